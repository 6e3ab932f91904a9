//! Observability setup for Kappa: structured logging and optional
//! OpenTelemetry trace export.

pub mod tracing_setup;
