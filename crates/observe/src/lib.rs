//! Observability helpers shared between the binaries: initialization logic
//! for logging and a panic hook that routes panics through `tracing`.
pub mod tracing;
