//! Diagnostics sink for development-only error reports.
//!
//! The cache controller reports storage failures here only when running in
//! [`ExecutionMode::Development`](crate::ExecutionMode::Development). In every
//! other mode nothing is sent, so production never depends on a sink existing.

use tracing::error;

/// Receives errors worth showing to a developer.
pub trait DiagnosticsSink: Send + Sync {
    /// Report `err`.
    fn report(&self, err: &dyn std::error::Error);
}

/// Sink forwarding reports to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn report(&self, err: &dyn std::error::Error) {
        error!("paywall mailbox storage failure: {err}");
    }
}
