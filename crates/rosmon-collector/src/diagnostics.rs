use crate::coercion::ParseError;
use crate::error::CollectError;
use rosmon_common::types::{Device, SampleError};

/// A problem met during a collection pass.
#[derive(Debug)]
pub enum Diagnostic<'a> {
    /// The device fetch failed or timed out; the pass produced nothing.
    FetchFailed {
        device: &'a Device,
        command: &'a str,
        error: &'a CollectError,
    },
    /// One field of one record was not a number; only that sample is lost.
    FieldRejected {
        device: &'a Device,
        user: &'a str,
        property: &'a str,
        value: &'a str,
        error: &'a ParseError,
    },
    /// A parsed value could not be turned into a sample.
    SampleRejected {
        device: &'a Device,
        user: &'a str,
        property: &'a str,
        error: &'a SampleError,
    },
}

/// Structured sink for collection diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: &Diagnostic<'_>);
}

/// Writes every diagnostic as one `tracing` error event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn record(&self, diagnostic: &Diagnostic<'_>) {
        match diagnostic {
            Diagnostic::FetchFailed {
                device,
                command,
                error,
            } => {
                tracing::error!(
                    device = %device.name,
                    address = %device.address,
                    command = %command,
                    timeout = error.is_timeout(),
                    error = %error,
                    "Failed to fetch metrics from device"
                );
            }
            Diagnostic::FieldRejected {
                device,
                user,
                property,
                value,
                error,
            } => {
                tracing::error!(
                    device = %device.name,
                    user = %user,
                    property = %property,
                    value = %value,
                    error = %error,
                    "Failed to parse metric value"
                );
            }
            Diagnostic::SampleRejected {
                device,
                user,
                property,
                error,
            } => {
                tracing::error!(
                    device = %device.name,
                    user = %user,
                    property = %property,
                    error = %error,
                    "Failed to build metric sample"
                );
            }
        }
    }
}
