//! Metric collection for RouterOS devices.
//!
//! Each [`Collector`] queries a device through a [`DeviceClient`], turns the
//! numeric fields of the returned records into labeled [`Sample`]s and hands
//! them to an [`Emitter`]. A malformed field only costs its own sample: the
//! failure is reported to the [`DiagnosticSink`] and the pass carries on.
//!
//! [`Sample`]: rosmon_common::types::Sample

pub mod catalog;
pub mod coercion;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod hotspot;
pub mod registry;


use rosmon_common::types::{Device, MetricDescriptor, Record};
use std::time::Duration;

pub use catalog::DescriptorCatalog;
pub use diagnostics::{Diagnostic, DiagnosticSink, TracingDiagnostics};
pub use emit::{Emitter, SampleBuffer};
pub use error::{CollectError, DeviceError};

/// Default upper bound for a single device fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Request/response channel to a device.
///
/// Implementations own the connection and serialize access to it. The
/// `proplist` limits which fields the device sends back for each record.
#[async_trait::async_trait]
pub trait DeviceClient: Send + Sync {
    /// Runs `command` and returns the reply records in device order.
    async fn run(&self, command: &str, proplist: &[&str]) -> Result<Vec<Record>, DeviceError>;
}

/// Everything one collection pass against one device needs.
///
/// Built per pass by the caller; collectors keep no state between passes.
pub struct CollectorContext<'a> {
    pub device: &'a Device,
    pub client: &'a dyn DeviceClient,
    pub emitter: &'a dyn Emitter,
    pub diagnostics: &'a dyn DiagnosticSink,
    /// Upper bound for the device fetch. Elapsing fails the pass.
    pub timeout: Duration,
}

impl<'a> CollectorContext<'a> {
    pub fn new(
        device: &'a Device,
        client: &'a dyn DeviceClient,
        emitter: &'a dyn Emitter,
        diagnostics: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            device,
            client,
            emitter,
            diagnostics,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs `command` on the device, bounded by [`Self::timeout`].
    ///
    /// A transport failure or an elapsed timeout is logged once through the
    /// diagnostic sink and returned as a pass-level [`CollectError`].
    pub async fn fetch(
        &self,
        command: &str,
        proplist: &[&str],
    ) -> Result<Vec<Record>, CollectError> {
        let reply = tokio::time::timeout(self.timeout, self.client.run(command, proplist)).await;
        let error = match reply {
            Ok(Ok(records)) => return Ok(records),
            Ok(Err(source)) => CollectError::Fetch {
                device: self.device.name.clone(),
                command: command.to_string(),
                source,
            },
            Err(_) => CollectError::Timeout {
                device: self.device.name.clone(),
                command: command.to_string(),
                timeout: self.timeout,
            },
        };
        self.diagnostics.record(&Diagnostic::FetchFailed {
            device: self.device,
            command,
            error: &error,
        });
        Err(error)
    }
}

/// A category of device metrics (hotspot sessions, interfaces, ...).
///
/// `describe` is called once at registration; `collect` once per pass.
/// Collectors are shared across concurrent passes for different devices, so
/// the trait requires `Send + Sync` and `collect` takes `&self`.
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    /// Short collector name (e.g. `"hotspot"`), used for logging.
    fn name(&self) -> &str;

    /// Every descriptor this collector can emit. Returns a fresh iterator on
    /// each call.
    fn describe(&self) -> Box<dyn Iterator<Item = &MetricDescriptor> + '_>;

    /// Runs one pass against `ctx.device`.
    ///
    /// # Errors
    ///
    /// Fails only when the device fetch fails or times out. Field-level
    /// problems are reported to `ctx.diagnostics` and skipped.
    async fn collect(&self, ctx: &CollectorContext<'_>) -> Result<(), CollectError>;
}
