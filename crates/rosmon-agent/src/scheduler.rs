use rosmon_collector::error::CollectError;
use rosmon_collector::registry::Registry;
use rosmon_collector::{CollectorContext, DeviceClient, DiagnosticSink, SampleBuffer};
use rosmon_common::types::{Device, Sample};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};

/// A device together with the client used to reach it.
#[derive(Clone)]
pub struct DeviceTarget {
    pub device: Device,
    pub client: Arc<dyn DeviceClient>,
}

impl DeviceTarget {
    pub fn new(device: Device, client: Arc<dyn DeviceClient>) -> Self {
        Self { device, client }
    }
}

/// One collector that failed against one device during a pass.
#[derive(Debug)]
pub struct PassFailure {
    pub device: String,
    pub collector: String,
    pub error: CollectError,
}

#[derive(Debug, Default)]
pub struct PassReport {
    pub devices: usize,
    pub failures: Vec<PassFailure>,
    pub elapsed: Duration,
}

impl PassReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs collection passes over every target, several devices at a time.
///
/// Each device pass is independent: a device that fails or times out is
/// reported in the [`PassReport`] while the others complete normally.
///
/// A device pass collects into its own buffer and then forwards the samples
/// into `samples` with an awaited send, so a full channel holds the pass back
/// until the consumer catches up. The consumer has to drain the channel while
/// [`run_pass`](Self::run_pass) is running.
pub struct PassScheduler {
    registry: Arc<Registry>,
    targets: Vec<DeviceTarget>,
    samples: mpsc::Sender<Sample>,
    diagnostics: Arc<dyn DiagnosticSink>,
    fetch_timeout: Duration,
    max_concurrent: usize,
}

impl PassScheduler {
    pub fn new(
        registry: Arc<Registry>,
        targets: Vec<DeviceTarget>,
        samples: mpsc::Sender<Sample>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            registry,
            targets,
            samples,
            diagnostics,
            fetch_timeout: rosmon_collector::DEFAULT_FETCH_TIMEOUT,
            max_concurrent: 4,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Collects every registered collector from every target once.
    pub async fn run_pass(&self) -> PassReport {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            let sem = Arc::clone(&semaphore);
            let registry = Arc::clone(&self.registry);
            let tx = self.samples.clone();
            let diagnostics = Arc::clone(&self.diagnostics);
            let device_name = target.device.name.clone();
            let target = target.clone();
            let timeout = self.fetch_timeout;

            let task = tokio::spawn(async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return Vec::new();
                };
                let buffer = SampleBuffer::new();
                let ctx = CollectorContext::new(
                    &target.device,
                    target.client.as_ref(),
                    &buffer,
                    diagnostics.as_ref(),
                )
                .with_timeout(timeout);

                let failures = registry
                    .collect(&ctx)
                    .await
                    .into_iter()
                    .map(|(collector, error)| PassFailure {
                        device: target.device.name.clone(),
                        collector,
                        error,
                    })
                    .collect::<Vec<_>>();

                for sample in buffer.drain() {
                    if tx.send(sample).await.is_err() {
                        tracing::warn!(
                            device = %target.device.name,
                            "Sample receiver closed, discarding rest of device pass"
                        );
                        break;
                    }
                }
                failures
            });
            tasks.push((device_name, task));
        }

        let mut report = PassReport {
            devices: self.targets.len(),
            ..Default::default()
        };
        for (device, task) in tasks {
            match task.await {
                Ok(failures) => report.failures.extend(failures),
                Err(e) => {
                    tracing::error!(device = %device, error = %e, "Device collection task panicked");
                }
            }
        }
        report.elapsed = start.elapsed();

        tracing::info!(
            devices = report.devices,
            failed = report.failures.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Collection pass finished"
        );
        report
    }
}
