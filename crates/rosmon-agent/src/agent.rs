use crate::config::AgentConfig;
use crate::replay::ReplayClient;
use crate::scheduler::{DeviceTarget, PassReport, PassScheduler};
use crate::textfile;
use anyhow::{Context, Result};
use rosmon_collector::hotspot::HotspotCollector;
use rosmon_collector::registry::Registry;
use rosmon_collector::{DiagnosticSink, TracingDiagnostics};
use rosmon_common::types::Sample;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outcome of one agent tick.
#[derive(Debug)]
pub struct TickSummary {
    pub report: PassReport,
    pub samples: Vec<Sample>,
}

/// Wires collectors, devices and the sample channel together.
pub struct Agent {
    scheduler: PassScheduler,
    rx: mpsc::Receiver<Sample>,
    output_path: Option<PathBuf>,
}

impl Agent {
    /// Builds an agent whose devices are served by [`ReplayClient`]s.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let targets = config
            .devices
            .iter()
            .map(|d| DeviceTarget::new(d.device(), Arc::new(ReplayClient::new(&d.snapshot))))
            .collect();
        Self::with_targets(config, targets, Arc::new(TracingDiagnostics))
    }

    pub fn with_targets(
        config: &AgentConfig,
        targets: Vec<DeviceTarget>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let mut registry = Registry::new();
        if config.collectors.hotspot {
            registry
                .register(Arc::new(HotspotCollector::new(&config.namespace)))
                .context("Failed to register hotspot collector")?;
        }
        if registry.descriptors().is_empty() {
            tracing::warn!("No collectors enabled, passes will produce no samples");
        }
        tracing::info!(
            descriptors = registry.descriptors().len(),
            devices = targets.len(),
            "Collectors registered"
        );

        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let scheduler = PassScheduler::new(Arc::new(registry), targets, tx, diagnostics)
            .with_fetch_timeout(config.fetch_timeout())
            .with_max_concurrent(config.max_concurrent);

        Ok(Self {
            scheduler,
            rx,
            output_path: config.output_path.clone(),
        })
    }

    /// Runs one pass over all devices, collects what it emitted and, when an
    /// output path is configured, replaces the exposition file with it.
    pub async fn tick(&mut self) -> Result<TickSummary> {
        let mut samples = Vec::new();

        let pass = self.scheduler.run_pass();
        tokio::pin!(pass);
        let report = loop {
            tokio::select! {
                report = &mut pass => break report,
                Some(sample) = self.rx.recv() => samples.push(sample),
            }
        };
        while let Ok(sample) = self.rx.try_recv() {
            samples.push(sample);
        }

        if let Some(path) = &self.output_path {
            let body = textfile::render(&samples).context("Failed to encode samples")?;
            textfile::write_atomic(path, &body)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        tracing::info!(
            samples = samples.len(),
            failed_devices = report.failures.len(),
            "Tick complete"
        );
        Ok(TickSummary { report, samples })
    }
}
