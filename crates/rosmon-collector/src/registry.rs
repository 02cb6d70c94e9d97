use crate::error::{CollectError, RegistryError};
use crate::{Collector, CollectorContext};
use rosmon_common::types::MetricDescriptor;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Set of collectors run against every device, with the union of their
/// descriptors.
///
/// `register` asks the collector for its descriptors exactly once; the
/// registry keeps that snapshot for its whole lifetime.
///
/// # Examples
///
/// ```
/// use rosmon_collector::hotspot::HotspotCollector;
/// use rosmon_collector::registry::Registry;
/// use std::sync::Arc;
///
/// let mut registry = Registry::new();
/// registry.register(Arc::new(HotspotCollector::new("mikrotik"))).unwrap();
/// assert_eq!(registry.descriptors().len(), 5);
/// assert!(registry.register(Arc::new(HotspotCollector::new("mikrotik"))).is_err());
/// ```
#[derive(Default)]
pub struct Registry {
    collectors: Vec<Arc<dyn Collector>>,
    descriptors: Vec<MetricDescriptor>,
    owners: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `collector`, rejecting it when any of its descriptor names is
    /// already taken. Nothing is registered on rejection.
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<(), RegistryError> {
        let described: Vec<MetricDescriptor> = collector.describe().cloned().collect();

        let mut seen = HashSet::new();
        for desc in &described {
            if let Some(owner) = self.owners.get(&desc.name) {
                return Err(RegistryError::DuplicateDescriptor {
                    name: desc.name.clone(),
                    owner: owner.clone(),
                });
            }
            if !seen.insert(desc.name.as_str()) {
                return Err(RegistryError::DuplicateDescriptor {
                    name: desc.name.clone(),
                    owner: collector.name().to_string(),
                });
            }
        }

        for desc in &described {
            self.owners.insert(desc.name.clone(), collector.name().to_string());
        }
        tracing::debug!(
            collector = collector.name(),
            descriptors = described.len(),
            "Collector registered"
        );
        self.descriptors.extend(described);
        self.collectors.push(collector);
        Ok(())
    }

    pub fn descriptors(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    /// Runs every collector against `ctx.device`, one after the other.
    ///
    /// A failing collector does not stop the others; each failure is
    /// returned next to the collector's name.
    pub async fn collect(&self, ctx: &CollectorContext<'_>) -> Vec<(String, CollectError)> {
        let mut failures = Vec::new();
        for collector in &self.collectors {
            if let Err(e) = collector.collect(ctx).await {
                failures.push((collector.name().to_string(), e));
            }
        }
        failures
    }
}
