//! Prometheus text exposition of one collection pass, written to disk for a
//! textfile collector to pick up.

use prometheus_client::collector::Collector;
use prometheus_client::encoding::{text, DescriptorEncoder, EncodeMetric};
use prometheus_client::metrics::counter::ConstCounter;
use prometheus_client::metrics::MetricType;
use prometheus_client::registry::Registry;
use rosmon_common::types::{MetricDescriptor, Sample};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The samples of one finished pass, exposed as constant counters.
#[derive(Debug)]
struct PassSamples {
    samples: Vec<Sample>,
}

impl PassSamples {
    /// Samples grouped by metric family, families in order of first
    /// appearance.
    fn families(&self) -> Vec<(&Arc<MetricDescriptor>, Vec<&Sample>)> {
        let mut families: Vec<(&Arc<MetricDescriptor>, Vec<&Sample>)> = Vec::new();
        for sample in &self.samples {
            match families
                .iter_mut()
                .find(|(desc, _)| desc.name == sample.name())
            {
                Some((_, members)) => members.push(sample),
                None => families.push((sample.descriptor(), vec![sample])),
            }
        }
        families
    }
}

impl Collector for PassSamples {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), std::fmt::Error> {
        for (desc, members) in self.families() {
            let mut family =
                encoder.encode_descriptor(&desc.name, &desc.help, None, MetricType::Counter)?;
            for sample in members {
                let labels: Vec<(&str, &str)> = desc
                    .label_names
                    .iter()
                    .map(String::as_str)
                    .zip(sample.labels().values().iter().map(String::as_str))
                    .collect();
                let counter = ConstCounter::new(sample.value());
                let metric = family.encode_family(&labels)?;
                counter.encode(metric)?;
            }
        }
        Ok(())
    }
}

/// Renders `samples` in the OpenMetrics text format. Every family is a
/// counter, so its sample lines carry the `_total` suffix.
///
/// # Examples
///
/// ```
/// use rosmon_agent::textfile::render;
/// use rosmon_common::types::{LabelTuple, MetricDescriptor, Sample};
/// use std::sync::Arc;
///
/// let desc = Arc::new(MetricDescriptor::for_property("mikrotik", "user", "bytes-in", &["user"]));
/// let sample = Sample::new(desc, 1024.0, LabelTuple::from_iter(["alice"])).unwrap();
/// let text = render(&[sample]).unwrap();
/// assert!(text.contains("# TYPE mikrotik_user_bytes_in counter"));
/// assert!(text.contains("mikrotik_user_bytes_in_total{user=\"alice\"} 1024"));
/// ```
pub fn render(samples: &[Sample]) -> Result<String, std::fmt::Error> {
    let mut registry = Registry::default();
    registry.register_collector(Box::new(PassSamples {
        samples: samples.to_vec(),
    }));
    let mut body = String::new();
    text::encode(&mut body, &registry)?;
    Ok(body)
}

/// Writes `body` to `path` through a sibling temp file and a rename, so
/// readers never see a half-written file.
pub async fn write_atomic(path: &Path, body: &str) -> std::io::Result<()> {
    let mut tmp = PathBuf::from(path);
    let file_name = path
        .file_name()
        .map(|n| format!(".{}.tmp", n.to_string_lossy()))
        .unwrap_or_else(|| ".rosmon.tmp".to_string());
    tmp.set_file_name(file_name);
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await
}
