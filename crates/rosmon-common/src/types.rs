use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Identity of a monitored RouterOS device.
///
/// The name and address are copied into the first two positions of every
/// label tuple and into every diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub address: String,
}

impl Device {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// How a record field is used during a collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Copied verbatim into the label tuple.
    Label,
    /// Catalogued and parsed into a counter sample for every record.
    Counter,
    /// Catalogued and requested from the device, but never read back.
    DescribedOnly,
}

impl FieldRole {
    /// Whether the field owns a metric descriptor.
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldRole::Counter | FieldRole::DescribedOnly)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub role: FieldRole,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, role: FieldRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn label(name: impl Into<String>) -> Self {
        Self::new(name, FieldRole::Label)
    }

    pub fn counter(name: impl Into<String>) -> Self {
        Self::new(name, FieldRole::Counter)
    }

    pub fn described_only(name: impl Into<String>) -> Self {
        Self::new(name, FieldRole::DescribedOnly)
    }
}

/// Ordered description of the fields a collector reads from each record.
///
/// Label fields and numeric fields are disjoint by construction: every name
/// carries exactly one [`FieldRole`].
///
/// # Examples
///
/// ```
/// use rosmon_common::types::{FieldSpec, RecordSchema};
///
/// let schema = RecordSchema::new(vec![
///     FieldSpec::label("user"),
///     FieldSpec::described_only("uptime"),
///     FieldSpec::counter("bytes-in"),
/// ]);
/// assert_eq!(schema.projection(), vec!["user", "uptime", "bytes-in"]);
/// assert_eq!(schema.numeric().count(), 2);
/// assert_eq!(schema.scanned().collect::<Vec<_>>(), vec!["bytes-in"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Builds a schema, keeping the first occurrence of a repeated field name.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let mut unique: Vec<FieldSpec> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.iter().any(|f| f.name == field.name) {
                unique.push(field);
            }
        }
        Self { fields: unique }
    }

    /// Every field name, in schema order. This is what gets requested from
    /// the device.
    pub fn projection(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.with_role(|role| role == FieldRole::Label)
    }

    /// Fields that own a descriptor (counters and described-only fields).
    pub fn numeric(&self) -> impl Iterator<Item = &str> + '_ {
        self.with_role(FieldRole::is_numeric)
    }

    /// Fields whose values are read from each record.
    pub fn scanned(&self) -> impl Iterator<Item = &str> + '_ {
        self.with_role(|role| role == FieldRole::Counter)
    }

    fn with_role(
        &self,
        pred: impl Fn(FieldRole) -> bool + 'static,
    ) -> impl Iterator<Item = &str> + '_ {
        self.fields
            .iter()
            .filter(move |f| pred(f.role))
            .map(|f| f.name.as_str())
    }
}

/// One row returned by a device query: property name to raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Raw value of `name`, or `None` when the device did not send it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Label value of `name`; a missing field reads as the empty string.
    pub fn label(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Drops every field not listed in `proplist`.
    pub fn retain_fields(&mut self, proplist: &[&str]) {
        self.fields.retain(|k, _| proplist.contains(&k.as_str()));
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Static metadata for one metric family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

impl MetricDescriptor {
    /// Builds `{namespace}_{subsystem}_{property}` with dashes in the property
    /// turned into underscores. The help text is the raw property name.
    ///
    /// # Examples
    ///
    /// ```
    /// use rosmon_common::types::MetricDescriptor;
    ///
    /// let desc = MetricDescriptor::for_property("mikrotik", "user", "bytes-in", &["name", "user"]);
    /// assert_eq!(desc.name, "mikrotik_user_bytes_in");
    /// assert_eq!(desc.help, "bytes-in");
    /// assert_eq!(desc.label_names, vec!["name", "user"]);
    /// ```
    pub fn for_property<S: AsRef<str>>(
        namespace: &str,
        subsystem: &str,
        property: &str,
        label_names: &[S],
    ) -> Self {
        let cleaned = metric_name_cleanup(property);
        let name = [namespace, subsystem, cleaned.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        Self {
            name,
            help: property.to_string(),
            label_names: label_names.iter().map(|l| l.as_ref().to_string()).collect(),
        }
    }
}

fn metric_name_cleanup(property: &str) -> String {
    property.replace('-', "_")
}

/// Ordered label values, aligned with a descriptor's `label_names`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTuple(Vec<String>);

impl LabelTuple {
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for LabelTuple {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("metric {metric} expects {expected} label values, got {actual}")]
    LabelArity {
        metric: String,
        expected: usize,
        actual: usize,
    },
}

/// The unit handed to an emitter: a descriptor, a counter value and its
/// labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    descriptor: Arc<MetricDescriptor>,
    value: f64,
    labels: LabelTuple,
}

impl Sample {
    /// Builds a sample, rejecting label tuples whose arity does not match the
    /// descriptor's label schema.
    pub fn new(
        descriptor: Arc<MetricDescriptor>,
        value: f64,
        labels: LabelTuple,
    ) -> Result<Self, SampleError> {
        if labels.arity() != descriptor.label_names.len() {
            return Err(SampleError::LabelArity {
                metric: descriptor.name.clone(),
                expected: descriptor.label_names.len(),
                actual: labels.arity(),
            });
        }
        Ok(Self {
            descriptor,
            value,
            labels,
        })
    }

    pub fn descriptor(&self) -> &Arc<MetricDescriptor> {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn labels(&self) -> &LabelTuple {
        &self.labels
    }

    /// Label value for `label_name`, looked up through the descriptor schema.
    pub fn label(&self, label_name: &str) -> Option<&str> {
        self.descriptor
            .label_names
            .iter()
            .position(|n| n == label_name)
            .and_then(|i| self.labels.values().get(i))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> Arc<MetricDescriptor> {
        Arc::new(MetricDescriptor::for_property(
            "mikrotik",
            "user",
            "packets-out",
            &["name", "address", "user", "comment"],
        ))
    }

    #[test]
    fn metric_name_replaces_every_dash() {
        let desc = MetricDescriptor::for_property("ns", "sub", "a-b-c", &["x"]);
        assert_eq!(desc.name, "ns_sub_a_b_c");
    }

    #[test]
    fn metric_name_skips_empty_parts() {
        let desc = MetricDescriptor::for_property("ns", "", "bytes-in", &["x"]);
        assert_eq!(desc.name, "ns_bytes_in");
    }

    #[test]
    fn sample_rejected_when_label_arity_differs() {
        let err = Sample::new(
            descriptor(),
            1.0,
            LabelTuple::from_iter(["router1", "10.0.0.1"]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SampleError::LabelArity {
                metric: "mikrotik_user_packets_out".into(),
                expected: 4,
                actual: 2,
            }
        );
    }

    #[test]
    fn sample_label_resolves_by_schema_name() {
        let sample = Sample::new(
            descriptor(),
            7.0,
            LabelTuple::from_iter(["router1", "10.0.0.1", "alice", ""]),
        )
        .unwrap();
        assert_eq!(sample.label("user"), Some("alice"));
        assert_eq!(sample.label("comment"), Some(""));
        assert_eq!(sample.label("missing"), None);
        assert_eq!(sample.name(), "mikrotik_user_packets_out");
    }

    #[test]
    fn record_missing_label_reads_as_empty_string() {
        let record: Record = [("user", "alice")].into_iter().collect();
        assert_eq!(record.label("user"), "alice");
        assert_eq!(record.label("comment"), "");
        assert_eq!(record.get("comment"), None);
    }

    #[test]
    fn record_retain_keeps_only_projected_fields() {
        let mut record: Record = [("user", "bob"), ("mac-address", "aa:bb"), ("bytes-in", "5")]
            .into_iter()
            .collect();
        record.retain_fields(&["user", "bytes-in"]);
        assert_eq!(record.get("user"), Some("bob"));
        assert_eq!(record.get("bytes-in"), Some("5"));
        assert_eq!(record.get("mac-address"), None);
    }

    #[test]
    fn schema_dedup_keeps_first_role() {
        let schema = RecordSchema::new(vec![
            FieldSpec::label("user"),
            FieldSpec::counter("user"),
            FieldSpec::counter("bytes-in"),
        ]);
        assert_eq!(schema.projection(), vec!["user", "bytes-in"]);
        assert_eq!(schema.labels().collect::<Vec<_>>(), vec!["user"]);
        assert_eq!(schema.scanned().collect::<Vec<_>>(), vec!["bytes-in"]);
    }

    #[test]
    fn record_deserializes_from_flat_json_object() {
        let record: Record =
            serde_json::from_str(r#"{"user":"alice","bytes-in":"1024"}"#).unwrap();
        assert_eq!(record.get("bytes-in"), Some("1024"));
    }
}
