use rosmon_common::types::MetricDescriptor;
use std::sync::Arc;

/// Immutable, ordered mapping from numeric property to metric descriptor.
///
/// Built once per collector and shared read-only by every pass. The catalog
/// always holds exactly one descriptor per configured numeric property, no
/// matter which properties a given record actually carries.
///
/// # Examples
///
/// ```
/// use rosmon_collector::catalog::DescriptorCatalog;
///
/// let catalog = DescriptorCatalog::new(
///     "mikrotik",
///     "user",
///     ["bytes-in", "bytes-out"],
///     &["name", "address", "user", "comment"],
/// );
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.describe().count(), 2);
/// assert_eq!(catalog.get("bytes-out").unwrap().name, "mikrotik_user_bytes_out");
/// assert!(catalog.get("uptime").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct DescriptorCatalog {
    entries: Vec<(String, Arc<MetricDescriptor>)>,
}

impl DescriptorCatalog {
    /// Builds one descriptor per property, all sharing `label_names`.
    /// A property listed twice keeps its first descriptor.
    pub fn new<I, P, S>(namespace: &str, subsystem: &str, properties: I, label_names: &[S]) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
        S: AsRef<str>,
    {
        let mut entries: Vec<(String, Arc<MetricDescriptor>)> = Vec::new();
        for property in properties {
            let property = property.as_ref();
            if entries.iter().any(|(p, _)| p == property) {
                continue;
            }
            let desc = MetricDescriptor::for_property(namespace, subsystem, property, label_names);
            entries.push((property.to_string(), Arc::new(desc)));
        }
        Self { entries }
    }

    /// Descriptors in property order. Each call starts a new iteration.
    pub fn describe(&self) -> impl Iterator<Item = &MetricDescriptor> + '_ {
        self.entries.iter().map(|(_, desc)| desc.as_ref())
    }

    pub fn get(&self, property: &str) -> Option<&Arc<MetricDescriptor>> {
        self.entries
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, desc)| desc)
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 4] = ["name", "address", "user", "comment"];

    #[test]
    fn catalog_yields_same_descriptors_on_every_describe() {
        let catalog = DescriptorCatalog::new(
            "mikrotik",
            "user",
            ["bytes-in", "bytes-out", "packets-in", "packets-out"],
            &LABELS,
        );
        let first: Vec<_> = catalog.describe().cloned().collect();
        let second: Vec<_> = catalog.describe().cloned().collect();
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            vec![
                "mikrotik_user_bytes_in",
                "mikrotik_user_bytes_out",
                "mikrotik_user_packets_in",
                "mikrotik_user_packets_out",
            ]
        );
    }

    #[test]
    fn catalog_shares_label_schema_across_descriptors() {
        let catalog = DescriptorCatalog::new("mikrotik", "user", ["uptime", "bytes-in"], &LABELS);
        for desc in catalog.describe() {
            assert_eq!(desc.label_names, LABELS);
        }
    }

    #[test]
    fn catalog_ignores_repeated_property() {
        let catalog = DescriptorCatalog::new("ns", "sub", ["a", "b", "a"], &LABELS);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.properties().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn catalog_is_empty_without_properties() {
        let catalog = DescriptorCatalog::new("ns", "sub", Vec::<String>::new(), &LABELS);
        assert!(catalog.is_empty());
        assert_eq!(catalog.describe().count(), 0);
    }
}
