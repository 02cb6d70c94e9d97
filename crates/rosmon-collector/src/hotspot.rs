use crate::catalog::DescriptorCatalog;
use crate::coercion::parse_value;
use crate::diagnostics::Diagnostic;
use crate::error::CollectError;
use crate::{Collector, CollectorContext};
use rosmon_common::types::{FieldSpec, LabelTuple, MetricDescriptor, Record, RecordSchema, Sample};

pub const HOTSPOT_ACTIVE_COMMAND: &str = "/ip/hotspot/active/print";

const SUBSYSTEM: &str = "user";

/// Label schema shared by every hotspot descriptor. `name` and `address`
/// identify the device; `user` and `comment` come from the session record.
pub const LABEL_NAMES: [&str; 4] = ["name", "address", "user", "comment"];

/// Record field holding the session's user; also identifies the record in
/// diagnostics.
const USER_FIELD: &str = "user";
const COMMENT_FIELD: &str = "comment";

/// Fields requested for every active hotspot session.
///
/// `uptime` is catalogued but never scanned: RouterOS reports it as a
/// duration string (`1h2m3s`), so its descriptor exists without samples.
pub fn default_schema() -> RecordSchema {
    RecordSchema::new(vec![
        FieldSpec::label(USER_FIELD),
        FieldSpec::described_only("uptime"),
        FieldSpec::counter("bytes-in"),
        FieldSpec::counter("bytes-out"),
        FieldSpec::counter("packets-in"),
        FieldSpec::counter("packets-out"),
        FieldSpec::label(COMMENT_FIELD),
    ])
}

/// Per-user traffic counters for active hotspot sessions.
pub struct HotspotCollector {
    schema: RecordSchema,
    catalog: DescriptorCatalog,
}

impl HotspotCollector {
    pub fn new(namespace: &str) -> Self {
        Self::with_schema(namespace, default_schema())
    }

    /// Builds a collector over an arbitrary schema. The catalog holds one
    /// descriptor per numeric field of `schema`.
    pub fn with_schema(namespace: &str, schema: RecordSchema) -> Self {
        let catalog = DescriptorCatalog::new(namespace, SUBSYSTEM, schema.numeric(), &LABEL_NAMES);
        Self { schema, catalog }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn catalog(&self) -> &DescriptorCatalog {
        &self.catalog
    }

    fn collect_for_record(&self, record: &Record, ctx: &CollectorContext<'_>) -> usize {
        let user = record.label(USER_FIELD);
        let labels = LabelTuple::from_iter([
            ctx.device.name.as_str(),
            ctx.device.address.as_str(),
            user,
            record.label(COMMENT_FIELD),
        ]);

        let mut emitted = 0;
        for property in self.schema.scanned() {
            if self.collect_for_property(property, user, &labels, record, ctx) {
                emitted += 1;
            }
        }
        emitted
    }

    /// Emits the sample for one (record, property) pair. Returns whether a
    /// sample was emitted.
    fn collect_for_property(
        &self,
        property: &str,
        user: &str,
        labels: &LabelTuple,
        record: &Record,
        ctx: &CollectorContext<'_>,
    ) -> bool {
        let Some(desc) = self.catalog.get(property) else {
            return false;
        };
        let value = match record.get(property) {
            Some(value) if !value.is_empty() => value,
            _ => return false,
        };

        let parsed = match parse_value(value) {
            Ok(v) => v,
            Err(e) => {
                ctx.diagnostics.record(&Diagnostic::FieldRejected {
                    device: ctx.device,
                    user,
                    property,
                    value,
                    error: &e,
                });
                return false;
            }
        };

        match Sample::new(desc.clone(), parsed, labels.clone()) {
            Ok(sample) => {
                tracing::trace!(
                    device = %ctx.device.name,
                    metric = %sample.name(),
                    value = parsed,
                    "Emitting sample"
                );
                ctx.emitter.emit(sample);
                true
            }
            Err(e) => {
                ctx.diagnostics.record(&Diagnostic::SampleRejected {
                    device: ctx.device,
                    user,
                    property,
                    error: &e,
                });
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl Collector for HotspotCollector {
    fn name(&self) -> &str {
        "hotspot"
    }

    fn describe(&self) -> Box<dyn Iterator<Item = &MetricDescriptor> + '_> {
        Box::new(self.catalog.describe())
    }

    async fn collect(&self, ctx: &CollectorContext<'_>) -> Result<(), CollectError> {
        let proplist = self.schema.projection();
        let records = ctx.fetch(HOTSPOT_ACTIVE_COMMAND, &proplist).await?;

        let emitted: usize = records
            .iter()
            .map(|record| self.collect_for_record(record, ctx))
            .sum();

        tracing::debug!(
            device = %ctx.device.name,
            sessions = records.len(),
            samples = emitted,
            "Hotspot collection finished"
        );
        Ok(())
    }
}
