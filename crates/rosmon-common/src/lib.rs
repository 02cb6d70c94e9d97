//! Shared data model for rosmon: device identity, record schemas, metric
//! descriptors and the samples produced from them.

pub mod types;
