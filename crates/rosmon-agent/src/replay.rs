use async_trait::async_trait;
use rosmon_collector::error::DeviceError;
use rosmon_collector::DeviceClient;
use rosmon_common::types::Record;
use std::collections::HashMap;
use std::path::PathBuf;

/// Reply records keyed by command, as stored in a snapshot file:
///
/// ```json
/// { "/ip/hotspot/active/print": [ { "user": "alice", "bytes-in": "1024" } ] }
/// ```
pub type Snapshot = HashMap<String, Vec<Record>>;

/// [`DeviceClient`] that answers from a JSON snapshot on disk.
///
/// The file is read again on every call so it can be swapped while the agent
/// runs. Only the fields listed in the proplist are returned, like a device
/// honoring `=.proplist=`.
#[derive(Debug, Clone)]
pub struct ReplayClient {
    path: PathBuf,
}

impl ReplayClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Snapshot, DeviceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content).map_err(|e| DeviceError::Decode(Box::new(e)))
    }
}

#[async_trait]
impl DeviceClient for ReplayClient {
    async fn run(&self, command: &str, proplist: &[&str]) -> Result<Vec<Record>, DeviceError> {
        let mut snapshot = self.load().await?;
        let Some(mut records) = snapshot.remove(command) else {
            return Err(DeviceError::Trap {
                category: Some(0),
                message: format!("no such command: {command}"),
            });
        };
        if !proplist.is_empty() {
            for record in &mut records {
                record.retain_fields(proplist);
            }
        }
        tracing::trace!(
            path = %self.path.display(),
            command = %command,
            records = records.len(),
            "Replayed device reply"
        );
        Ok(records)
    }
}
