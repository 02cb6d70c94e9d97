use std::time::Duration;

/// Errors raised by a [`DeviceClient`](crate::DeviceClient) implementation.
///
/// # Examples
///
/// ```rust
/// use rosmon_collector::error::DeviceError;
///
/// let err = DeviceError::Trap {
///     category: Some(2),
///     message: "no such command".to_string(),
/// };
/// assert!(err.to_string().contains("no such command"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Socket or file level failure.
    #[error("Device: I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device rejected the command (`!trap` reply).
    #[error("Device: command failed (category={category:?}): {message}")]
    Trap {
        category: Option<u32>,
        message: String,
    },

    /// The reply could not be understood.
    #[error("Device: protocol error: {0}")]
    Protocol(String),

    /// The reply payload could not be decoded into records.
    #[error("Device: decode error: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The connection was closed before the reply completed.
    #[error("Device: connection closed")]
    Closed,
}

/// Pass-level failure of a collection pass. Zero samples are emitted when
/// `collect` returns one of these.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("fetching {command} from {device} failed: {source}")]
    Fetch {
        device: String,
        command: String,
        #[source]
        source: DeviceError,
    },

    #[error("fetching {command} from {device} timed out after {timeout:?}")]
    Timeout {
        device: String,
        command: String,
        timeout: Duration,
    },
}

impl CollectError {
    pub fn device(&self) -> &str {
        match self {
            CollectError::Fetch { device, .. } | CollectError::Timeout { device, .. } => device,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CollectError::Timeout { .. })
    }
}

/// Failure to add a collector to a [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("descriptor {name} is already registered by collector {owner}")]
    DuplicateDescriptor { name: String, owner: String },
}
