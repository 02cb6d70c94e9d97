use rosmon_common::types::Sample;
use std::sync::Mutex;

/// Write-only sink for finished samples. `emit` must not block.
///
/// The agent gives every device pass its own [`SampleBuffer`] and forwards
/// the buffered samples to its consumer once the pass is over.
pub trait Emitter: Send + Sync {
    fn emit(&self, sample: Sample);
}

/// In-memory sink that keeps every sample in emission order.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: Mutex<Vec<Sample>>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every buffered sample, leaving the buffer empty.
    pub fn drain(&self) -> Vec<Sample> {
        match self.samples.lock() {
            Ok(mut samples) => std::mem::take(&mut *samples),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Emitter for SampleBuffer {
    fn emit(&self, sample: Sample) {
        match self.samples.lock() {
            Ok(mut samples) => samples.push(sample),
            Err(poisoned) => poisoned.into_inner().push(sample),
        }
    }
}
