use std::sync::Arc;

use crate::{
    padding::PaddingSignal,
    ring::{BufferPolicy, RingSnapshot},
};

/// A [`BufferPolicy`] that asks the padding thread for a refill.
///
/// Both a low-watermark take and an empty take raise the signal. A full put
/// is the normal end of a refill and is only traced.
#[derive(Clone, Debug)]
pub struct PaddingPolicy {
    signal: Arc<PaddingSignal>,
}

impl PaddingPolicy {
    pub fn new(signal: Arc<PaddingSignal>) -> Self {
        Self { signal }
    }

    pub fn signal(&self) -> &Arc<PaddingSignal> {
        &self.signal
    }
}

impl BufferPolicy for PaddingPolicy {
    fn reject_put(&self, value: u64, ring: RingSnapshot) {
        #[cfg(feature = "tracing")]
        tracing::trace!(value, tail = ring.tail, cursor = ring.cursor, "Ring is full");
        #[cfg(not(feature = "tracing"))]
        let _ = (value, ring);
    }

    fn reject_take(&self, ring: RingSnapshot) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            tail = ring.tail,
            cursor = ring.cursor,
            "Ring drained before padding caught up"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = ring;
        self.signal.raise();
    }

    fn trigger_padding(&self, ring: RingSnapshot) {
        if self.signal.raise() {
            #[cfg(feature = "tracing")]
            tracing::trace!(tail = ring.tail, cursor = ring.cursor, "Requested padding");
        }
        #[cfg(not(feature = "tracing"))]
        let _ = ring;
    }
}
