use crossbeam_utils::sync::{Parker, Unparker};
use portable_atomic::{AtomicBool, AtomicU64, Ordering};

/// The low-watermark signal between consumers and the padding thread.
///
/// Raising is wait-free and safe from any number of threads. Raises that
/// arrive while one is already pending collapse into it, so a burst of
/// low-watermark takes wakes the padding thread once.
#[derive(Debug)]
pub struct PaddingSignal {
    pending: AtomicBool,
    raised: AtomicU64,
    unparker: Unparker,
}

impl PaddingSignal {
    /// Creates a signal and the [`Parker`] the padding thread sleeps on.
    pub fn new() -> (Self, Parker) {
        let parker = Parker::new();
        let signal = Self {
            pending: AtomicBool::new(false),
            raised: AtomicU64::new(0),
            unparker: parker.unparker().clone(),
        };
        (signal, parker)
    }

    /// Requests a refill. Returns `true` if this call woke the padding thread,
    /// `false` if a request was already pending.
    pub fn raise(&self) -> bool {
        self.raised.fetch_add(1, Ordering::Relaxed);
        if self.pending.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.unparker.unpark();
        true
    }

    /// Clears the pending request, returning whether there was one.
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Total raises, coalesced or not.
    pub fn raised(&self) -> u64 {
        self.raised.load(Ordering::Relaxed)
    }

    /// Wakes the padding thread without requesting a refill.
    pub(crate) fn wake(&self) {
        self.unparker.unpark();
    }
}
