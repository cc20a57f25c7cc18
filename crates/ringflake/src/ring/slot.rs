use portable_atomic::{AtomicU8, AtomicU64, Ordering};

/// Who may touch a slot next.
///
/// Every slot cycles `CanPut -> CanTake -> CanPut` forever. The producer only
/// writes slots in `CanPut`; a consumer only reads a slot it has claimed,
/// which is always in `CanTake`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlotState {
    /// Empty, or already consumed. Owned by the producer.
    CanPut = 0,
    /// Holds a published value that no consumer has released yet.
    CanTake = 1,
}

impl SlotState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::CanPut,
            _ => Self::CanTake,
        }
    }
}

/// One ring cell: a payload and the flag that publishes it.
///
/// Writers store the payload first and then the flag with `Release`; readers
/// load the flag with `Acquire` before the payload. The producer also bumps
/// `tail` with `Release` after the flag, and consumers only claim a sequence
/// after an `Acquire` load of `tail` covers it, so a claimed slot always shows
/// `CanTake` and its payload.
#[derive(Debug)]
pub(crate) struct Slot {
    value: AtomicU64,
    state: AtomicU8,
}

impl Slot {
    pub(crate) const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
            state: AtomicU8::new(SlotState::CanPut as u8),
        }
    }

    pub(crate) fn state(&self, order: Ordering) -> SlotState {
        SlotState::from_u8(self.state.load(order))
    }

    pub(crate) fn set_state(&self, state: SlotState, order: Ordering) {
        self.state.store(state as u8, order);
    }

    pub(crate) fn write(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub(crate) fn read(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}
