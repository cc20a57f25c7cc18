use crate::{
    BufferPolicy, Error, LogAndDrop, PutStatus, RingBuffer, RingSnapshot, SlotState, TakeStatus,
};
use portable_atomic::{AtomicUsize, Ordering};
use std::{
    sync::{Arc, Barrier, Mutex},
    thread::scope,
};

#[derive(Default)]
struct CountingPolicy {
    rejected_puts: AtomicUsize,
    rejected_takes: AtomicUsize,
    paddings: AtomicUsize,
    last_padding: Mutex<Option<RingSnapshot>>,
}

impl CountingPolicy {
    fn rejected_puts(&self) -> usize {
        self.rejected_puts.load(Ordering::SeqCst)
    }

    fn rejected_takes(&self) -> usize {
        self.rejected_takes.load(Ordering::SeqCst)
    }

    fn paddings(&self) -> usize {
        self.paddings.load(Ordering::SeqCst)
    }
}

impl BufferPolicy for CountingPolicy {
    fn reject_put(&self, _value: u64, _ring: RingSnapshot) {
        self.rejected_puts.fetch_add(1, Ordering::SeqCst);
    }

    fn reject_take(&self, _ring: RingSnapshot) {
        self.rejected_takes.fetch_add(1, Ordering::SeqCst);
    }

    fn trigger_padding(&self, ring: RingSnapshot) {
        self.paddings.fetch_add(1, Ordering::SeqCst);
        *self.last_padding.lock().unwrap() = Some(ring);
    }
}

fn unwrap_ready(status: TakeStatus) -> u64 {
    match status {
        TakeStatus::Ready { id } => id,
        TakeStatus::Empty => panic!("unexpected empty ring"),
    }
}

#[test]
fn rejects_invalid_capacity() {
    for capacity in [0, 1, 3, 6, 100] {
        assert_eq!(
            RingBuffer::with_default_padding(capacity, LogAndDrop).err(),
            Some(Error::InvalidCapacity { capacity })
        );
    }
}

#[test]
fn rejects_invalid_padding_factor() {
    assert_eq!(
        RingBuffer::new(8, 101, LogAndDrop).err(),
        Some(Error::InvalidPaddingFactor { factor: 101 })
    );
    assert!(RingBuffer::new(8, 100, LogAndDrop).is_ok());
    assert!(RingBuffer::new(8, 0, LogAndDrop).is_ok());
}

#[test]
fn padding_threshold_is_a_share_of_capacity() {
    let threshold = |factor| RingBuffer::new(8, factor, LogAndDrop).unwrap().0.padding_threshold();

    assert_eq!(threshold(0), 0);
    assert_eq!(threshold(25), 2);
    assert_eq!(threshold(50), 4);
    // never reaches capacity
    assert_eq!(threshold(100), 7);

    let (ring, _) = RingBuffer::with_default_padding(1 << 15, LogAndDrop).unwrap();
    assert_eq!(ring.padding_threshold(), 1 << 14);
}

#[test]
fn counters_start_at_minus_one() {
    let (ring, _producer) = RingBuffer::with_default_padding(8, LogAndDrop).unwrap();
    assert_eq!(ring.tail(), -1);
    assert_eq!(ring.cursor(), -1);
    assert_eq!(ring.capacity(), 8);
    assert!(ring.is_empty());
    assert_eq!(ring.remaining_capacity(), 7);
}

#[test]
fn take_on_empty_ring_is_rejected() {
    let (ring, _producer) = RingBuffer::new(8, 25, CountingPolicy::default()).unwrap();

    assert_eq!(ring.take(), TakeStatus::Empty);
    assert_eq!(ring.take(), TakeStatus::Empty);

    assert_eq!(ring.cursor(), -1);
    assert_eq!(ring.policy().rejected_takes(), 2);
    assert_eq!(ring.policy().paddings(), 0);
    for index in 0..8 {
        assert_eq!(ring.slot(index).state(Ordering::SeqCst), SlotState::CanPut);
    }
}

#[test]
fn takes_are_fifo() {
    let (ring, mut producer) = RingBuffer::with_default_padding(8, LogAndDrop).unwrap();

    producer.put(1).unwrap();
    producer.put(2).unwrap();
    producer.put(3).unwrap();

    assert_eq!(ring.take(), TakeStatus::Ready { id: 1 });
    assert_eq!(ring.take(), TakeStatus::Ready { id: 2 });
    assert_eq!(ring.take(), TakeStatus::Ready { id: 3 });
    assert_eq!(ring.take(), TakeStatus::Empty);
}

#[test]
fn put_publishes_sequential_sequences() {
    let (ring, mut producer) = RingBuffer::with_default_padding(8, LogAndDrop).unwrap();

    for sequence in 0..3 {
        assert_eq!(
            producer.put(100 + sequence as u64).unwrap(),
            PutStatus::Published { sequence }
        );
    }
    assert_eq!(ring.tail(), 2);
    assert_eq!(ring.len(), 3);
    assert_eq!(ring.slot(0).state(Ordering::SeqCst), SlotState::CanTake);
    assert_eq!(ring.slot(3).state(Ordering::SeqCst), SlotState::CanPut);
}

#[test]
fn full_ring_rejects_put_without_changes() {
    let (ring, mut producer) = RingBuffer::new(8, 50, CountingPolicy::default()).unwrap();

    for value in 0..7 {
        assert!(matches!(
            producer.put(value).unwrap(),
            PutStatus::Published { .. }
        ));
    }
    assert_eq!(ring.remaining_capacity(), 0);

    assert_eq!(producer.put(99).unwrap(), PutStatus::Full);
    assert_eq!(ring.policy().rejected_puts(), 1);
    assert_eq!(ring.tail(), 6);
    assert_eq!(ring.cursor(), -1);
    // the eighth slot was never written
    assert_eq!(ring.slot(7).state(Ordering::SeqCst), SlotState::CanPut);

    for value in 0..7 {
        assert_eq!(ring.take(), TakeStatus::Ready { id: value });
    }
    assert_eq!(ring.take(), TakeStatus::Empty);
}

#[test]
fn slots_are_reused_after_wrapping() {
    let (ring, mut producer) = RingBuffer::with_default_padding(8, LogAndDrop).unwrap();

    for value in 0..7 {
        producer.put(value).unwrap();
    }
    for value in 0..3 {
        assert_eq!(ring.take(), TakeStatus::Ready { id: value });
    }
    for value in 7..10 {
        producer.put(value).unwrap();
    }
    assert_eq!(producer.put(10).unwrap(), PutStatus::Full);

    let drained: Vec<_> = (3..10).map(|_| unwrap_ready(ring.take())).collect();
    assert_eq!(drained, (3..10).collect::<Vec<_>>());
    assert_eq!(ring.tail(), 9);
    assert_eq!(ring.cursor(), 9);
}

#[test]
fn occupancy_stays_bounded_across_many_laps() {
    let (ring, mut producer) = RingBuffer::with_default_padding(8, LogAndDrop).unwrap();
    let mut next = 0;
    let mut expected = 0;

    for lap in 0..200 {
        // alternate between filling up and draining partially
        while let PutStatus::Published { .. } = producer.put(next).unwrap() {
            next += 1;
            let len = ring.tail() - ring.cursor();
            assert!((0..=7).contains(&len));
        }
        for _ in 0..(lap % 7) + 1 {
            assert_eq!(ring.take(), TakeStatus::Ready { id: expected });
            expected += 1;
            let len = ring.tail() - ring.cursor();
            assert!((0..=7).contains(&len));
        }
    }
}

#[test]
fn low_watermark_fires_once_per_qualifying_take() {
    let (ring, mut producer) = RingBuffer::new(8, 25, CountingPolicy::default()).unwrap();
    assert_eq!(ring.padding_threshold(), 2);

    for value in 0..7 {
        producer.put(value).unwrap();
    }

    // leaves 6, 5, 4, 3, 2 behind: none below the threshold
    for _ in 0..5 {
        unwrap_ready(ring.take());
    }
    assert_eq!(ring.policy().paddings(), 0);

    // leaves 1
    unwrap_ready(ring.take());
    assert_eq!(ring.tail() - ring.cursor(), 1);
    assert_eq!(ring.policy().paddings(), 1);

    // leaves 0
    unwrap_ready(ring.take());
    assert_eq!(ring.policy().paddings(), 2);
    let last = ring.policy().last_padding.lock().unwrap().unwrap();
    assert_eq!(last.tail, 6);
    assert_eq!(last.cursor, 6);

    assert_eq!(ring.take(), TakeStatus::Empty);
    assert_eq!(ring.policy().paddings(), 2);
    assert_eq!(ring.policy().rejected_takes(), 1);
}

#[test]
fn zero_padding_factor_never_fires() {
    let (ring, mut producer) = RingBuffer::new(8, 0, CountingPolicy::default()).unwrap();
    for value in 0..7 {
        producer.put(value).unwrap();
    }
    while let TakeStatus::Ready { .. } = ring.take() {}
    assert_eq!(ring.policy().paddings(), 0);
}

#[test]
fn put_into_held_slot_is_a_protocol_violation() {
    let (ring, mut producer) = RingBuffer::with_default_padding(8, LogAndDrop).unwrap();
    producer.put(1).unwrap();

    // a consumer that claimed slot 1 on a previous lap and has not let go
    ring.slot(1).set_state(SlotState::CanTake, Ordering::SeqCst);

    assert_eq!(
        producer.put(2).unwrap_err(),
        Error::ProtocolViolation {
            sequence: 1,
            index: 1
        }
    );
    assert_eq!(ring.tail(), 0);

    ring.slot(1).set_state(SlotState::CanPut, Ordering::SeqCst);
    assert_eq!(
        producer.put(2).unwrap(),
        PutStatus::Published { sequence: 1 }
    );
    assert_eq!(ring.take(), TakeStatus::Ready { id: 1 });
    assert_eq!(ring.take(), TakeStatus::Ready { id: 2 });
}

#[test]
fn concurrent_takes_never_share_a_value() {
    const CAPACITY: usize = 8;

    let (ring, mut producer) = RingBuffer::with_default_padding(CAPACITY, LogAndDrop).unwrap();
    for value in 0..CAPACITY as u64 - 1 {
        producer.put(value).unwrap();
    }

    let barrier = Barrier::new(CAPACITY);
    let results = Mutex::new(Vec::with_capacity(CAPACITY));

    scope(|s| {
        for _ in 0..CAPACITY {
            s.spawn(|| {
                barrier.wait();
                let status = ring.take();
                results.lock().unwrap().push(status);
            });
        }
    });

    let results = results.into_inner().unwrap();
    let mut taken: Vec<_> = results
        .iter()
        .filter_map(|status| match status {
            TakeStatus::Ready { id } => Some(*id),
            TakeStatus::Empty => None,
        })
        .collect();
    taken.sort_unstable();

    assert_eq!(taken, (0..CAPACITY as u64 - 1).collect::<Vec<_>>());
    assert_eq!(
        results
            .iter()
            .filter(|status| **status == TakeStatus::Empty)
            .count(),
        1
    );
    assert_eq!(ring.cursor(), ring.tail());
}

#[test]
fn concurrent_fill_and_drain_delivers_every_value_once() {
    const TOTAL: u64 = 200_000;
    let consumers = num_cpus::get().clamp(2, 8);

    let (ring, mut producer) = RingBuffer::with_default_padding(1 << 10, LogAndDrop).unwrap();
    let taken = AtomicUsize::new(0);
    let seen = Mutex::new(Vec::with_capacity(TOTAL as usize));

    scope(|s| {
        s.spawn(move || {
            let mut value = 0;
            while value < TOTAL {
                // a consumer that claimed a slot but has not released it
                // yet blocks the producer the same way a full ring does
                match producer.put(value) {
                    Ok(PutStatus::Published { .. }) => value += 1,
                    Ok(PutStatus::Full) | Err(Error::ProtocolViolation { .. }) => {
                        std::hint::spin_loop();
                    }
                    Err(err) => panic!("unexpected put error: {err}"),
                }
            }
        });

        for _ in 0..consumers {
            s.spawn(|| {
                let mut local = Vec::new();
                while taken.load(Ordering::Acquire) < TOTAL as usize {
                    if let TakeStatus::Ready { id } = ring.take() {
                        // one consumer always sees values in publish order
                        if let Some(&prev) = local.last() {
                            assert!(id > prev);
                        }
                        local.push(id);
                        taken.fetch_add(1, Ordering::AcqRel);
                    }
                }
                seen.lock().unwrap().extend(local);
            });
        }
    });

    let mut seen = seen.into_inner().unwrap();
    seen.sort_unstable();
    assert_eq!(seen.len(), TOTAL as usize);
    assert!(seen.iter().copied().eq(0..TOTAL));
    assert!(ring.is_empty());
}

#[test]
fn debug_shows_counters() {
    let (ring, mut producer) = RingBuffer::with_default_padding(8, LogAndDrop).unwrap();
    producer.put(5).unwrap();
    let rendered = format!("{producer:?}");
    assert!(rendered.contains("RingBuffer"));
    assert!(rendered.contains("tail: 0"));
    assert!(rendered.contains("cursor: -1"));
    assert_eq!(Arc::strong_count(producer.ring()), 2);
    drop(ring);
}
