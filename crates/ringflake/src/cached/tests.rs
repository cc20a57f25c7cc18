use crate::{
    CachedConfig, CachedGenerator, DEFAULT_EPOCH, Error, LockSnowflakeAllocator, RingflakeId,
    Snowflake, SystemClock, TakeStatus, TimeSource,
};
use core::time::Duration;
use portable_atomic::{AtomicU64, Ordering};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    thread::{self, scope},
    time::Instant,
};

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock tests can move backwards.
struct SettableTime {
    millis: AtomicU64,
}

impl TimeSource for Arc<SettableTime> {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

fn small_generator() -> CachedGenerator<RingflakeId, SystemClock> {
    let allocator =
        LockSnowflakeAllocator::<RingflakeId, _>::new(2, 5, SystemClock::default()).unwrap();
    CachedGenerator::new(allocator, CachedConfig::default().with_boost_power(0)).unwrap()
}

#[test]
fn construction_fills_the_ring() {
    let generator = small_generator();
    let ring = generator.ring();
    assert_eq!(ring.capacity(), 4096);
    assert_eq!(ring.padding_threshold(), 2048);
    assert_eq!(ring.len(), 4095);
}

#[test]
fn ids_carry_identity_and_decode() {
    let generator = small_generator();
    let id = generator.next_id().unwrap();

    assert_eq!(id.datacenter_id(), 2);
    assert_eq!(id.worker_id(), 5);

    let parts = generator.parse(id.to_raw());
    assert_eq!(parts.id, id.to_raw());
    assert_eq!(parts.datacenter_id, 2);
    assert_eq!(parts.worker_id, 5);
    assert_eq!(parts.sequence, id.sequence());
    assert_eq!(
        parts.unix_millis,
        DEFAULT_EPOCH.as_millis() as u64 + id.timestamp()
    );
    assert_eq!(generator.epoch(), DEFAULT_EPOCH);
}

#[test]
fn falls_back_to_allocator_when_empty() {
    let mut generator = small_generator();
    generator.shutdown();

    let mut drained = Vec::new();
    while let TakeStatus::Ready { id } = generator.ring().take() {
        drained.push(id);
    }
    assert_eq!(drained.len(), 4095);
    assert!(generator.ring().is_empty());

    let fallback = generator.next_id().unwrap();
    assert!(generator.ring().is_empty());
    assert!(drained.iter().all(|&raw| raw < fallback.to_raw()));

    let again = generator.next_id().unwrap();
    assert!(again > fallback);
}

#[test]
fn fallback_reports_clock_regression() {
    let time = Arc::new(SettableTime {
        millis: AtomicU64::new(1_000),
    });
    let allocator =
        LockSnowflakeAllocator::<RingflakeId, _>::new(0, 0, Arc::clone(&time)).unwrap();
    let mut generator =
        CachedGenerator::new(allocator, CachedConfig::default().with_boost_power(0)).unwrap();
    generator.shutdown();

    while let TakeStatus::Ready { .. } = generator.ring().take() {}
    let last = generator.next_id().unwrap();

    time.millis.store(last.timestamp() - 10, Ordering::SeqCst);
    assert_eq!(
        generator.next_id().unwrap_err(),
        Error::ClockMovedBackward {
            last: last.timestamp(),
            now: last.timestamp() - 10
        }
    );

    time.millis.store(last.timestamp() + 1, Ordering::SeqCst);
    let recovered = generator.next_id().unwrap();
    assert!(recovered > last);
}

#[test]
fn low_watermark_wakes_the_padding_thread() {
    let generator = small_generator();
    let before = generator.padding_requests();

    // drop below half of the ring
    for _ in 0..3_000 {
        generator.next_id().unwrap();
    }
    assert!(generator.padding_requests() > before);

    let deadline = Instant::now() + Duration::from_secs(10);
    while generator.ring().len() < 4095 {
        assert!(Instant::now() < deadline, "ring was not refilled");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn scheduled_padding_keeps_the_ring_full() {
    let allocator =
        LockSnowflakeAllocator::<RingflakeId, _>::new(0, 0, SystemClock::default()).unwrap();
    let generator = CachedGenerator::new(
        allocator,
        CachedConfig::default()
            .with_boost_power(0)
            .with_padding_factor(0)
            .with_schedule_interval(Duration::from_millis(5)),
    )
    .unwrap();

    for _ in 0..1_000 {
        generator.next_id().unwrap();
    }
    // a zero factor never signals, so only the schedule can refill
    assert_eq!(generator.padding_requests(), 0);

    let deadline = Instant::now() + Duration::from_secs(10);
    while generator.ring().len() < 4095 {
        assert!(Instant::now() < deadline, "ring was not refilled");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn unique_under_contention() {
    let threads = num_cpus::get().clamp(4, 8);
    let per_thread = 20_000;

    let generator = small_generator();
    let seen = Mutex::new(HashSet::with_capacity(threads * per_thread));

    scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                let mut local = Vec::with_capacity(per_thread);
                for _ in 0..per_thread {
                    local.push(generator.next_id().unwrap());
                }
                let mut seen = seen.lock().unwrap();
                for id in local {
                    assert!(seen.insert(id), "duplicate ID: {id:?}");
                }
            });
        }
    });

    assert_eq!(seen.into_inner().unwrap().len(), threads * per_thread);
}

#[test]
fn shutdown_is_idempotent() {
    let mut generator = small_generator();
    generator.shutdown();
    generator.shutdown();
    assert!(generator.next_id().is_ok());
}

#[test]
fn rejects_invalid_config() {
    let allocator =
        LockSnowflakeAllocator::<RingflakeId, _>::new(0, 0, MockTime { millis: 1 }).unwrap();
    let err = CachedGenerator::new(allocator, CachedConfig::default().with_padding_factor(150))
        .err()
        .unwrap();
    assert_eq!(err, Error::InvalidPaddingFactor { factor: 150 });
}

#[test]
fn initial_fill_errors_are_returned() {
    let max = RingflakeId::max_timestamp();
    let allocator =
        LockSnowflakeAllocator::<RingflakeId, _>::new(0, 0, MockTime { millis: max + 1 })
            .unwrap();
    let err = CachedGenerator::new(allocator, CachedConfig::default().with_boost_power(0))
        .err()
        .unwrap();
    assert_eq!(err, Error::TimestampOverflow { now: max + 1, max });
}
