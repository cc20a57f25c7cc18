use anyhow::{Context, anyhow};
use core::time::Duration;
use ringflake::{
    CachedGenerator, IdParts, LockSnowflakeAllocator, MonotonicClock, RingflakeId, Snowflake,
    SystemClock, TimeSource,
};
use std::{
    io::{self, BufWriter, Write},
    thread,
    time::Instant,
};

use crate::config::{ClockKind, Command, GeneratorConfig};

pub fn run(config: &GeneratorConfig) -> anyhow::Result<()> {
    match config.command {
        Command::Decode { id } => decode(id, config.epoch),
        Command::Generate {
            count,
            consumers,
            json,
        } => match config.clock {
            ClockKind::System => generate(
                config,
                SystemClock::with_epoch(config.epoch),
                count,
                consumers,
                json,
            ),
            ClockKind::Monotonic => {
                let clock = MonotonicClock::with_epoch(config.epoch)
                    .context("failed to start the monotonic clock")?;
                generate(config, clock, count, consumers, json)
            }
        },
    }
}

fn decode(id: u64, epoch: Duration) -> anyhow::Result<()> {
    let parts = IdParts::decode(RingflakeId::from_raw(id), epoch);
    println!("{}", serde_json::to_string_pretty(&parts)?);
    Ok(())
}

fn generate<T>(
    config: &GeneratorConfig,
    clock: T,
    count: usize,
    consumers: usize,
    json: bool,
) -> anyhow::Result<()>
where
    T: TimeSource + Send + Sync + 'static,
{
    let allocator =
        LockSnowflakeAllocator::<RingflakeId, _>::new(config.datacenter_id, config.worker_id, clock)?;
    let mut generator = CachedGenerator::new(allocator, config.cached)
        .context("failed to start the cached generator")?;

    let start = Instant::now();
    let mut ids = draw(&generator, count, consumers)?;
    let elapsed = start.elapsed();
    ids.sort_unstable();

    let mut out = BufWriter::new(io::stdout().lock());
    for id in &ids {
        if json {
            writeln!(out, "{}", serde_json::to_string(&generator.parse(id.to_raw()))?)?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    out.flush()?;

    tracing::info!(
        count,
        consumers,
        elapsed_us = elapsed.as_micros() as u64,
        padding_requests = generator.padding_requests(),
        "Generated IDs"
    );

    generator.shutdown();
    Ok(())
}

/// Splits `count` takes across `consumers` threads sharing one generator.
fn draw<T>(
    generator: &CachedGenerator<RingflakeId, T>,
    count: usize,
    consumers: usize,
) -> anyhow::Result<Vec<RingflakeId>>
where
    T: TimeSource + Send + Sync + 'static,
{
    thread::scope(|s| -> anyhow::Result<Vec<RingflakeId>> {
        let handles: Vec<_> = (0..consumers)
            .map(|i| {
                let share = count / consumers + usize::from(i < count % consumers);
                s.spawn(move || {
                    (0..share)
                        .map(|_| generator.next_id())
                        .collect::<ringflake::Result<Vec<_>>>()
                })
            })
            .collect();

        let mut ids = Vec::with_capacity(count);
        for handle in handles {
            let batch = handle
                .join()
                .map_err(|_| anyhow!("consumer thread panicked"))?
                .context("failed to generate an ID")?;
            ids.extend(batch);
        }
        Ok(ids)
    })
}
