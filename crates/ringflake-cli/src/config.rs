use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use core::time::Duration;
use ringflake::{CachedConfig, DEFAULT_EPOCH, RingflakeId, Snowflake};
use std::time::SystemTime;

/// Runtime configuration for the `ringflake` binary.
///
/// Every option can also be set through the environment variable named next
/// to it, and a `.env` file in the working directory is loaded first.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ringflake",
    version,
    about = "Generate cached Snowflake IDs or decode existing ones"
)]
pub struct CliArgs {
    /// Datacenter ID packed into every generated ID (0-31).
    ///
    /// Environment variable: `DATACENTER_ID`
    #[arg(long, env = "DATACENTER_ID", default_value_t = 0, global = true)]
    pub datacenter_id: u64,

    /// Worker ID packed into every generated ID (0-31).
    ///
    /// Together with the datacenter ID this must be unique among all
    /// processes generating IDs at the same time.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", default_value_t = 0, global = true)]
    pub worker_id: u64,

    /// Custom epoch, in milliseconds since 1970-01-01 UTC.
    ///
    /// Changing it for an existing ID space breaks ordering and can produce
    /// duplicates. Decoding must use the epoch the IDs were generated with.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, env = "EPOCH_MS", default_value_t = DEFAULT_EPOCH.as_millis() as u64, global = true)]
    pub epoch_ms: u64,

    /// Ring capacity is one millisecond of IDs shifted left by this much.
    ///
    /// Environment variable: `BOOST_POWER`
    #[arg(long, env = "BOOST_POWER", default_value_t = 3, global = true)]
    pub boost_power: u32,

    /// Refill once a take leaves less than this percentage of the ring.
    ///
    /// Environment variable: `PADDING_FACTOR`
    #[arg(long, env = "PADDING_FACTOR", default_value_t = 50, global = true)]
    pub padding_factor: u32,

    /// Also refill on this period, in seconds. 0 disables scheduled refills.
    ///
    /// Environment variable: `SCHEDULE_INTERVAL_SECS`
    #[arg(long, env = "SCHEDULE_INTERVAL_SECS", default_value_t = 0, global = true)]
    pub schedule_interval_secs: u64,

    /// Time source for the allocator.
    ///
    /// `system` reports clock regressions as errors; `monotonic` hides them
    /// by ticking from a steady clock.
    ///
    /// Environment variable: `CLOCK`
    #[arg(long, env = "CLOCK", value_enum, default_value_t = ClockKind::System, global = true)]
    pub clock: ClockKind,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate IDs from a cached generator and print them, one per line.
    Generate {
        /// Total number of IDs to print.
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Threads drawing from the generator concurrently.
        #[arg(short, long, default_value_t = 1)]
        consumers: usize,

        /// Print each ID with its decoded fields as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Decode a raw ID into its fields, printed as JSON.
    Decode {
        /// The ID as an unsigned decimal integer.
        id: u64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    System,
    Monotonic,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub epoch: Duration,
    pub clock: ClockKind,
    pub cached: CachedConfig,
    pub command: Command,
}

impl TryFrom<CliArgs> for GeneratorConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.datacenter_id > RingflakeId::max_datacenter_id() {
            bail!(
                "DATACENTER_ID ({}) exceeds the datacenter ID space (max = {})",
                args.datacenter_id,
                RingflakeId::max_datacenter_id()
            );
        }
        if args.worker_id > RingflakeId::max_worker_id() {
            bail!(
                "WORKER_ID ({}) exceeds the worker ID space (max = {})",
                args.worker_id,
                RingflakeId::max_worker_id()
            );
        }

        let epoch = Duration::from_millis(args.epoch_ms);
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .context("system clock is before 1970")?;
        if epoch > now {
            bail!("EPOCH_MS ({}) is in the future", args.epoch_ms);
        }

        let mut cached = CachedConfig::default()
            .with_boost_power(args.boost_power)
            .with_padding_factor(args.padding_factor);
        if args.schedule_interval_secs > 0 {
            cached = cached.with_schedule_interval(Duration::from_secs(args.schedule_interval_secs));
        }
        cached.validate().context("invalid ring settings")?;

        if let Command::Generate { consumers, .. } = args.command {
            if consumers == 0 {
                bail!("--consumers must be greater than 0");
            }
        }

        Ok(Self {
            datacenter_id: args.datacenter_id,
            worker_id: args.worker_id,
            epoch,
            clock: args.clock,
            cached,
            command: args.command,
        })
    }
}
