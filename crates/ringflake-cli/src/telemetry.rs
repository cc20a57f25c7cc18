//! Log output for the `ringflake` binary.
//!
//! Events go to stderr so generated IDs on stdout can be piped untouched. The
//! level defaults to `info` and follows `RUST_LOG` when it is set, e.g.
//!
//! ```bash
//! RUST_LOG=ringflake=debug ringflake generate -n 100000 --consumers 8
//! ```

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()
        .context("failed to install the tracing subscriber")
}
