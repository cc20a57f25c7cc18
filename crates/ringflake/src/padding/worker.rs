use core::time::Duration;
use crossbeam_utils::sync::Parker;
use portable_atomic::{AtomicBool, Ordering};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::{
    error::{Error, Result},
    id::Snowflake,
    padding::{PaddingExecutor, PaddingOutcome, PaddingSignal},
    ring::BufferPolicy,
    time::TimeSource,
};

/// The background thread that runs [`PaddingExecutor::padding_buffer`].
///
/// The thread sleeps until the [`PaddingSignal`] is raised, or until
/// `schedule_interval` elapses when one is set, and refills the ring each time
/// it wakes. Refill errors are logged and the thread keeps going; the next
/// signal retries.
///
/// Dropping the worker stops and joins the thread.
#[derive(Debug)]
pub struct PaddingWorker {
    shutdown: Arc<AtomicBool>,
    signal: Arc<PaddingSignal>,
    handle: Option<JoinHandle<()>>,
}

impl PaddingWorker {
    /// Starts the padding thread.
    ///
    /// `parker` must be the one returned alongside `signal` by
    /// [`PaddingSignal::new`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerSpawn`] if the OS refuses to start the thread.
    pub fn spawn<ID, T, P>(
        executor: Arc<PaddingExecutor<ID, T, P>>,
        signal: Arc<PaddingSignal>,
        parker: Parker,
        schedule_interval: Option<Duration>,
    ) -> Result<Self>
    where
        ID: Snowflake + Send + Sync + 'static,
        T: TimeSource + Send + Sync + 'static,
        P: BufferPolicy + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = thread::Builder::new()
            .name("ringflake-padding".into())
            .spawn({
                let shutdown = Arc::clone(&shutdown);
                let signal = Arc::clone(&signal);
                move || run(&executor, &signal, &parker, &shutdown, schedule_interval)
            })
            .map_err(|e| Error::WorkerSpawn {
                reason: e.to_string(),
            })?;

        Ok(Self {
            shutdown,
            signal,
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it to exit. Calling it again is a
    /// no-op.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.shutdown.store(true, Ordering::Release);
        self.signal.wake();
        if handle.join().is_err() {
            #[cfg(feature = "tracing")]
            tracing::error!("Padding worker panicked");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for PaddingWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<ID, T, P>(
    executor: &PaddingExecutor<ID, T, P>,
    signal: &PaddingSignal,
    parker: &Parker,
    shutdown: &AtomicBool,
    schedule_interval: Option<Duration>,
) where
    ID: Snowflake,
    T: TimeSource,
    P: BufferPolicy,
{
    #[cfg(feature = "tracing")]
    tracing::debug!(?schedule_interval, "Padding worker started");

    loop {
        match schedule_interval {
            Some(interval) => parker.park_timeout(interval),
            None => parker.park(),
        }
        if shutdown.load(Ordering::Acquire) {
            break;
        }

        // clear before refilling so raises during the refill wake us again
        let requested = signal.take_pending();
        if !requested && schedule_interval.is_none() {
            continue;
        }

        match executor.padding_buffer() {
            Ok(PaddingOutcome::Padded { count }) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(count, requested, "Padding round finished");
                #[cfg(not(feature = "tracing"))]
                let _ = count;
            }
            Ok(PaddingOutcome::AlreadyRunning) => {}
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(%err, "Padding failed");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Padding worker stopped");
}
