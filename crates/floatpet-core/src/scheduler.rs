//! Repeating timers
//!
//! A [`RepeatingTask`] sleeps, runs its tick closure, and sleeps again for
//! whatever interval the tick returned. The pending wait can be restarted
//! with a new interval or the whole task cancelled from the handle.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to a self-rescheduling background task.
/// Dropping the handle cancels the task.
pub struct RepeatingTask {
    name: &'static str,
    reschedule_tx: mpsc::UnboundedSender<Duration>,
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    /// Spawn a task whose tick returns the delay before the next tick
    pub fn spawn<F>(runtime: &Handle, name: &'static str, first: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Duration + Send + 'static,
    {
        let (reschedule_tx, mut reschedule_rx) = mpsc::unbounded_channel::<Duration>();

        let handle = runtime.spawn(async move {
            tracing::debug!("Starting {} timer, first tick in {:?}", name, first);
            let mut period = first;

            loop {
                let sleep = tokio::time::sleep(period);
                tokio::pin!(sleep);

                tokio::select! {
                    _ = &mut sleep => {
                        period = tick();
                        tracing::trace!("{} timer: next tick in {:?}", name, period);
                    }
                    next = reschedule_rx.recv() => match next {
                        // Restart the pending wait with the new interval
                        Some(next) => period = next,
                        None => break,
                    },
                }
            }

            tracing::debug!("{} timer stopped", name);
        });

        Self {
            name,
            reschedule_tx,
            handle,
        }
    }

    /// Spawn a task that ticks at a constant period
    pub fn every<F>(runtime: &Handle, name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::spawn(runtime, name, period, move || {
            tick();
            period
        })
    }

    /// Restart the pending wait so the next tick happens `interval` from now
    pub fn reschedule(&self, interval: Duration) {
        if self.reschedule_tx.send(interval).is_err() {
            tracing::debug!("{} timer already stopped, reschedule ignored", self.name);
        }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
