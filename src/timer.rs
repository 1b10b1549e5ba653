//! One-second countdown ticks.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// A tick emitted by a [`CountdownTimer`] for the attempt it was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub attempt: u64,
}

/// Handle to a repeating one-second tick task.
///
/// Dropping the handle aborts the task.
pub struct CountdownTimer {
    attempt: u64,
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    /// Spawn a task that sends a tick every second until cancelled or the receiver closes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(attempt: u64, ticks: mpsc::UnboundedSender<TimerTick>) -> Self {
        let handle = tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if ticks.send(TimerTick { attempt }).is_err() {
                    break;
                }
            }
        });

        Self { attempt, handle }
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
