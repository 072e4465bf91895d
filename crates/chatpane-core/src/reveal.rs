//! Typewriter reveal task.
//!
//! A reveal is an independent task per bot entry. It emits one step per
//! character: the first immediately, then one every `interval`. The task owns
//! no transcript state; each step is handed to a callback that forwards it to
//! whoever owns the widget.

use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::transcript::EntryId;
use crate::widget::RevealJob;

/// Runs a reveal job to completion or cancellation.
///
/// `on_step` is called once per character with the target entry and returns
/// `false` when the receiver is gone, which ends the task early.
pub async fn run_reveal<F>(job: RevealJob, mut on_step: F)
where
    F: FnMut(EntryId) -> bool,
{
    let RevealJob {
        entry,
        steps,
        interval,
        cancel,
    } = job;
    debug!(entry = entry.0, steps, "reveal started");

    if interval.is_zero() {
        for _ in 0..steps {
            if cancel.is_cancelled() || !on_step(entry) {
                return;
            }
            tokio::task::yield_now().await;
        }
        return;
    }

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for _ in 0..steps {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!(entry = entry.0, "reveal cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }
        if !on_step(entry) {
            return;
        }
    }
    debug!(entry = entry.0, "reveal finished");
}
