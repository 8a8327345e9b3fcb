//! Session wall-clock timer.
//!
//! Elapsed time is always recomputed from the recorded start timestamp, so a
//! late or skipped tick never drifts the minute count.

use std::sync::Weak;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::session_controller::SessionController;

/// Whole minutes between `start` and `now`, floored. Never negative.
#[must_use]
pub fn elapsed_minutes(start: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let seconds = (now - start).num_seconds().max(0);
    u32::try_from(seconds / 60).unwrap_or(u32::MAX)
}

/// What the timer loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

/// Drives [`SessionController::tick`] at a fixed period.
pub struct SessionTimer;

impl SessionTimer {
    /// Spawn the tick loop for one session run.
    ///
    /// The loop exits when `cancel` fires, when the controller is dropped, or
    /// when a tick reports [`TickOutcome::Stop`].
    pub fn spawn(
        controller: Weak<SessionController>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let Some(controller) = controller.upgrade() else {
                    break;
                };
                if controller.tick().await == TickOutcome::Stop {
                    break;
                }
            }

            tracing::debug!("Session timer stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn floors_to_whole_minutes() {
        let start = at(0);
        assert_eq!(elapsed_minutes(start, at(0)), 0);
        assert_eq!(elapsed_minutes(start, at(59)), 0);
        assert_eq!(elapsed_minutes(start, at(60)), 1);
        assert_eq!(elapsed_minutes(start, at(8 * 60 + 30)), 8);
    }

    #[test]
    fn clock_behind_start_is_zero() {
        assert_eq!(elapsed_minutes(at(120), at(0)), 0);
    }
}
