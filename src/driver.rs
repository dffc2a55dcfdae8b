use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::tm::TimerManager;

/// Ticks a [`TimerManager`] from a tokio interval, for applications that
/// have no frame loop of their own.
///
/// The driver runs on the caller's task, so managers holding non-`Send`
/// callbacks can be driven without spawning.
pub struct TimerDriver {
    /// Instance name for logging
    name: String,

    /// How often the manager is updated
    heartbeat_interval: Duration,

    /// Upper bound on a single tick's delta
    max_delta: Option<Duration>,

    /// Return from `run` once the manager holds no timers
    stop_when_idle: bool,

    /// Cancellation token for graceful shutdown
    cancel_token: CancellationToken,
}

impl TimerDriver {
    /// Create a new TimerDriver
    ///
    /// # Arguments
    /// * `name` - Driver instance name
    /// * `heartbeat_interval` - How often to advance the manager
    /// * `cancel_token` - Stops `run` when cancelled
    pub fn new(name: String, heartbeat_interval: Duration, cancel_token: CancellationToken) -> Self {
        TimerDriver {
            name,
            // tokio intervals reject a zero period
            heartbeat_interval: heartbeat_interval.max(Duration::from_millis(1)),
            max_delta: None,
            stop_when_idle: false,
            cancel_token,
        }
    }

    /// Clamp each tick's delta so a stalled task does not advance timers
    /// by the whole stall at once
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = Some(max_delta);
        self
    }

    pub fn with_stop_when_idle(mut self, stop_when_idle: bool) -> Self {
        self.stop_when_idle = stop_when_idle;
        self
    }

    /// Drive the manager until cancelled, or until idle if configured.
    ///
    /// Returns the number of updates performed.
    pub async fn run(&self, manager: &mut TimerManager<'_>) -> u64 {
        let mut heartbeat = interval(self.heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_tick = Instant::now();
        let mut ticks = 0u64;

        log::info!(
            "Timer driver '{}' started for manager '{}'",
            self.name,
            manager.label()
        );

        loop {
            tokio::select! {
                biased;

                // Handle cancellation token
                _ = self.cancel_token.cancelled() => {
                    log::info!("Timer driver '{}' cancelled via token", self.name);
                    break;
                },

                // Advance the manager
                now = heartbeat.tick() => {
                    let mut delta = now.saturating_duration_since(last_tick);
                    last_tick = now;
                    if let Some(max_delta) = self.max_delta {
                        delta = delta.min(max_delta);
                    }

                    manager.update(delta);
                    ticks += 1;

                    if self.stop_when_idle && manager.is_empty() {
                        log::info!("Timer driver '{}' idle after {} tick(s)", self.name, ticks);
                        break;
                    }
                },
            }
        }

        log::info!("Timer driver '{}' stopped", self.name);
        ticks
    }
}
