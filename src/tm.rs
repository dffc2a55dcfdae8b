use std::any::Any;
use std::time::Duration;

use crate::error::TimerError;
use crate::timer::{Payload, Timer, TimerDef, TimerId, TimerSnapshot, TimerState};

/// Bounded pool of frame-driven countdown timers
///
/// Timers are advanced once per [`update`](TimerManager::update) call, in the
/// order they were added. Callbacks may chain new timers through
/// [`TimerContext::add`]; those join the pool after the pass that created them.
pub struct TimerManager<'a> {
    /// Active timers in insertion order
    timers: Vec<Timer<'a>>,

    /// Id allocation, capacity accounting and chained additions
    registry: Registry<'a>,
}

/// The part of a manager reachable from inside a callback
struct Registry<'a> {
    /// Instance name for logging
    label: String,

    capacity: usize,

    next_id: u64,

    /// Timers counted against capacity: active and not yet finished this
    /// pass, plus pending
    live: usize,

    /// Timers added during the current pass, merged when it ends
    pending: Vec<Timer<'a>>,
}

impl<'a> Registry<'a> {
    fn schedule(&mut self, def: TimerDef<'a>) -> Result<TimerId, TimerError> {
        if def.duration().is_zero() {
            log::warn!("Rejected zero-duration timer in manager '{}'", self.label);
            return Err(TimerError::InvalidDuration(def.duration()));
        }
        if self.live >= self.capacity {
            log::warn!(
                "Timer manager '{}' is full ({} timers), rejecting new timer",
                self.label,
                self.capacity
            );
            return Err(TimerError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let id = TimerId::new(self.next_id);
        self.next_id += 1;
        self.live += 1;
        log::debug!(
            "Timer {} added to manager '{}' ({:?})",
            id,
            self.label,
            def.duration()
        );
        self.pending.push(Timer::new(id, def));
        Ok(id)
    }
}

/// What a callback sees of its timer, plus access to the owning manager
pub struct TimerContext<'m, 'a> {
    id: TimerId,
    state: TimerState,
    amount: f64,
    elapsed: Duration,
    duration: Duration,
    payload: &'m Payload<'a>,
    registry: &'m mut Registry<'a>,
}

impl<'m, 'a> TimerContext<'m, 'a> {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Elapsed fraction in `[0, 1]`
    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn payload(&self) -> &Payload<'a> {
        self.payload
    }

    /// Borrowed payload downcast to `T`
    pub fn data<T: Any>(&self) -> Option<&'a T> {
        self.payload.downcast_ref::<T>()
    }

    /// Owned payload bytes
    pub fn bytes(&self) -> Option<&[u8]> {
        self.payload.as_bytes()
    }

    pub fn label(&self) -> &str {
        &self.registry.label
    }

    /// Number of timers currently counted against capacity
    pub fn active_count(&self) -> usize {
        self.registry.live
    }

    /// Chain a new timer onto the owning manager.
    ///
    /// The new timer is not advanced during the current pass; its `Starting`
    /// phase runs on the next [`TimerManager::update`].
    pub fn add(&mut self, def: TimerDef<'a>) -> Result<TimerId, TimerError> {
        self.registry.schedule(def)
    }
}

impl<'a> TimerManager<'a> {
    /// Create a new TimerManager holding at most `capacity` timers
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of simultaneously active timers, at least 1
    /// * `label` - Instance name for logging
    pub fn new(capacity: usize, label: impl Into<String>) -> Result<Self, TimerError> {
        let label = label.into();
        if capacity == 0 {
            log::warn!("Timer manager '{}' requested with zero capacity", label);
            return Err(TimerError::InvalidCapacity);
        }

        log::info!("Timer manager '{}' created, capacity {}", label, capacity);

        Ok(TimerManager {
            // grows on demand, capacity is only a bound
            timers: Vec::new(),
            registry: Registry {
                label,
                capacity,
                next_id: 0,
                live: 0,
                pending: Vec::new(),
            },
        })
    }

    /// Register a timer. It receives its `Starting` phase on the next update.
    pub fn add(&mut self, def: TimerDef<'a>) -> Result<TimerId, TimerError> {
        let id = self.registry.schedule(def)?;
        self.timers.append(&mut self.registry.pending);
        Ok(id)
    }

    /// Advance every active timer by `delta` and dispatch its phase callback
    pub fn update(&mut self, delta: Duration) {
        let TimerManager { timers, registry } = self;

        for timer in timers.iter_mut() {
            let state = timer.advance(delta);

            let cancelled = match timer.callback(state) {
                Some(callback) => {
                    log::trace!(
                        "Timer {} in manager '{}': {:?} at {:.3}",
                        timer.id,
                        registry.label,
                        state,
                        timer.amount()
                    );
                    let mut ctx = TimerContext {
                        id: timer.id,
                        state,
                        amount: timer.amount(),
                        elapsed: timer.elapsed,
                        duration: timer.duration,
                        payload: &timer.payload,
                        registry: &mut *registry,
                    };
                    (**callback)(&mut ctx)
                }
                None => false,
            };

            if cancelled || state == TimerState::Stopping {
                timer.finished = true;
                registry.live -= 1;
                if cancelled {
                    log::debug!(
                        "Timer {} cancelled in manager '{}' during {:?}",
                        timer.id,
                        registry.label,
                        state
                    );
                } else {
                    log::debug!("Timer {} finished in manager '{}'", timer.id, registry.label);
                }
            }
        }

        timers.retain(|timer| !timer.finished);
        timers.append(&mut registry.pending);
    }

    pub fn label(&self) -> &str {
        &self.registry.label
    }

    pub fn capacity(&self) -> usize {
        self.registry.capacity
    }

    /// Number of active timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    /// Progress of every active timer, in update order
    pub fn snapshots(&self) -> impl Iterator<Item = TimerSnapshot> + use<'_, 'a> {
        self.timers.iter().map(Timer::snapshot)
    }
}

impl Drop for TimerManager<'_> {
    fn drop(&mut self) {
        log::info!(
            "Timer manager '{}' dropped, releasing {} timer(s)",
            self.registry.label,
            self.timers.len()
        );
    }
}
