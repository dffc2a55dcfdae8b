use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::tm::TimerContext;

/// Handle of a timer, unique within the manager that assigned it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub(crate) fn new(raw: u64) -> Self {
        TimerId(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase of a timer during one advancement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerState {
    /// First advancement after `add`, `amount` is 0
    Starting,
    /// Every advancement strictly between start and stop
    Updating,
    /// The advancement on which `amount` reaches 1
    Stopping,
}

/// Phase callback. Returning `true` removes the timer immediately.
///
/// The same callback may be bound to several phases of one timer, or to
/// several timers.
pub type TimerCallback<'a> = Rc<dyn Fn(&mut TimerContext<'_, 'a>) -> bool + 'a>;

/// User data attached to a timer
pub enum Payload<'a> {
    None,
    /// Caller-owned data, borrowed for the lifetime of the manager
    Borrowed(&'a dyn Any),
    /// Byte copy owned by the timer, freed when the timer is removed
    Owned(Box<[u8]>),
}

impl<'a> Payload<'a> {
    pub fn is_none(&self) -> bool {
        matches!(self, Payload::None)
    }

    /// Borrowed data downcast to `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match self {
            Payload::Borrowed(data) => {
                let data: &'a dyn Any = *data;
                data.downcast_ref::<T>()
            }
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Owned(bytes) => Some(&**bytes),
            _ => None,
        }
    }
}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None => f.write_str("None"),
            Payload::Borrowed(_) => f.write_str("Borrowed(..)"),
            Payload::Owned(bytes) => write!(f, "Owned({} bytes)", bytes.len()),
        }
    }
}

/// Definition of a timer, consumed by [`TimerManager::add`](crate::TimerManager::add)
///
/// ```
/// use timerman::{Duration, TimerDef, TimerState};
///
/// let def = TimerDef::new(Duration::from_millis(500))
///     .with_bytes(b"fade-out")
///     .on_update(|ctx| {
///         assert_eq!(ctx.state(), TimerState::Updating);
///         false
///     });
/// assert_eq!(def.duration(), Duration::from_millis(500));
/// ```
pub struct TimerDef<'a> {
    duration: Duration,
    payload: Payload<'a>,
    on_start: Option<TimerCallback<'a>>,
    on_update: Option<TimerCallback<'a>>,
    on_stop: Option<TimerCallback<'a>>,
}

impl<'a> TimerDef<'a> {
    pub fn new(duration: Duration) -> Self {
        TimerDef {
            duration,
            payload: Payload::None,
            on_start: None,
            on_update: None,
            on_stop: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Attach caller-owned data. The timer only keeps the reference.
    pub fn with_data<T: Any>(mut self, data: &'a T) -> Self {
        self.payload = Payload::Borrowed(data);
        self
    }

    /// Attach a private copy of `bytes`. An empty slice attaches nothing.
    pub fn with_bytes(mut self, bytes: &[u8]) -> Self {
        self.payload = if bytes.is_empty() {
            Payload::None
        } else {
            Payload::Owned(bytes.into())
        };
        self
    }

    pub fn on_start<F>(self, callback: F) -> Self
    where
        F: Fn(&mut TimerContext<'_, 'a>) -> bool + 'a,
    {
        self.with_callback(TimerState::Starting, Rc::new(callback))
    }

    pub fn on_update<F>(self, callback: F) -> Self
    where
        F: Fn(&mut TimerContext<'_, 'a>) -> bool + 'a,
    {
        self.with_callback(TimerState::Updating, Rc::new(callback))
    }

    pub fn on_stop<F>(self, callback: F) -> Self
    where
        F: Fn(&mut TimerContext<'_, 'a>) -> bool + 'a,
    {
        self.with_callback(TimerState::Stopping, Rc::new(callback))
    }

    /// Bind one callback to all three phases
    pub fn on_all<F>(self, callback: F) -> Self
    where
        F: Fn(&mut TimerContext<'_, 'a>) -> bool + 'a,
    {
        let callback: TimerCallback<'a> = Rc::new(callback);
        self.with_callback(TimerState::Starting, callback.clone())
            .with_callback(TimerState::Updating, callback.clone())
            .with_callback(TimerState::Stopping, callback)
    }

    /// Bind a shared callback to a single phase
    pub fn with_callback(mut self, state: TimerState, callback: TimerCallback<'a>) -> Self {
        match state {
            TimerState::Starting => self.on_start = Some(callback),
            TimerState::Updating => self.on_update = Some(callback),
            TimerState::Stopping => self.on_stop = Some(callback),
        }
        self
    }
}

impl fmt::Debug for TimerDef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerDef")
            .field("duration", &self.duration)
            .field("payload", &self.payload)
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_stop", &self.on_stop.is_some())
            .finish()
    }
}

/// Read-only copy of a timer's progress, for debug overlays and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    pub id: TimerId,
    /// Phase of the last advancement, `None` until the first one
    pub state: Option<TimerState>,
    pub amount: f64,
    pub elapsed: Duration,
    pub duration: Duration,
}

/// One active countdown owned by a manager slot
pub(crate) struct Timer<'a> {
    pub(crate) id: TimerId,
    pub(crate) duration: Duration,
    pub(crate) elapsed: Duration,
    pub(crate) state: Option<TimerState>,
    pub(crate) payload: Payload<'a>,
    on_start: Option<TimerCallback<'a>>,
    on_update: Option<TimerCallback<'a>>,
    on_stop: Option<TimerCallback<'a>>,
    /// Set once the timer stopped or was cancelled during a pass
    pub(crate) finished: bool,
}

impl<'a> Timer<'a> {
    pub(crate) fn new(id: TimerId, def: TimerDef<'a>) -> Self {
        Timer {
            id,
            duration: def.duration,
            elapsed: Duration::ZERO,
            state: None,
            payload: def.payload,
            on_start: def.on_start,
            on_update: def.on_update,
            on_stop: def.on_stop,
            finished: false,
        }
    }

    /// Advance by `delta` and return the phase of this advancement.
    ///
    /// The first advancement is always `Starting` and does not consume
    /// `delta`. Reaching the duration clamps `elapsed` to it.
    pub(crate) fn advance(&mut self, delta: Duration) -> TimerState {
        let state = match self.state {
            None => TimerState::Starting,
            Some(_) => {
                self.elapsed = self.elapsed.saturating_add(delta);
                if self.elapsed >= self.duration {
                    self.elapsed = self.duration;
                    TimerState::Stopping
                } else {
                    TimerState::Updating
                }
            }
        };
        self.state = Some(state);
        state
    }

    pub(crate) fn amount(&self) -> f64 {
        if self.elapsed >= self.duration {
            return 1.0;
        }
        // the ratio can round up to 1.0 for long durations
        let ratio = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        ratio.clamp(0.0, 1.0 - f64::EPSILON / 2.0)
    }

    pub(crate) fn callback(&self, state: TimerState) -> Option<&TimerCallback<'a>> {
        match state {
            TimerState::Starting => self.on_start.as_ref(),
            TimerState::Updating => self.on_update.as_ref(),
            TimerState::Stopping => self.on_stop.as_ref(),
        }
    }

    pub(crate) fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            id: self.id,
            state: self.state,
            amount: self.amount(),
            elapsed: self.elapsed,
            duration: self.duration,
        }
    }
}
