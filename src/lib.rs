//! # Timer Manager
//!
//! A bounded pool of frame-driven countdown timers for game and render loops.
//!
//! The application calls [`TimerManager::update`] once per frame with the
//! elapsed time since the previous frame. Every active timer is advanced in
//! insertion order and its phase callback runs with the timer's progress.
//!
//! ## Features
//!
//! - **Three-phase lifecycle**: `Starting` once, `Updating` while running, `Stopping` once
//! - **Cooperative cancellation**: a callback returning `true` removes its timer immediately
//! - **Chaining**: callbacks can add new timers to the same manager mid-update
//! - **Bounded**: fixed capacity chosen at construction, ids never reused
//! - **Payloads**: borrow caller data or hand the manager a private byte copy
//! - **Async driver**: optional tokio heartbeat for loops without a frame clock
//! - **Comprehensive Logging**: Built-in logging for debugging and monitoring
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::Cell;
//! use timerman::{Duration, TimerDef, TimerManager, TimerState};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stops = Cell::new(0);
//!     let mut manager = TimerManager::new(8, "fx")?;
//!
//!     manager.add(
//!         TimerDef::new(Duration::from_millis(250))
//!             .on_update(|ctx| {
//!                 println!("fade {:.2}", ctx.amount());
//!                 false
//!             })
//!             .on_stop(|ctx| {
//!                 assert_eq!(ctx.state(), TimerState::Stopping);
//!                 stops.set(stops.get() + 1);
//!                 false
//!             }),
//!     )?;
//!
//!     // One call per frame
//!     while !manager.is_empty() {
//!         manager.update(Duration::from_millis(16));
//!     }
//!
//!     drop(manager);
//!     assert_eq!(stops.get(), 1);
//!     Ok(())
//! }
//! ```

mod driver;
mod error;
mod timer;
mod tm;

pub use driver::TimerDriver;
pub use error::TimerError;
pub use timer::{Payload, TimerCallback, TimerDef, TimerId, TimerSnapshot, TimerState};
pub use tm::{TimerContext, TimerManager};

// Re-export commonly used types for convenience
pub use std::time::Duration;
pub use tokio_util::sync::CancellationToken;
