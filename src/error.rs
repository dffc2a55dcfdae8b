//! Error types for timer manager operations

use std::time::Duration;

use thiserror::Error;

/// Errors returned synchronously by [`TimerManager`](crate::TimerManager) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("timer manager capacity must be at least 1")]
    InvalidCapacity,

    #[error("timer duration must be positive, got {0:?}")]
    InvalidDuration(Duration),

    #[error("timer manager is full ({capacity} active timers)")]
    CapacityExceeded { capacity: usize },
}
