//! Time source for entity timestamps.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

/// Supplies the current instant.
pub trait Clock: Debug + Send + Sync {
    /// The current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
