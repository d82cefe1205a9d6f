//! Injectable time source.
//!
//! Reading-month boundaries and session expiry depend on "now", so
//! services take a [`Clock`] instead of calling `Utc::now()` directly.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock with a settable instant.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: std::sync::Mutex<Option<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(Some(instant)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap() = Some(instant);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().unwrap().unwrap_or_else(Utc::now)
    }
}

// Lets a test keep a handle to the clock it injected.
impl<T: Clock> Clock for std::sync::Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
