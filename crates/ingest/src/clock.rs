//! Wall-clock capability, injected so score records can be stamped with a fixed year in tests

use chrono::{Datelike, Local};

pub trait Clock: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        Local::now().year()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}
