use chrono::{Local, NaiveDateTime, Timelike};

/// Source of the timestamps stamped onto tasks.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in local time, truncated to whole seconds to match the file format.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}
