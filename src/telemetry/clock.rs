//! Wall-clock source for timestamps and the date/time readouts

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};

/// Source of the current local time
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Date readout, e.g. `19-Oct-2026`
pub fn date_label(at: NaiveDateTime) -> String {
    at.format("%d-%b-%Y").to_string()
}

/// 12-hour time readout, e.g. `03:04:05 PM`
pub fn time_label(at: NaiveDateTime) -> String {
    at.format("%I:%M:%S %p").to_string()
}

/// Time of day truncated to whole seconds
pub fn to_second(at: NaiveDateTime) -> NaiveTime {
    let time = at.time();
    time.with_nanosecond(0).unwrap_or(time)
}
