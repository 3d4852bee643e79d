//! Wall-clock readout: an `HH:MM` string refreshed on a fixed tick.

use chrono::{Local, NaiveTime, Timelike};

#[derive(Debug, Clone)]
pub struct Clock {
    interval: f64,
    since_refresh: f64,
    value: String,
}

impl Clock {
    /// `interval` is in seconds.  The readout starts at `00:00` until the
    /// first refresh.
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(0.01),
            since_refresh: 0.0,
            value: String::from("00:00"),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Format `time` immediately.  Returns `true` when the readout changed.
    pub fn refresh_at(&mut self, time: NaiveTime) -> bool {
        let next = format!("{:02}:{:02}", time.hour(), time.minute());
        if next == self.value {
            return false;
        }
        self.value = next;
        true
    }

    /// Read the local time now.
    pub fn refresh(&mut self) -> bool {
        self.refresh_at(Local::now().time())
    }

    /// Advance by `dt` seconds, asking `now` for the time whenever an
    /// interval has elapsed.
    pub fn tick_with(&mut self, dt: f64, now: impl FnOnce() -> NaiveTime) -> bool {
        self.since_refresh += dt.max(0.0);
        if self.since_refresh < self.interval {
            return false;
        }
        self.since_refresh %= self.interval;
        self.refresh_at(now())
    }

    pub fn tick(&mut self, dt: f64) -> bool {
        self.tick_with(dt, || Local::now().time())
    }
}
