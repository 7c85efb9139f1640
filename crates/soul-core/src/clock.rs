//! World clock for the Digital Soul simulation.
//!
//! The clock is the single owner of the in-world [`GameTime`]. Each tick
//! advances it by a fixed number of minutes taken from [`TimeConfig`]; the
//! night window, the 07:00 wake-up instant, and the 00:00 reflection
//! instant are all derived from the current time, never stored.
//!
//! # Design Principles
//!
//! - The minutes-per-tick step divides 60, so every hour boundary (and in
//!   particular 00:00 and 07:00) is hit exactly once per day.
//! - Calendar carries use fixed 30-day months; see [`GameTime::plus_minutes`].

use soul_types::{GameTime, TimeOfDay};

use crate::config::TimeConfig;

/// Errors that can occur during clock construction.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Invalid time configuration.
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// World clock tracking the simulation's in-world time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    /// Time a fresh or reset world starts at.
    start: GameTime,
    /// Current time.
    now: GameTime,
    /// Minutes added per tick.
    minutes_per_tick: u32,
    /// Ticks since construction or the last reset.
    ticks: u64,
}

impl Clock {
    /// Create a clock from a time configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `minutes_per_tick` is 0 or
    /// does not divide 60.
    pub fn new(config: &TimeConfig) -> Result<Self, ClockError> {
        let step = config.minutes_per_tick;
        if step == 0 || 60_u32.checked_rem(step) != Some(0) {
            return Err(ClockError::InvalidConfig {
                reason: format!("minutes_per_tick must be a divisor of 60, got {step}"),
            });
        }
        let start = config.start;
        let start = GameTime::new(start.year, start.month, start.day, start.hour, start.minute);
        Ok(Self {
            start,
            now: start,
            minutes_per_tick: step,
            ticks: 0,
        })
    }

    /// Advance by the configured step. Returns the new time.
    pub fn advance(&mut self) -> GameTime {
        self.advance_by(u64::from(self.minutes_per_tick))
    }

    /// Advance by `minutes`. Returns the new time.
    pub fn advance_by(&mut self, minutes: u64) -> GameTime {
        self.now = self.now.plus_minutes(minutes);
        self.ticks = self.ticks.saturating_add(1);
        self.now
    }

    /// Return to the start time and zero the tick counter.
    pub const fn reset(&mut self) {
        self.now = self.start;
        self.ticks = 0;
    }

    /// Current time.
    pub const fn now(&self) -> GameTime {
        self.now
    }

    /// Ticks since construction or the last reset.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Configured minutes per tick.
    pub const fn minutes_per_tick(&self) -> u32 {
        self.minutes_per_tick
    }

    /// True iff the hour is at or after 22 or before 6.
    pub const fn is_night(&self) -> bool {
        self.now.is_night()
    }

    /// True at exactly 07:00.
    pub const fn is_wake_time(&self) -> bool {
        self.now.is_wake_time()
    }

    /// True at exactly 00:00, when daily reflection runs.
    pub const fn is_midnight(&self) -> bool {
        self.now.is_exactly(0, 0)
    }

    /// Coarse phase of the day.
    pub const fn time_of_day(&self) -> TimeOfDay {
        self.now.time_of_day()
    }

    /// Human-readable time, e.g. `"Morning, 08:00"`.
    pub fn describe(&self) -> String {
        format!("{}, {}", self.time_of_day(), self.now.clock_label())
    }
}
