//! In-world calendar types.
//!
//! The simulation calendar has minute resolution and fixed-length months:
//! every month has [`DAYS_PER_MONTH`] days and every year has
//! [`MONTHS_PER_YEAR`] months. [`GameTime`] is a plain value; the clock in
//! `soul-core` owns the single mutable instance.

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Minutes in one in-world hour.
pub const MINUTES_PER_HOUR: u32 = 60;

/// Hours in one in-world day.
pub const HOURS_PER_DAY: u32 = 24;

/// Days in every in-world month.
pub const DAYS_PER_MONTH: u32 = 30;

/// Months in one in-world year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Hour at which sleeping agents wake up.
pub const WAKE_HOUR: u32 = 7;

/// Minute at which sleeping agents wake up.
pub const WAKE_MINUTE: u32 = 0;

/// A point on the in-world calendar.
///
/// Invariant: `minute < 60`, `hour < 24`, `1 <= day <= 30`,
/// `1 <= month <= 12`. [`GameTime::new`] normalizes its input and
/// [`GameTime::plus_minutes`] restores the invariant after every addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameTime {
    /// Calendar year.
    pub year: u32,
    /// Month of the year, 1-based.
    pub month: u32,
    /// Day of the month, 1-based.
    pub day: u32,
    /// Hour of the day, 0-23.
    pub hour: u32,
    /// Minute of the hour, 0-59.
    pub minute: u32,
}

impl GameTime {
    /// Build a time from raw components, carrying any overflow upwards.
    ///
    /// Zero `day` or `month` values are treated as 1.
    pub fn new(year: u32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let raw = Self {
            year,
            month: month.max(1),
            day: day.max(1),
            hour,
            minute,
        };
        raw.plus_minutes(0)
    }

    /// Return this time advanced by `minutes`, normalized.
    ///
    /// Carries minute -> hour -> day -> month -> year. The year saturates at
    /// `u32::MAX` rather than wrapping.
    #[must_use]
    pub fn plus_minutes(self, minutes: u64) -> Self {
        let total_minutes = u64::from(self.minute).saturating_add(minutes);
        let (minute, carry_hours) = split(total_minutes, MINUTES_PER_HOUR);

        let total_hours = u64::from(self.hour).saturating_add(carry_hours);
        let (hour, carry_days) = split(total_hours, HOURS_PER_DAY);

        // Day and month are 1-based; shift to 0-based for the carry.
        let total_days = u64::from(self.day.saturating_sub(1)).saturating_add(carry_days);
        let (day_index, carry_months) = split(total_days, DAYS_PER_MONTH);

        let total_months = u64::from(self.month.saturating_sub(1)).saturating_add(carry_months);
        let (month_index, carry_years) = split(total_months, MONTHS_PER_YEAR);

        let year = u32::try_from(u64::from(self.year).saturating_add(carry_years))
            .unwrap_or(u32::MAX);

        Self {
            year,
            month: month_index.saturating_add(1),
            day: day_index.saturating_add(1),
            hour,
            minute,
        }
    }

    /// Whether this time falls in the night window (22:00 to 05:59).
    pub const fn is_night(&self) -> bool {
        self.hour >= 22 || self.hour < 6
    }

    /// Whether this time is exactly `hour:minute`.
    pub const fn is_exactly(&self, hour: u32, minute: u32) -> bool {
        self.hour == hour && self.minute == minute
    }

    /// Whether this is the wake-up instant, [`WAKE_HOUR`]:[`WAKE_MINUTE`].
    pub const fn is_wake_time(&self) -> bool {
        self.is_exactly(WAKE_HOUR, WAKE_MINUTE)
    }

    /// Coarse phase of the day derived from the hour.
    pub const fn time_of_day(&self) -> TimeOfDay {
        match self.hour {
            5..=7 => TimeOfDay::Dawn,
            8..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Dusk,
            _ => TimeOfDay::Night,
        }
    }

    /// `HH:MM` rendering of the time of day.
    pub fn clock_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

impl Default for GameTime {
    /// The calendar origin used by a fresh world: 2024-01-01 07:00.
    fn default() -> Self {
        Self {
            year: 2024,
            month: 1,
            day: 1,
            hour: 7,
            minute: 0,
        }
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Split `value` into `(value % base, value / base)` with `base > 0`.
fn split(value: u64, base: u32) -> (u32, u64) {
    let base = u64::from(base);
    let rem = value.checked_rem(base).unwrap_or(0);
    let quot = value.checked_div(base).unwrap_or(0);
    // rem < base <= u32::MAX
    (u32::try_from(rem).unwrap_or(0), quot)
}

/// Coarse phase of the in-world day, used for perception wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TimeOfDay {
    /// 05:00 to 07:59.
    Dawn,
    /// 08:00 to 11:59.
    Morning,
    /// 12:00 to 16:59.
    Afternoon,
    /// 17:00 to 21:59.
    Dusk,
    /// 22:00 to 04:59.
    Night,
}

impl TimeOfDay {
    /// English label for this phase.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dawn => "Dawn",
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Dusk => "Dusk",
            Self::Night => "Night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
