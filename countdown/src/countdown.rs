//! Countdown arithmetic: the target instant, the remaining duration, and the four display fields.

use std::fmt;

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

pub const SECS_PER_MINUTE: u64 = 60;
pub const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
pub const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Hours tried, in order, when local midnight on January 1 falls into a DST gap.
const MIDNIGHT_FALLBACK_HOURS: [u32; 4] = [0, 1, 2, 3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownError {
    /// January 1 of `year` cannot be represented in local time.
    TargetOutOfRange { year: i32 },
}

impl fmt::Display for CountdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownError::TargetOutOfRange { year } => {
                write!(f, "January 1 of year {year} is out of range for local time")
            }
        }
    }
}

impl std::error::Error for CountdownError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Field {
    /// Display and update order.
    pub const ALL: [Field; 4] = [Field::Days, Field::Hours, Field::Minutes, Field::Seconds];

    pub fn index(self) -> usize {
        match self {
            Field::Days => 0,
            Field::Hours => 1,
            Field::Minutes => 2,
            Field::Seconds => 3,
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            Field::Days => "DAYS",
            Field::Hours => "HOURS",
            Field::Minutes => "MINUTES",
            Field::Seconds => "SECONDS",
        }
    }
}

/// Zero-pads to at least two digits; wider values are kept whole.
pub fn pad(n: u64) -> String {
    format!("{n:02}")
}

/// Whole units left until the target. Sub-second remainders are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RemainingDuration {
    pub days: u64,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl RemainingDuration {
    pub fn from_secs(total: u64) -> Self {
        Self {
            days: total / SECS_PER_DAY,
            hours: ((total / SECS_PER_HOUR) % 24) as u8,
            minutes: ((total / SECS_PER_MINUTE) % 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    /// Time left from `now` until `target`, or `None` once the target is reached.
    pub fn between(now: DateTime<Local>, target: DateTime<Local>) -> Option<Self> {
        let diff_ms = (target - now).num_milliseconds();
        if diff_ms <= 0 {
            return None;
        }
        Some(Self::from_secs(diff_ms as u64 / 1000))
    }

    pub fn total_secs(&self) -> u64 {
        self.days * SECS_PER_DAY
            + u64::from(self.hours) * SECS_PER_HOUR
            + u64::from(self.minutes) * SECS_PER_MINUTE
            + u64::from(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.total_secs() == 0
    }

    pub fn value(&self, field: Field) -> u64 {
        match field {
            Field::Days => self.days,
            Field::Hours => u64::from(self.hours),
            Field::Minutes => u64::from(self.minutes),
            Field::Seconds => u64::from(self.seconds),
        }
    }

    pub fn fields(&self) -> FieldValues {
        FieldValues {
            values: Field::ALL.map(|field| pad(self.value(field))),
        }
    }
}

impl fmt::Display for RemainingDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}:{:02}:{:02}",
            pad(self.days),
            self.hours,
            self.minutes,
            self.seconds
        )
    }
}

/// The four padded strings pushed to the display on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues {
    values: [String; 4],
}

impl FieldValues {
    pub fn zero() -> Self {
        RemainingDuration::default().fields()
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    /// Fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }
}

/// Earliest of 00:00 to 03:00 on January 1 of `year` that exists in `tz`.
pub fn new_year_start<Tz: TimeZone>(year: i32, tz: &Tz) -> Result<DateTime<Tz>, CountdownError> {
    let date =
        NaiveDate::from_ymd_opt(year, 1, 1).ok_or(CountdownError::TargetOutOfRange { year })?;
    MIDNIGHT_FALLBACK_HOURS
        .iter()
        .find_map(|hour| {
            date.and_hms_opt(*hour, 0, 0)?
                .and_local_timezone(tz.clone())
                .earliest()
        })
        .ok_or(CountdownError::TargetOutOfRange { year })
}

/// The instant being counted down to, plus the new year it marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInstant {
    at: DateTime<Local>,
    year: i32,
}

impl TargetInstant {
    /// Local midnight on January 1 of `year`.
    ///
    /// If midnight does not exist locally (DST gap) the first valid hour that morning is used.
    pub fn new_year(year: i32) -> Result<Self, CountdownError> {
        let at = new_year_start(year, &Local)?;
        Ok(Self { at, year })
    }

    /// The next January 1 strictly after `now`.
    pub fn new_year_after(now: DateTime<Local>) -> Result<Self, CountdownError> {
        let year = now
            .year()
            .checked_add(1)
            .ok_or(CountdownError::TargetOutOfRange { year: now.year() })?;
        Self::new_year(year)
    }

    /// An arbitrary target; the celebrated year is the one `at` falls in.
    pub fn at(at: DateTime<Local>) -> Self {
        Self {
            at,
            year: at.year(),
        }
    }

    pub fn instant(&self) -> DateTime<Local> {
        self.at
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// January 1 of the year after this one. Falls back to the next new year after `now` if that
    /// is not in the future, so the countdown never re-arms onto an expired target.
    pub fn following(&self, now: DateTime<Local>) -> Result<Self, CountdownError> {
        let year = self
            .year
            .checked_add(1)
            .ok_or(CountdownError::TargetOutOfRange { year: self.year })?;
        let next = Self::new_year(year)?;
        if next.at > now {
            Ok(next)
        } else {
            Self::new_year_after(now)
        }
    }

    pub fn remaining(&self, now: DateTime<Local>) -> Option<RemainingDuration> {
        RemainingDuration::between(now, self.at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Running(RemainingDuration),
    Expired,
}

impl TickOutcome {
    /// Values to display for this outcome; all zeros once expired.
    pub fn fields(&self) -> FieldValues {
        match self {
            TickOutcome::Running(remaining) => remaining.fields(),
            TickOutcome::Expired => FieldValues::zero(),
        }
    }
}

pub fn evaluate(now: DateTime<Local>, target: &TargetInstant) -> TickOutcome {
    match target.remaining(now) {
        Some(remaining) => TickOutcome::Running(remaining),
        None => TickOutcome::Expired,
    }
}
