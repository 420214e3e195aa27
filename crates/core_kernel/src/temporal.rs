//! Stay periods and property-local dates
//!
//! Reservations are booked over half-open date intervals `[check_in, check_out)`:
//! the night of `check_in` is sold, the morning of `check_out` the room is free
//! again. Two stays where one checks out on the day the other checks in
//! therefore never overlap.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ISO-8601 calendar date format used for all date inputs
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timezone wrapper for the property's local calendar
///
/// "Today" for check-in stamping and the same-day occupancy guard is the
/// property's local date, not the UTC date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parses an IANA timezone name such as `Asia/Kolkata`
    pub fn parse(name: &str) -> Result<Self, TemporalError> {
        Tz::from_str(name)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(name.to_string()))
    }

    /// Returns the calendar date at `instant` in this timezone
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Errors related to dates and stay periods
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid stay: check-out {check_out} must be after check-in {check_in}")]
    InvalidPeriod {
        check_in: String,
        check_out: String,
    },

    #[error("Malformed date '{0}', expected YYYY-MM-DD")]
    MalformedDate(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Parses a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, TemporalError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| TemporalError::MalformedDate(value.to_string()))
}

/// A half-open stay interval `[check_in, check_out)`
///
/// # Invariants
///
/// - `check_out > check_in`, so every stay covers at least one night
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayPeriod {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayPeriod {
    /// Creates a stay period
    ///
    /// # Errors
    ///
    /// Returns `TemporalError::InvalidPeriod` when `check_out <= check_in`
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, TemporalError> {
        if check_out <= check_in {
            return Err(TemporalError::InvalidPeriod {
                check_in: check_in.to_string(),
                check_out: check_out.to_string(),
            });
        }
        Ok(Self { check_in, check_out })
    }

    /// Parses both ends from `YYYY-MM-DD` strings
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self, TemporalError> {
        Self::new(parse_date(check_in)?, parse_date(check_out)?)
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Number of nights sold
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Returns true if the night starting on `date` belongs to this stay
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.check_in && date < self.check_out
    }

    /// Half-open overlap: `self.check_in < other.check_out && self.check_out > other.check_in`
    pub fn overlaps(&self, other: &StayPeriod) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }
}

impl fmt::Display for StayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.check_in, self.check_out)
    }
}
