//! Gregorian calendar <-> Julian Day conversion.
//! Proleptic Gregorian in both directions, UTC only.

use serde::{Deserialize, Serialize};

/// Julian Day of the J2000.0 epoch (2000-01-01 12:00 UTC).
pub const JD_J2000: f64 = 2451545.0;
/// Julian Day of the Unix epoch (1970-01-01 00:00 UTC).
pub const JD_UNIX_EPOCH: f64 = 2440587.5;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;

const SECONDS_PER_DAY: f64 = 86_400.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A UTC calendar instant.
///
/// `month` is signed so that month arithmetic can overflow freely;
/// out-of-range months carry into the year when converted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    /// 1 = January. Values outside 1..=12 are carried into `year`.
    pub month: i32,
    pub day: u32,
    #[serde(default)]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
    #[serde(default)]
    pub second: f64,
}

impl CalendarDate {
    /// Midnight UTC on the given day.
    pub fn ymd(year: i32, month: i32, day: u32) -> Self {
        Self::ymd_hms(year, month, day, 0, 0, 0.0)
    }

    pub fn ymd_hms(year: i32, month: i32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Same instant with `month` carried into `year` so it lies in 1..=12.
    pub fn normalized(self) -> Self {
        let (year, month) = carry_month(self.year as i64, self.month as i64);
        Self {
            year: year as i32,
            month: month as i32,
            ..self
        }
    }

    /// Fraction of the civil day elapsed since midnight.
    pub fn day_fraction(&self) -> f64 {
        (self.hour as f64 * 3600.0 + self.minute as f64 * 60.0 + self.second) / SECONDS_PER_DAY
    }

    pub fn julian_day(&self) -> f64 {
        julian_day(self)
    }

    /// Shift by whole months, clamping the day to the length of the target month.
    pub fn add_months(self, months: i32) -> Self {
        let shifted = Self {
            month: self.month + months,
            ..self
        }
        .normalized();
        let last = days_in_month(shifted.year, shifted.month);
        Self {
            day: shifted.day.min(last),
            ..shifted
        }
    }
}

/// Carry an unbounded month number into the year. Returns (year, month in 1..=12).
fn carry_month(year: i64, month: i64) -> (i64, i64) {
    let zero_based = month - 1;
    (year + zero_based.div_euclid(12), zero_based.rem_euclid(12) + 1)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year` (month is carried first).
pub fn days_in_month(year: i32, month: i32) -> u32 {
    let (year, month) = carry_month(year as i64, month as i64);
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year as i32) => 29,
        2 => 28,
        _ => 31,
    }
}

/// Integer Julian Day Number of the civil day (the JD at its noon).
fn julian_day_number(year: i64, month: i64, day: i64) -> i64 {
    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        - 32045
}

/// Convert a UTC calendar date to a continuous Julian Day.
///
/// 2000-01-01 12:00 maps exactly to 2451545.0.
pub fn julian_day(date: &CalendarDate) -> f64 {
    let (year, month) = carry_month(date.year as i64, date.month as i64);
    let jdn = julian_day_number(year, month, date.day as i64);
    jdn as f64
        + (date.hour as f64 - 12.0) / 24.0
        + date.minute as f64 / 1440.0
        + date.second / SECONDS_PER_DAY
}

/// Julian Day for a JavaScript-style timestamp (milliseconds since the Unix epoch).
pub fn julian_day_from_unix_millis(millis: f64) -> f64 {
    millis / MILLIS_PER_DAY + JD_UNIX_EPOCH
}

/// Inverse of [`julian_day`] (Meeus, chapter 7).
pub fn calendar_date(jd: f64) -> CalendarDate {
    let shifted = jd + 0.5;
    let z_floor = shifted.floor();
    let fraction = shifted - z_floor;
    let z = z_floor as i64;

    let alpha = ((z as f64 - 1867216.25) / 36524.25).floor() as i64;
    let a = z + 1 + alpha - alpha.div_euclid(4);
    let b = a + 1524;
    let c = ((b as f64 - 122.1) / 365.25).floor() as i64;
    let d = (365.25 * c as f64).floor() as i64;
    let e = ((b - d) as f64 / 30.6001).floor() as i64;

    let day = b - d - (30.6001 * e as f64).floor() as i64;
    let month = if e < 14 { e - 1 } else { e - 13 };
    let year = if month > 2 { c - 4716 } else { c - 4715 };

    let seconds = fraction * SECONDS_PER_DAY;
    let hour = ((seconds / 3600.0).floor() as u32).min(23);
    let minute = (((seconds - hour as f64 * 3600.0) / 60.0).floor() as u32).min(59);
    let second = (seconds - hour as f64 * 3600.0 - minute as f64 * 60.0).max(0.0);

    CalendarDate {
        year: year as i32,
        month: month as i32,
        day: day as u32,
        hour,
        minute,
        second,
    }
}

pub fn days_since_j2000(jd: f64) -> f64 {
    jd - JD_J2000
}

pub fn julian_centuries_since_j2000(jd: f64) -> f64 {
    days_since_j2000(jd) / DAYS_PER_JULIAN_CENTURY
}
