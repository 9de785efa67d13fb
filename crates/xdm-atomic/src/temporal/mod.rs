//! Calendar values and proleptic Gregorian calendar math.
//!
//! Years are stored with a year zero (internal 0 is lexical `-0001`); only the lexical
//! layer in [`lexical`] translates between the two numberings. Timezones are offsets
//! in minutes, `None` meaning "no timezone" (distinct from `Z`).

use crate::error::{Error, ErrorCode};

pub mod date_time;
pub mod duration;
pub mod gdate;
pub mod lexical;
pub mod time;

pub use date_time::DateTimeValue;
pub use duration::{DurationKind, DurationValue};
pub use gdate::{GDateKind, GDateValue};
pub use time::TimeValue;

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;
/// Largest timezone offset in minutes (14:00).
pub const MAX_TIMEZONE: i16 = 14 * 60;
/// Largest year magnitude accepted by parsing and calendar arithmetic.
pub const MAX_YEAR: i64 = i32::MAX as i64;

/// Julian day number of 1970-01-01.
const UNIX_EPOCH_JDN: i64 = 2_440_588;

pub fn is_valid_timezone(tz: i16) -> bool {
    (-MAX_TIMEZONE..=MAX_TIMEZONE).contains(&tz)
}

pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0) && !(year % 100 == 0 && year % 400 != 0)
}

pub fn days_in_month(year: i64, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Internal year within the range the lexical forms can express.
pub fn is_valid_year(year: i64) -> bool {
    (1 - MAX_YEAR..=MAX_YEAR).contains(&year)
}

pub fn is_valid_date(year: i64, month: u8, day: u8) -> bool {
    (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month)
}

/// Julian day number of a date (internal year numbering).
pub fn julian_day_number(year: i64, month: u8, day: u8) -> i64 {
    // days-from-civil over eras of 400 years, March-based
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y.rem_euclid(400);
    let m = i64::from(month);
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468 + UNIX_EPOCH_JDN
}

/// Date of a Julian day number, as `(year, month, day)`.
pub fn date_from_julian_day_number(jdn: i64) -> (i64, u8, u8) {
    let z = jdn - UNIX_EPOCH_JDN + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (
        year,
        u8::try_from(month).unwrap_or(1),
        u8::try_from(day).unwrap_or(1),
    )
}

/// Ordinal day within the year, 1 January = 1.
pub fn day_within_year(year: i64, month: u8, day: u8) -> i64 {
    julian_day_number(year, month, day) - julian_day_number(year, 1, 1) + 1
}

/// Day of the week, Monday = 1 through Sunday = 7.
pub fn day_of_week(year: i64, month: u8, day: u8) -> u8 {
    // JDN 0 was a Monday
    u8::try_from(julian_day_number(year, month, day).rem_euclid(7) + 1).unwrap_or(1)
}

/// ISO 8601 week number: week 1 is the week holding the year's first Thursday. Days
/// before week 1 belong to the last week of the previous year, days after the last
/// Thursday to week 1 of the next.
pub fn week_number(year: i64, month: u8, day: u8) -> i64 {
    let d = day_within_year(year, month, day);
    let first_day = i64::from(day_of_week(year, 1, 1));
    if first_day > 4 && first_day + d <= 8 {
        return week_number(year - 1, 12, 31);
    }
    let inc = i64::from(first_day < 5);
    let week = (d + first_day - 2) / 7 + inc;
    if week == 53 && day_of_week(year, 12, 31) < 4 {
        return 1;
    }
    week
}

/// Week within the month by the same first-Thursday rule; days before week 1 are week 0.
pub fn week_number_within_month(year: i64, month: u8, day: u8) -> i64 {
    let first_day = i64::from(day_of_week(year, month, 1));
    let inc = i64::from(first_day < 5);
    (i64::from(day) + first_day - 2) / 7 + inc
}

/// Year in lexical numbering (no year zero).
pub fn lexical_year(internal: i64) -> i64 {
    if internal <= 0 { internal - 1 } else { internal }
}

/// Shift a date by a number of months, clamping the day to the end of the target month.
pub fn add_months(year: i64, month: u8, day: u8, months: i64) -> Result<(i64, u8, u8), Error> {
    let total = year
        .checked_mul(12)
        .and_then(|t| t.checked_add(i64::from(month) - 1))
        .and_then(|t| t.checked_add(months))
        .ok_or_else(year_overflow)?;
    let new_year = total.div_euclid(12);
    if new_year.abs() > MAX_YEAR {
        return Err(year_overflow());
    }
    let new_month = u8::try_from(total.rem_euclid(12) + 1).map_err(|_| year_overflow())?;
    let mut new_day = day;
    while !is_valid_date(new_year, new_month, new_day) {
        new_day -= 1;
    }
    Ok((new_year, new_month, new_day))
}

/// Split microseconds since the epoch of the Julian day count (local time) into a date
/// and the microseconds within the day.
pub fn split_local_micros(local: i128) -> Result<((i64, u8, u8), i64), Error> {
    let day = i128::from(MICROS_PER_DAY);
    let jdn = i64::try_from(local.div_euclid(day)).map_err(|_| year_overflow())?;
    let within = i64::try_from(local.rem_euclid(day)).map_err(|_| year_overflow())?;
    let date = date_from_julian_day_number(jdn);
    if date.0.abs() > MAX_YEAR {
        return Err(year_overflow());
    }
    Ok((date, within))
}

/// Local microseconds counted from the start of Julian day 0.
pub fn local_micros(year: i64, month: u8, day: u8, micros_of_day: i64) -> i128 {
    i128::from(julian_day_number(year, month, day)) * i128::from(MICROS_PER_DAY)
        + i128::from(micros_of_day)
}

pub(crate) fn year_overflow() -> Error {
    Error::from_code(ErrorCode::FODT0001, "year out of range")
}

pub(crate) fn check_timezone(tz: Option<i16>) -> Result<(), Error> {
    match tz {
        Some(t) if !is_valid_timezone(t) => Err(Error::from_code(
            ErrorCode::FODT0003,
            format!("invalid timezone offset of {t} minutes"),
        )),
        _ => Ok(()),
    }
}

/// Components extractable from temporal and duration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Year,
    Month,
    Day,
    Hours,
    Minutes,
    /// Seconds including the fraction, as a decimal.
    Seconds,
    WholeSeconds,
    Microseconds,
    Timezone,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2000, 2, 29, true)]
    #[case(1900, 2, 29, false)]
    #[case(2024, 2, 29, true)]
    #[case(2023, 2, 29, false)]
    #[case(2023, 4, 31, false)]
    #[case(2023, 13, 1, false)]
    #[case(0, 2, 29, true)]
    fn validity(#[case] y: i64, #[case] m: u8, #[case] d: u8, #[case] expected: bool) {
        assert_eq!(is_valid_date(y, m, d), expected);
    }

    #[test]
    fn julian_day_numbers() {
        assert_eq!(julian_day_number(2000, 1, 1), 2_451_545);
        assert_eq!(julian_day_number(1970, 1, 1), 2_440_588);
        assert_eq!(julian_day_number(-4713, 11, 24), 0);
    }

    #[test]
    fn jdn_round_trips_across_eras() {
        for jdn in [-1_000_000, -1, 0, 1_721_060, 2_299_161, 2_451_545, 5_000_000] {
            let (y, m, d) = date_from_julian_day_number(jdn);
            assert!(is_valid_date(y, m, d));
            assert_eq!(julian_day_number(y, m, d), jdn);
        }
    }

    #[rstest]
    #[case(2024, 1, 1, 1)]
    #[case(1970, 1, 1, 4)]
    #[case(2000, 2, 29, 2)]
    #[case(2023, 12, 31, 7)]
    fn weekdays(#[case] y: i64, #[case] m: u8, #[case] d: u8, #[case] expected: u8) {
        assert_eq!(day_of_week(y, m, d), expected);
    }

    #[rstest]
    #[case(2005, 1, 1, 53)]
    #[case(2005, 1, 3, 1)]
    #[case(2008, 12, 29, 1)]
    #[case(2012, 12, 31, 1)]
    #[case(2009, 12, 31, 53)]
    #[case(2024, 3, 15, 11)]
    fn iso_weeks(#[case] y: i64, #[case] m: u8, #[case] d: u8, #[case] expected: i64) {
        assert_eq!(week_number(y, m, d), expected);
    }

    #[test]
    fn week_within_month_uses_first_thursday() {
        // 2024-03-01 is a Friday, so it belongs to week 0
        assert_eq!(week_number_within_month(2024, 3, 1), 0);
        assert_eq!(week_number_within_month(2024, 3, 4), 1);
        // 2024-02-01 is a Thursday
        assert_eq!(week_number_within_month(2024, 2, 1), 1);
    }

    #[rstest]
    #[case((2024, 1, 31), 1, (2024, 2, 29))]
    #[case((2023, 1, 31), 1, (2023, 2, 28))]
    #[case((2024, 3, 31), -1, (2024, 2, 29))]
    #[case((2024, 5, 15), -17, (2022, 12, 15))]
    #[case((1, 1, 1), -1, (0, 12, 1))]
    fn months_clamp_to_month_end(
        #[case] from: (i64, u8, u8),
        #[case] months: i64,
        #[case] expected: (i64, u8, u8),
    ) {
        assert_eq!(add_months(from.0, from.1, from.2, months).unwrap(), expected);
    }

    #[test]
    fn local_micros_split_back() {
        let m = local_micros(2024, 2, 29, 3_600_000_000);
        assert_eq!(split_local_micros(m).unwrap(), ((2024, 2, 29), 3_600_000_000));
        let m = local_micros(2024, 3, 1, 0) - 1;
        assert_eq!(split_local_micros(m).unwrap(), ((2024, 2, 29), MICROS_PER_DAY - 1));
    }

    #[test]
    fn day_within_year_counts_leap_day() {
        assert_eq!(day_within_year(2024, 12, 31), 366);
        assert_eq!(day_within_year(2023, 12, 31), 365);
    }
}
