//! `xs:date` and the partial Gregorian types.
//!
//! All six kinds share one field layout. Fields a kind does not carry hold reference
//! values (year 1972, a leap year, so that `--02-29` is representable; month 12 for
//! `xs:gDay`; day 1 otherwise), which makes the instant of any value well defined for
//! comparison.

use core::cmp::Ordering;
use core::fmt;

use crate::error::{ConversionResult, Error};
use crate::temporal::date_time::DateTimeValue;
use crate::temporal::duration::DurationValue;
use crate::temporal::lexical::{self, Scanner};
use crate::temporal::{
    MICROS_PER_SECOND, add_months, check_timezone, date_from_julian_day_number,
    day_of_week, day_within_year, is_valid_date, is_valid_year, julian_day_number, local_micros,
    split_local_micros, week_number, week_number_within_month,
};

const REFERENCE_YEAR: i64 = 1972;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GDateKind {
    Date,
    GYearMonth,
    GYear,
    GMonthDay,
    GMonth,
    GDay,
}

impl GDateKind {
    pub fn type_name(self) -> &'static str {
        match self {
            GDateKind::Date => "xs:date",
            GDateKind::GYearMonth => "xs:gYearMonth",
            GDateKind::GYear => "xs:gYear",
            GDateKind::GMonthDay => "xs:gMonthDay",
            GDateKind::GMonth => "xs:gMonth",
            GDateKind::GDay => "xs:gDay",
        }
    }

    fn has_year(self) -> bool {
        matches!(self, GDateKind::Date | GDateKind::GYearMonth | GDateKind::GYear)
    }

    fn has_month(self) -> bool {
        !matches!(self, GDateKind::GYear | GDateKind::GDay)
    }

    fn has_day(self) -> bool {
        matches!(self, GDateKind::Date | GDateKind::GMonthDay | GDateKind::GDay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GDateValue {
    kind: GDateKind,
    year: i64,
    month: u8,
    day: u8,
    tz: Option<i16>,
}

impl GDateValue {
    /// Trusted constructor; fields the kind does not carry are replaced by reference
    /// values.
    pub fn from_parts(kind: GDateKind, year: i64, month: u8, day: u8, tz: Option<i16>) -> Self {
        Self {
            kind,
            year: if kind.has_year() { year } else { REFERENCE_YEAR },
            month: if kind.has_month() {
                month
            } else if kind == GDateKind::GDay {
                12
            } else {
                1
            },
            day: if kind.has_day() { day } else { 1 },
            tz,
        }
    }

    /// Validating constructor for `xs:date`.
    pub fn date(year: i64, month: u8, day: u8, tz: Option<i16>) -> Result<Self, Error> {
        if !is_valid_year(year) {
            return Err(crate::error::ValidationError::invalid(format!(
                "invalid xs:date: year {year} out of range"
            ))
            .into());
        }
        if !is_valid_date(year, month, day) {
            return Err(crate::error::ValidationError::invalid(format!(
                "invalid xs:date fields {year}-{month}-{day}"
            ))
            .into());
        }
        check_timezone(tz)?;
        Ok(Self::from_parts(GDateKind::Date, year, month, day, tz))
    }

    /// `xs:date` of a Julian day number.
    pub fn date_from_julian_day_number(jdn: i64, tz: Option<i16>) -> Self {
        let (y, m, d) = date_from_julian_day_number(jdn);
        Self::from_parts(GDateKind::Date, y, m, d, tz)
    }

    pub fn parse(input: &str, kind: GDateKind) -> ConversionResult<Self> {
        let mut s = Scanner::new(input, kind.type_name());
        let (mut year, mut month, mut day) = (REFERENCE_YEAR, 1, 1);
        match kind {
            GDateKind::Date | GDateKind::GYearMonth | GDateKind::GYear => {
                year = s.year()?;
                if kind != GDateKind::GYear {
                    s.expect(b'-')?;
                    month = s.two_digits("month")?;
                }
                if kind == GDateKind::Date {
                    s.expect(b'-')?;
                    day = s.two_digits("day")?;
                }
            }
            GDateKind::GMonthDay | GDateKind::GMonth => {
                s.expect(b'-')?;
                s.expect(b'-')?;
                month = s.two_digits("month")?;
                if kind == GDateKind::GMonthDay {
                    s.expect(b'-')?;
                    day = s.two_digits("day")?;
                }
            }
            GDateKind::GDay => {
                for _ in 0..3 {
                    s.expect(b'-')?;
                }
                month = 12;
                day = s.two_digits("day")?;
            }
        }
        let tz = s.timezone()?;
        s.expect_end()?;
        if !is_valid_date(year, month, day) {
            return Err(s.error("no such date"));
        }
        Ok(Self::from_parts(kind, year, month, day, tz))
    }

    pub fn kind(&self) -> GDateKind {
        self.kind
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn timezone(&self) -> Option<i16> {
        self.tz
    }

    pub fn has_year(&self) -> bool {
        self.kind.has_year()
    }

    pub fn has_month(&self) -> bool {
        self.kind.has_month()
    }

    pub fn has_day(&self) -> bool {
        self.kind.has_day()
    }

    /// Keep only the fields `kind` carries.
    #[must_use]
    pub fn project(&self, kind: GDateKind) -> Self {
        Self::from_parts(kind, self.year, self.month, self.day, self.tz)
    }

    fn require_date(&self, op: &str) -> Result<(), Error> {
        if self.kind == GDateKind::Date {
            Ok(())
        } else {
            Err(Error::type_error(format!("{op} is not defined for {}", self.kind.type_name())))
        }
    }

    pub fn julian_day_number(&self) -> i64 {
        julian_day_number(self.year, self.month, self.day)
    }

    pub fn tomorrow(&self) -> Result<Self, Error> {
        self.require_date("tomorrow")?;
        Ok(Self::date_from_julian_day_number(self.julian_day_number() + 1, self.tz))
    }

    pub fn yesterday(&self) -> Result<Self, Error> {
        self.require_date("yesterday")?;
        Ok(Self::date_from_julian_day_number(self.julian_day_number() - 1, self.tz))
    }

    /// Monday = 1 .. Sunday = 7.
    pub fn day_of_week(&self) -> u8 {
        day_of_week(self.year, self.month, self.day)
    }

    pub fn day_within_year(&self) -> i64 {
        day_within_year(self.year, self.month, self.day)
    }

    pub fn week_number(&self) -> i64 {
        week_number(self.year, self.month, self.day)
    }

    pub fn week_number_within_month(&self) -> i64 {
        week_number_within_month(self.year, self.month, self.day)
    }

    /// Midnight at the start of the value, as an `xs:dateTime`.
    pub fn to_date_time(&self) -> DateTimeValue {
        DateTimeValue::from_date_and_micros((self.year, self.month, self.day), 0, self.tz)
    }

    pub fn to_instant_micros(&self, implicit_tz: i16) -> i128 {
        self.to_date_time().to_instant_micros(implicit_tz)
    }

    pub fn compare(&self, other: &Self, implicit_tz: i16) -> Ordering {
        self.to_instant_micros(implicit_tz)
            .cmp(&other.to_instant_micros(implicit_tz))
    }

    /// Add a duration to an `xs:date`: months first (clamping the day), then the time
    /// group, counted from midnight.
    pub fn add_duration(&self, d: &DurationValue) -> Result<Self, Error> {
        self.require_date("duration arithmetic")?;
        let (y, m, day) = add_months(self.year, self.month, self.day, d.signed_months())?;
        let local = local_micros(y, m, day, 0) + d.signed_micros();
        let (date, _) = split_local_micros(local)?;
        Ok(Self::from_parts(GDateKind::Date, date.0, date.1, date.2, self.tz))
    }

    pub fn subtract_duration(&self, d: &DurationValue) -> Result<Self, Error> {
        self.add_duration(&d.negate())
    }

    /// Difference of two dates as an `xs:dayTimeDuration`.
    pub fn subtract(&self, other: &Self, implicit_tz: i16) -> Result<DurationValue, Error> {
        self.require_date("subtraction")?;
        other.require_date("subtraction")?;
        DurationValue::from_micros(
            self.to_instant_micros(implicit_tz) - other.to_instant_micros(implicit_tz),
        )
    }

    /// Adjust to `tz`, or strip the timezone; the date is taken at midnight.
    pub fn adjust_timezone(&self, tz: Option<i16>) -> Result<Self, Error> {
        self.require_date("timezone adjustment")?;
        let dt = self.to_date_time().adjust_timezone(tz)?;
        Ok(dt.date())
    }

    /// Timezone offset as microseconds, for the timezone component.
    pub fn timezone_micros(&self) -> Option<i128> {
        self.tz
            .map(|t| i128::from(t) * 60 * i128::from(MICROS_PER_SECOND))
    }
}

impl fmt::Display for GDateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(16);
        match self.kind {
            GDateKind::Date | GDateKind::GYearMonth | GDateKind::GYear => {
                lexical::write_year(&mut out, self.year);
                if self.kind != GDateKind::GYear {
                    out.push('-');
                    lexical::write_two(&mut out, self.month);
                }
                if self.kind == GDateKind::Date {
                    out.push('-');
                    lexical::write_two(&mut out, self.day);
                }
            }
            GDateKind::GMonthDay | GDateKind::GMonth => {
                out.push_str("--");
                lexical::write_two(&mut out, self.month);
                if self.kind == GDateKind::GMonthDay {
                    out.push('-');
                    lexical::write_two(&mut out, self.day);
                }
            }
            GDateKind::GDay => {
                out.push_str("---");
                lexical::write_two(&mut out, self.day);
            }
        }
        lexical::write_timezone(&mut out, self.tz);
        f.write_str(&out)
    }
}
