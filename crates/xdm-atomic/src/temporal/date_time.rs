use core::cmp::Ordering;
use core::fmt;

use crate::error::{ConversionResult, Error};
use crate::temporal::duration::DurationValue;
use crate::temporal::gdate::{GDateKind, GDateValue};
use crate::temporal::lexical::{self, Scanner};
use crate::temporal::time::TimeValue;
use crate::temporal::{
    MICROS_PER_DAY, MICROS_PER_SECOND, add_months, check_timezone, is_valid_date, is_valid_year,
    local_micros, split_local_micros,
};

/// `xs:dateTime`. Calendar fields are local time in the value's own timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTimeValue {
    year: i64,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micros: u32,
    tz: Option<i16>,
}

impl DateTimeValue {
    /// Validating constructor; `year` uses internal numbering.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: i64,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        micros: u32,
        tz: Option<i16>,
    ) -> Result<Self, Error> {
        if !is_valid_year(year) {
            return Err(crate::error::ValidationError::invalid(format!(
                "invalid xs:dateTime: year {year} out of range"
            ))
            .into());
        }
        if !is_valid_date(year, month, day)
            || hour > 23
            || minute > 59
            || second > 59
            || i64::from(micros) >= MICROS_PER_SECOND
        {
            return Err(crate::error::ValidationError::invalid(format!(
                "invalid xs:dateTime fields {year}-{month}-{day} {hour}:{minute}:{second}.{micros}"
            ))
            .into());
        }
        check_timezone(tz)?;
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            micros,
            tz,
        })
    }

    /// Trusted constructor from a date and the microseconds elapsed within that day.
    pub fn from_date_and_micros(date: (i64, u8, u8), micros_of_day: i64, tz: Option<i16>) -> Self {
        let within = micros_of_day.rem_euclid(MICROS_PER_DAY);
        let secs = within / MICROS_PER_SECOND;
        Self {
            year: date.0,
            month: date.1,
            day: date.2,
            hour: u8::try_from(secs / 3600).unwrap_or(0),
            minute: u8::try_from(secs / 60 % 60).unwrap_or(0),
            second: u8::try_from(secs % 60).unwrap_or(0),
            micros: u32::try_from(within % MICROS_PER_SECOND).unwrap_or(0),
            tz,
        }
    }

    /// Trusted constructor from a Julian day number.
    pub fn from_julian_day_number(jdn: i64, micros_of_day: i64, tz: Option<i16>) -> Self {
        Self::from_date_and_micros(crate::temporal::date_from_julian_day_number(jdn), micros_of_day, tz)
    }

    pub fn parse(input: &str) -> ConversionResult<Self> {
        let mut s = Scanner::new(input, "xs:dateTime");
        let year = s.year()?;
        s.expect(b'-')?;
        let month = s.two_digits("month")?;
        s.expect(b'-')?;
        let day = s.two_digits("day")?;
        s.expect(b'T')?;
        let (hour, minute, second, micros) = s.time_of_day()?;
        let tz = s.timezone()?;
        s.expect_end()?;
        if !is_valid_date(year, month, day) {
            return Err(s.error("no such date"));
        }
        if hour == 24 {
            let next = local_micros(year, month, day, MICROS_PER_DAY);
            let (date, _) = split_local_micros(next).map_err(|_| s.error("year out of range"))?;
            return Ok(Self::from_date_and_micros(date, 0, tz));
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            micros,
            tz,
        })
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

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn microsecond(&self) -> u32 {
        self.micros
    }

    pub fn timezone(&self) -> Option<i16> {
        self.tz
    }

    pub fn micros_of_day(&self) -> i64 {
        ((i64::from(self.hour) * 60 + i64::from(self.minute)) * 60 + i64::from(self.second))
            * MICROS_PER_SECOND
            + i64::from(self.micros)
    }

    pub fn julian_day_number(&self) -> i64 {
        crate::temporal::julian_day_number(self.year, self.month, self.day)
    }

    fn local(&self) -> i128 {
        local_micros(self.year, self.month, self.day, self.micros_of_day())
    }

    /// UTC instant in microseconds; timezone-less values are taken to be in
    /// `implicit_tz`.
    pub fn to_instant_micros(&self, implicit_tz: i16) -> i128 {
        let tz = self.tz.unwrap_or(implicit_tz);
        self.local() - i128::from(tz) * 60 * i128::from(MICROS_PER_SECOND)
    }

    fn from_local(local: i128, tz: Option<i16>) -> Result<Self, Error> {
        let (date, within) = split_local_micros(local)?;
        Ok(Self::from_date_and_micros(date, within, tz))
    }

    /// Adjust to `tz`, or strip the timezone when `tz` is `None`. A value without a
    /// timezone takes `tz` unchanged in local time.
    pub fn adjust_timezone(&self, tz: Option<i16>) -> Result<Self, Error> {
        check_timezone(tz)?;
        match (self.tz, tz) {
            (None, _) | (Some(_), None) => Ok(Self { tz, ..*self }),
            (Some(from), Some(to)) => {
                let shift = i128::from(to - from) * 60 * i128::from(MICROS_PER_SECOND);
                Self::from_local(self.local() + shift, tz)
            }
        }
    }

    /// Add a duration: the month group first (clamping the day), then the time group.
    pub fn add_duration(&self, d: &DurationValue) -> Result<Self, Error> {
        let (year, month, day) = add_months(self.year, self.month, self.day, d.signed_months())?;
        let local = local_micros(year, month, day, self.micros_of_day()) + d.signed_micros();
        Self::from_local(local, self.tz)
    }

    pub fn subtract_duration(&self, d: &DurationValue) -> Result<Self, Error> {
        self.add_duration(&d.negate())
    }

    /// Difference of two instants as an `xs:dayTimeDuration`.
    pub fn subtract(&self, other: &Self, implicit_tz: i16) -> Result<DurationValue, Error> {
        DurationValue::from_micros(
            self.to_instant_micros(implicit_tz) - other.to_instant_micros(implicit_tz),
        )
    }

    pub fn compare(&self, other: &Self, implicit_tz: i16) -> Ordering {
        self.to_instant_micros(implicit_tz)
            .cmp(&other.to_instant_micros(implicit_tz))
    }

    /// Date part in the value's own timezone.
    pub fn date(&self) -> GDateValue {
        GDateValue::from_parts(GDateKind::Date, self.year, self.month, self.day, self.tz)
    }

    /// Calendar part projected onto a Gregorian kind (`xs:gYear`, ...).
    pub fn gdate(&self, kind: GDateKind) -> GDateValue {
        self.date().project(kind)
    }

    pub fn time(&self) -> TimeValue {
        TimeValue::from_micros_of_day(self.micros_of_day(), self.tz)
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        lexical::write_year(out, self.year);
        out.push('-');
        lexical::write_two(out, self.month);
        out.push('-');
        lexical::write_two(out, self.day);
        out.push('T');
        lexical::write_two(out, self.hour);
        out.push(':');
        lexical::write_two(out, self.minute);
        out.push(':');
        lexical::write_seconds(out, self.second, self.micros);
        lexical::write_timezone(out, self.tz);
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(32);
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::temporal::duration::DurationKind;
    use rstest::rstest;

    fn dt(s: &str) -> DateTimeValue {
        DateTimeValue::parse(s).unwrap()
    }

    #[rstest]
    #[case("2024-03-01T10:00:00+05:30")]
    #[case("2024-02-29T23:59:59.999999Z")]
    #[case("-0001-12-31T00:00:00")]
    #[case("12345-01-01T00:00:00.5-14:00")]
    fn round_trips(#[case] input: &str) {
        assert_eq!(dt(input).to_string(), input);
    }

    #[rstest]
    #[case("2023-02-29T00:00:00")]
    #[case("2024-01-01T25:00:00")]
    #[case("2024-01-01T24:00:01")]
    #[case("2024-1-01T00:00:00")]
    #[case("2024-01-01")]
    #[case("2024-01-01T00:00:00+14:30")]
    #[case("0000-01-01T00:00:00")]
    fn rejects(#[case] input: &str) {
        let e = DateTimeValue::parse(input).unwrap_err();
        assert_eq!(e.code, ErrorCode::FORG0001, "{input}");
    }

    #[test]
    fn midnight_24_rolls_over() {
        assert_eq!(dt("2023-12-31T24:00:00Z").to_string(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn adjusting_the_timezone() {
        let v = dt("2024-03-01T10:00:00+05:30");
        assert_eq!(v.adjust_timezone(Some(0)).unwrap().to_string(), "2024-03-01T04:30:00Z");
        assert_eq!(v.adjust_timezone(None).unwrap().to_string(), "2024-03-01T10:00:00");
        let local = dt("2024-03-01T10:00:00");
        assert_eq!(
            local.adjust_timezone(Some(-600)).unwrap().to_string(),
            "2024-03-01T10:00:00-10:00"
        );
        assert_eq!(v.adjust_timezone(Some(900)).unwrap_err().code, ErrorCode::FODT0003);
    }

    #[test]
    fn instants_compare_across_timezones() {
        let a = dt("2024-03-01T10:00:00+01:00");
        let b = dt("2024-03-01T09:00:00Z");
        assert_eq!(a.compare(&b, 0), Ordering::Equal);
        let local = dt("2024-03-01T10:00:00");
        assert_eq!(local.compare(&b, 60), Ordering::Equal);
        assert_eq!(local.compare(&b, 0), Ordering::Greater);
    }

    #[test]
    fn adding_durations() {
        let v = dt("2024-01-31T12:00:00Z");
        let p1m = DurationValue::from_months(1).unwrap();
        assert_eq!(v.add_duration(&p1m).unwrap().to_string(), "2024-02-29T12:00:00Z");
        let p13h = DurationValue::parse("PT13H", DurationKind::DayTime).unwrap();
        assert_eq!(v.add_duration(&p13h).unwrap().to_string(), "2024-02-01T01:00:00Z");
        assert_eq!(v.subtract_duration(&p13h).unwrap().to_string(), "2024-01-30T23:00:00Z");
        let mixed = DurationValue::parse("P1MT1S", DurationKind::Duration).unwrap();
        assert_eq!(v.add_duration(&mixed).unwrap().to_string(), "2024-02-29T12:00:01Z");
    }

    #[test]
    fn subtracting_instants() {
        let a = dt("2024-03-01T00:00:00Z");
        let b = dt("2024-02-28T12:00:00Z");
        assert_eq!(a.subtract(&b, 0).unwrap().to_string(), "P1DT12H");
        assert_eq!(b.subtract(&a, 0).unwrap().to_string(), "-P1DT12H");
    }

    #[test]
    fn year_zero_boundary() {
        let v = dt("0001-01-01T00:00:00Z");
        let back = v
            .subtract_duration(&DurationValue::parse("PT1S", DurationKind::DayTime).unwrap())
            .unwrap();
        assert_eq!(back.to_string(), "-0001-12-31T23:59:59Z");
        assert_eq!(back.year(), 0);
    }

    #[test]
    fn parts() {
        let v = dt("2024-03-01T10:20:30.25+01:00");
        assert_eq!(v.date().to_string(), "2024-03-01+01:00");
        assert_eq!(v.time().to_string(), "10:20:30.25+01:00");
        assert_eq!(v.gdate(GDateKind::GYearMonth).to_string(), "2024-03+01:00");
    }
}
