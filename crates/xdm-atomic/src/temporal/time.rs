use core::cmp::Ordering;
use core::fmt;

use crate::error::{ConversionResult, Error};
use crate::temporal::duration::DurationValue;
use crate::temporal::lexical::{self, Scanner};
use crate::temporal::{MICROS_PER_DAY, MICROS_PER_SECOND, check_timezone, local_micros};

/// Times are placed on this date when compared or subtracted.
const REFERENCE_DATE: (i64, u8, u8) = (1972, 12, 31);

/// `xs:time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeValue {
    micros_of_day: i64,
    tz: Option<i16>,
}

impl TimeValue {
    pub fn new(hour: u8, minute: u8, second: u8, micros: u32, tz: Option<i16>) -> Result<Self, Error> {
        if hour > 23 || minute > 59 || second > 59 || i64::from(micros) >= MICROS_PER_SECOND {
            return Err(crate::error::ValidationError::invalid(format!(
                "invalid xs:time fields {hour}:{minute}:{second}.{micros}"
            ))
            .into());
        }
        check_timezone(tz)?;
        let secs = (i64::from(hour) * 60 + i64::from(minute)) * 60 + i64::from(second);
        Ok(Self {
            micros_of_day: secs * MICROS_PER_SECOND + i64::from(micros),
            tz,
        })
    }

    /// Trusted constructor; the count wraps around midnight.
    pub fn from_micros_of_day(micros: i64, tz: Option<i16>) -> Self {
        Self {
            micros_of_day: micros.rem_euclid(MICROS_PER_DAY),
            tz,
        }
    }

    /// `24:00:00` is accepted and means `00:00:00`.
    pub fn parse(input: &str) -> ConversionResult<Self> {
        let mut s = Scanner::new(input, "xs:time");
        let (hour, minute, second, micros) = s.time_of_day()?;
        let tz = s.timezone()?;
        s.expect_end()?;
        let secs = (i64::from(hour) * 60 + i64::from(minute)) * 60 + i64::from(second);
        Ok(Self::from_micros_of_day(
            secs * MICROS_PER_SECOND + i64::from(micros),
            tz,
        ))
    }

    pub fn micros_of_day(&self) -> i64 {
        self.micros_of_day
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn hour(&self) -> u8 {
        (self.micros_of_day / (3600 * MICROS_PER_SECOND)) as u8
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn minute(&self) -> u8 {
        (self.micros_of_day / (60 * MICROS_PER_SECOND) % 60) as u8
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn second(&self) -> u8 {
        (self.micros_of_day / MICROS_PER_SECOND % 60) as u8
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn microsecond(&self) -> u32 {
        (self.micros_of_day % MICROS_PER_SECOND) as u32
    }

    pub fn timezone(&self) -> Option<i16> {
        self.tz
    }

    pub fn to_instant_micros(&self, implicit_tz: i16) -> i128 {
        let (y, m, d) = REFERENCE_DATE;
        let tz = self.tz.unwrap_or(implicit_tz);
        local_micros(y, m, d, self.micros_of_day)
            - i128::from(tz) * 60 * i128::from(MICROS_PER_SECOND)
    }

    pub fn compare(&self, other: &Self, implicit_tz: i16) -> Ordering {
        self.to_instant_micros(implicit_tz)
            .cmp(&other.to_instant_micros(implicit_tz))
    }

    /// Add the time group of a duration, wrapping around midnight. The month group is
    /// ignored.
    #[must_use]
    pub fn add_duration(&self, d: &DurationValue) -> Self {
        let delta = i64::try_from(d.signed_micros().rem_euclid(i128::from(MICROS_PER_DAY)))
            .unwrap_or(0);
        Self::from_micros_of_day(self.micros_of_day + delta, self.tz)
    }

    #[must_use]
    pub fn subtract_duration(&self, d: &DurationValue) -> Self {
        self.add_duration(&d.negate())
    }

    pub fn subtract(&self, other: &Self, implicit_tz: i16) -> Result<DurationValue, Error> {
        DurationValue::from_micros(
            self.to_instant_micros(implicit_tz) - other.to_instant_micros(implicit_tz),
        )
    }

    pub fn adjust_timezone(&self, tz: Option<i16>) -> Result<Self, Error> {
        check_timezone(tz)?;
        match (self.tz, tz) {
            (Some(from), Some(to)) => Ok(Self::from_micros_of_day(
                self.micros_of_day + i64::from(to - from) * 60 * MICROS_PER_SECOND,
                tz,
            )),
            _ => Ok(Self { tz, ..*self }),
        }
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(20);
        lexical::write_two(&mut out, self.hour());
        out.push(':');
        lexical::write_two(&mut out, self.minute());
        out.push(':');
        lexical::write_seconds(&mut out, self.second(), self.microsecond());
        lexical::write_timezone(&mut out, self.tz);
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::duration::DurationKind;

    fn t(s: &str) -> TimeValue {
        TimeValue::parse(s).unwrap()
    }

    #[test]
    fn parses_and_formats() {
        assert_eq!(t("13:20:00.500-05:00").to_string(), "13:20:00.5-05:00");
        assert_eq!(t("24:00:00").to_string(), "00:00:00");
        assert!(TimeValue::parse("13:20").is_err());
        assert!(TimeValue::parse("13:60:00").is_err());
    }

    #[test]
    fn adding_wraps_around_midnight() {
        let d = DurationValue::parse("PT3H", DurationKind::DayTime).unwrap();
        assert_eq!(t("23:00:00").add_duration(&d).to_string(), "02:00:00");
        assert_eq!(t("01:00:00").subtract_duration(&d).to_string(), "22:00:00");
        let days = DurationValue::parse("P3DT1S", DurationKind::DayTime).unwrap();
        assert_eq!(t("10:00:00").add_duration(&days).to_string(), "10:00:01");
    }

    #[test]
    fn comparison_uses_the_reference_date() {
        assert_eq!(t("12:00:00+01:00").compare(&t("11:00:00Z"), 0), Ordering::Equal);
        assert_eq!(t("00:30:00+01:00").compare(&t("23:00:00Z"), 0), Ordering::Less);
        assert_eq!(t("12:00:00").compare(&t("12:00:00Z"), 60), Ordering::Less);
    }

    #[test]
    fn subtraction_and_adjustment() {
        assert_eq!(
            t("11:12:00Z").subtract(&t("04:00:00-05:00"), 0).unwrap().to_string(),
            "PT2H12M"
        );
        assert_eq!(
            t("10:00:00-05:00").adjust_timezone(Some(600)).unwrap().to_string(),
            "01:00:00+10:00"
        );
    }
}
