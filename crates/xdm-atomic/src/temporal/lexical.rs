//! Hand-rolled scanner for the ISO 8601 profile used by XML Schema, plus the matching
//! formatting helpers.
//!
//! Fields are fixed width (two digits for month, day, hour, minute, second); years have
//! at least four digits and may only be longer without a leading zero. Lexical years
//! have no year zero, so the scanner converts negative years to the internal numbering
//! (`-0001` becomes 0).

use crate::error::{ConversionResult, ValidationError};
use crate::temporal::{MAX_TIMEZONE, MAX_YEAR, MICROS_PER_SECOND};

pub struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    type_name: &'static str,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str, type_name: &'static str) -> Self {
        let trimmed = crate::value::string::trim_xml_whitespace(input);
        Self {
            input: trimmed,
            bytes: trimmed.as_bytes(),
            pos: 0,
            type_name,
        }
    }

    pub fn error(&self, msg: &str) -> ValidationError {
        ValidationError::invalid(format!(
            "invalid {} value '{}': {msg}",
            self.type_name, self.input
        ))
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, b: u8) -> ConversionResult<()> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", char::from(b))))
        }
    }

    pub fn expect_end(&self) -> ConversionResult<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing characters"))
        }
    }

    fn digit_run(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Exactly two digits.
    pub fn two_digits(&mut self, field: &str) -> ConversionResult<u8> {
        match (self.bytes.get(self.pos), self.bytes.get(self.pos + 1)) {
            (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                self.pos += 2;
                Ok((a - b'0') * 10 + (b - b'0'))
            }
            _ => Err(self.error(&format!("{field} must have two digits"))),
        }
    }

    /// Optionally signed year in lexical numbering, returned in internal numbering.
    pub fn year(&mut self) -> ConversionResult<i64> {
        let negative = self.eat(b'-');
        let digits = self.digit_run();
        if digits.len() < 4 {
            return Err(self.error("year must have at least four digits"));
        }
        if digits.len() > 4 && digits.starts_with('0') {
            return Err(self.error("year with more than four digits must not start with zero"));
        }
        let value = digits
            .parse::<i64>()
            .ok()
            .filter(|v| *v <= MAX_YEAR)
            .ok_or_else(|| self.error("year out of range"))?;
        if value == 0 {
            return Err(self.error("year zero is not allowed"));
        }
        Ok(if negative { 1 - value } else { value })
    }

    /// Optional `.fraction`, truncated to microseconds.
    pub fn fraction_micros(&mut self) -> ConversionResult<u32> {
        if !self.eat(b'.') {
            return Ok(0);
        }
        let digits = self.digit_run();
        if digits.is_empty() {
            return Err(self.error("fractional seconds need at least one digit"));
        }
        let mut micros = 0u32;
        for (i, b) in digits.bytes().take(6).enumerate() {
            micros += u32::from(b - b'0') * 10u32.pow(5 - u32::try_from(i).unwrap_or(5));
        }
        Ok(micros)
    }

    /// Optional timezone: `Z` or `(+|-)hh:mm` with `hh <= 14`.
    pub fn timezone(&mut self) -> ConversionResult<Option<i16>> {
        if self.eat(b'Z') {
            return Ok(Some(0));
        }
        let sign = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(None),
        };
        self.pos += 1;
        let hours = self.two_digits("timezone hour")?;
        self.expect(b':')?;
        let minutes = self.two_digits("timezone minute")?;
        if minutes > 59 {
            return Err(self.error("timezone minutes out of range"));
        }
        let total = i16::from(hours) * 60 + i16::from(minutes);
        if total > MAX_TIMEZONE {
            return Err(self.error("timezone out of range"));
        }
        Ok(Some(sign * total))
    }

    /// `hh:mm:ss(.fff)?`; `24:00:00` is returned as hour 24 for the caller to roll over.
    pub fn time_of_day(&mut self) -> ConversionResult<(u8, u8, u8, u32)> {
        let hour = self.two_digits("hour")?;
        self.expect(b':')?;
        let minute = self.two_digits("minute")?;
        self.expect(b':')?;
        let second = self.two_digits("second")?;
        let micros = self.fraction_micros()?;
        if minute > 59 || second > 59 {
            return Err(self.error("time field out of range"));
        }
        if hour > 24 || (hour == 24 && (minute, second, micros) != (0, 0, 0)) {
            return Err(self.error("hour out of range"));
        }
        Ok((hour, minute, second, micros))
    }
}

/// Write a year in lexical numbering, at least four digits.
pub fn write_year(out: &mut String, internal_year: i64) {
    let lexical = if internal_year <= 0 {
        internal_year - 1
    } else {
        internal_year
    };
    if lexical < 0 {
        out.push('-');
    }
    out.push_str(&format!("{:04}", lexical.unsigned_abs()));
}

pub fn write_two(out: &mut String, v: u8) {
    out.push_str(&format!("{v:02}"));
}

/// Seconds with the fraction, trailing zeros removed.
pub fn write_seconds(out: &mut String, second: u8, micros: u32) {
    write_two(out, second);
    if micros > 0 {
        let frac = format!("{micros:06}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
}

pub fn write_timezone(out: &mut String, tz: Option<i16>) {
    match tz {
        None => {}
        Some(0) => out.push('Z'),
        Some(m) => {
            out.push(if m < 0 { '-' } else { '+' });
            let abs = m.unsigned_abs();
            out.push_str(&format!("{:02}:{:02}", abs / 60, abs % 60));
        }
    }
}

/// Seconds and microseconds as a decimal string (`5`, `5.25`).
pub fn seconds_decimal(total_micros: i128) -> String {
    let whole = total_micros / i128::from(MICROS_PER_SECOND);
    let frac = (total_micros % i128::from(MICROS_PER_SECOND)).unsigned_abs();
    if frac == 0 {
        format!("{whole}")
    } else {
        let sign = if total_micros < 0 && whole == 0 { "-" } else { "" };
        let f = format!("{frac:06}");
        format!("{sign}{whole}.{}", f.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024", 2024)]
    #[case("-0001", 0)]
    #[case("-0044", -43)]
    #[case("12345", 12345)]
    fn years_shift_to_internal_numbering(#[case] input: &str, #[case] expected: i64) {
        let mut s = Scanner::new(input, "xs:gYear");
        assert_eq!(s.year().unwrap(), expected);
        let mut out = String::new();
        write_year(&mut out, expected);
        assert_eq!(out, input);
    }

    #[rstest]
    #[case("0000")]
    #[case("024")]
    #[case("02024")]
    #[case("+2024")]
    fn invalid_years(#[case] input: &str) {
        assert!(Scanner::new(input, "xs:gYear").year().is_err());
    }

    #[rstest]
    #[case("Z", Some(0))]
    #[case("+05:30", Some(330))]
    #[case("-14:00", Some(-840))]
    #[case("", None)]
    fn timezones(#[case] input: &str, #[case] expected: Option<i16>) {
        assert_eq!(Scanner::new(input, "tz").timezone().unwrap(), expected);
        let mut out = String::new();
        write_timezone(&mut out, expected);
        assert_eq!(out, input);
    }

    #[rstest]
    #[case("+14:01")]
    #[case("+15:00")]
    #[case("+5:00")]
    #[case("+05:60")]
    fn invalid_timezones(#[case] input: &str) {
        assert!(Scanner::new(input, "tz").timezone().is_err());
    }

    #[test]
    fn fractions_truncate_to_microseconds() {
        let mut s = Scanner::new(".1234567", "t");
        assert_eq!(s.fraction_micros().unwrap(), 123_456);
        let mut out = String::new();
        write_seconds(&mut out, 5, 120_000);
        assert_eq!(out, "05.12");
    }

    #[test]
    fn seconds_as_decimal() {
        assert_eq!(seconds_decimal(5_250_000), "5.25");
        assert_eq!(seconds_decimal(-500_000), "-0.5");
        assert_eq!(seconds_decimal(3_000_000), "3");
    }
}
