//! `xs:duration`, `xs:dayTimeDuration` and `xs:yearMonthDuration`.
//!
//! A duration is held normalized as a sign plus two magnitudes: total months and total
//! microseconds. The two groups never mix; the six components are derived from them.
//! A zero duration is never negative.

use core::cmp::Ordering;
use core::fmt;

use num_bigint::BigInt;

use crate::compare::ValueOrdering;
use crate::error::{ConversionResult, Error, ErrorCode, ValidationError};
use crate::temporal::lexical::seconds_decimal;
use crate::temporal::{MICROS_PER_DAY, MICROS_PER_SECOND};
use crate::value::decimal::DecimalValue;
use crate::value::float::round_double;
use crate::value::string::trim_xml_whitespace;

const MICROS_PER_MINUTE: i128 = 60 * MICROS_PER_SECOND as i128;
const MICROS_PER_HOUR: i128 = 60 * MICROS_PER_MINUTE;

/// Largest magnitude of the month group.
const MAX_MONTHS: i64 = i32::MAX as i64 * 12;
/// Largest magnitude of the time group: `i64::MAX` seconds.
const MAX_MICROS: i128 = i64::MAX as i128 * MICROS_PER_SECOND as i128;

/// Fewest days covered by `n` months, `n < 12`.
const SHORTEST_MONTHS: [i64; 12] = [0, 28, 59, 89, 120, 150, 181, 212, 242, 273, 303, 334];
/// Most days covered by `n` months, `n < 12`.
const LONGEST_MONTHS: [i64; 12] = [0, 31, 62, 92, 123, 153, 184, 215, 245, 276, 306, 337];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationKind {
    Duration,
    DayTime,
    YearMonth,
}

impl DurationKind {
    pub fn type_name(self) -> &'static str {
        match self {
            DurationKind::Duration => "xs:duration",
            DurationKind::DayTime => "xs:dayTimeDuration",
            DurationKind::YearMonth => "xs:yearMonthDuration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DurationValue {
    kind: DurationKind,
    negative: bool,
    months: i64,
    micros: i128,
}

fn overflow(kind: DurationKind) -> Error {
    Error::from_code(
        ErrorCode::FODT0002,
        format!("{} value out of range", kind.type_name()),
    )
}

impl DurationValue {
    fn normalized(kind: DurationKind, negative: bool, months: i64, micros: i128) -> Result<Self, Error> {
        if months > MAX_MONTHS || micros > MAX_MICROS {
            return Err(overflow(kind));
        }
        let (months, micros) = match kind {
            DurationKind::Duration => (months, micros),
            DurationKind::DayTime => (0, micros),
            DurationKind::YearMonth => (months, 0),
        };
        Ok(Self {
            kind,
            negative: negative && (months != 0 || micros != 0),
            months,
            micros,
        })
    }

    /// Build an `xs:duration` from components. All components are magnitudes; the sign
    /// applies to the whole value.
    #[allow(clippy::too_many_arguments)]
    pub fn from_components(
        negative: bool,
        years: u64,
        months: u64,
        days: u64,
        hours: u64,
        minutes: u64,
        seconds: u64,
        microseconds: u64,
    ) -> Result<Self, Error> {
        let err = || overflow(DurationKind::Duration);
        let total_months = i64::try_from(years)
            .ok()
            .and_then(|y| y.checked_mul(12))
            .and_then(|y| y.checked_add(i64::try_from(months).ok()?))
            .ok_or_else(err)?;
        let total_micros = i128::from(days) * i128::from(MICROS_PER_DAY)
            + i128::from(hours) * MICROS_PER_HOUR
            + i128::from(minutes) * MICROS_PER_MINUTE
            + i128::from(seconds) * i128::from(MICROS_PER_SECOND)
            + i128::from(microseconds);
        Self::normalized(DurationKind::Duration, negative, total_months, total_micros)
    }

    /// `xs:yearMonthDuration` of a signed month count.
    pub fn from_months(months: i64) -> Result<Self, Error> {
        Self::normalized(
            DurationKind::YearMonth,
            months < 0,
            months.checked_abs().ok_or_else(|| overflow(DurationKind::YearMonth))?,
            0,
        )
    }

    /// `xs:dayTimeDuration` of a signed microsecond count.
    pub fn from_micros(micros: i128) -> Result<Self, Error> {
        Self::normalized(
            DurationKind::DayTime,
            micros < 0,
            0,
            micros.checked_abs().ok_or_else(|| overflow(DurationKind::DayTime))?,
        )
    }

    pub fn zero(kind: DurationKind) -> Self {
        Self {
            kind,
            negative: false,
            months: 0,
            micros: 0,
        }
    }

    /// Parse `-?PnYnMnDTnHnMnS`. Day-time durations admit no year or month part,
    /// year-month durations no day or time part.
    pub fn parse(lexical: &str, kind: DurationKind) -> ConversionResult<Self> {
        let s = trim_xml_whitespace(lexical);
        let invalid = |why: &str| {
            ValidationError::invalid(format!("invalid {} value '{lexical}': {why}", kind.type_name()))
        };
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let body = body.strip_prefix('P').ok_or_else(|| invalid("must start with 'P'"))?;
        let (date_part, time_part) = match body.split_once('T') {
            Some((d, t)) => {
                if t.is_empty() {
                    return Err(invalid("'T' must be followed by a time component"));
                }
                (d, Some(t))
            }
            None => (body, None),
        };

        let out_of_range = || {
            ValidationError::new(
                ErrorCode::FODT0002,
                format!("{} value '{lexical}' out of range", kind.type_name()),
            )
        };
        let mut months: i128 = 0;
        let mut micros: i128 = 0;
        let mut seen_any = false;

        let mut order = 0;
        for (number, designator) in components(date_part).map_err(|()| invalid("malformed component"))? {
            let rank = match designator {
                'Y' if kind != DurationKind::DayTime => 0,
                'M' if kind != DurationKind::DayTime => 1,
                'D' if kind != DurationKind::YearMonth => 2,
                _ => return Err(invalid(&format!("unexpected designator '{designator}'"))),
            };
            if rank < order {
                return Err(invalid("components out of order"));
            }
            order = rank + 1;
            let (whole, frac) = number;
            if frac.is_some() {
                return Err(invalid("only seconds may have a fraction"));
            }
            seen_any = true;
            let whole = whole.ok_or_else(out_of_range)?;
            let step = match designator {
                'Y' => whole.checked_mul(12),
                'M' => Some(whole),
                _ => whole.checked_mul(i128::from(MICROS_PER_DAY)),
            }
            .ok_or_else(out_of_range)?;
            if designator == 'D' {
                micros = micros.checked_add(step).ok_or_else(out_of_range)?;
            } else {
                months = months.checked_add(step).ok_or_else(out_of_range)?;
            }
        }

        if let Some(t) = time_part {
            if kind == DurationKind::YearMonth {
                return Err(invalid("no time part allowed"));
            }
            let mut order = 0;
            let parts = components(t).map_err(|()| invalid("malformed component"))?;
            if parts.is_empty() {
                return Err(invalid("'T' must be followed by a time component"));
            }
            for ((whole, frac), designator) in parts {
                let (rank, unit) = match designator {
                    'H' => (0, MICROS_PER_HOUR),
                    'M' => (1, MICROS_PER_MINUTE),
                    'S' => (2, i128::from(MICROS_PER_SECOND)),
                    _ => return Err(invalid(&format!("unexpected designator '{designator}'"))),
                };
                if rank < order {
                    return Err(invalid("components out of order"));
                }
                order = rank + 1;
                if frac.is_some() && designator != 'S' {
                    return Err(invalid("only seconds may have a fraction"));
                }
                seen_any = true;
                micros = whole
                    .and_then(|w| w.checked_mul(unit))
                    .and_then(|us| us.checked_add(i128::from(frac.unwrap_or(0))))
                    .and_then(|us| micros.checked_add(us))
                    .ok_or_else(out_of_range)?;
            }
        }

        if !seen_any {
            return Err(invalid("at least one component is required"));
        }
        let months = i64::try_from(months).ok().filter(|m| *m <= MAX_MONTHS);
        match months {
            Some(m) if micros <= MAX_MICROS => Self::normalized(kind, negative, m, micros)
                .map_err(|e| ValidationError::new(e.code, e.message)),
            _ => Err(out_of_range()),
        }
    }

    pub fn kind(&self) -> DurationKind {
        self.kind
    }

    /// Relabel as another duration kind, dropping the group the target cannot hold.
    #[must_use]
    pub fn to_kind(&self, kind: DurationKind) -> Self {
        let (months, micros) = match kind {
            DurationKind::Duration => (self.months, self.micros),
            DurationKind::DayTime => (0, self.micros),
            DurationKind::YearMonth => (self.months, 0),
        };
        Self {
            kind,
            negative: self.negative && (months != 0 || micros != 0),
            months,
            micros,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.micros == 0
    }

    pub fn signed_months(&self) -> i64 {
        if self.negative { -self.months } else { self.months }
    }

    pub fn signed_micros(&self) -> i128 {
        if self.negative { -self.micros } else { self.micros }
    }

    pub fn years(&self) -> i64 {
        self.months / 12
    }

    pub fn months(&self) -> i64 {
        self.months % 12
    }

    pub fn days(&self) -> i128 {
        self.micros / i128::from(MICROS_PER_DAY)
    }

    pub fn hours(&self) -> i128 {
        (self.micros % i128::from(MICROS_PER_DAY)) / MICROS_PER_HOUR
    }

    pub fn minutes(&self) -> i128 {
        (self.micros % MICROS_PER_HOUR) / MICROS_PER_MINUTE
    }

    pub fn seconds(&self) -> i128 {
        (self.micros % MICROS_PER_MINUTE) / i128::from(MICROS_PER_SECOND)
    }

    pub fn microseconds(&self) -> i128 {
        self.micros % i128::from(MICROS_PER_SECOND)
    }

    /// Seconds including the fraction, signed, as a decimal.
    pub fn seconds_with_fraction(&self) -> DecimalValue {
        let within_minute = self.micros % MICROS_PER_MINUTE;
        let signed = if self.negative { -within_minute } else { within_minute };
        DecimalValue::new(BigInt::from(signed), 6)
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            negative: !self.negative && !self.is_zero(),
            ..self.clone()
        }
    }

    fn same_subtype(&self, other: &Self, op: &str) -> Result<DurationKind, Error> {
        match (self.kind, other.kind) {
            (DurationKind::DayTime, DurationKind::DayTime) => Ok(DurationKind::DayTime),
            (DurationKind::YearMonth, DurationKind::YearMonth) => Ok(DurationKind::YearMonth),
            (a, b) => Err(Error::type_error(format!(
                "cannot {op} {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }

    fn from_signed(kind: DurationKind, months: i128, micros: i128) -> Result<Self, Error> {
        let negative = months < 0 || micros < 0;
        let months = i64::try_from(months.unsigned_abs()).map_err(|_| overflow(kind))?;
        let micros = i128::try_from(micros.unsigned_abs()).map_err(|_| overflow(kind))?;
        Self::normalized(kind, negative, months, micros)
    }

    pub fn add(&self, other: &Self) -> Result<Self, Error> {
        let kind = self.same_subtype(other, "add")?;
        let months = i128::from(self.signed_months()) + i128::from(other.signed_months());
        let micros = self
            .signed_micros()
            .checked_add(other.signed_micros())
            .ok_or_else(|| overflow(kind))?;
        Self::from_signed(kind, months, micros)
    }

    pub fn subtract(&self, other: &Self) -> Result<Self, Error> {
        self.add(&other.negate()).map_err(|e| {
            if e.is_type_error {
                Error::type_error(format!(
                    "cannot subtract {} from {}",
                    other.kind.type_name(),
                    self.kind.type_name()
                ))
            } else {
                e
            }
        })
    }

    /// Apply `op` to the month or microsecond count and round to the nearest unit.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn scale(&self, verb: &str, op: impl Fn(f64) -> f64) -> Result<Self, Error> {
        if self.kind == DurationKind::Duration {
            return Err(Error::type_error(format!("cannot {verb} an xs:duration")));
        }
        if self.kind == DurationKind::YearMonth {
            let scaled = round_double(op(self.signed_months() as f64));
            if !scaled.is_finite() || scaled.abs() > MAX_MONTHS as f64 {
                return Err(overflow(self.kind));
            }
            Self::from_months(scaled as i64)
        } else {
            let scaled = round_double(op(self.signed_micros() as f64));
            if !scaled.is_finite() || scaled.abs() > MAX_MICROS as f64 {
                return Err(overflow(self.kind));
            }
            Self::from_micros(scaled as i128)
        }
    }

    /// Multiply by a number, rounding to the nearest month or microsecond.
    pub fn multiply(&self, factor: f64) -> Result<Self, Error> {
        if factor.is_nan() {
            return Err(Error::from_code(
                ErrorCode::FOCA0005,
                "cannot multiply a duration by NaN",
            ));
        }
        if factor.is_infinite() && self.kind != DurationKind::Duration {
            return Err(overflow(self.kind));
        }
        self.scale("multiply", |v| v * factor)
    }

    /// Divide by a number. Division by zero overflows (`FODT0002`).
    pub fn divide(&self, divisor: f64) -> Result<Self, Error> {
        if divisor.is_nan() {
            return Err(Error::from_code(
                ErrorCode::FOCA0005,
                "cannot divide a duration by NaN",
            ));
        }
        if divisor == 0.0 && self.kind != DurationKind::Duration {
            return Err(overflow(self.kind));
        }
        self.scale("divide", |v| v / divisor)
    }

    /// Ratio of two durations of the same subtype.
    pub fn divide_by_duration(&self, other: &Self) -> Result<DecimalValue, Error> {
        let kind = self.same_subtype(other, "divide")?;
        let (num, den) = match kind {
            DurationKind::YearMonth => (
                BigInt::from(self.signed_months()),
                BigInt::from(other.signed_months()),
            ),
            _ => (
                BigInt::from(self.signed_micros()),
                BigInt::from(other.signed_micros()),
            ),
        };
        DecimalValue::new(num, 0).divide(&DecimalValue::new(den, 0))
    }

    /// XPath ordering: total within a subtype, undefined otherwise (`XPTY0004`).
    pub fn xpath_compare(&self, other: &Self) -> Result<Ordering, Error> {
        match self.same_subtype(other, "compare")? {
            DurationKind::YearMonth => Ok(self.signed_months().cmp(&other.signed_months())),
            _ => Ok(self.signed_micros().cmp(&other.signed_micros())),
        }
    }

    /// Equality across all duration kinds: both groups must match.
    pub fn value_equals(&self, other: &Self) -> bool {
        self.signed_months() == other.signed_months() && self.signed_micros() == other.signed_micros()
    }

    /// Schema partial order. Differing month counts are compared through the range of
    /// day counts they may span.
    pub fn schema_compare(&self, other: &Self) -> ValueOrdering {
        let (m0, s0) = (self.signed_months(), self.signed_micros());
        let (m1, s1) = (other.signed_months(), other.signed_micros());
        if m0 == m1 {
            return s0.cmp(&s1).into();
        }
        if s0 == s1 {
            return m0.cmp(&m1).into();
        }
        let day = i128::from(MICROS_PER_DAY);
        let min0 = i128::from(months_to_days_min(m0)) * day + s0;
        let max0 = i128::from(months_to_days_max(m0)) * day + s0;
        let min1 = i128::from(months_to_days_min(m1)) * day + s1;
        let max1 = i128::from(months_to_days_max(m1)) * day + s1;
        if max0 < min1 {
            ValueOrdering::Less
        } else if min0 > max1 {
            ValueOrdering::Greater
        } else {
            ValueOrdering::Indeterminate
        }
    }
}

fn leap_days(years: i64) -> i64 {
    years / 4 - years / 100 + years / 400
}

fn months_to_days_min(months: i64) -> i64 {
    if months < 0 {
        return -months_to_days_max(-months);
    }
    let (years, rest) = (months / 12, months % 12);
    let base = SHORTEST_MONTHS[usize::try_from(rest).unwrap_or(0)];
    if years == 0 {
        base
    } else {
        years * 365 + leap_days(years) - 1 + base
    }
}

fn months_to_days_max(months: i64) -> i64 {
    if months < 0 {
        return -months_to_days_min(-months);
    }
    let (years, rest) = (months / 12, months % 12);
    let base = LONGEST_MONTHS[usize::try_from(rest).unwrap_or(0)];
    if years == 0 {
        base
    } else {
        years * 365 + leap_days(years) + 1 + base
    }
}

type Component = ((Option<i128>, Option<u32>), char);

/// Split `12Y3M4.5S` into `(number, designator)` pairs. The fraction is returned in
/// microseconds, truncated.
fn components(s: &str) -> Result<Vec<Component>, ()> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let whole_digits = &s[start..i];
        let mut frac = None;
        if bytes.get(i) == Some(&b'.') {
            i += 1;
            let fs = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let digits = &s[fs..i];
            if digits.is_empty() {
                return Err(());
            }
            let mut micros = 0u32;
            for (k, b) in digits.bytes().take(6).enumerate() {
                micros += u32::from(b - b'0') * 10u32.pow(5 - u32::try_from(k).map_err(|_| ())?);
            }
            frac = Some(micros);
        }
        if whole_digits.is_empty() {
            return Err(());
        }
        // None when the digits exceed i128
        let whole = whole_digits.parse::<i128>().ok();
        let designator = *bytes.get(i).ok_or(())?;
        if !designator.is_ascii_uppercase() {
            return Err(());
        }
        i += 1;
        out.push(((whole, frac), char::from(designator)));
    }
    Ok(out)
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str(if self.kind == DurationKind::YearMonth { "P0M" } else { "PT0S" });
        }
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        if self.years() != 0 {
            write!(f, "{}Y", self.years())?;
        }
        if self.months() != 0 {
            write!(f, "{}M", self.months())?;
        }
        if self.days() != 0 {
            write!(f, "{}D", self.days())?;
        }
        let time = self.micros % i128::from(MICROS_PER_DAY);
        if time != 0 {
            f.write_str("T")?;
            if self.hours() != 0 {
                write!(f, "{}H", self.hours())?;
            }
            if self.minutes() != 0 {
                write!(f, "{}M", self.minutes())?;
            }
            let secs = self.micros % MICROS_PER_MINUTE;
            if secs != 0 {
                write!(f, "{}S", seconds_decimal(secs))?;
            }
        }
        Ok(())
    }
}
