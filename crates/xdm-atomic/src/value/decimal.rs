//! `xs:decimal`: arbitrary-precision fixed point.
//!
//! A value is an unscaled `BigInt` and a non-negative scale (`unscaled * 10^-scale`).
//! Trailing fractional zeros are always stripped, so equal values have equal
//! representations and `1000`/`1000.00` serialize identically.

use core::cmp::Ordering;
use core::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::{ConversionResult, Error, ErrorCode, ValidationError};
use crate::value::integer::IntegerValue;
use crate::value::string::trim_xml_whitespace;

/// Minimum scale of a decimal quotient.
pub const DIVISION_SCALE: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    /// Toward negative infinity.
    Floor,
    /// Toward positive infinity.
    Ceiling,
    /// Toward zero.
    Down,
    /// Ties away from zero.
    HalfUp,
    /// Ties toward zero.
    HalfDown,
    /// Ties to the even neighbour.
    HalfEven,
    /// Ties toward positive infinity.
    HalfCeiling,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecimalValue {
    unscaled: BigInt,
    scale: u32,
}

fn pow10(n: u32) -> BigInt {
    BigInt::from(10u32).pow(n)
}

/// Divide `num` by a positive `den`, rounding the quotient per `mode`.
fn div_round(num: &BigInt, den: &BigInt, mode: RoundingMode) -> BigInt {
    let q = num / den;
    let r = num % den;
    if r.is_zero() {
        return q;
    }
    let negative = num.is_negative();
    let half = (r.abs() * 2u32).cmp(den);
    let away = match mode {
        RoundingMode::Floor => negative,
        RoundingMode::Ceiling => !negative,
        RoundingMode::Down => false,
        RoundingMode::HalfUp => half != Ordering::Less,
        RoundingMode::HalfDown => half == Ordering::Greater,
        RoundingMode::HalfEven => {
            half == Ordering::Greater || (half == Ordering::Equal && !(&q % 2u32).is_zero())
        }
        RoundingMode::HalfCeiling => {
            half == Ordering::Greater || (half == Ordering::Equal && !negative)
        }
    };
    match (away, negative) {
        (false, _) => q,
        (true, true) => q - 1u32,
        (true, false) => q + 1u32,
    }
}

impl DecimalValue {
    /// Build from `unscaled * 10^-scale`, stripping trailing zeros.
    pub fn new(unscaled: BigInt, scale: u32) -> Self {
        let mut unscaled = unscaled;
        let mut scale = scale;
        if unscaled.is_zero() {
            return Self::zero();
        }
        let ten = BigInt::from(10u32);
        while scale > 0 && (&unscaled % &ten).is_zero() {
            unscaled /= &ten;
            scale -= 1;
        }
        Self { unscaled, scale }
    }

    pub fn zero() -> Self {
        Self {
            unscaled: BigInt::zero(),
            scale: 0,
        }
    }

    pub fn from_i64(v: i64) -> Self {
        Self {
            unscaled: BigInt::from(v),
            scale: 0,
        }
    }

    pub fn from_integer(v: &IntegerValue) -> Self {
        Self {
            unscaled: v.to_big(),
            scale: 0,
        }
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Parse the lexical form: optional sign, digits with an optional point, no exponent.
    pub fn parse(lexical: &str) -> ConversionResult<Self> {
        Self::parse_unchecked(trim_xml_whitespace(lexical)).ok_or_else(|| {
            ValidationError::invalid(format!("invalid lexical form for xs:decimal: '{lexical}'"))
        })
    }

    /// `[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)`
    fn parse_unchecked(s: &str) -> Option<Self> {
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return None;
        }
        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        if digits.is_empty() {
            return None;
        }
        let mut unscaled = BigInt::parse_bytes(digits.as_bytes(), 10)?;
        if negative {
            unscaled = -unscaled;
        }
        Some(Self::new(unscaled, u32::try_from(frac_part.len()).ok()?))
    }

    /// Exact decimal of the shortest round-tripping representation of `v`.
    pub fn from_f64(v: f64) -> ConversionResult<Self> {
        if !v.is_finite() {
            return Err(ValidationError::new(
                ErrorCode::FOCA0002,
                format!("cannot convert {v} to xs:decimal"),
            ));
        }
        // Display for floats never uses exponent notation
        Self::parse_unchecked(&v.to_string()).ok_or_else(|| {
            ValidationError::new(ErrorCode::FOCA0002, format!("cannot convert {v} to xs:decimal"))
        })
    }

    /// The exact binary value of a finite double, every digit of its expansion kept.
    pub fn exact_f64(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }
        let bits = v.to_bits();
        let biased = i32::try_from((bits >> 52) & 0x7ff).ok()?;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mantissa, exp) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased - 1075)
        };
        let mut unscaled = BigInt::from(mantissa);
        if bits >> 63 == 1 {
            unscaled = -unscaled;
        }
        let shift = exp.unsigned_abs();
        Some(if exp >= 0 {
            Self::new(unscaled << shift, 0)
        } else {
            // m / 2^k == m * 5^k / 10^k
            Self::new(unscaled * BigInt::from(5u32).pow(shift), shift)
        })
    }

    pub fn from_f32(v: f32) -> ConversionResult<Self> {
        if !v.is_finite() {
            return Err(ValidationError::new(
                ErrorCode::FOCA0002,
                format!("cannot convert {v} to xs:decimal"),
            ));
        }
        Self::parse_unchecked(&v.to_string()).ok_or_else(|| {
            ValidationError::new(ErrorCode::FOCA0002, format!("cannot convert {v} to xs:decimal"))
        })
    }

    pub fn to_f64(&self) -> f64 {
        if self.scale == 0 {
            return self.unscaled.to_f64().unwrap_or(f64::NAN);
        }
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    pub fn to_f32(&self) -> f32 {
        self.to_string().parse().unwrap_or(f32::NAN)
    }

    pub fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }

    pub fn is_integral(&self) -> bool {
        self.scale == 0
    }

    pub fn signum(&self) -> i32 {
        if self.unscaled.is_negative() {
            -1
        } else {
            i32::from(!self.unscaled.is_zero())
        }
    }

    /// Integer part, truncated toward zero.
    pub fn to_integer(&self) -> IntegerValue {
        IntegerValue::from_big(&self.unscaled / pow10(self.scale))
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            unscaled: -&self.unscaled,
            scale: self.scale,
        }
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            unscaled: self.unscaled.abs(),
            scale: self.scale,
        }
    }

    /// Both unscaled values brought to the larger scale.
    fn aligned(&self, other: &Self) -> (BigInt, BigInt, u32) {
        match self.scale.cmp(&other.scale) {
            Ordering::Equal => (self.unscaled.clone(), other.unscaled.clone(), self.scale),
            Ordering::Less => (
                &self.unscaled * pow10(other.scale - self.scale),
                other.unscaled.clone(),
                other.scale,
            ),
            Ordering::Greater => (
                self.unscaled.clone(),
                &other.unscaled * pow10(self.scale - other.scale),
                self.scale,
            ),
        }
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let (a, b, scale) = self.aligned(other);
        Self::new(a + b, scale)
    }

    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        let (a, b, scale) = self.aligned(other);
        Self::new(a - b, scale)
    }

    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        Self::new(&self.unscaled * &other.unscaled, self.scale + other.scale)
    }

    /// Quotient at scale `max(18, s1, s2)`, ties rounded toward zero.
    pub fn divide(&self, other: &Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::from_code(ErrorCode::FOAR0001, "decimal division by zero"));
        }
        let scale = DIVISION_SCALE.max(self.scale).max(other.scale);
        let mut num = &self.unscaled * pow10(scale + other.scale - self.scale);
        let mut den = other.unscaled.clone();
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        Ok(Self::new(div_round(&num, &den, RoundingMode::HalfDown), scale))
    }

    /// Truncating division (`idiv`).
    pub fn idiv(&self, other: &Self) -> Result<IntegerValue, Error> {
        if other.is_zero() {
            return Err(Error::from_code(ErrorCode::FOAR0001, "integer division by zero"));
        }
        let (a, b, _) = self.aligned(other);
        Ok(IntegerValue::from_big(a / b))
    }

    /// Remainder of truncating division; the sign follows the dividend.
    pub fn modulo(&self, other: &Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::from_code(ErrorCode::FOAR0001, "modulus by zero"));
        }
        let (a, b, scale) = self.aligned(other);
        Ok(Self::new(a % b, scale))
    }

    /// Round to `scale` fractional digits; a negative scale rounds to a power of ten
    /// above the decimal point.
    #[must_use]
    pub fn round_to(&self, scale: i64, mode: RoundingMode) -> Self {
        let current = i64::from(self.scale);
        if scale >= current {
            return self.clone();
        }
        let drop = current.checked_sub(scale).and_then(|d| u32::try_from(d).ok());
        let q = match drop {
            Some(drop) if usize::try_from(drop).is_ok_and(|d| d <= self.precision()) => {
                div_round(&self.unscaled, &pow10(drop), mode)
            }
            // every digit is dropped: |value| < 0.1 of the rounding unit
            _ => div_round(&self.unscaled.signum(), &BigInt::from(10u32), mode),
        };
        if q.is_zero() {
            return Self::zero();
        }
        if scale >= 0 {
            Self::new(q, u32::try_from(scale).unwrap_or(0))
        } else {
            match u32::try_from(scale.unsigned_abs()) {
                Ok(up) => Self::new(q * pow10(up), 0),
                Err(_) => Self::zero(),
            }
        }
    }

    #[must_use]
    pub fn floor(&self) -> Self {
        self.round_to(0, RoundingMode::Floor)
    }

    #[must_use]
    pub fn ceiling(&self) -> Self {
        self.round_to(0, RoundingMode::Ceiling)
    }

    /// Nearest integer, ties toward positive infinity.
    #[must_use]
    pub fn round(&self) -> Self {
        self.round_to(0, RoundingMode::HalfCeiling)
    }

    #[must_use]
    pub fn round_half_to_even(&self, scale: i64) -> Self {
        self.round_to(scale, RoundingMode::HalfEven)
    }

    /// Canonical lexical form: always contains a decimal point.
    pub fn canonical(&self) -> String {
        let mut s = self.to_string();
        if self.scale == 0 {
            s.push_str(".0");
        }
        s
    }

    /// Number of digits in total; useful to enforce `totalDigits`-like limits.
    pub fn precision(&self) -> usize {
        if self.is_zero() {
            1
        } else {
            self.unscaled.abs().to_string().len()
        }
    }
}

impl Ord for DecimalValue {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

impl PartialOrd for DecimalValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.abs().to_string();
        if self.unscaled.is_negative() {
            f.write_str("-")?;
        }
        let scale = self.scale as usize;
        if scale == 0 {
            f.write_str(&digits)
        } else if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

impl From<i64> for DecimalValue {
    fn from(v: i64) -> Self {
        Self::from_i64(v)
    }
}

impl From<&IntegerValue> for DecimalValue {
    fn from(v: &IntegerValue) -> Self {
        Self::from_integer(v)
    }
}
