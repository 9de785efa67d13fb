//! `xs:integer` and its subtypes.
//!
//! Values live in an `i64` while they fit and move to an arbitrary-precision `BigInt`
//! only when they do not. Every operation that produces a `BigInt` reduces the result
//! back to `i64` when possible, so the representation is canonical and derived equality
//! is value equality.

use core::cmp::Ordering;
use core::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use tracing::debug;

use crate::error::{ConversionResult, Error, ErrorCode, ValidationError};
use crate::types::BuiltinType;
use crate::value::string::trim_xml_whitespace;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IntegerValue {
    Int64(i64),
    Big(BigInt),
}

/// Both operands of `+`/`-` below 2^60 in magnitude: the result cannot overflow.
fn additive_safe(v: i64) -> bool {
    matches!((v >> 60) & 0xf, 0 | 0xf)
}

/// Both operands of `*` below 2^31 in magnitude: the product cannot overflow.
fn multiplicative_safe(v: i64) -> bool {
    matches!((v >> 31) & 0x1_ffff_ffff, 0 | 0x1_ffff_ffff)
}

impl IntegerValue {
    pub const ZERO: IntegerValue = IntegerValue::Int64(0);
    pub const ONE: IntegerValue = IntegerValue::Int64(1);

    /// Wrap a `BigInt`, reducing it to `i64` when it fits.
    pub fn from_big(b: BigInt) -> Self {
        match b.to_i64() {
            Some(v) => IntegerValue::Int64(v),
            None => IntegerValue::Big(b),
        }
    }

    pub fn to_big(&self) -> BigInt {
        match self {
            IntegerValue::Int64(v) => BigInt::from(*v),
            IntegerValue::Big(b) => b.clone(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IntegerValue::Int64(v) => Some(*v),
            IntegerValue::Big(_) => None,
        }
    }

    pub fn to_i128(&self) -> Option<i128> {
        match self {
            IntegerValue::Int64(v) => Some(i128::from(*v)),
            IntegerValue::Big(b) => b.to_i128(),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            IntegerValue::Int64(v) => *v as f64,
            IntegerValue::Big(b) => b.to_f64().unwrap_or(if b.is_negative() {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }),
        }
    }

    pub fn signum(&self) -> i32 {
        match self {
            IntegerValue::Int64(v) => v.signum().try_into().unwrap_or(0),
            IntegerValue::Big(b) => {
                if b.is_negative() {
                    -1
                } else {
                    i32::from(!b.is_zero())
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, IntegerValue::Int64(0))
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        match self {
            IntegerValue::Int64(v) => match v.checked_neg() {
                Some(n) => IntegerValue::Int64(n),
                None => Self::from_big(-BigInt::from(*v)),
            },
            IntegerValue::Big(b) => Self::from_big(-b),
        }
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        if self.signum() < 0 { self.negate() } else { self.clone() }
    }

    /// Parse the lexical form of `xs:integer`: optional sign followed by digits, with
    /// surrounding XML whitespace ignored.
    pub fn parse(lexical: &str) -> ConversionResult<Self> {
        let s = trim_xml_whitespace(lexical);
        let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid(format!(
                "invalid lexical form for xs:integer: '{lexical}'"
            )));
        }
        if let Ok(v) = s.parse::<i64>() {
            return Ok(IntegerValue::Int64(v));
        }
        BigInt::parse_bytes(s.as_bytes(), 10)
            .map(Self::from_big)
            .ok_or_else(|| {
                ValidationError::invalid(format!("invalid lexical form for xs:integer: '{lexical}'"))
            })
    }

    /// Range check against the facets of a built-in integer subtype.
    pub fn check_range(&self, ty: BuiltinType) -> ConversionResult<()> {
        let Some((min, max)) = ty.integer_bounds() else {
            return Ok(());
        };
        let ok = match self.to_i128() {
            Some(v) => min.is_none_or(|m| v >= m) && max.is_none_or(|m| v <= m),
            // only unbounded directions admit values outside i128
            None => {
                let neg = self.signum() < 0;
                if neg { min.is_none() } else { max.is_none() }
            }
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::invalid(format!(
                "value {self} out of range for {}",
                ty.display_name()
            )))
        }
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        if let (IntegerValue::Int64(a), IntegerValue::Int64(b)) = (self, other) {
            if additive_safe(*a) && additive_safe(*b) {
                return IntegerValue::Int64(a + b);
            }
            debug!(lhs = a, rhs = b, op = "+", "integer arithmetic redirected to BigInt");
        }
        Self::from_big(self.to_big() + other.to_big())
    }

    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        if let (IntegerValue::Int64(a), IntegerValue::Int64(b)) = (self, other) {
            if additive_safe(*a) && additive_safe(*b) {
                return IntegerValue::Int64(a - b);
            }
            debug!(lhs = a, rhs = b, op = "-", "integer arithmetic redirected to BigInt");
        }
        Self::from_big(self.to_big() - other.to_big())
    }

    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        if let (IntegerValue::Int64(a), IntegerValue::Int64(b)) = (self, other) {
            if multiplicative_safe(*a) && multiplicative_safe(*b) {
                return IntegerValue::Int64(a * b);
            }
            debug!(lhs = a, rhs = b, op = "*", "integer arithmetic redirected to BigInt");
        }
        Self::from_big(self.to_big() * other.to_big())
    }

    /// Truncating integer division (`idiv`).
    pub fn idiv(&self, other: &Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::from_code(ErrorCode::FOAR0001, "integer division by zero"));
        }
        if let (IntegerValue::Int64(a), IntegerValue::Int64(b)) = (self, other)
            && let Some(q) = a.checked_div(*b)
        {
            return Ok(IntegerValue::Int64(q));
        }
        Ok(Self::from_big(self.to_big() / other.to_big()))
    }

    /// Remainder of truncating division; the sign follows the dividend.
    pub fn modulo(&self, other: &Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::from_code(ErrorCode::FOAR0001, "modulus by zero"));
        }
        if let (IntegerValue::Int64(a), IntegerValue::Int64(b)) = (self, other) {
            // i64::MIN % -1 overflows, the remainder is zero
            return Ok(IntegerValue::Int64(a.checked_rem(*b).unwrap_or(0)));
        }
        Ok(Self::from_big(self.to_big() % other.to_big()))
    }

    /// `Some(q)` when `other` divides `self` exactly.
    pub fn exact_quotient(&self, other: &Self) -> Result<Option<Self>, Error> {
        if self.modulo(other)?.is_zero() {
            Ok(Some(self.idiv(other)?))
        } else {
            Ok(None)
        }
    }
}

impl From<i64> for IntegerValue {
    fn from(v: i64) -> Self {
        IntegerValue::Int64(v)
    }
}

impl From<BigInt> for IntegerValue {
    fn from(b: BigInt) -> Self {
        Self::from_big(b)
    }
}

impl Ord for IntegerValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IntegerValue::Int64(a), IntegerValue::Int64(b)) => a.cmp(b),
            _ => self.to_big().cmp(&other.to_big()),
        }
    }
}

impl PartialOrd for IntegerValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IntegerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegerValue::Int64(v) => write!(f, "{v}"),
            IntegerValue::Big(b) => write!(f, "{b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn overflow_moves_to_bigint_and_back() {
        let max = IntegerValue::Int64(i64::MAX);
        let sum = max.add(&IntegerValue::ONE);
        assert_eq!(sum, IntegerValue::Big(BigInt::from(i64::MAX) + 1));
        assert_eq!(sum.subtract(&IntegerValue::ONE), max);
    }

    #[test]
    fn multiply_large_values() {
        let a = IntegerValue::Int64(1 << 40);
        let p = a.multiply(&a);
        assert_eq!(p.to_string(), "1208925819614629174706176");
        assert_eq!(p.idiv(&a).unwrap(), a);
    }

    #[rstest]
    #[case(7, 2, 3, 1)]
    #[case(-7, 2, -3, -1)]
    #[case(7, -2, -3, 1)]
    #[case(-7, -2, 3, -1)]
    fn idiv_and_mod_truncate(#[case] a: i64, #[case] b: i64, #[case] q: i64, #[case] r: i64) {
        let (a, b) = (IntegerValue::from(a), IntegerValue::from(b));
        assert_eq!(a.idiv(&b).unwrap(), IntegerValue::from(q));
        assert_eq!(a.modulo(&b).unwrap(), IntegerValue::from(r));
    }

    #[test]
    fn min_divided_by_minus_one() {
        let a = IntegerValue::Int64(i64::MIN);
        let m1 = IntegerValue::Int64(-1);
        assert_eq!(a.idiv(&m1).unwrap(), IntegerValue::Big(-BigInt::from(i64::MIN)));
        assert_eq!(a.modulo(&m1).unwrap(), IntegerValue::ZERO);
        assert_eq!(a.negate(), IntegerValue::Big(-BigInt::from(i64::MIN)));
    }

    #[test]
    fn division_by_zero_is_foar0001() {
        let e = IntegerValue::ONE.idiv(&IntegerValue::ZERO).unwrap_err();
        assert_eq!(e.code_enum(), ErrorCode::FOAR0001);
        let e = IntegerValue::ONE.modulo(&IntegerValue::ZERO).unwrap_err();
        assert_eq!(e.code_enum(), ErrorCode::FOAR0001);
    }

    #[rstest]
    #[case(" 42 ", "42")]
    #[case("+7", "7")]
    #[case("-0", "0")]
    #[case("99999999999999999999", "99999999999999999999")]
    fn parses_lexical_forms(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(IntegerValue::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("+")]
    #[case("1.0")]
    #[case("1e3")]
    #[case("--1")]
    fn rejects_invalid_lexical_forms(#[case] input: &str) {
        assert_eq!(
            IntegerValue::parse(input).unwrap_err().code,
            ErrorCode::FORG0001
        );
    }

    #[rstest]
    #[case(BuiltinType::Byte, 127, true)]
    #[case(BuiltinType::Byte, 128, false)]
    #[case(BuiltinType::UnsignedInt, -1, false)]
    #[case(BuiltinType::PositiveInteger, 0, false)]
    #[case(BuiltinType::NonPositiveInteger, 0, true)]
    #[case(BuiltinType::Int, 2_147_483_648, false)]
    fn range_checks(#[case] ty: BuiltinType, #[case] v: i64, #[case] ok: bool) {
        assert_eq!(IntegerValue::from(v).check_range(ty).is_ok(), ok);
    }

    #[test]
    fn unsigned_long_accepts_values_beyond_i64() {
        let v = IntegerValue::parse("18446744073709551615").unwrap();
        assert!(v.check_range(BuiltinType::UnsignedLong).is_ok());
        assert!(v.add(&IntegerValue::ONE).check_range(BuiltinType::UnsignedLong).is_err());
        assert!(v.check_range(BuiltinType::Long).is_err());
    }
}
