//! The numeric tower: promotion and arithmetic across integer, decimal, float and double.
//!
//! Mixed operands are promoted to the higher-ranked representation
//! (`double > float > decimal > integer`) before the operation runs. `xs:boolean` is not
//! an arithmetic operand; a cast turns it into the integer 0 or 1, which then takes the
//! lowest rank.

use core::cmp::Ordering;
use core::fmt;

use crate::error::{ConversionResult, Error, ErrorCode, ValidationError};
use crate::value::decimal::DecimalValue;
use crate::value::float::{format_double, format_float, round_double};
use crate::value::integer::IntegerValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Times,
    Div,
    IDiv,
    Mod,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Plus => "+",
            ArithmeticOp::Minus => "-",
            ArithmeticOp::Times => "*",
            ArithmeticOp::Div => "div",
            ArithmeticOp::IDiv => "idiv",
            ArithmeticOp::Mod => "mod",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumericValue {
    Integer(IntegerValue),
    Decimal(DecimalValue),
    Float(f32),
    Double(f64),
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(v: f64) -> f32 {
    v as f32
}

impl NumericValue {
    fn rank(&self) -> u8 {
        match self {
            NumericValue::Integer(_) => 0,
            NumericValue::Decimal(_) => 1,
            NumericValue::Float(_) => 2,
            NumericValue::Double(_) => 3,
        }
    }

    /// Promote to the representation of the given rank; never demotes.
    fn promote(&self, rank: u8) -> NumericValue {
        match (self, rank) {
            (v, r) if v.rank() >= r => v.clone(),
            (v, 3) => NumericValue::Double(v.to_double()),
            (v, 2) => NumericValue::Float(v.to_float()),
            (NumericValue::Integer(i), _) => NumericValue::Decimal(DecimalValue::from_integer(i)),
            (v, _) => v.clone(),
        }
    }

    pub fn to_double(&self) -> f64 {
        match self {
            NumericValue::Integer(i) => i.to_f64(),
            NumericValue::Decimal(d) => d.to_f64(),
            NumericValue::Float(f) => f64::from(*f),
            NumericValue::Double(d) => *d,
        }
    }

    pub fn to_float(&self) -> f32 {
        match self {
            NumericValue::Decimal(d) => d.to_f32(),
            NumericValue::Float(f) => *f,
            other => narrow(other.to_double()),
        }
    }

    pub fn to_decimal(&self) -> ConversionResult<DecimalValue> {
        match self {
            NumericValue::Integer(i) => Ok(DecimalValue::from_integer(i)),
            NumericValue::Decimal(d) => Ok(d.clone()),
            NumericValue::Float(f) => DecimalValue::from_f32(*f),
            NumericValue::Double(d) => DecimalValue::from_f64(*d),
        }
    }

    /// Truncate toward zero; NaN and infinities fail with `FOCA0002`.
    pub fn to_integer(&self) -> ConversionResult<IntegerValue> {
        match self {
            NumericValue::Integer(i) => Ok(i.clone()),
            NumericValue::Decimal(d) => Ok(d.to_integer()),
            NumericValue::Float(f) => Ok(DecimalValue::from_f32(f.trunc())?.to_integer()),
            NumericValue::Double(d) => Ok(DecimalValue::from_f64(d.trunc())?.to_integer()),
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            NumericValue::Float(f) => f.is_nan(),
            NumericValue::Double(d) => d.is_nan(),
            _ => false,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            NumericValue::Integer(i) => i.is_zero(),
            NumericValue::Decimal(d) => d.is_zero(),
            NumericValue::Float(f) => *f == 0.0,
            NumericValue::Double(d) => *d == 0.0,
        }
    }

    /// -1, 0 or +1; NaN yields 0.
    pub fn signum(&self) -> i32 {
        let of_float = |v: f64| {
            if v > 0.0 {
                1
            } else if v < 0.0 {
                -1
            } else {
                0
            }
        };
        match self {
            NumericValue::Integer(i) => i.signum(),
            NumericValue::Decimal(d) => d.signum(),
            NumericValue::Float(f) => of_float(f64::from(*f)),
            NumericValue::Double(d) => of_float(*d),
        }
    }

    pub fn is_whole_number(&self) -> bool {
        match self {
            NumericValue::Integer(_) => true,
            NumericValue::Decimal(d) => d.is_integral(),
            NumericValue::Float(f) => f.is_finite() && f.fract() == 0.0,
            NumericValue::Double(d) => d.is_finite() && d.fract() == 0.0,
        }
    }

    /// Apply `op`, promoting the lower-ranked operand first.
    pub fn arithmetic(&self, op: ArithmeticOp, other: &NumericValue) -> Result<NumericValue, Error> {
        let rank = self.rank().max(other.rank());
        match (self.promote(rank), other.promote(rank)) {
            (NumericValue::Integer(a), NumericValue::Integer(b)) => integer_op(&a, op, &b),
            (NumericValue::Decimal(a), NumericValue::Decimal(b)) => decimal_op(&a, op, &b),
            (NumericValue::Float(a), NumericValue::Float(b)) => match op {
                ArithmeticOp::IDiv => float_idiv(f64::from(a), f64::from(b)),
                _ => Ok(NumericValue::Float(narrow(float_op(
                    f64::from(a),
                    op,
                    f64::from(b),
                )))),
            },
            (NumericValue::Double(a), NumericValue::Double(b)) => match op {
                ArithmeticOp::IDiv => float_idiv(a, b),
                _ => Ok(NumericValue::Double(float_op(a, op, b))),
            },
            _ => Err(Error::type_error("numeric promotion produced mismatched operands")),
        }
    }

    #[must_use]
    pub fn negate(&self) -> NumericValue {
        match self {
            NumericValue::Integer(i) => NumericValue::Integer(i.negate()),
            NumericValue::Decimal(d) => NumericValue::Decimal(d.negate()),
            NumericValue::Float(f) => NumericValue::Float(-f),
            NumericValue::Double(d) => NumericValue::Double(-d),
        }
    }

    #[must_use]
    pub fn abs(&self) -> NumericValue {
        match self {
            NumericValue::Integer(i) => NumericValue::Integer(i.abs()),
            NumericValue::Decimal(d) => NumericValue::Decimal(d.abs()),
            NumericValue::Float(f) => NumericValue::Float(f.abs()),
            NumericValue::Double(d) => NumericValue::Double(d.abs()),
        }
    }

    #[must_use]
    pub fn floor(&self) -> NumericValue {
        match self {
            NumericValue::Integer(_) => self.clone(),
            NumericValue::Decimal(d) => NumericValue::Decimal(d.floor()),
            NumericValue::Float(f) => NumericValue::Float(f.floor()),
            NumericValue::Double(d) => NumericValue::Double(d.floor()),
        }
    }

    #[must_use]
    pub fn ceiling(&self) -> NumericValue {
        match self {
            NumericValue::Integer(_) => self.clone(),
            NumericValue::Decimal(d) => NumericValue::Decimal(d.ceiling()),
            NumericValue::Float(f) => NumericValue::Float(f.ceil()),
            NumericValue::Double(d) => NumericValue::Double(d.ceil()),
        }
    }

    /// Nearest whole number, ties toward positive infinity.
    #[must_use]
    pub fn round(&self) -> NumericValue {
        match self {
            NumericValue::Integer(_) => self.clone(),
            NumericValue::Decimal(d) => NumericValue::Decimal(d.round()),
            NumericValue::Float(f) => NumericValue::Float(narrow(round_double(f64::from(*f)))),
            NumericValue::Double(d) => NumericValue::Double(round_double(*d)),
        }
    }

    /// Banker's rounding at `scale` fractional digits (negative: above the point).
    #[must_use]
    pub fn round_half_to_even(&self, scale: i64) -> NumericValue {
        let via_decimal = |v: f64| -> f64 {
            if !v.is_finite() || v == 0.0 {
                return v;
            }
            match DecimalValue::from_f64(v) {
                Ok(d) => {
                    let r = d.round_half_to_even(scale).to_f64();
                    if r == 0.0 && v < 0.0 { -0.0 } else { r }
                }
                Err(_) => v,
            }
        };
        match self {
            NumericValue::Integer(i) => {
                if scale >= 0 {
                    self.clone()
                } else {
                    let d = DecimalValue::from_integer(i).round_half_to_even(scale);
                    NumericValue::Integer(d.to_integer())
                }
            }
            NumericValue::Decimal(d) => NumericValue::Decimal(d.round_half_to_even(scale)),
            NumericValue::Float(f) => NumericValue::Float(narrow(via_decimal(f64::from(*f)))),
            NumericValue::Double(d) => NumericValue::Double(via_decimal(*d)),
        }
    }

    /// Numeric ordering after promotion; `None` when either side is NaN.
    pub fn compare(&self, other: &NumericValue) -> Option<Ordering> {
        let rank = self.rank().max(other.rank());
        match (self.promote(rank), other.promote(rank)) {
            (NumericValue::Integer(a), NumericValue::Integer(b)) => Some(a.cmp(&b)),
            (NumericValue::Decimal(a), NumericValue::Decimal(b)) => Some(a.cmp(&b)),
            (NumericValue::Float(a), NumericValue::Float(b)) => a.partial_cmp(&b),
            (NumericValue::Double(a), NumericValue::Double(b)) => a.partial_cmp(&b),
            _ => None,
        }
    }
}

fn integer_op(a: &IntegerValue, op: ArithmeticOp, b: &IntegerValue) -> Result<NumericValue, Error> {
    Ok(match op {
        ArithmeticOp::Plus => NumericValue::Integer(a.add(b)),
        ArithmeticOp::Minus => NumericValue::Integer(a.subtract(b)),
        ArithmeticOp::Times => NumericValue::Integer(a.multiply(b)),
        ArithmeticOp::IDiv => NumericValue::Integer(a.idiv(b)?),
        ArithmeticOp::Mod => NumericValue::Integer(a.modulo(b)?),
        ArithmeticOp::Div => match a.exact_quotient(b)? {
            Some(q) => NumericValue::Integer(q),
            None => NumericValue::Decimal(
                DecimalValue::from_integer(a).divide(&DecimalValue::from_integer(b))?,
            ),
        },
    })
}

fn decimal_op(a: &DecimalValue, op: ArithmeticOp, b: &DecimalValue) -> Result<NumericValue, Error> {
    Ok(match op {
        ArithmeticOp::Plus => NumericValue::Decimal(a.add(b)),
        ArithmeticOp::Minus => NumericValue::Decimal(a.subtract(b)),
        ArithmeticOp::Times => NumericValue::Decimal(a.multiply(b)),
        ArithmeticOp::Div => NumericValue::Decimal(a.divide(b)?),
        ArithmeticOp::IDiv => NumericValue::Integer(a.idiv(b)?),
        ArithmeticOp::Mod => NumericValue::Decimal(a.modulo(b)?),
    })
}

/// IEEE arithmetic; `mod` is the truncating remainder, as Rust's `%`.
fn float_op(a: f64, op: ArithmeticOp, b: f64) -> f64 {
    match op {
        ArithmeticOp::Plus => a + b,
        ArithmeticOp::Minus => a - b,
        ArithmeticOp::Times => a * b,
        ArithmeticOp::Div => a / b,
        ArithmeticOp::Mod => a % b,
        ArithmeticOp::IDiv => (a / b).trunc(),
    }
}

fn float_idiv(a: f64, b: f64) -> Result<NumericValue, Error> {
    if b == 0.0 {
        return Err(Error::from_code(ErrorCode::FOAR0001, "integer division by zero"));
    }
    let q = (a / b).trunc();
    if !q.is_finite() {
        return Err(Error::from_code(
            ErrorCode::FOAR0002,
            "idiv operand is NaN or infinite",
        ));
    }
    DecimalValue::from_f64(q)
        .map(|d| NumericValue::Integer(d.to_integer()))
        .map_err(|e: ValidationError| Error::from_code(ErrorCode::FOAR0002, e.message))
}

impl From<IntegerValue> for NumericValue {
    fn from(v: IntegerValue) -> Self {
        NumericValue::Integer(v)
    }
}

impl From<bool> for NumericValue {
    fn from(v: bool) -> Self {
        NumericValue::Integer(IntegerValue::Int64(i64::from(v)))
    }
}

impl From<i64> for NumericValue {
    fn from(v: i64) -> Self {
        NumericValue::Integer(IntegerValue::Int64(v))
    }
}

impl From<DecimalValue> for NumericValue {
    fn from(v: DecimalValue) -> Self {
        NumericValue::Decimal(v)
    }
}

impl From<f64> for NumericValue {
    fn from(v: f64) -> Self {
        NumericValue::Double(v)
    }
}

impl From<f32> for NumericValue {
    fn from(v: f32) -> Self {
        NumericValue::Float(v)
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Integer(i) => write!(f, "{i}"),
            NumericValue::Decimal(d) => write!(f, "{d}"),
            NumericValue::Float(v) => f.write_str(&format_float(*v)),
            NumericValue::Double(v) => f.write_str(&format_double(*v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(s: &str) -> NumericValue {
        NumericValue::Decimal(DecimalValue::parse(s).unwrap())
    }

    #[test]
    fn integer_plus_decimal_is_decimal() {
        let r = NumericValue::from(5).arithmetic(ArithmeticOp::Plus, &dec("2.5")).unwrap();
        assert_eq!(r, dec("7.5"));
    }

    #[test]
    fn decimal_plus_double_is_double() {
        let r = dec("1.5").arithmetic(ArithmeticOp::Plus, &NumericValue::Double(1.0)).unwrap();
        assert_eq!(r, NumericValue::Double(2.5));
    }

    #[test]
    fn float_plus_integer_is_float() {
        let r = NumericValue::Float(1.5).arithmetic(ArithmeticOp::Times, &NumericValue::from(2)).unwrap();
        assert_eq!(r, NumericValue::Float(3.0));
    }

    #[rstest]
    #[case(6, 3, "2", true)]
    #[case(7, 2, "3.5", false)]
    #[case(1, 3, "0.333333333333333333", false)]
    fn integer_div_exactness(#[case] a: i64, #[case] b: i64, #[case] s: &str, #[case] integral: bool) {
        let r = NumericValue::from(a).arithmetic(ArithmeticOp::Div, &NumericValue::from(b)).unwrap();
        assert_eq!(r.to_string(), s);
        assert_eq!(matches!(r, NumericValue::Integer(_)), integral);
    }

    #[rstest]
    #[case(ArithmeticOp::Div)]
    #[case(ArithmeticOp::IDiv)]
    #[case(ArithmeticOp::Mod)]
    fn integer_zero_divisor(#[case] op: ArithmeticOp) {
        let e = NumericValue::from(1).arithmetic(op, &NumericValue::from(0)).unwrap_err();
        assert_eq!(e.code_enum(), ErrorCode::FOAR0001);
    }

    #[test]
    fn double_division_by_zero_is_infinite() {
        let r = NumericValue::Double(1.0).arithmetic(ArithmeticOp::Div, &NumericValue::from(0)).unwrap();
        assert_eq!(r, NumericValue::Double(f64::INFINITY));
        let e = NumericValue::Double(1.0).arithmetic(ArithmeticOp::IDiv, &NumericValue::from(0)).unwrap_err();
        assert_eq!(e.code_enum(), ErrorCode::FOAR0001);
        let e = NumericValue::Double(f64::NAN).arithmetic(ArithmeticOp::IDiv, &NumericValue::from(2)).unwrap_err();
        assert_eq!(e.code_enum(), ErrorCode::FOAR0002);
    }

    #[test]
    fn double_idiv_yields_integer() {
        let r = NumericValue::Double(-7.5).arithmetic(ArithmeticOp::IDiv, &NumericValue::Double(2.0)).unwrap();
        assert_eq!(r, NumericValue::from(-3));
    }

    #[test]
    fn compare_across_ranks() {
        assert_eq!(NumericValue::from(2).compare(&dec("1.5")), Some(Ordering::Greater));
        assert_eq!(NumericValue::from(2).compare(&NumericValue::Double(2.0)), Some(Ordering::Equal));
        assert_eq!(NumericValue::from(2).compare(&NumericValue::Double(f64::NAN)), None);
    }

    #[test]
    fn integer_round_half_to_even_negative_scale() {
        let r = NumericValue::from(1250).round_half_to_even(-2);
        assert_eq!(r, NumericValue::from(1200));
    }

    #[test]
    fn booleans_promote_as_integers() {
        let sum = NumericValue::from(true).arithmetic(ArithmeticOp::Plus, &NumericValue::from(1)).unwrap();
        assert_eq!(sum, NumericValue::from(2));
        let sum = NumericValue::from(false).arithmetic(ArithmeticOp::Plus, &NumericValue::Double(0.5)).unwrap();
        assert_eq!(sum, NumericValue::Double(0.5));
    }

    #[rstest]
    #[case(NumericValue::Decimal(DecimalValue::parse("1.5").unwrap()), i64::MIN)]
    #[case(NumericValue::Decimal(DecimalValue::parse("-98765.4321").unwrap()), -1_000_000_000)]
    #[case(NumericValue::from(i64::MAX), i64::MIN)]
    #[case(NumericValue::Double(1.5), i64::MIN)]
    fn rounding_far_above_the_point_gives_zero(#[case] v: NumericValue, #[case] scale: i64) {
        assert!(v.round_half_to_even(scale).is_zero());
    }

    #[test]
    fn double_round_half_to_even() {
        assert_eq!(NumericValue::Double(2.5).round_half_to_even(0), NumericValue::Double(2.0));
        assert_eq!(NumericValue::Double(3.567_812e4).round_half_to_even(2), NumericValue::Double(35678.12));
    }

    #[test]
    fn to_integer_truncates_and_rejects_specials() {
        assert_eq!(NumericValue::Double(-3.9).to_integer().unwrap(), IntegerValue::from(-3));
        assert_eq!(
            NumericValue::Double(f64::INFINITY).to_integer().unwrap_err().code,
            ErrorCode::FOCA0002
        );
    }
}
