//! Arithmetic operators over atomic values.
//!
//! Dispatches on the operand types: the numeric tower, duration arithmetic and
//! date/time arithmetic. Untyped operands are cast to `xs:double` first.

use std::borrow::Cow;

use crate::context::ConversionContext;
use crate::error::Error;
use crate::temporal::{DurationKind, DurationValue, GDateKind};
use crate::types::PrimitiveKind;
use crate::value::numeric::ArithmeticOp;
use crate::value::{AtomicData, AtomicValue};

fn untyped_to_double<'a>(v: &'a AtomicValue, ctx: &ConversionContext) -> Result<Cow<'a, AtomicValue>, Error> {
    if v.primitive_kind() == PrimitiveKind::UntypedAtomic {
        Ok(Cow::Owned(v.convert_primitive(PrimitiveKind::Double, true, ctx)?))
    } else {
        Ok(Cow::Borrowed(v))
    }
}

fn unsupported(lhs: &AtomicValue, op: ArithmeticOp, rhs: &AtomicValue) -> Error {
    Error::type_error(format!(
        "operator '{op}' is not defined for {} and {}",
        lhs.type_label(),
        rhs.type_label()
    ))
}

/// Only the two totally ordered duration subtypes take part in date/time arithmetic.
fn calendar_duration(d: &DurationValue) -> bool {
    d.kind() != DurationKind::Duration
}

/// Evaluate `lhs op rhs`.
pub fn arithmetic(
    lhs: &AtomicValue,
    op: ArithmeticOp,
    rhs: &AtomicValue,
    ctx: &ConversionContext,
) -> Result<AtomicValue, Error> {
    use AtomicData as D;
    use ArithmeticOp as Op;
    let a = untyped_to_double(lhs, ctx)?;
    let b = untyped_to_double(rhs, ctx)?;
    if let (Some(x), Some(y)) = (a.as_numeric(), b.as_numeric()) {
        return x.arithmetic(op, &y).map(AtomicValue::from_numeric);
    }
    let tz = ctx.implicit_timezone;
    let fail = || unsupported(&a, op, &b);
    match (a.data(), op, b.data()) {
        (D::Duration(x), Op::Plus, D::Duration(y)) => Ok(AtomicValue::duration(x.add(y)?)),
        (D::Duration(x), Op::Minus, D::Duration(y)) => Ok(AtomicValue::duration(x.subtract(y)?)),
        (D::Duration(x), Op::Div, D::Duration(y)) => {
            Ok(AtomicValue::decimal(x.divide_by_duration(y)?))
        }
        (D::Duration(d), Op::Times, _) => match b.as_numeric() {
            Some(n) => Ok(AtomicValue::duration(d.multiply(n.to_double())?)),
            None => Err(fail()),
        },
        (_, Op::Times, D::Duration(d)) => match a.as_numeric() {
            Some(n) => Ok(AtomicValue::duration(d.multiply(n.to_double())?)),
            None => Err(fail()),
        },
        (D::Duration(d), Op::Div, _) => match b.as_numeric() {
            Some(n) => Ok(AtomicValue::duration(d.divide(n.to_double())?)),
            None => Err(fail()),
        },

        (D::DateTime(t), Op::Plus, D::Duration(d)) | (D::Duration(d), Op::Plus, D::DateTime(t))
            if calendar_duration(d) =>
        {
            Ok(AtomicValue::date_time(t.add_duration(d)?))
        }
        (D::DateTime(t), Op::Minus, D::Duration(d)) if calendar_duration(d) => {
            Ok(AtomicValue::date_time(t.subtract_duration(d)?))
        }
        (D::GDate(g), Op::Plus, D::Duration(d)) | (D::Duration(d), Op::Plus, D::GDate(g))
            if calendar_duration(d) =>
        {
            Ok(AtomicValue::gdate(g.add_duration(d)?))
        }
        (D::GDate(g), Op::Minus, D::Duration(d)) if calendar_duration(d) => {
            Ok(AtomicValue::gdate(g.subtract_duration(d)?))
        }
        (D::Time(t), Op::Plus, D::Duration(d)) | (D::Duration(d), Op::Plus, D::Time(t))
            if d.kind() == DurationKind::DayTime =>
        {
            Ok(AtomicValue::time(t.add_duration(d)))
        }
        (D::Time(t), Op::Minus, D::Duration(d)) if d.kind() == DurationKind::DayTime => {
            Ok(AtomicValue::time(t.subtract_duration(d)))
        }

        (D::DateTime(x), Op::Minus, D::DateTime(y)) => Ok(AtomicValue::duration(x.subtract(y, tz)?)),
        (D::GDate(x), Op::Minus, D::GDate(y))
            if x.kind() == GDateKind::Date && y.kind() == GDateKind::Date =>
        {
            Ok(AtomicValue::duration(x.subtract(y, tz)?))
        }
        (D::Time(x), Op::Minus, D::Time(y)) => Ok(AtomicValue::duration(x.subtract(y, tz)?)),
        _ => Err(fail()),
    }
}

/// Unary minus.
pub fn negate(v: &AtomicValue, ctx: &ConversionContext) -> Result<AtomicValue, Error> {
    let v = untyped_to_double(v, ctx)?;
    if let Some(n) = v.as_numeric() {
        return Ok(AtomicValue::from_numeric(n.negate()));
    }
    match v.data() {
        AtomicData::Duration(d) => Ok(AtomicValue::duration(d.negate())),
        _ => Err(Error::type_error(format!("unary minus is not defined for {}", v.type_label()))),
    }
}
