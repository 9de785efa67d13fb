//! Comparison of atomic values.
//!
//! Two relations are kept apart:
//! - the schema relation ([`schema_compare`], [`schema_equals`]) used by facets and
//!   identity checks. It is a partial order within a value space and never consults a
//!   collation.
//! - the XPath value comparison ([`compare_values`], [`value_compare`]) behind `eq`,
//!   `lt` and friends, with untyped promotion, numeric promotion and collations.

use core::cmp::Ordering;
use std::borrow::Cow;
use std::sync::Arc;

use crate::collation::{Collation, resolve_collation};
use crate::context::ConversionContext;
use crate::error::Error;
use crate::types::PrimitiveKind;
use crate::value::decimal::DecimalValue;
use crate::value::numeric::NumericValue;
use crate::value::{AtomicData, AtomicValue};

/// Result of a comparison under a partial order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOrdering {
    Less,
    Equal,
    Greater,
    /// Neither ordered nor equal, e.g. `P1M` against `P30D`.
    Indeterminate,
}

impl ValueOrdering {
    pub fn is_eq(self) -> bool {
        self == ValueOrdering::Equal
    }

    pub fn to_ordering(self) -> Option<Ordering> {
        match self {
            ValueOrdering::Less => Some(Ordering::Less),
            ValueOrdering::Equal => Some(Ordering::Equal),
            ValueOrdering::Greater => Some(Ordering::Greater),
            ValueOrdering::Indeterminate => None,
        }
    }

    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            ValueOrdering::Less => ValueOrdering::Greater,
            ValueOrdering::Greater => ValueOrdering::Less,
            other => other,
        }
    }
}

impl From<Ordering> for ValueOrdering {
    fn from(o: Ordering) -> Self {
        match o {
            Ordering::Less => ValueOrdering::Less,
            Ordering::Equal => ValueOrdering::Equal,
            Ordering::Greater => ValueOrdering::Greater,
        }
    }
}

impl From<Option<Ordering>> for ValueOrdering {
    fn from(o: Option<Ordering>) -> Self {
        o.map_or(ValueOrdering::Indeterminate, Into::into)
    }
}

fn equality(eq: bool) -> ValueOrdering {
    if eq { ValueOrdering::Equal } else { ValueOrdering::Indeterminate }
}

const FOURTEEN_HOURS: i128 = 14 * 3600 * 1_000_000;

/// Order of two temporal instants where either side may lack a timezone.
///
/// A value without a timezone may lie anywhere within +/-14:00 of its local time; the
/// result is indeterminate when the other instant falls inside that window.
fn temporal_order(a: i128, a_tz: bool, b: i128, b_tz: bool) -> ValueOrdering {
    match (a_tz, b_tz) {
        (true, false) => {
            if a < b - FOURTEEN_HOURS {
                ValueOrdering::Less
            } else if a > b + FOURTEEN_HOURS {
                ValueOrdering::Greater
            } else {
                ValueOrdering::Indeterminate
            }
        }
        (false, true) => temporal_order(b, b_tz, a, a_tz).reverse(),
        _ => a.cmp(&b).into(),
    }
}

fn float_schema_order(a: f64, b: f64) -> ValueOrdering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => ValueOrdering::Equal,
        (false, false) => a.partial_cmp(&b).into(),
        _ => ValueOrdering::Indeterminate,
    }
}

/// Schema comparison; `None` when the values lie in different value spaces.
///
/// Integers and decimals share a value space; floats and doubles do not. NaN equals
/// itself here.
pub fn schema_compare(a: &AtomicValue, b: &AtomicValue, _ctx: &ConversionContext) -> Option<ValueOrdering> {
    use AtomicData as D;
    Some(match (a.data(), b.data()) {
        (D::Integer(_) | D::Decimal(_), D::Integer(_) | D::Decimal(_)) => {
            let (x, y) = (a.as_numeric()?, b.as_numeric()?);
            x.compare(&y).into()
        }
        (D::Float(x), D::Float(y)) => float_schema_order(f64::from(*x), f64::from(*y)),
        (D::Double(x), D::Double(y)) => float_schema_order(*x, *y),
        (D::Boolean(x), D::Boolean(y)) => equality(x == y),
        (D::String(x), D::String(y))
        | (D::UntypedAtomic(x), D::UntypedAtomic(y))
        | (D::AnyUri(x), D::AnyUri(y)) => x.as_str().cmp(y.as_str()).into(),
        (D::Duration(x), D::Duration(y)) => x.schema_compare(y),
        (D::DateTime(x), D::DateTime(y)) => temporal_order(
            x.to_instant_micros(0),
            x.timezone().is_some(),
            y.to_instant_micros(0),
            y.timezone().is_some(),
        ),
        (D::Time(x), D::Time(y)) => temporal_order(
            x.to_instant_micros(0),
            x.timezone().is_some(),
            y.to_instant_micros(0),
            y.timezone().is_some(),
        ),
        (D::GDate(x), D::GDate(y)) if x.kind() == y.kind() => temporal_order(
            x.to_instant_micros(0),
            x.timezone().is_some(),
            y.to_instant_micros(0),
            y.timezone().is_some(),
        ),
        (D::HexBinary(x), D::HexBinary(y)) | (D::Base64Binary(x), D::Base64Binary(y)) => {
            equality(x == y)
        }
        (D::QName(x), D::QName(y)) | (D::Notation(x), D::Notation(y)) => equality(x == y),
        (D::External(x), D::External(y)) => equality(x == y),
        _ => return None,
    })
}

pub fn schema_equals(a: &AtomicValue, b: &AtomicValue, ctx: &ConversionContext) -> bool {
    schema_compare(a, b, ctx) == Some(ValueOrdering::Equal)
}

/// Operators of XPath value comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Le => "le",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Ge => "ge",
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, ComparisonOp::Eq | ComparisonOp::Ne)
    }

    /// Apply the operator to an ordering; `Indeterminate` only satisfies `ne`.
    pub fn test(self, ord: ValueOrdering) -> bool {
        use ValueOrdering as O;
        match self {
            ComparisonOp::Eq => ord == O::Equal,
            ComparisonOp::Ne => ord != O::Equal,
            ComparisonOp::Lt => ord == O::Less,
            ComparisonOp::Le => matches!(ord, O::Less | O::Equal),
            ComparisonOp::Gt => ord == O::Greater,
            ComparisonOp::Ge => matches!(ord, O::Greater | O::Equal),
        }
    }
}

/// An untyped operand takes the type of its counterpart: double against a number,
/// string otherwise.
fn promote_untyped<'a>(
    v: &'a AtomicValue,
    other: &AtomicValue,
    ctx: &ConversionContext,
) -> Result<Cow<'a, AtomicValue>, Error> {
    if v.primitive_kind() != PrimitiveKind::UntypedAtomic {
        return Ok(Cow::Borrowed(v));
    }
    let target = if other.is_numeric() {
        PrimitiveKind::Double
    } else {
        PrimitiveKind::String
    };
    Ok(Cow::Owned(v.convert_primitive(target, true, ctx)?))
}

/// Ordering under XPath value comparison, together with whether the types are ordered
/// at all (`false` for the equality-only types).
fn xpath_order(
    lhs: &AtomicValue,
    rhs: &AtomicValue,
    ctx: &ConversionContext,
    collation: Option<&dyn Collation>,
) -> Result<(ValueOrdering, bool), Error> {
    use AtomicData as D;
    let a = promote_untyped(lhs, rhs, ctx)?;
    let b = promote_untyped(rhs, &a, ctx)?;
    if let (Some(x), Some(y)) = (a.as_numeric(), b.as_numeric()) {
        return Ok((x.compare(&y).into(), true));
    }
    let tz = ctx.implicit_timezone;
    let ordered = |o: Ordering| -> Result<(ValueOrdering, bool), Error> { Ok((o.into(), true)) };
    match (a.data(), b.data()) {
        (
            D::String(x) | D::AnyUri(x) | D::UntypedAtomic(x),
            D::String(y) | D::AnyUri(y) | D::UntypedAtomic(y),
        ) => {
            let resolved: Arc<dyn Collation>;
            let coll = match collation {
                Some(c) => c,
                None => {
                    resolved = resolve_collation(ctx, None)?;
                    resolved.as_ref()
                }
            };
            ordered(coll.compare(x.as_str(), y.as_str()))
        }
        (D::Boolean(x), D::Boolean(y)) => ordered(x.cmp(y)),
        (D::Duration(x), D::Duration(y)) => {
            if x.kind() == y.kind() && x.kind() != crate::temporal::DurationKind::Duration {
                ordered(x.xpath_compare(y)?)
            } else {
                Ok((equality(x.value_equals(y)), false))
            }
        }
        (D::DateTime(x), D::DateTime(y)) => ordered(x.compare(y, tz)),
        (D::Time(x), D::Time(y)) => ordered(x.compare(y, tz)),
        (D::GDate(x), D::GDate(y)) if x.kind() == y.kind() => {
            let o = x.compare(y, tz);
            if x.kind() == crate::temporal::GDateKind::Date {
                ordered(o)
            } else {
                Ok((o.into(), false))
            }
        }
        (D::HexBinary(x), D::HexBinary(y)) | (D::Base64Binary(x), D::Base64Binary(y)) => {
            ordered(x.cmp(y))
        }
        (D::QName(x), D::QName(y)) | (D::Notation(x), D::Notation(y)) => {
            Ok((equality(x == y), false))
        }
        (D::External(x), D::External(y)) => Ok((equality(x == y), false)),
        _ => Err(Error::type_error(format!(
            "cannot compare {} with {}",
            a.type_label(),
            b.type_label()
        ))),
    }
}

/// XPath ordering of two values. Equality-only types yield `Equal` or
/// `Indeterminate`; incomparable types fail with `XPTY0004`. A NaN operand yields
/// `Indeterminate`.
pub fn compare_values(
    a: &AtomicValue,
    b: &AtomicValue,
    ctx: &ConversionContext,
    collation: Option<&dyn Collation>,
) -> Result<ValueOrdering, Error> {
    xpath_order(a, b, ctx, collation).map(|(o, _)| o)
}

/// XPath value comparison `a op b`.
pub fn value_compare(
    a: &AtomicValue,
    op: ComparisonOp,
    b: &AtomicValue,
    ctx: &ConversionContext,
    collation: Option<&dyn Collation>,
) -> Result<bool, Error> {
    let (ord, ordered) = xpath_order(a, b, ctx, collation)?;
    if !ordered && !op.is_equality() {
        return Err(Error::type_error(format!(
            "'{}' is not defined for {}",
            op.symbol(),
            a.type_label()
        )));
    }
    Ok(op.test(ord))
}

/// Equality as used by `distinct-values` and `deep-equal`: NaN equals NaN and
/// incomparable values are simply unequal. Numbers are equal when their exact values
/// are, so `xs:float("0.1")` differs from `xs:decimal("0.1")` and from
/// `xs:double("0.1")`; this keeps the relation transitive.
pub fn values_equal(
    a: &AtomicValue,
    b: &AtomicValue,
    ctx: &ConversionContext,
    collation: Option<&dyn Collation>,
) -> bool {
    if let (Some(x), Some(y)) = (a.as_numeric(), b.as_numeric()) {
        return numeric_key(&x) == numeric_key(&y);
    }
    let untyped = |v: &AtomicValue| v.primitive_kind() == PrimitiveKind::UntypedAtomic;
    if untyped(a) || untyped(b) {
        // no numeric promotion: untyped values only ever equal strings
        if !(a.primitive_kind().is_string_like() && b.primitive_kind().is_string_like()) {
            return false;
        }
        let sa = AtomicValue::string(a.string_value().as_ref());
        let sb = AtomicValue::string(b.string_value().as_ref());
        return compare_values(&sa, &sb, ctx, collation).is_ok_and(ValueOrdering::is_eq);
    }
    compare_values(a, b, ctx, collation).is_ok_and(ValueOrdering::is_eq)
}

/// Numeric part of an [`EqualityKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NumericKey {
    Finite(DecimalValue),
    NaN,
    PositiveInfinity,
    NegativeInfinity,
}

/// Hash key consistent with [`values_equal`]: equal values produce equal keys.
///
/// Numbers share a key across integer, decimal, float and double when their exact
/// values are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EqualityKey {
    Numeric(NumericKey),
    Boolean(bool),
    /// Collation key of a string, anyURI or untyped value.
    String(String),
    /// Signed months and microseconds.
    Duration(i64, i128),
    /// Primitive kind and instant in the implicit timezone.
    Temporal(PrimitiveKind, i128),
    Binary(Vec<u8>),
    QName(Option<String>, String),
    External(String),
}

fn float_key(d: f64) -> NumericKey {
    if d.is_nan() {
        NumericKey::NaN
    } else if d == f64::INFINITY {
        NumericKey::PositiveInfinity
    } else if d == f64::NEG_INFINITY {
        NumericKey::NegativeInfinity
    } else {
        DecimalValue::exact_f64(d).map_or(NumericKey::NaN, NumericKey::Finite)
    }
}

fn numeric_key(n: &NumericValue) -> NumericKey {
    match n {
        NumericValue::Integer(i) => NumericKey::Finite(DecimalValue::from_integer(i)),
        NumericValue::Decimal(d) => NumericKey::Finite(d.clone()),
        // widening to f64 is exact
        NumericValue::Float(f) => float_key(f64::from(*f)),
        NumericValue::Double(d) => float_key(*d),
    }
}

pub fn equality_key(
    v: &AtomicValue,
    ctx: &ConversionContext,
    collation: Option<&dyn Collation>,
) -> Result<EqualityKey, Error> {
    use AtomicData as D;
    let tz = ctx.implicit_timezone;
    Ok(match v.data() {
        D::Integer(_) | D::Decimal(_) | D::Float(_) | D::Double(_) => match v.as_numeric() {
            Some(n) => EqualityKey::Numeric(numeric_key(&n)),
            None => EqualityKey::Numeric(NumericKey::NaN),
        },
        D::String(s) | D::AnyUri(s) | D::UntypedAtomic(s) => {
            let key = match collation {
                Some(c) => c.key(s.as_str()),
                None => resolve_collation(ctx, None)?.key(s.as_str()),
            };
            EqualityKey::String(key)
        }
        D::Boolean(b) => EqualityKey::Boolean(*b),
        D::Duration(d) => EqualityKey::Duration(d.signed_months(), d.signed_micros()),
        D::DateTime(d) => EqualityKey::Temporal(PrimitiveKind::DateTime, d.to_instant_micros(tz)),
        D::Time(t) => EqualityKey::Temporal(PrimitiveKind::Time, t.to_instant_micros(tz)),
        D::GDate(g) => EqualityKey::Temporal(v.primitive_kind(), g.to_instant_micros(tz)),
        D::HexBinary(b) | D::Base64Binary(b) => EqualityKey::Binary(b.as_bytes().to_vec()),
        D::QName(q) | D::Notation(q) => {
            EqualityKey::QName(q.namespace().map(str::to_string), q.local_name().to_string())
        }
        D::External(e) => EqualityKey::External(e.to_string()),
    })
}
