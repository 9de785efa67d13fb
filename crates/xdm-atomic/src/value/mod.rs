//! Atomic values: a payload plus a type label.
//!
//! The payload ([`AtomicData`]) is a closed sum over the primitive representations; the
//! label ([`AtomicType`]) names the built-in or user-defined type the value belongs to.
//! The primitive kind of the label always agrees with the payload. Values are immutable;
//! relabelling produces a new value.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use crate::context::ConversionContext;
use crate::error::{ConversionResult, Error, ErrorCode, ValidationError};
use crate::interop::ExternalValue;
use crate::temporal::{
    Component, DateTimeValue, DurationKind, DurationValue, GDateKind, GDateValue, TimeValue,
    lexical_year,
};
use crate::types::{AtomicType, BuiltinType, PrimitiveKind};

pub mod any_uri;
pub mod binary;
pub mod boolean;
mod convert;
pub mod decimal;
pub mod float;
pub mod integer;
pub mod numeric;
pub mod qname;
pub mod string;

use binary::BinaryValue;
use decimal::DecimalValue;
use integer::IntegerValue;
use numeric::NumericValue;
use qname::QNameValue;
use string::StringValue;

/// Payload of an atomic value, one variant per primitive representation.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomicData {
    UntypedAtomic(StringValue),
    String(StringValue),
    AnyUri(StringValue),
    Boolean(bool),
    Integer(IntegerValue),
    Decimal(DecimalValue),
    Float(f32),
    Double(f64),
    /// All three duration types; the kind is part of the payload.
    Duration(DurationValue),
    DateTime(DateTimeValue),
    Time(TimeValue),
    /// `xs:date` and the g-types; the kind is part of the payload.
    GDate(GDateValue),
    HexBinary(BinaryValue),
    Base64Binary(BinaryValue),
    QName(QNameValue),
    Notation(QNameValue),
    External(ExternalValue),
}

impl AtomicData {
    /// Primitive kind implied by the payload alone.
    pub fn primitive_kind(&self) -> PrimitiveKind {
        match self {
            AtomicData::UntypedAtomic(_) => PrimitiveKind::UntypedAtomic,
            AtomicData::String(_) => PrimitiveKind::String,
            AtomicData::AnyUri(_) => PrimitiveKind::AnyUri,
            AtomicData::Boolean(_) => PrimitiveKind::Boolean,
            AtomicData::Integer(_) => PrimitiveKind::Integer,
            AtomicData::Decimal(_) => PrimitiveKind::Decimal,
            AtomicData::Float(_) => PrimitiveKind::Float,
            AtomicData::Double(_) => PrimitiveKind::Double,
            AtomicData::Duration(d) => match d.kind() {
                DurationKind::Duration => PrimitiveKind::Duration,
                DurationKind::DayTime => PrimitiveKind::DayTimeDuration,
                DurationKind::YearMonth => PrimitiveKind::YearMonthDuration,
            },
            AtomicData::DateTime(_) => PrimitiveKind::DateTime,
            AtomicData::Time(_) => PrimitiveKind::Time,
            AtomicData::GDate(g) => gdate_primitive(g.kind()),
            AtomicData::HexBinary(_) => PrimitiveKind::HexBinary,
            AtomicData::Base64Binary(_) => PrimitiveKind::Base64Binary,
            AtomicData::QName(_) => PrimitiveKind::QName,
            AtomicData::Notation(_) => PrimitiveKind::Notation,
            AtomicData::External(_) => PrimitiveKind::External,
        }
    }
}

pub(crate) fn gdate_primitive(kind: GDateKind) -> PrimitiveKind {
    match kind {
        GDateKind::Date => PrimitiveKind::Date,
        GDateKind::GYearMonth => PrimitiveKind::GYearMonth,
        GDateKind::GYear => PrimitiveKind::GYear,
        GDateKind::GMonthDay => PrimitiveKind::GMonthDay,
        GDateKind::GMonth => PrimitiveKind::GMonth,
        GDateKind::GDay => PrimitiveKind::GDay,
    }
}

pub(crate) fn duration_label(kind: DurationKind) -> BuiltinType {
    match kind {
        DurationKind::Duration => BuiltinType::Duration,
        DurationKind::DayTime => BuiltinType::DayTimeDuration,
        DurationKind::YearMonth => BuiltinType::YearMonthDuration,
    }
}

/// An atomic value of the XPath data model.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicValue {
    data: AtomicData,
    type_label: AtomicType,
}

static TRUE: AtomicValue = AtomicValue {
    data: AtomicData::Boolean(true),
    type_label: AtomicType::Builtin(BuiltinType::Boolean),
};

static FALSE: AtomicValue = AtomicValue {
    data: AtomicData::Boolean(false),
    type_label: AtomicType::Builtin(BuiltinType::Boolean),
};

const SMALL_INTEGER_LIMIT: usize = 20;

static SMALL_INTEGERS: LazyLock<[AtomicValue; SMALL_INTEGER_LIMIT + 1]> = LazyLock::new(|| {
    std::array::from_fn(|i| AtomicValue {
        data: AtomicData::Integer(IntegerValue::Int64(i64::try_from(i).unwrap_or_default())),
        type_label: BuiltinType::Integer.into(),
    })
});

impl AtomicValue {
    fn builtin(data: AtomicData, label: BuiltinType) -> Self {
        Self {
            data,
            type_label: label.into(),
        }
    }

    pub fn boolean(b: bool) -> Self {
        if b { TRUE.clone() } else { FALSE.clone() }
    }

    /// `xs:integer`; values in `0..=20` come from a shared table.
    pub fn integer(v: impl Into<IntegerValue>) -> Self {
        let v = v.into();
        if let IntegerValue::Int64(i) = v
            && let Ok(idx) = usize::try_from(i)
            && idx <= SMALL_INTEGER_LIMIT
        {
            return SMALL_INTEGERS[idx].clone();
        }
        Self::builtin(AtomicData::Integer(v), BuiltinType::Integer)
    }

    pub fn decimal(v: DecimalValue) -> Self {
        Self::builtin(AtomicData::Decimal(v), BuiltinType::Decimal)
    }

    pub fn double(v: f64) -> Self {
        Self::builtin(AtomicData::Double(v), BuiltinType::Double)
    }

    pub fn float(v: f32) -> Self {
        Self::builtin(AtomicData::Float(v), BuiltinType::Float)
    }

    pub fn from_numeric(n: NumericValue) -> Self {
        match n {
            NumericValue::Integer(i) => Self::integer(i),
            NumericValue::Decimal(d) => Self::decimal(d),
            NumericValue::Float(f) => Self::float(f),
            NumericValue::Double(d) => Self::double(d),
        }
    }

    pub fn string(s: impl Into<StringValue>) -> Self {
        Self::builtin(AtomicData::String(s.into()), BuiltinType::String)
    }

    pub fn untyped(s: impl Into<StringValue>) -> Self {
        Self::builtin(AtomicData::UntypedAtomic(s.into()), BuiltinType::UntypedAtomic)
    }

    /// Trusted `xs:anyURI`; use [`AtomicValue::from_lexical`] to validate.
    pub fn any_uri(s: impl Into<StringValue>) -> Self {
        Self::builtin(AtomicData::AnyUri(s.into()), BuiltinType::AnyUri)
    }

    /// Labelled after the kind of the duration.
    pub fn duration(d: DurationValue) -> Self {
        let label = duration_label(d.kind());
        Self::builtin(AtomicData::Duration(d), label)
    }

    pub fn date_time(v: DateTimeValue) -> Self {
        Self::builtin(AtomicData::DateTime(v), BuiltinType::DateTime)
    }

    pub fn time(v: TimeValue) -> Self {
        Self::builtin(AtomicData::Time(v), BuiltinType::Time)
    }

    /// `xs:date` or one of the g-types, after the kind of `v`.
    pub fn gdate(v: GDateValue) -> Self {
        let label = gdate_primitive(v.kind()).builtin().unwrap_or(BuiltinType::Date);
        Self::builtin(AtomicData::GDate(v), label)
    }

    pub fn hex_binary(v: BinaryValue) -> Self {
        Self::builtin(AtomicData::HexBinary(v), BuiltinType::HexBinary)
    }

    pub fn base64_binary(v: BinaryValue) -> Self {
        Self::builtin(AtomicData::Base64Binary(v), BuiltinType::Base64Binary)
    }

    pub fn qname(v: QNameValue) -> Self {
        Self::builtin(AtomicData::QName(v), BuiltinType::QName)
    }

    pub fn notation(v: QNameValue) -> Self {
        Self::builtin(AtomicData::Notation(v), BuiltinType::Notation)
    }

    /// Wrap a host object.
    pub fn external(v: ExternalValue) -> Self {
        Self {
            data: AtomicData::External(v),
            type_label: AtomicType::External,
        }
    }

    pub fn data(&self) -> &AtomicData {
        &self.data
    }

    pub fn into_data(self) -> AtomicData {
        self.data
    }

    pub fn type_label(&self) -> &AtomicType {
        &self.type_label
    }

    pub fn primitive_kind(&self) -> PrimitiveKind {
        self.data.primitive_kind()
    }

    /// Copy of this value under another label.
    ///
    /// The label must share the primitive kind of the payload (`XPTY0004` otherwise). The
    /// value is not revalidated against the facets of the new label.
    pub fn with_type_label(&self, label: AtomicType) -> Result<Self, Error> {
        if label.primitive() != self.primitive_kind() {
            return Err(Error::type_error(format!(
                "cannot label a {} value as {label}",
                self.primitive_kind()
            )));
        }
        Ok(self.relabel(label))
    }

    pub(crate) fn relabel(&self, label: AtomicType) -> Self {
        Self {
            data: self.data.clone(),
            type_label: label,
        }
    }

    /// XPath string value.
    pub fn string_value(&self) -> Cow<'_, str> {
        match &self.data {
            AtomicData::UntypedAtomic(s) | AtomicData::String(s) | AtomicData::AnyUri(s) => {
                Cow::Borrowed(s.as_str())
            }
            AtomicData::Boolean(b) => Cow::Borrowed(boolean::format_boolean(*b)),
            AtomicData::Integer(i) => Cow::Owned(i.to_string()),
            AtomicData::Decimal(d) => Cow::Owned(d.to_string()),
            AtomicData::Float(f) => Cow::Owned(float::format_float(*f)),
            AtomicData::Double(d) => Cow::Owned(float::format_double(*d)),
            AtomicData::Duration(d) => Cow::Owned(d.to_string()),
            AtomicData::DateTime(d) => Cow::Owned(d.to_string()),
            AtomicData::Time(t) => Cow::Owned(t.to_string()),
            AtomicData::GDate(g) => Cow::Owned(g.to_string()),
            AtomicData::HexBinary(b) => Cow::Owned(b.to_hex()),
            AtomicData::Base64Binary(b) => Cow::Owned(b.to_base64()),
            AtomicData::QName(q) | AtomicData::Notation(q) => Cow::Owned(q.to_string()),
            AtomicData::External(e) => Cow::Owned(e.to_string()),
        }
    }

    /// Canonical lexical representation of XML Schema. Differs from the string value for
    /// decimals (always with a point) and for floats and doubles (always with an
    /// exponent).
    pub fn canonical_lexical(&self) -> String {
        match &self.data {
            AtomicData::Decimal(d) => d.canonical(),
            AtomicData::Float(f) => float::canonical_float(*f),
            AtomicData::Double(d) => float::canonical_double(*d),
            _ => self.string_value().into_owned(),
        }
    }

    /// The value as a member of the numeric tower. Booleans are not numeric here.
    pub fn as_numeric(&self) -> Option<NumericValue> {
        match &self.data {
            AtomicData::Integer(i) => Some(NumericValue::Integer(i.clone())),
            AtomicData::Decimal(d) => Some(NumericValue::Decimal(d.clone())),
            AtomicData::Float(f) => Some(NumericValue::Float(*f)),
            AtomicData::Double(d) => Some(NumericValue::Double(*d)),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.primitive_kind().is_numeric()
    }

    pub fn is_nan(&self) -> bool {
        match self.data {
            AtomicData::Float(f) => f.is_nan(),
            AtomicData::Double(d) => d.is_nan(),
            _ => false,
        }
    }

    /// Effective boolean value of this value as a singleton sequence.
    pub fn effective_boolean_value(&self) -> Result<bool, Error> {
        match &self.data {
            AtomicData::Boolean(b) => Ok(*b),
            AtomicData::String(s) | AtomicData::UntypedAtomic(s) | AtomicData::AnyUri(s) => {
                Ok(!s.is_empty())
            }
            _ => match self.as_numeric() {
                Some(n) => Ok(!n.is_zero() && !n.is_nan()),
                None => Err(Error::from_code(
                    ErrorCode::FORG0006,
                    format!("effective boolean value is not defined for {}", self.type_label),
                )),
            },
        }
    }

    /// Parse `lexical` as a value of the primitive `kind`.
    pub fn from_lexical(
        lexical: &str,
        kind: PrimitiveKind,
        ctx: &ConversionContext,
    ) -> ConversionResult<Self> {
        convert::from_lexical(lexical, kind, ctx)
    }

    /// Cast to a primitive kind following the XPath casting table.
    ///
    /// With `validate` off the caller vouches that the value already fits the target, so
    /// range checks may be skipped. Lexical checks of the target are always applied.
    pub fn convert_primitive(
        &self,
        target: PrimitiveKind,
        validate: bool,
        ctx: &ConversionContext,
    ) -> ConversionResult<Self> {
        convert::convert_primitive(self, target, validate, ctx)
    }

    /// Cast to any atomic type: built-in primitives, built-in derived types and
    /// user-defined restrictions.
    pub fn convert(
        &self,
        target: &AtomicType,
        ctx: &ConversionContext,
        validate: bool,
    ) -> ConversionResult<Self> {
        convert::convert(self, target, ctx, validate)
    }

    /// Extract a component of a temporal or duration value.
    ///
    /// `Ok(None)` when the value lacks the component (a missing timezone, the month of a
    /// `gYear`); `XPTY0004` when the type never has it.
    pub fn get_component(&self, component: Component) -> Result<Option<AtomicValue>, Error> {
        let int = |v: i64| Some(AtomicValue::integer(v));
        let tz = |tz: Option<i16>| -> Result<Option<AtomicValue>, Error> {
            tz.map(|m| DurationValue::from_micros(i128::from(m) * 60_000_000).map(AtomicValue::duration))
                .transpose()
        };
        let seconds = |second: u8, micros: u32| {
            let total = i64::from(second) * 1_000_000 + i64::from(micros);
            Some(AtomicValue::decimal(DecimalValue::new(total.into(), 6)))
        };
        let unsupported = || -> Result<Option<AtomicValue>, Error> {
            Err(Error::type_error(format!(
                "{} has no {component:?} component",
                self.type_label
            )))
        };
        match (&self.data, component) {
            (AtomicData::DateTime(d), c) => match c {
                Component::Year => Ok(int(lexical_year(d.year()))),
                Component::Month => Ok(int(d.month().into())),
                Component::Day => Ok(int(d.day().into())),
                Component::Hours => Ok(int(d.hour().into())),
                Component::Minutes => Ok(int(d.minute().into())),
                Component::Seconds => Ok(seconds(d.second(), d.microsecond())),
                Component::WholeSeconds => Ok(int(d.second().into())),
                Component::Microseconds => Ok(int(d.microsecond().into())),
                Component::Timezone => tz(d.timezone()),
            },
            (AtomicData::Time(t), c) => match c {
                Component::Hours => Ok(int(t.hour().into())),
                Component::Minutes => Ok(int(t.minute().into())),
                Component::Seconds => Ok(seconds(t.second(), t.microsecond())),
                Component::WholeSeconds => Ok(int(t.second().into())),
                Component::Microseconds => Ok(int(t.microsecond().into())),
                Component::Timezone => tz(t.timezone()),
                _ => unsupported(),
            },
            (AtomicData::GDate(g), c) => match c {
                Component::Year => Ok(g.has_year().then(|| AtomicValue::integer(lexical_year(g.year())))),
                Component::Month => Ok(g.has_month().then(|| AtomicValue::integer(i64::from(g.month())))),
                Component::Day => Ok(g.has_day().then(|| AtomicValue::integer(i64::from(g.day())))),
                Component::Timezone => tz(g.timezone()),
                _ => unsupported(),
            },
            (AtomicData::Duration(d), c) => {
                let sign: i128 = if d.is_negative() { -1 } else { 1 };
                let signed = |v: i128| {
                    Some(AtomicValue::integer(IntegerValue::from_big((v * sign).into())))
                };
                match c {
                    Component::Year => Ok(signed(d.years().into())),
                    Component::Month => Ok(signed(d.months().into())),
                    Component::Day => Ok(signed(d.days())),
                    Component::Hours => Ok(signed(d.hours())),
                    Component::Minutes => Ok(signed(d.minutes())),
                    Component::Seconds => Ok(Some(AtomicValue::decimal(d.seconds_with_fraction()))),
                    Component::WholeSeconds => Ok(signed(d.seconds())),
                    Component::Microseconds => Ok(signed(d.microseconds())),
                    Component::Timezone => unsupported(),
                }
            }
            _ => unsupported(),
        }
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value())
    }
}

impl From<bool> for AtomicValue {
    fn from(b: bool) -> Self {
        AtomicValue::boolean(b)
    }
}

impl From<i64> for AtomicValue {
    fn from(v: i64) -> Self {
        AtomicValue::integer(v)
    }
}

impl From<f64> for AtomicValue {
    fn from(v: f64) -> Self {
        AtomicValue::double(v)
    }
}

impl From<&str> for AtomicValue {
    fn from(s: &str) -> Self {
        AtomicValue::string(s)
    }
}

impl From<String> for AtomicValue {
    fn from(s: String) -> Self {
        AtomicValue::string(s)
    }
}

/// Failure of a cast from `value` to `target`, as a type error.
pub(crate) fn cast_type_error(value: &AtomicValue, target: impl fmt::Display) -> ValidationError {
    ValidationError::type_error(format!("cannot cast {} to {target}", value.type_label))
}
