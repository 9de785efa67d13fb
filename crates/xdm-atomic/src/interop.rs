//! Mapping between atomic values and host representations.
//!
//! [`convert_to_external`] hands a value to host code in the representation the caller
//! asks for; [`from_external`] wraps a host value as the natural atomic type. Pairs with
//! no mapping fail with `XDMI0001`.

use core::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike};
use num_bigint::BigInt;
use rust_decimal::Decimal;

use crate::context::ConversionContext;
use crate::error::{Error, ErrorCode};
use crate::temporal::{DateTimeValue, DurationKind, DurationValue, GDateKind, GDateValue, TimeValue};
use crate::types::BuiltinType;
use crate::value::binary::BinaryValue;
use crate::value::decimal::DecimalValue;
use crate::value::integer::IntegerValue;
use crate::value::numeric::NumericValue;
use crate::value::{AtomicData, AtomicValue};

/// Host representations an atomic value can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalType {
    Bool,
    I64,
    I32,
    I16,
    I8,
    F64,
    F32,
    String,
    Bytes,
    BigInt,
    Decimal,
    Date,
    DateTime,
    Time,
    TimeDelta,
}

impl fmt::Display for ExternalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExternalType::Bool => "bool",
            ExternalType::I64 => "i64",
            ExternalType::I32 => "i32",
            ExternalType::I16 => "i16",
            ExternalType::I8 => "i8",
            ExternalType::F64 => "f64",
            ExternalType::F32 => "f32",
            ExternalType::String => "String",
            ExternalType::Bytes => "Vec<u8>",
            ExternalType::BigInt => "BigInt",
            ExternalType::Decimal => "Decimal",
            ExternalType::Date => "NaiveDate",
            ExternalType::DateTime => "DateTime<FixedOffset>",
            ExternalType::Time => "NaiveTime",
            ExternalType::TimeDelta => "TimeDelta",
        })
    }
}

/// A host value, either produced by [`convert_to_external`] or wrapped as an
/// external-object atomic value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalValue {
    Bool(bool),
    I64(i64),
    I32(i32),
    I16(i16),
    I8(i8),
    F64(f64),
    F32(f32),
    String(String),
    Bytes(Vec<u8>),
    BigInt(BigInt),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Time(NaiveTime),
    TimeDelta(TimeDelta),
}

impl ExternalValue {
    pub fn external_type(&self) -> ExternalType {
        match self {
            ExternalValue::Bool(_) => ExternalType::Bool,
            ExternalValue::I64(_) => ExternalType::I64,
            ExternalValue::I32(_) => ExternalType::I32,
            ExternalValue::I16(_) => ExternalType::I16,
            ExternalValue::I8(_) => ExternalType::I8,
            ExternalValue::F64(_) => ExternalType::F64,
            ExternalValue::F32(_) => ExternalType::F32,
            ExternalValue::String(_) => ExternalType::String,
            ExternalValue::Bytes(_) => ExternalType::Bytes,
            ExternalValue::BigInt(_) => ExternalType::BigInt,
            ExternalValue::Decimal(_) => ExternalType::Decimal,
            ExternalValue::Date(_) => ExternalType::Date,
            ExternalValue::DateTime(_) => ExternalType::DateTime,
            ExternalValue::Time(_) => ExternalType::Time,
            ExternalValue::TimeDelta(_) => ExternalType::TimeDelta,
        }
    }
}

impl fmt::Display for ExternalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalValue::Bool(v) => write!(f, "{v}"),
            ExternalValue::I64(v) => write!(f, "{v}"),
            ExternalValue::I32(v) => write!(f, "{v}"),
            ExternalValue::I16(v) => write!(f, "{v}"),
            ExternalValue::I8(v) => write!(f, "{v}"),
            ExternalValue::F64(v) => write!(f, "{v}"),
            ExternalValue::F32(v) => write!(f, "{v}"),
            ExternalValue::String(v) => f.write_str(v),
            ExternalValue::Bytes(v) => write!(f, "{v:?}"),
            ExternalValue::BigInt(v) => write!(f, "{v}"),
            ExternalValue::Decimal(v) => write!(f, "{v}"),
            ExternalValue::Date(v) => write!(f, "{v}"),
            ExternalValue::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            ExternalValue::Time(v) => write!(f, "{v}"),
            ExternalValue::TimeDelta(v) => write!(f, "{v}"),
        }
    }
}

fn no_mapping(value: &AtomicValue, target: ExternalType) -> Error {
    Error::from_code(
        ErrorCode::XDMI0001,
        format!(
            "no {target} representation for {} value '{}'",
            value.type_label(),
            value.string_value()
        ),
    )
}

fn exact_integer(value: &AtomicValue) -> Option<IntegerValue> {
    match value.as_numeric()? {
        NumericValue::Integer(i) => Some(i),
        n if n.is_whole_number() => n.to_integer().ok(),
        _ => None,
    }
}

fn offset(minutes: i16) -> Option<FixedOffset> {
    FixedOffset::east_opt(i32::from(minutes) * 60)
}

/// Convert `value` to the host representation `target`.
pub fn convert_to_external(
    value: &AtomicValue,
    target: ExternalType,
    ctx: &ConversionContext,
) -> Result<ExternalValue, Error> {
    if let AtomicData::External(ext) = value.data() {
        if ext.external_type() == target {
            return Ok(ext.clone());
        }
        return convert_to_external(&from_external(ext)?, target, ctx);
    }
    let fail = || no_mapping(value, target);
    let mapped = match (target, value.data()) {
        (ExternalType::String, _) => Some(ExternalValue::String(value.string_value().into_owned())),
        (ExternalType::Bool, AtomicData::Boolean(b)) => Some(ExternalValue::Bool(*b)),
        (ExternalType::I64, _) => exact_integer(value)
            .and_then(|i| i.as_i64())
            .map(ExternalValue::I64),
        (ExternalType::I32, _) => exact_integer(value)
            .and_then(|i| i32::try_from(i.as_i64()?).ok())
            .map(ExternalValue::I32),
        (ExternalType::I16, _) => exact_integer(value)
            .and_then(|i| i16::try_from(i.as_i64()?).ok())
            .map(ExternalValue::I16),
        (ExternalType::I8, _) => exact_integer(value)
            .and_then(|i| i8::try_from(i.as_i64()?).ok())
            .map(ExternalValue::I8),
        (ExternalType::BigInt, _) => exact_integer(value).map(|i| ExternalValue::BigInt(i.to_big())),
        (ExternalType::F64, _) => value.as_numeric().map(|n| ExternalValue::F64(n.to_double())),
        (ExternalType::F32, _) => value.as_numeric().map(|n| ExternalValue::F32(n.to_float())),
        (ExternalType::Decimal, _) => match value.as_numeric() {
            Some(NumericValue::Float(_) | NumericValue::Double(_)) => value
                .as_numeric()
                .and_then(|n| Decimal::try_from(n.to_double()).ok())
                .map(ExternalValue::Decimal),
            Some(n) => n
                .to_decimal()
                .ok()
                .and_then(|d| Decimal::from_str_exact(&d.to_string()).ok())
                .map(ExternalValue::Decimal),
            None => None,
        },
        (ExternalType::Bytes, AtomicData::HexBinary(b) | AtomicData::Base64Binary(b)) => {
            Some(ExternalValue::Bytes(b.as_bytes().to_vec()))
        }
        (ExternalType::Date, AtomicData::GDate(d)) if d.kind() == GDateKind::Date => {
            i32::try_from(d.year())
                .ok()
                .and_then(|y| NaiveDate::from_ymd_opt(y, u32::from(d.month()), u32::from(d.day())))
                .map(ExternalValue::Date)
        }
        (ExternalType::DateTime, AtomicData::DateTime(dt)) => {
            let tz = offset(dt.timezone().unwrap_or(ctx.implicit_timezone));
            let naive = i32::try_from(dt.year())
                .ok()
                .and_then(|y| NaiveDate::from_ymd_opt(y, u32::from(dt.month()), u32::from(dt.day())))
                .and_then(|date| {
                    date.and_hms_micro_opt(
                        u32::from(dt.hour()),
                        u32::from(dt.minute()),
                        u32::from(dt.second()),
                        dt.microsecond(),
                    )
                });
            match (tz, naive) {
                (Some(tz), Some(naive)) => tz
                    .from_local_datetime(&naive)
                    .single()
                    .map(ExternalValue::DateTime),
                _ => None,
            }
        }
        (ExternalType::Time, AtomicData::Time(t)) => NaiveTime::from_hms_micro_opt(
            u32::from(t.hour()),
            u32::from(t.minute()),
            u32::from(t.second()),
            t.microsecond(),
        )
        .map(ExternalValue::Time),
        (ExternalType::TimeDelta, AtomicData::Duration(d)) if d.kind() == DurationKind::DayTime => {
            i64::try_from(d.signed_micros())
                .ok()
                .map(|us| ExternalValue::TimeDelta(TimeDelta::microseconds(us)))
        }
        _ => None,
    };
    mapped.ok_or_else(fail)
}

/// Wrap a host value as the atomic value of its natural type.
pub fn from_external(value: &ExternalValue) -> Result<AtomicValue, Error> {
    let integer = |i: i64, label: BuiltinType| {
        AtomicValue::integer(i).relabel(label.into())
    };
    Ok(match value {
        ExternalValue::Bool(b) => AtomicValue::boolean(*b),
        ExternalValue::I64(v) => integer(*v, BuiltinType::Long),
        ExternalValue::I32(v) => integer(i64::from(*v), BuiltinType::Int),
        ExternalValue::I16(v) => integer(i64::from(*v), BuiltinType::Short),
        ExternalValue::I8(v) => integer(i64::from(*v), BuiltinType::Byte),
        ExternalValue::F64(v) => AtomicValue::double(*v),
        ExternalValue::F32(v) => AtomicValue::float(*v),
        ExternalValue::String(s) => AtomicValue::string(s.as_str()),
        ExternalValue::Bytes(b) => AtomicValue::base64_binary(BinaryValue::new(b.clone())),
        ExternalValue::BigInt(b) => AtomicValue::integer(IntegerValue::from_big(b.clone())),
        ExternalValue::Decimal(d) => AtomicValue::decimal(DecimalValue::parse(&d.to_string())?),
        ExternalValue::Date(d) => AtomicValue::gdate(GDateValue::date(
            i64::from(d.year()),
            u8::try_from(d.month()).unwrap_or(1),
            u8::try_from(d.day()).unwrap_or(1),
            None,
        )?),
        ExternalValue::DateTime(dt) => {
            let local = dt.naive_local();
            let tz = i16::try_from(dt.offset().local_minus_utc() / 60).ok();
            AtomicValue::date_time(DateTimeValue::new(
                i64::from(local.year()),
                u8::try_from(local.month()).unwrap_or(1),
                u8::try_from(local.day()).unwrap_or(1),
                u8::try_from(local.hour()).unwrap_or(0),
                u8::try_from(local.minute()).unwrap_or(0),
                u8::try_from(local.second()).unwrap_or(0),
                local.nanosecond() / 1000 % 1_000_000,
                tz,
            )?)
        }
        ExternalValue::Time(t) => AtomicValue::time(TimeValue::new(
            u8::try_from(t.hour()).unwrap_or(0),
            u8::try_from(t.minute()).unwrap_or(0),
            u8::try_from(t.second()).unwrap_or(0),
            t.nanosecond() / 1000 % 1_000_000,
            None,
        )?),
        ExternalValue::TimeDelta(d) => {
            let micros = d
                .num_microseconds()
                .map_or_else(|| i128::from(d.num_milliseconds()) * 1000, i128::from);
            AtomicValue::duration(DurationValue::from_micros(micros)?)
        }
    })
}
