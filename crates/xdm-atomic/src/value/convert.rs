//! The cast engine.
//!
//! `from_lexical` is the single switch from a string to every primitive kind.
//! `convert_primitive` implements the XPath casting table between primitives, and
//! `convert` layers built-in derived types and user-defined restrictions on top of it.

use tracing::{debug, trace};

use crate::context::ConversionContext;
use crate::error::{ConversionResult, ValidationError};
use crate::temporal::{DateTimeValue, DurationKind, DurationValue, GDateKind, GDateValue, TimeValue};
use crate::types::{AtomicType, BuiltinType, PrimitiveKind};
use crate::value::any_uri::validate_any_uri;
use crate::value::binary::BinaryValue;
use crate::value::boolean::parse_boolean;
use crate::value::decimal::DecimalValue;
use crate::value::float::{parse_double, parse_float};
use crate::value::integer::IntegerValue;
use crate::value::numeric::NumericValue;
use crate::value::qname::QNameValue;
use crate::value::string::{StringValue, trim_xml_whitespace, validate_restricted};
use crate::value::{AtomicData, AtomicValue, cast_type_error};

fn duration_kind(kind: PrimitiveKind) -> Option<DurationKind> {
    match kind {
        PrimitiveKind::Duration => Some(DurationKind::Duration),
        PrimitiveKind::DayTimeDuration => Some(DurationKind::DayTime),
        PrimitiveKind::YearMonthDuration => Some(DurationKind::YearMonth),
        _ => None,
    }
}

fn gdate_kind(kind: PrimitiveKind) -> Option<GDateKind> {
    match kind {
        PrimitiveKind::Date => Some(GDateKind::Date),
        PrimitiveKind::GYearMonth => Some(GDateKind::GYearMonth),
        PrimitiveKind::GYear => Some(GDateKind::GYear),
        PrimitiveKind::GMonthDay => Some(GDateKind::GMonthDay),
        PrimitiveKind::GMonth => Some(GDateKind::GMonth),
        PrimitiveKind::GDay => Some(GDateKind::GDay),
        _ => None,
    }
}

pub(super) fn from_lexical(
    lexical: &str,
    kind: PrimitiveKind,
    ctx: &ConversionContext,
) -> ConversionResult<AtomicValue> {
    if let Some(k) = duration_kind(kind) {
        return DurationValue::parse(lexical, k).map(AtomicValue::duration);
    }
    if let Some(k) = gdate_kind(kind) {
        return GDateValue::parse(lexical, k).map(AtomicValue::gdate);
    }
    Ok(match kind {
        PrimitiveKind::UntypedAtomic => AtomicValue::untyped(lexical),
        PrimitiveKind::String => AtomicValue::string(lexical),
        PrimitiveKind::Boolean => AtomicValue::boolean(parse_boolean(lexical)?),
        PrimitiveKind::Decimal => AtomicValue::decimal(DecimalValue::parse(lexical)?),
        PrimitiveKind::Integer => AtomicValue::integer(IntegerValue::parse(lexical)?),
        PrimitiveKind::Float => AtomicValue::float(parse_float(lexical)?),
        PrimitiveKind::Double => AtomicValue::double(parse_double(lexical)?),
        PrimitiveKind::DateTime => AtomicValue::date_time(DateTimeValue::parse(lexical)?),
        PrimitiveKind::Time => AtomicValue::time(TimeValue::parse(lexical)?),
        PrimitiveKind::HexBinary => AtomicValue::hex_binary(BinaryValue::from_hex(lexical)?),
        PrimitiveKind::Base64Binary => {
            AtomicValue::base64_binary(BinaryValue::from_base64(lexical)?)
        }
        PrimitiveKind::AnyUri => AtomicValue::any_uri(validate_any_uri(lexical)?),
        PrimitiveKind::QName => AtomicValue::qname(QNameValue::parse(lexical, ctx.name_checker())?),
        PrimitiveKind::Notation => {
            AtomicValue::notation(QNameValue::parse(lexical, ctx.name_checker())?)
        }
        PrimitiveKind::External => {
            return Err(ValidationError::type_error(
                "host objects have no lexical representation",
            ));
        }
        _ => return Err(ValidationError::type_error(format!("no lexical space for {kind}"))),
    })
}

fn numeric_source(value: &AtomicValue) -> Option<NumericValue> {
    match value.data() {
        AtomicData::Boolean(b) => Some(NumericValue::from(*b)),
        _ => value.as_numeric(),
    }
}

pub(super) fn convert_primitive(
    value: &AtomicValue,
    target: PrimitiveKind,
    validate: bool,
    ctx: &ConversionContext,
) -> ConversionResult<AtomicValue> {
    let source = value.primitive_kind();
    let converted = cast(value, source, target, ctx);
    if let Err(e) = &converted {
        trace!(
            source = %value.type_label(),
            target = %target,
            validate,
            code = %e.code,
            "cast rejected"
        );
    }
    converted
}

fn cast(
    value: &AtomicValue,
    source: PrimitiveKind,
    target: PrimitiveKind,
    ctx: &ConversionContext,
) -> ConversionResult<AtomicValue> {
    if source == target {
        return Ok(match target.builtin() {
            Some(b) => value.relabel(b.into()),
            None => value.clone(),
        });
    }
    match target {
        PrimitiveKind::String => return Ok(AtomicValue::string(value.string_value().as_ref())),
        PrimitiveKind::UntypedAtomic => {
            return Ok(AtomicValue::untyped(value.string_value().as_ref()));
        }
        _ => {}
    }
    match source {
        PrimitiveKind::String => return from_lexical(&value.string_value(), target, ctx),
        PrimitiveKind::UntypedAtomic
            if !matches!(target, PrimitiveKind::QName | PrimitiveKind::Notation) =>
        {
            return from_lexical(&value.string_value(), target, ctx);
        }
        _ => {}
    }
    let fail = || cast_type_error(value, target);
    match (target, value.data()) {
        (PrimitiveKind::Boolean, _) => numeric_source(value)
            .map(|n| AtomicValue::boolean(!n.is_zero() && !n.is_nan()))
            .ok_or_else(fail),
        (PrimitiveKind::Double, _) => numeric_source(value)
            .map(|n| AtomicValue::double(n.to_double()))
            .ok_or_else(fail),
        (PrimitiveKind::Float, _) => numeric_source(value)
            .map(|n| AtomicValue::float(n.to_float()))
            .ok_or_else(fail),
        (PrimitiveKind::Decimal, _) => match numeric_source(value) {
            Some(n) => Ok(AtomicValue::decimal(n.to_decimal()?)),
            None => Err(fail()),
        },
        (PrimitiveKind::Integer, _) => match numeric_source(value) {
            Some(n) => Ok(AtomicValue::integer(n.to_integer()?)),
            None => Err(fail()),
        },
        (t, AtomicData::Duration(d)) if duration_kind(t).is_some() => {
            let kind = duration_kind(t).ok_or_else(fail)?;
            Ok(AtomicValue::duration(d.to_kind(kind)))
        }
        (PrimitiveKind::DateTime, AtomicData::GDate(g)) if g.kind() == GDateKind::Date => {
            Ok(AtomicValue::date_time(g.to_date_time()))
        }
        (PrimitiveKind::Time, AtomicData::DateTime(dt)) => Ok(AtomicValue::time(dt.time())),
        (t, AtomicData::DateTime(dt)) if gdate_kind(t).is_some() => {
            let kind = gdate_kind(t).ok_or_else(fail)?;
            Ok(AtomicValue::gdate(dt.gdate(kind)))
        }
        (t, AtomicData::GDate(g)) if g.kind() == GDateKind::Date && gdate_kind(t).is_some() => {
            let kind = gdate_kind(t).ok_or_else(fail)?;
            Ok(AtomicValue::gdate(g.project(kind)))
        }
        (PrimitiveKind::HexBinary, AtomicData::Base64Binary(b)) => {
            Ok(AtomicValue::hex_binary(b.clone()))
        }
        (PrimitiveKind::Base64Binary, AtomicData::HexBinary(b)) => {
            Ok(AtomicValue::base64_binary(b.clone()))
        }
        _ => Err(fail()),
    }
}

/// Cast to a built-in type, primitive or derived.
fn convert_builtin(
    value: &AtomicValue,
    target: BuiltinType,
    ctx: &ConversionContext,
    validate: bool,
) -> ConversionResult<AtomicValue> {
    let base = convert_primitive(value, target.primitive(), validate, ctx)?;
    if target.is_primitive() {
        return Ok(base);
    }
    match base.data() {
        AtomicData::Integer(i) => {
            if validate {
                if target.is_unsigned()
                    && value.primitive_kind().is_string_like()
                    && trim_xml_whitespace(&value.string_value()).starts_with('+')
                {
                    return Err(ValidationError::invalid(format!(
                        "a leading '+' is not allowed in {}",
                        target.display_name()
                    )));
                }
                i.check_range(target)?;
            }
        }
        AtomicData::String(s) => {
            if let Some(kind) = target.string_kind() {
                let normalized = validate_restricted(kind, s.as_str(), ctx.name_checker())?;
                return Ok(AtomicValue::string(StringValue::new(normalized)).relabel(target.into()));
            }
        }
        _ => {}
    }
    Ok(base.relabel(target.into()))
}

pub(super) fn convert(
    value: &AtomicValue,
    target: &AtomicType,
    ctx: &ConversionContext,
    validate: bool,
) -> ConversionResult<AtomicValue> {
    match target {
        AtomicType::Builtin(b) => convert_builtin(value, *b, ctx, validate),
        AtomicType::External => match value.data() {
            AtomicData::External(_) => Ok(value.clone()),
            _ => Err(cast_type_error(value, target)),
        },
        AtomicType::User(user) => {
            let ancestor = target
                .builtin_ancestor()
                .ok_or_else(|| cast_type_error(value, target))?;
            let base = convert_builtin(value, ancestor, ctx, validate)?;
            user.validate(&base, ctx)?;
            debug!(type_name = %user.name, "applied user-defined type label");
            Ok(base.relabel(target.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rstest::rstest;

    fn ctx() -> ConversionContext {
        ConversionContext::default()
    }

    fn cast_str(s: &str, target: BuiltinType) -> ConversionResult<AtomicValue> {
        AtomicValue::string(s).convert(&target.into(), &ctx(), true)
    }

    #[rstest]
    #[case("12", BuiltinType::Integer, "12")]
    #[case(" 1000.00 ", BuiltinType::Decimal, "1000")]
    #[case("-INF", BuiltinType::Double, "-INF")]
    #[case("1", BuiltinType::Boolean, "true")]
    #[case("P1Y13M", BuiltinType::YearMonthDuration, "P2Y1M")]
    #[case("2024-02-29", BuiltinType::Date, "2024-02-29")]
    #[case("--02-29", BuiltinType::GMonthDay, "--02-29")]
    #[case("0fA1", BuiltinType::HexBinary, "0FA1")]
    #[case("  a   b ", BuiltinType::Token, "a b")]
    #[case("255", BuiltinType::UnsignedByte, "255")]
    #[case("http://example.com/a b", BuiltinType::AnyUri, "http://example.com/a b")]
    fn from_string(#[case] input: &str, #[case] target: BuiltinType, #[case] expected: &str) {
        let v = cast_str(input, target).unwrap();
        assert_eq!(v.string_value(), expected);
        assert_eq!(v.type_label(), &AtomicType::Builtin(target));
    }

    #[rstest]
    #[case("256", BuiltinType::UnsignedByte, ErrorCode::FORG0001)]
    #[case("+1", BuiltinType::UnsignedInt, ErrorCode::FORG0001)]
    #[case("1abc", BuiltinType::Id, ErrorCode::FORG0001)]
    #[case("1.5", BuiltinType::Integer, ErrorCode::FORG0001)]
    #[case("2023-02-29", BuiltinType::Date, ErrorCode::FORG0001)]
    #[case("p:local", BuiltinType::QName, ErrorCode::FONS0004)]
    fn from_string_rejected(#[case] input: &str, #[case] target: BuiltinType, #[case] code: ErrorCode) {
        assert_eq!(cast_str(input, target).unwrap_err().code, code);
    }

    #[test]
    fn range_checks_can_be_skipped_by_the_caller() {
        let v = AtomicValue::integer(300);
        assert!(v.convert(&BuiltinType::UnsignedByte.into(), &ctx(), true).is_err());
        let trusted = v.convert(&BuiltinType::UnsignedByte.into(), &ctx(), false).unwrap();
        assert_eq!(trusted.type_label(), &AtomicType::Builtin(BuiltinType::UnsignedByte));
        // lexical checks of restricted strings still apply
        let s = AtomicValue::string("1abc");
        assert!(s.convert(&BuiltinType::NCName.into(), &ctx(), false).is_err());
    }

    #[rstest]
    #[case(AtomicValue::double(f64::NAN), PrimitiveKind::Integer, ErrorCode::FOCA0002)]
    #[case(AtomicValue::double(f64::INFINITY), PrimitiveKind::Decimal, ErrorCode::FOCA0002)]
    #[case(AtomicValue::boolean(true), PrimitiveKind::Date, ErrorCode::XPTY0004)]
    #[case(AtomicValue::untyped("x"), PrimitiveKind::QName, ErrorCode::XPTY0004)]
    fn primitive_cast_failures(#[case] v: AtomicValue, #[case] target: PrimitiveKind, #[case] code: ErrorCode) {
        let e = v.convert_primitive(target, true, &ctx()).unwrap_err();
        assert_eq!(e.code, code);
        assert_eq!(e.is_type_error, code == ErrorCode::XPTY0004);
    }

    #[test]
    fn casting_table_paths() {
        let c = ctx();
        let dt = AtomicValue::from_lexical("2024-07-04T10:30:00Z", PrimitiveKind::DateTime, &c).unwrap();
        let cast = |v: &AtomicValue, k| v.convert_primitive(k, true, &c).unwrap().string_value().into_owned();
        assert_eq!(cast(&dt, PrimitiveKind::Date), "2024-07-04Z");
        assert_eq!(cast(&dt, PrimitiveKind::Time), "10:30:00Z");
        assert_eq!(cast(&dt, PrimitiveKind::GYearMonth), "2024-07Z");
        let date = dt.convert_primitive(PrimitiveKind::Date, true, &c).unwrap();
        assert_eq!(cast(&date, PrimitiveKind::DateTime), "2024-07-04T00:00:00Z");
        assert_eq!(cast(&AtomicValue::double(-3.7), PrimitiveKind::Integer), "-3");
        assert_eq!(cast(&AtomicValue::boolean(true), PrimitiveKind::Decimal), "1");
        assert_eq!(cast(&AtomicValue::integer(0), PrimitiveKind::Boolean), "false");
        let hex = AtomicValue::hex_binary(BinaryValue::new(vec![0xCA, 0xFE]));
        assert_eq!(cast(&hex, PrimitiveKind::Base64Binary), "yv4=");
        let d = AtomicValue::from_lexical("P1Y2M3DT4H", PrimitiveKind::Duration, &c).unwrap();
        assert_eq!(cast(&d, PrimitiveKind::DayTimeDuration), "P3DT4H");
        assert_eq!(cast(&d, PrimitiveKind::YearMonthDuration), "P1Y2M");
    }

    #[test]
    fn derived_values_cast_back_to_their_primitive() {
        let c = ctx();
        let b = AtomicValue::integer(5)
            .convert(&BuiltinType::Byte.into(), &c, true)
            .unwrap();
        let i = b.convert_primitive(PrimitiveKind::Integer, true, &c).unwrap();
        assert_eq!(i.type_label(), &AtomicType::Builtin(BuiltinType::Integer));
    }
}
