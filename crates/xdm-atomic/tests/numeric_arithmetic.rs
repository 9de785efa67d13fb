use platynui_xdm::value::integer::IntegerValue;
use platynui_xdm::{
    ArithmeticOp as Op, AtomicData, AtomicValue, BuiltinType, ConversionContext, ErrorCode,
    PrimitiveKind, arithmetic, negate,
};
use rstest::rstest;

fn ctx() -> ConversionContext {
    ConversionContext::default()
}

fn dec(s: &str) -> AtomicValue {
    AtomicValue::from_lexical(s, PrimitiveKind::Decimal, &ctx()).unwrap()
}

fn eval(lhs: &AtomicValue, op: Op, rhs: &AtomicValue) -> AtomicValue {
    arithmetic(lhs, op, rhs, &ctx()).unwrap()
}

#[rstest]
#[case(AtomicValue::integer(5), Op::Plus, dec("2.5"), "7.5", BuiltinType::Decimal)]
#[case(AtomicValue::integer(5), Op::Plus, AtomicValue::float(0.5), "5.5", BuiltinType::Float)]
#[case(dec("0.1"), Op::Plus, AtomicValue::double(1.0), "1.1", BuiltinType::Double)]
#[case(AtomicValue::float(1.5), Op::Times, AtomicValue::double(2.0), "3", BuiltinType::Double)]
#[case(AtomicValue::integer(7), Op::Minus, AtomicValue::integer(10), "-3", BuiltinType::Integer)]
#[case(AtomicValue::untyped("4"), Op::Plus, AtomicValue::integer(1), "5", BuiltinType::Double)]
fn numeric_promotion(
    #[case] lhs: AtomicValue,
    #[case] op: Op,
    #[case] rhs: AtomicValue,
    #[case] expected: &str,
    #[case] label: BuiltinType,
) {
    let out = eval(&lhs, op, &rhs);
    assert_eq!(out.string_value(), expected);
    assert_eq!(out.type_label().as_builtin(), Some(label));
}

#[test]
fn integer_overflow_moves_to_big_integers() {
    let max = AtomicValue::integer(i64::MAX);
    let out = eval(&max, Op::Plus, &AtomicValue::integer(1));
    assert_eq!(out.string_value(), "9223372036854775808");
    assert!(matches!(out.data(), AtomicData::Integer(IntegerValue::Big(_))));

    let back = eval(&out, Op::Minus, &AtomicValue::integer(1));
    assert_eq!(back.data(), &AtomicData::Integer(IntegerValue::Int64(i64::MAX)));

    let min = AtomicValue::integer(i64::MIN);
    let squared = eval(&min, Op::Times, &min);
    assert_eq!(squared.string_value(), "85070591730234615865843651857942052864");
}

#[rstest]
#[case(10, 5, "2", BuiltinType::Integer)]
#[case(10, 4, "2.5", BuiltinType::Decimal)]
#[case(1, 3, "0.333333333333333333", BuiltinType::Decimal)]
#[case(-7, 2, "-3.5", BuiltinType::Decimal)]
fn integer_division_exactness(
    #[case] a: i64,
    #[case] b: i64,
    #[case] expected: &str,
    #[case] label: BuiltinType,
) {
    let out = eval(&AtomicValue::integer(a), Op::Div, &AtomicValue::integer(b));
    assert_eq!(out.string_value(), expected);
    assert_eq!(out.type_label().as_builtin(), Some(label));
}

#[rstest]
#[case(7, Op::IDiv, 2, "3")]
#[case(-7, Op::IDiv, 2, "-3")]
#[case(7, Op::Mod, -2, "1")]
#[case(-7, Op::Mod, 2, "-1")]
fn truncating_division(#[case] a: i64, #[case] op: Op, #[case] b: i64, #[case] expected: &str) {
    assert_eq!(eval(&AtomicValue::integer(a), op, &AtomicValue::integer(b)).string_value(), expected);
}

#[rstest]
#[case(AtomicValue::integer(1), Op::Div, AtomicValue::integer(0))]
#[case(AtomicValue::integer(1), Op::IDiv, AtomicValue::integer(0))]
#[case(AtomicValue::integer(1), Op::Mod, AtomicValue::integer(0))]
#[case(dec("1.5"), Op::Div, dec("0.0"))]
#[case(AtomicValue::double(1.0), Op::IDiv, AtomicValue::double(0.0))]
fn division_by_zero(#[case] lhs: AtomicValue, #[case] op: Op, #[case] rhs: AtomicValue) {
    assert_eq!(arithmetic(&lhs, op, &rhs, &ctx()).unwrap_err().code, ErrorCode::FOAR0001);
}

#[test]
fn floating_point_division_follows_ieee() {
    let one = AtomicValue::double(1.0);
    let zero = AtomicValue::double(0.0);
    assert_eq!(eval(&one, Op::Div, &zero).string_value(), "INF");
    assert_eq!(eval(&negate(&one, &ctx()).unwrap(), Op::Div, &zero).string_value(), "-INF");
    assert!(eval(&zero, Op::Div, &zero).is_nan());
    assert!(eval(&one, Op::Mod, &zero).is_nan());
}

#[test]
fn idiv_of_infinity_overflows() {
    let inf = AtomicValue::double(f64::INFINITY);
    let err = arithmetic(&inf, Op::IDiv, &AtomicValue::double(2.0), &ctx()).unwrap_err();
    assert_eq!(err.code, ErrorCode::FOAR0002);
}

#[rstest]
#[case("1000", "1000")]
#[case("1000.00", "1000")]
#[case("-0.500", "-0.5")]
#[case("+.25", "0.25")]
#[case("00012.3400", "12.34")]
fn decimal_serialization_strips_trailing_zeros(#[case] lexical: &str, #[case] expected: &str) {
    assert_eq!(dec(lexical).string_value(), expected);
}

#[test]
fn decimal_canonical_form_keeps_a_point() {
    assert_eq!(dec("1000.00").canonical_lexical(), "1000.0");
    assert_eq!(dec("12.5").canonical_lexical(), "12.5");
}

#[rstest]
#[case(1e6, "1.0E6")]
#[case(123_456.0, "123456")]
#[case(0.000_001, "0.000001")]
#[case(1.5e-7, "1.5E-7")]
#[case(-0.0, "-0")]
fn double_string_values(#[case] v: f64, #[case] expected: &str) {
    assert_eq!(AtomicValue::double(v).string_value(), expected);
}
