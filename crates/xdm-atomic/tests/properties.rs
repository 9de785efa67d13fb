use platynui_xdm::value::decimal::DecimalValue;
use platynui_xdm::{
    ArithmeticOp, AtomicValue, ComparisonOp, ConversionContext, DurationKind, DurationValue,
    GDateValue, PrimitiveKind, arithmetic, equality_key, value_compare,
};
use proptest::prelude::*;

fn ctx() -> ConversionContext {
    ConversionContext::default()
}

proptest! {
    #[test]
    fn integer_addition_is_undone_by_subtraction(a in any::<i64>(), b in any::<i64>()) {
        let c = ctx();
        let (x, y) = (AtomicValue::integer(a), AtomicValue::integer(b));
        let sum = arithmetic(&x, ArithmeticOp::Plus, &y, &c).unwrap();
        let back = arithmetic(&sum, ArithmeticOp::Minus, &y, &c).unwrap();
        prop_assert_eq!(back, x);
        prop_assert_eq!(sum.string_value(), (i128::from(a) + i128::from(b)).to_string());
    }

    #[test]
    fn integer_ordering_matches_i64(a in any::<i64>(), b in any::<i64>()) {
        let c = ctx();
        let lt = value_compare(&AtomicValue::integer(a), ComparisonOp::Lt, &AtomicValue::integer(b), &c, None).unwrap();
        prop_assert_eq!(lt, a < b);
    }

    #[test]
    fn decimal_lexical_form_reparses(int in -1_000_000_000i64..1_000_000_000, frac in 0u32..1_000_000, scale in 0usize..7) {
        let lexical = format!("{int}.{frac:06}");
        let lexical = &lexical[..lexical.len() - (6 - scale)];
        let d = DecimalValue::parse(lexical).unwrap();
        let again = DecimalValue::parse(&d.to_string()).unwrap();
        prop_assert_eq!(&again, &d);
        prop_assert!(!d.to_string().contains('E'));
    }

    #[test]
    fn julian_day_numbers_round_trip(jdn in 0i64..5_000_000) {
        let date = GDateValue::date_from_julian_day_number(jdn, None);
        prop_assert_eq!(date.julian_day_number(), jdn);
    }

    #[test]
    fn day_time_durations_reparse(micros in -10_000_000_000_000i128..10_000_000_000_000) {
        let d = DurationValue::from_micros(micros).unwrap();
        let again = DurationValue::parse(&d.to_string(), DurationKind::DayTime).unwrap();
        prop_assert_eq!(again.signed_micros(), micros);
    }

    #[test]
    fn equal_numbers_share_an_equality_key(n in -(1i64 << 53)..(1i64 << 53)) {
        let c = ctx();
        let as_int = equality_key(&AtomicValue::integer(n), &c, None).unwrap();
        #[allow(clippy::cast_precision_loss)]
        let as_double = equality_key(&AtomicValue::double(n as f64), &c, None).unwrap();
        prop_assert_eq!(as_int, as_double);
    }

    #[test]
    fn string_values_cast_back_to_the_same_value(n in any::<i64>()) {
        let c = ctx();
        let v = AtomicValue::integer(n);
        let s = AtomicValue::string(v.string_value().as_ref());
        let back = s.convert_primitive(PrimitiveKind::Integer, true, &c).unwrap();
        prop_assert_eq!(back, v);
    }
}
