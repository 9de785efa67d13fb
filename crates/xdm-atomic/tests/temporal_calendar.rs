use platynui_xdm::temporal::{days_in_month, is_leap_year};
use platynui_xdm::{
    ArithmeticOp as Op, AtomicData, AtomicValue, Component, ConversionContext,
    ConversionContextBuilder, DateTimeValue, DurationKind, DurationValue, ErrorCode, GDateKind,
    GDateValue, PrimitiveKind, TimeValue, ValueOrdering, arithmetic, schema_compare,
};
use rstest::rstest;

fn ctx() -> ConversionContext {
    ConversionContext::default()
}

fn lex(s: &str, kind: PrimitiveKind) -> AtomicValue {
    AtomicValue::from_lexical(s, kind, &ctx()).unwrap()
}

#[rstest]
#[case(2024, true)]
#[case(2023, false)]
#[case(2000, true)]
#[case(1900, false)]
#[case(2100, false)]
fn leap_years(#[case] year: i64, #[case] leap: bool) {
    assert_eq!(is_leap_year(year), leap);
    assert_eq!(days_in_month(year, 2), if leap { 29 } else { 28 });
}

#[rstest]
#[case("2024-02-29", true)]
#[case("2023-02-29", false)]
#[case("1900-02-29", false)]
#[case("2024-04-31", false)]
#[case("2024-13-01", false)]
#[case("24-01-01", false)]
#[case("12024-01-01", true)]
#[case("02024-01-01", false)]
#[case("2024-01-01+14:00", true)]
#[case("2024-01-01+14:01", false)]
fn date_lexical_space(#[case] lexical: &str, #[case] valid: bool) {
    let res = GDateValue::parse(lexical, GDateKind::Date);
    match valid {
        true => assert_eq!(res.unwrap().to_string(), lexical),
        false => assert_eq!(res.unwrap_err().code, ErrorCode::FORG0001),
    }
}

#[test]
fn end_of_day_is_midnight_of_the_next_day() {
    let dt = DateTimeValue::parse("2024-12-31T24:00:00Z").unwrap();
    assert_eq!(dt.to_string(), "2025-01-01T00:00:00Z");
    assert!(DateTimeValue::parse("2024-12-31T24:00:01Z").is_err());
}

#[test]
fn timezone_adjustment_round_trip() {
    let dt = DateTimeValue::parse("2024-03-01T10:00:00+05:30").unwrap();
    let utc = dt.adjust_timezone(Some(0)).unwrap();
    assert_eq!(utc.to_string(), "2024-03-01T04:30:00Z");
    let back = utc.adjust_timezone(Some(330)).unwrap();
    assert_eq!(back, dt);
    let local = dt.adjust_timezone(None).unwrap();
    assert_eq!(local.to_string(), "2024-03-01T10:00:00");
    assert_eq!(dt.adjust_timezone(Some(15 * 60)).unwrap_err().code, ErrorCode::FODT0003);
}

#[test]
fn adjusting_a_local_value_only_attaches_the_timezone() {
    let t = TimeValue::parse("23:30:00").unwrap();
    assert_eq!(t.adjust_timezone(Some(-300)).unwrap().to_string(), "23:30:00-05:00");
    let d = GDateValue::parse("2024-03-01+10:00", GDateKind::Date).unwrap();
    assert_eq!(d.adjust_timezone(Some(-600)).unwrap().to_string(), "2024-02-29-10:00");
}

#[rstest]
#[case("2024-01-31", "P1M", "2024-02-29")]
#[case("2023-01-31", "P1M", "2023-02-28")]
#[case("2024-02-29", "P1Y", "2025-02-28")]
#[case("2024-03-31", "-P1M", "2024-02-29")]
#[case("2000-01-01", "P12000M", "3000-01-01")]
fn month_arithmetic_clamps_the_day(#[case] date: &str, #[case] duration: &str, #[case] expected: &str) {
    let d = lex(date, PrimitiveKind::Date);
    let dur = lex(duration, PrimitiveKind::YearMonthDuration);
    assert_eq!(arithmetic(&d, Op::Plus, &dur, &ctx()).unwrap().string_value(), expected);
}

#[test]
fn subtraction_uses_the_implicit_timezone() {
    let c = ConversionContextBuilder::new().with_implicit_timezone(-5 * 60).build();
    let local = AtomicValue::from_lexical("2024-01-01T00:00:00", PrimitiveKind::DateTime, &c).unwrap();
    let utc = AtomicValue::from_lexical("2024-01-01T00:00:00Z", PrimitiveKind::DateTime, &c).unwrap();
    assert_eq!(arithmetic(&local, Op::Minus, &utc, &c).unwrap().string_value(), "PT5H");
    assert_eq!(arithmetic(&local, Op::Minus, &utc, &ctx()).unwrap().string_value(), "PT0S");
}

#[rstest]
#[case("P1M", "P28D", ValueOrdering::Indeterminate)]
#[case("P1M", "P30D", ValueOrdering::Indeterminate)]
#[case("P1M", "P31D", ValueOrdering::Indeterminate)]
#[case("P1M", "P27D", ValueOrdering::Greater)]
#[case("P1M", "P32D", ValueOrdering::Less)]
#[case("P1Y", "P365D", ValueOrdering::Indeterminate)]
#[case("P1Y", "P367D", ValueOrdering::Less)]
#[case("P1Y", "P12M", ValueOrdering::Equal)]
#[case("PT24H", "P1D", ValueOrdering::Equal)]
fn duration_partial_order(#[case] a: &str, #[case] b: &str, #[case] expected: ValueOrdering) {
    let (a, b) = (lex(a, PrimitiveKind::Duration), lex(b, PrimitiveKind::Duration));
    assert_eq!(schema_compare(&a, &b, &ctx()), Some(expected));
    assert_eq!(schema_compare(&b, &a, &ctx()), Some(expected.reverse()));
}

#[test]
fn timezoned_and_local_instants_within_fourteen_hours_are_indeterminate() {
    let a = lex("2024-01-01T12:00:00", PrimitiveKind::DateTime);
    let b = lex("2024-01-01T12:00:00Z", PrimitiveKind::DateTime);
    let c = lex("2024-01-02T12:00:00Z", PrimitiveKind::DateTime);
    assert_eq!(schema_compare(&a, &b, &ctx()), Some(ValueOrdering::Indeterminate));
    assert_eq!(schema_compare(&a, &c, &ctx()), Some(ValueOrdering::Less));
}

#[rstest]
#[case("-P1Y2M3DT4H5M6.5S", Component::Year, Some("-1"))]
#[case("-P1Y2M3DT4H5M6.5S", Component::Month, Some("-2"))]
#[case("-P1Y2M3DT4H5M6.5S", Component::Day, Some("-3"))]
#[case("-P1Y2M3DT4H5M6.5S", Component::Hours, Some("-4"))]
#[case("-P1Y2M3DT4H5M6.5S", Component::Seconds, Some("-6.5"))]
#[case("P1Y", Component::Timezone, None)]
fn duration_components(#[case] lexical: &str, #[case] c: Component, #[case] expected: Option<&str>) {
    let d = lex(lexical, PrimitiveKind::Duration);
    let got = d.get_component(c).unwrap_or(None);
    assert_eq!(got.map(|v| v.string_value().into_owned()).as_deref(), expected);
}

#[test]
fn date_time_components() {
    let dt = lex("2024-02-29T13:14:15.25-03:00", PrimitiveKind::DateTime);
    let get = |c| dt.get_component(c).unwrap().unwrap().string_value().into_owned();
    assert_eq!(get(Component::Year), "2024");
    assert_eq!(get(Component::Day), "29");
    assert_eq!(get(Component::Seconds), "15.25");
    assert_eq!(get(Component::Timezone), "-PT3H");
    let gyear = lex("2024", PrimitiveKind::GYear);
    assert_eq!(gyear.get_component(Component::Month).unwrap(), None);
    assert_eq!(
        AtomicValue::integer(1).get_component(Component::Year).unwrap_err().code,
        ErrorCode::XPTY0004
    );
}

#[test]
fn duration_construction_overflow() {
    assert_eq!(DurationValue::from_months(i64::MAX).unwrap_err().code, ErrorCode::FODT0002);
    let big = DurationValue::parse("P99999999999999999999Y", DurationKind::Duration);
    assert!(big.is_err());
    let d = DurationValue::parse("PT90M", DurationKind::DayTime).unwrap();
    assert_eq!(AtomicValue::duration(d.clone()).string_value(), "PT1H30M");
    assert!(matches!(AtomicValue::duration(d).data(), AtomicData::Duration(_)));
}

#[rstest]
#[case("PT10000000000000000000000000000000000000H", DurationKind::Duration)]
#[case("P10000000000000000000000000000000000000Y", DurationKind::Duration)]
#[case("P170141183460469231731687303715884105727Y", DurationKind::YearMonth)]
#[case("P1000000000000000000000000000000000D", DurationKind::DayTime)]
#[case("PT1000000000000000000000000000000000.5S", DurationKind::DayTime)]
#[case("PT100000000000000000000000000000000000000000000000M", DurationKind::DayTime)]
#[case("P1DT170141183460469231731687303715884105727S", DurationKind::Duration)]
fn long_duration_components_overflow(#[case] lexical: &str, #[case] kind: DurationKind) {
    assert_eq!(DurationValue::parse(lexical, kind).unwrap_err().code, ErrorCode::FODT0002);
    let err = AtomicValue::string(lexical)
        .convert_primitive(PrimitiveKind::Duration, true, &ctx())
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::FODT0002);
}

#[rstest]
#[case(i64::MAX)]
#[case(i64::MIN)]
#[case(i64::from(i32::MAX) + 1)]
#[case(-i64::from(i32::MAX))]
fn field_constructors_reject_years_beyond_the_lexical_range(#[case] year: i64) {
    let err = DateTimeValue::new(year, 1, 1, 0, 0, 0, 0, None).unwrap_err();
    assert_eq!(err.code, ErrorCode::FORG0001);
    let err = GDateValue::date(year, 1, 1, Some(0)).unwrap_err();
    assert_eq!(err.code, ErrorCode::FORG0001);
}

#[test]
fn field_constructors_accept_the_extreme_years() {
    let last = DateTimeValue::new(i64::from(i32::MAX), 12, 31, 23, 59, 59, 0, None).unwrap();
    assert!(last.julian_day_number() > 0);
    let first = GDateValue::date(1 - i64::from(i32::MAX), 1, 1, None).unwrap();
    assert!(first.julian_day_number() < 0);
    assert_eq!(first.to_string(), format!("-{}-01-01", i32::MAX));
}

#[test]
fn week_and_day_calculations() {
    let d = GDateValue::parse("2024-12-30", GDateKind::Date).unwrap();
    assert_eq!(d.day_within_year(), 365);
    // 2024-12-30 is a Monday in ISO week 1 of 2025
    assert_eq!(d.week_number(), 1);
    assert_eq!(d.tomorrow().unwrap().to_string(), "2024-12-31");
    assert_eq!(d.yesterday().unwrap().to_string(), "2024-12-29");
}
