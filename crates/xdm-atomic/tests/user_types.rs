use std::sync::Arc;

use platynui_xdm::{
    AtomicType, AtomicValue, BuiltinType, BuiltinTypeRegistry, ConversionContext,
    ConversionContextBuilder, ErrorCode, ExpandedName, Facet, PrimitiveKind, TypeRegistry,
    UserAtomicType,
};
use rstest::rstest;

const NS: &str = "urn:example:types";

struct Fixture {
    ctx: ConversionContext,
    sku: AtomicType,
    percent: AtomicType,
    small_percent: AtomicType,
    color: AtomicType,
}

fn fixture() -> Fixture {
    let name = |local: &str| ExpandedName::new(Some(NS.to_string()), local);
    let mut reg = BuiltinTypeRegistry::new();
    let sku = reg.register(
        UserAtomicType::new(name("sku"), BuiltinType::Token)
            .with_facet(Facet::pattern("[A-Z]{3}-[0-9]{4}").unwrap()),
    );
    let percent = reg.register(
        UserAtomicType::new(name("percent"), BuiltinType::Integer)
            .with_facet(Facet::MinInclusive(AtomicValue::integer(0)))
            .with_facet(Facet::MaxInclusive(AtomicValue::integer(100))),
    );
    let small_percent = reg.register(
        UserAtomicType::new(name("smallPercent"), percent.clone())
            .with_facet(Facet::MaxInclusive(AtomicValue::integer(10))),
    );
    let color = reg.register(
        UserAtomicType::new(name("color"), BuiltinType::String).with_facet(Facet::Enumeration(vec![
            AtomicValue::string("red"),
            AtomicValue::string("green"),
        ])),
    );
    let ctx = ConversionContextBuilder::new().with_type_registry(Arc::new(reg)).build();
    Fixture {
        ctx,
        sku,
        percent,
        small_percent,
        color,
    }
}

#[rstest]
#[case(" ABC-1234 ", true)]
#[case("ABC-12345", false)]
#[case("abc-1234", false)]
fn pattern_facet(#[case] lexical: &str, #[case] ok: bool) {
    let f = fixture();
    let res = AtomicValue::string(lexical).convert(&f.sku, &f.ctx, true);
    match ok {
        true => {
            let v = res.unwrap();
            assert_eq!(v.string_value(), "ABC-1234");
            assert_eq!(v.type_label(), &f.sku);
            assert_eq!(v.primitive_kind(), PrimitiveKind::String);
        }
        false => assert_eq!(res.unwrap_err().code, ErrorCode::FORG0001),
    }
}

#[rstest]
#[case("0", true, true)]
#[case("10", true, true)]
#[case("11", true, false)]
#[case("100", true, false)]
#[case("101", false, false)]
#[case("-1", false, false)]
fn range_facets_are_inherited(#[case] lexical: &str, #[case] percent_ok: bool, #[case] small_ok: bool) {
    let f = fixture();
    let v = AtomicValue::untyped(lexical);
    assert_eq!(v.convert(&f.percent, &f.ctx, true).is_ok(), percent_ok);
    assert_eq!(v.convert(&f.small_percent, &f.ctx, true).is_ok(), small_ok);
}

#[test]
fn enumeration_facet() {
    let f = fixture();
    assert!(AtomicValue::string("red").convert(&f.color, &f.ctx, true).is_ok());
    let err = AtomicValue::string("blue").convert(&f.color, &f.ctx, true).unwrap_err();
    assert_eq!(err.code, ErrorCode::FORG0001);
}

#[test]
fn user_types_resolve_and_derive() {
    let f = fixture();
    let reg = f.ctx.type_registry();
    let resolved = reg.resolve(&ExpandedName::new(Some(NS.to_string()), "smallPercent"));
    assert_eq!(resolved.as_ref(), Some(&f.small_percent));
    assert!(reg.is_subtype(&f.small_percent, &f.percent));
    assert!(reg.is_subtype(&f.small_percent, &BuiltinType::Decimal.into()));
    assert!(!reg.is_subtype(&f.percent, &f.small_percent));
    assert_eq!(f.small_percent.builtin_ancestor(), Some(BuiltinType::Integer));
}

#[test]
fn relabelling_checks_the_primitive() {
    let f = fixture();
    let v = AtomicValue::integer(5).with_type_label(f.percent.clone()).unwrap();
    assert_eq!(v.type_label(), &f.percent);
    // a labelled value behaves like its primitive
    assert_eq!(v.string_value(), "5");
    assert!(v.is_numeric());
    let err = AtomicValue::string("5").with_type_label(f.percent.clone()).unwrap_err();
    assert_eq!(err.code, ErrorCode::XPTY0004);
}

#[test]
fn casting_out_of_a_user_type() {
    let f = fixture();
    let v = AtomicValue::untyped("42").convert(&f.percent, &f.ctx, true).unwrap();
    let d = v.convert(&BuiltinType::Double.into(), &f.ctx, true).unwrap();
    assert_eq!(d.string_value(), "42");
    let s = v.convert(&BuiltinType::String.into(), &f.ctx, true).unwrap();
    assert_eq!(s.type_label(), &AtomicType::Builtin(BuiltinType::String));
}
