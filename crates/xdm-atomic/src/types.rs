//! Type labels for atomic values.
//!
//! Every value carries an [`AtomicType`]: either one of the built-in types of XML Schema
//! (primitive or derived) or a user-defined restriction registered with a
//! [`TypeRegistry`]. The primitive ancestor of a label must always agree with the payload
//! of the value it labels.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::compare::{ValueOrdering, schema_compare, schema_equals};
use crate::context::ConversionContext;
use crate::error::{Error, ErrorCode, ValidationError};
use crate::names::ExpandedName;
use crate::value::string::StringKind;
use crate::value::{AtomicData, AtomicValue};

/// The primitive type tag of a value.
///
/// The 19 primitives of XML Schema plus `xs:untypedAtomic`, the two duration subtypes,
/// `xs:integer` (a restriction of decimal with its own representation) and an escape kind
/// for host objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    UntypedAtomic,
    String,
    Boolean,
    Decimal,
    Integer,
    Float,
    Double,
    Duration,
    DayTimeDuration,
    YearMonthDuration,
    DateTime,
    Date,
    Time,
    GYear,
    GYearMonth,
    GMonth,
    GMonthDay,
    GDay,
    HexBinary,
    Base64Binary,
    AnyUri,
    QName,
    Notation,
    External,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 24] = [
        PrimitiveKind::UntypedAtomic,
        PrimitiveKind::String,
        PrimitiveKind::Boolean,
        PrimitiveKind::Decimal,
        PrimitiveKind::Integer,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Duration,
        PrimitiveKind::DayTimeDuration,
        PrimitiveKind::YearMonthDuration,
        PrimitiveKind::DateTime,
        PrimitiveKind::Date,
        PrimitiveKind::Time,
        PrimitiveKind::GYear,
        PrimitiveKind::GYearMonth,
        PrimitiveKind::GMonth,
        PrimitiveKind::GMonthDay,
        PrimitiveKind::GDay,
        PrimitiveKind::HexBinary,
        PrimitiveKind::Base64Binary,
        PrimitiveKind::AnyUri,
        PrimitiveKind::QName,
        PrimitiveKind::Notation,
        PrimitiveKind::External,
    ];

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Decimal
                | PrimitiveKind::Integer
                | PrimitiveKind::Float
                | PrimitiveKind::Double
        )
    }

    pub fn is_duration(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Duration
                | PrimitiveKind::DayTimeDuration
                | PrimitiveKind::YearMonthDuration
        )
    }

    /// Kinds whose payload is a plain string.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            PrimitiveKind::String | PrimitiveKind::UntypedAtomic | PrimitiveKind::AnyUri
        )
    }

    pub fn is_calendar(self) -> bool {
        matches!(
            self,
            PrimitiveKind::DateTime
                | PrimitiveKind::Date
                | PrimitiveKind::Time
                | PrimitiveKind::GYear
                | PrimitiveKind::GYearMonth
                | PrimitiveKind::GMonth
                | PrimitiveKind::GMonthDay
                | PrimitiveKind::GDay
        )
    }

    /// The built-in type with the same name.
    pub fn builtin(self) -> Option<BuiltinType> {
        Some(match self {
            PrimitiveKind::UntypedAtomic => BuiltinType::UntypedAtomic,
            PrimitiveKind::String => BuiltinType::String,
            PrimitiveKind::Boolean => BuiltinType::Boolean,
            PrimitiveKind::Decimal => BuiltinType::Decimal,
            PrimitiveKind::Integer => BuiltinType::Integer,
            PrimitiveKind::Float => BuiltinType::Float,
            PrimitiveKind::Double => BuiltinType::Double,
            PrimitiveKind::Duration => BuiltinType::Duration,
            PrimitiveKind::DayTimeDuration => BuiltinType::DayTimeDuration,
            PrimitiveKind::YearMonthDuration => BuiltinType::YearMonthDuration,
            PrimitiveKind::DateTime => BuiltinType::DateTime,
            PrimitiveKind::Date => BuiltinType::Date,
            PrimitiveKind::Time => BuiltinType::Time,
            PrimitiveKind::GYear => BuiltinType::GYear,
            PrimitiveKind::GYearMonth => BuiltinType::GYearMonth,
            PrimitiveKind::GMonth => BuiltinType::GMonth,
            PrimitiveKind::GMonthDay => BuiltinType::GMonthDay,
            PrimitiveKind::GDay => BuiltinType::GDay,
            PrimitiveKind::HexBinary => BuiltinType::HexBinary,
            PrimitiveKind::Base64Binary => BuiltinType::Base64Binary,
            PrimitiveKind::AnyUri => BuiltinType::AnyUri,
            PrimitiveKind::QName => BuiltinType::QName,
            PrimitiveKind::Notation => BuiltinType::Notation,
            PrimitiveKind::External => return None,
        })
    }

    pub fn display_name(self) -> &'static str {
        match self.builtin() {
            Some(b) => b.display_name(),
            None => "external object",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

macro_rules! builtin_types {
    ($($variant:ident => $local:literal),+ $(,)?) => {
        /// Built-in atomic types of XML Schema, primitive and derived.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum BuiltinType {
            $($variant),+
        }

        impl BuiltinType {
            pub const ALL: &'static [BuiltinType] = &[$(BuiltinType::$variant),+];

            /// Local name in the `xs` namespace.
            pub fn local_name(self) -> &'static str {
                match self {
                    $(BuiltinType::$variant => $local),+
                }
            }

            pub fn display_name(self) -> &'static str {
                match self {
                    $(BuiltinType::$variant => concat!("xs:", $local)),+
                }
            }

            pub fn from_local_name(local: &str) -> Option<Self> {
                match local {
                    $($local => Some(BuiltinType::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

builtin_types! {
    UntypedAtomic => "untypedAtomic",
    String => "string",
    NormalizedString => "normalizedString",
    Token => "token",
    Language => "language",
    NmToken => "NMTOKEN",
    Name => "Name",
    NCName => "NCName",
    Id => "ID",
    IdRef => "IDREF",
    Entity => "ENTITY",
    Boolean => "boolean",
    Decimal => "decimal",
    Integer => "integer",
    NonPositiveInteger => "nonPositiveInteger",
    NegativeInteger => "negativeInteger",
    Long => "long",
    Int => "int",
    Short => "short",
    Byte => "byte",
    NonNegativeInteger => "nonNegativeInteger",
    UnsignedLong => "unsignedLong",
    UnsignedInt => "unsignedInt",
    UnsignedShort => "unsignedShort",
    UnsignedByte => "unsignedByte",
    PositiveInteger => "positiveInteger",
    Float => "float",
    Double => "double",
    Duration => "duration",
    DayTimeDuration => "dayTimeDuration",
    YearMonthDuration => "yearMonthDuration",
    DateTime => "dateTime",
    Date => "date",
    Time => "time",
    GYear => "gYear",
    GYearMonth => "gYearMonth",
    GMonth => "gMonth",
    GMonthDay => "gMonthDay",
    GDay => "gDay",
    HexBinary => "hexBinary",
    Base64Binary => "base64Binary",
    AnyUri => "anyURI",
    QName => "QName",
    Notation => "NOTATION",
}

impl BuiltinType {
    /// Immediate base type; `None` for primitives.
    pub fn base(self) -> Option<BuiltinType> {
        use BuiltinType::*;
        Some(match self {
            NormalizedString => String,
            Token => NormalizedString,
            Language | NmToken | Name => Token,
            NCName => Name,
            Id | IdRef | Entity => NCName,
            Integer => Decimal,
            NonPositiveInteger | Long | NonNegativeInteger => Integer,
            NegativeInteger => NonPositiveInteger,
            Int => Long,
            Short => Int,
            Byte => Short,
            UnsignedLong | PositiveInteger => NonNegativeInteger,
            UnsignedInt => UnsignedLong,
            UnsignedShort => UnsignedInt,
            UnsignedByte => UnsignedShort,
            DayTimeDuration | YearMonthDuration => Duration,
            _ => return None,
        })
    }

    pub fn primitive(self) -> PrimitiveKind {
        use BuiltinType as B;
        match self {
            B::UntypedAtomic => PrimitiveKind::UntypedAtomic,
            B::String
            | B::NormalizedString
            | B::Token
            | B::Language
            | B::NmToken
            | B::Name
            | B::NCName
            | B::Id
            | B::IdRef
            | B::Entity => PrimitiveKind::String,
            B::Boolean => PrimitiveKind::Boolean,
            B::Decimal => PrimitiveKind::Decimal,
            B::Integer
            | B::NonPositiveInteger
            | B::NegativeInteger
            | B::Long
            | B::Int
            | B::Short
            | B::Byte
            | B::NonNegativeInteger
            | B::UnsignedLong
            | B::UnsignedInt
            | B::UnsignedShort
            | B::UnsignedByte
            | B::PositiveInteger => PrimitiveKind::Integer,
            B::Float => PrimitiveKind::Float,
            B::Double => PrimitiveKind::Double,
            B::Duration => PrimitiveKind::Duration,
            B::DayTimeDuration => PrimitiveKind::DayTimeDuration,
            B::YearMonthDuration => PrimitiveKind::YearMonthDuration,
            B::DateTime => PrimitiveKind::DateTime,
            B::Date => PrimitiveKind::Date,
            B::Time => PrimitiveKind::Time,
            B::GYear => PrimitiveKind::GYear,
            B::GYearMonth => PrimitiveKind::GYearMonth,
            B::GMonth => PrimitiveKind::GMonth,
            B::GMonthDay => PrimitiveKind::GMonthDay,
            B::GDay => PrimitiveKind::GDay,
            B::HexBinary => PrimitiveKind::HexBinary,
            B::Base64Binary => PrimitiveKind::Base64Binary,
            B::AnyUri => PrimitiveKind::AnyUri,
            B::QName => PrimitiveKind::QName,
            B::Notation => PrimitiveKind::Notation,
        }
    }

    pub fn is_primitive(self) -> bool {
        self.primitive().builtin() == Some(self)
    }

    pub fn derives_from(self, ancestor: BuiltinType) -> bool {
        let mut cur = Some(self);
        while let Some(t) = cur {
            if t == ancestor {
                return true;
            }
            cur = t.base();
        }
        // integer is modelled as its own primitive kind, but remains a decimal
        ancestor == BuiltinType::Decimal && self.primitive() == PrimitiveKind::Integer
    }

    /// Inclusive value range of the integer subtypes.
    pub fn integer_bounds(self) -> Option<(Option<i128>, Option<i128>)> {
        use BuiltinType::*;
        Some(match self {
            Integer => (None, None),
            NonPositiveInteger => (None, Some(0)),
            NegativeInteger => (None, Some(-1)),
            Long => (Some(i64::MIN.into()), Some(i64::MAX.into())),
            Int => (Some(i32::MIN.into()), Some(i32::MAX.into())),
            Short => (Some(i16::MIN.into()), Some(i16::MAX.into())),
            Byte => (Some(i8::MIN.into()), Some(i8::MAX.into())),
            NonNegativeInteger => (Some(0), None),
            PositiveInteger => (Some(1), None),
            UnsignedLong => (Some(0), Some(u64::MAX.into())),
            UnsignedInt => (Some(0), Some(u32::MAX.into())),
            UnsignedShort => (Some(0), Some(u16::MAX.into())),
            UnsignedByte => (Some(0), Some(u8::MAX.into())),
            _ => return None,
        })
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            BuiltinType::UnsignedLong
                | BuiltinType::UnsignedInt
                | BuiltinType::UnsignedShort
                | BuiltinType::UnsignedByte
        )
    }

    pub fn string_kind(self) -> Option<StringKind> {
        use BuiltinType::*;
        Some(match self {
            NormalizedString => StringKind::NormalizedString,
            Token => StringKind::Token,
            Language => StringKind::Language,
            NmToken => StringKind::NmToken,
            Name => StringKind::Name,
            NCName => StringKind::NCName,
            Id => StringKind::Id,
            IdRef => StringKind::IdRef,
            Entity => StringKind::Entity,
            _ => return None,
        })
    }

    pub fn expanded_name(self) -> ExpandedName {
        ExpandedName::xs(self.local_name())
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A constraining facet of a user-defined restriction.
#[derive(Debug, Clone)]
pub enum Facet {
    Pattern {
        source: String,
        regex: Arc<fancy_regex::Regex>,
    },
    Enumeration(Vec<AtomicValue>),
    Length(usize),
    MinLength(usize),
    MaxLength(usize),
    MinInclusive(AtomicValue),
    MaxInclusive(AtomicValue),
}

impl Facet {
    /// Compile a pattern facet; the pattern is implicitly anchored.
    pub fn pattern(source: impl Into<String>) -> Result<Self, Error> {
        let source = source.into();
        let regex = fancy_regex::Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            Error::from_code(ErrorCode::FORG0001, format!("invalid pattern facet '{source}'"))
                .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
        })?;
        Ok(Facet::Pattern {
            source,
            regex: Arc::new(regex),
        })
    }

    fn check(&self, value: &AtomicValue, ctx: &ConversionContext) -> Result<(), String> {
        match self {
            Facet::Pattern { source, regex } => {
                let lexical = value.string_value();
                match regex.is_match(&lexical) {
                    Ok(true) => Ok(()),
                    _ => Err(format!("'{lexical}' does not match pattern '{source}'")),
                }
            }
            Facet::Enumeration(allowed) => {
                if allowed.iter().any(|a| schema_equals(a, value, ctx)) {
                    Ok(())
                } else {
                    Err(format!("'{value}' is not in the enumeration"))
                }
            }
            Facet::Length(n) => match facet_length(value) {
                Some(len) if len != *n => Err(format!("length {len} is not {n}")),
                _ => Ok(()),
            },
            Facet::MinLength(n) => match facet_length(value) {
                Some(len) if len < *n => Err(format!("length {len} is below {n}")),
                _ => Ok(()),
            },
            Facet::MaxLength(n) => match facet_length(value) {
                Some(len) if len > *n => Err(format!("length {len} exceeds {n}")),
                _ => Ok(()),
            },
            Facet::MinInclusive(bound) => match schema_compare(value, bound, ctx) {
                Some(ValueOrdering::Greater | ValueOrdering::Equal) => Ok(()),
                _ => Err(format!("'{value}' is below the minimum {bound}")),
            },
            Facet::MaxInclusive(bound) => match schema_compare(value, bound, ctx) {
                Some(ValueOrdering::Less | ValueOrdering::Equal) => Ok(()),
                _ => Err(format!("'{value}' exceeds the maximum {bound}")),
            },
        }
    }
}

/// Length as measured by the length facets: characters for strings, octets for binary.
fn facet_length(value: &AtomicValue) -> Option<usize> {
    match value.data() {
        AtomicData::String(s) | AtomicData::UntypedAtomic(s) | AtomicData::AnyUri(s) => {
            Some(s.length())
        }
        AtomicData::HexBinary(b) | AtomicData::Base64Binary(b) => Some(b.len()),
        _ => None,
    }
}

/// An atomic type derived by restriction, registered by the host.
#[derive(Debug, Clone)]
pub struct UserAtomicType {
    pub name: ExpandedName,
    pub base: AtomicType,
    pub facets: Vec<Facet>,
}

impl UserAtomicType {
    pub fn new(name: ExpandedName, base: impl Into<AtomicType>) -> Self {
        Self {
            name,
            base: base.into(),
            facets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    /// Check `value` (already converted to the base type) against the facets of this type
    /// and of every user-defined ancestor.
    pub fn validate(&self, value: &AtomicValue, ctx: &ConversionContext) -> Result<(), ValidationError> {
        if let AtomicType::User(parent) = &self.base {
            parent.validate(value, ctx)?;
        }
        for facet in &self.facets {
            facet.check(value, ctx).map_err(|msg| {
                ValidationError::invalid(format!("value not valid for {}: {msg}", self.name))
            })?;
        }
        Ok(())
    }
}

impl PartialEq for UserAtomicType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for UserAtomicType {}

impl core::hash::Hash for UserAtomicType {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Type label of an atomic value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AtomicType {
    Builtin(BuiltinType),
    User(Arc<UserAtomicType>),
    /// Label of wrapped host objects.
    External,
}

impl From<BuiltinType> for AtomicType {
    fn from(b: BuiltinType) -> Self {
        AtomicType::Builtin(b)
    }
}

impl AtomicType {
    pub fn primitive(&self) -> PrimitiveKind {
        self.builtin_ancestor()
            .map_or(PrimitiveKind::External, BuiltinType::primitive)
    }

    /// Nearest built-in ancestor (the type itself when built-in); `None` for host objects.
    pub fn builtin_ancestor(&self) -> Option<BuiltinType> {
        let mut cur = self;
        loop {
            match cur {
                AtomicType::Builtin(b) => return Some(*b),
                AtomicType::User(u) => cur = &u.base,
                AtomicType::External => return None,
            }
        }
    }

    pub fn as_builtin(&self) -> Option<BuiltinType> {
        match self {
            AtomicType::Builtin(b) => Some(*b),
            _ => None,
        }
    }

    pub fn name(&self) -> ExpandedName {
        match self {
            AtomicType::Builtin(b) => b.expanded_name(),
            AtomicType::User(u) => u.name.clone(),
            AtomicType::External => {
                ExpandedName::new(Some(crate::consts::PLATYNUI_XDM_NS.to_string()), "external")
            }
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            AtomicType::Builtin(b) => b.display_name().to_string(),
            AtomicType::User(u) => u.name.to_string(),
            AtomicType::External => PrimitiveKind::External.display_name().to_string(),
        }
    }

    /// `true` when `self` is `ancestor` or derived from it by restriction.
    pub fn derives_from(&self, ancestor: &AtomicType) -> bool {
        let mut cur = self;
        loop {
            if cur == ancestor {
                return true;
            }
            match cur {
                AtomicType::User(u) => cur = &u.base,
                AtomicType::Builtin(b) => {
                    return match ancestor {
                        AtomicType::Builtin(a) => b.derives_from(*a),
                        _ => false,
                    };
                }
                AtomicType::External => return false,
            }
        }
    }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Source of type descriptors: resolves names to types and answers subtype questions.
pub trait TypeRegistry: Send + Sync {
    fn resolve(&self, name: &ExpandedName) -> Option<AtomicType>;

    fn display_name(&self, ty: &AtomicType) -> String {
        ty.display_name()
    }

    fn is_subtype(&self, sub: &AtomicType, sup: &AtomicType) -> bool {
        sub.derives_from(sup)
    }
}

/// Registry of the built-in types plus any user-defined restrictions added before the
/// registry is shared.
#[derive(Debug, Default, Clone)]
pub struct BuiltinTypeRegistry {
    user_types: HashMap<ExpandedName, AtomicType>,
}

impl BuiltinTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ty: UserAtomicType) -> AtomicType {
        let name = ty.name.clone();
        let at = AtomicType::User(Arc::new(ty));
        self.user_types.insert(name, at.clone());
        at
    }
}

impl TypeRegistry for BuiltinTypeRegistry {
    fn resolve(&self, name: &ExpandedName) -> Option<AtomicType> {
        if name.ns_uri.as_deref() == Some(crate::consts::XS)
            && let Some(b) = BuiltinType::from_local_name(&name.local)
        {
            return Some(AtomicType::Builtin(b));
        }
        self.user_types.get(name).cloned()
    }
}
