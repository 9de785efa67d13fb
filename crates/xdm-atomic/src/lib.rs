//! Atomic values of the XPath data model.
//!
//! Typed values for every XML Schema primitive, the casting table between them, schema
//! and XPath comparison, numeric and calendar arithmetic, and a mapping to host types.

pub mod arithmetic;
pub mod collation;
pub mod compare;
pub mod consts;
pub mod context;
pub mod error;
pub mod interop;
pub mod names;
pub mod sequence;
pub mod temporal;
pub mod types;
pub mod value;

pub use arithmetic::{arithmetic, negate};
pub use collation::{Collation, CollationRegistry, resolve_collation};
pub use compare::{
    ComparisonOp, EqualityKey, ValueOrdering, compare_values, equality_key, schema_compare,
    schema_equals, value_compare, values_equal,
};
pub use context::{ConversionContext, ConversionContextBuilder};
pub use error::{ConversionResult, Error, ErrorCode, Result, ValidationError};
pub use interop::{ExternalType, ExternalValue, convert_to_external, from_external};
pub use names::{ExpandedName, NameChecker, Xml10NameChecker, Xml11NameChecker};
pub use sequence::{Item, Value};
pub use temporal::{
    Component, DateTimeValue, DurationKind, DurationValue, GDateKind, GDateValue, TimeValue,
};
pub use types::{AtomicType, BuiltinType, BuiltinTypeRegistry, Facet, PrimitiveKind, TypeRegistry, UserAtomicType};
pub use value::numeric::{ArithmeticOp, NumericValue};
pub use value::{AtomicData, AtomicValue};
