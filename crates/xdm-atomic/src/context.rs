use std::sync::Arc;

use crate::collation::CollationRegistry;
use crate::names::{NameChecker, Xml11NameChecker};
use crate::types::{BuiltinTypeRegistry, TypeRegistry};

/// Immutable configuration consulted by conversions and comparisons.
///
/// Holds the collaborators the value system calls into but never mutates: the name
/// checker used for `NCName`-like lexical forms, the type registry resolving user-defined
/// atomic types, and the implicit timezone applied to timezone-less temporal values.
#[derive(Clone)]
pub struct ConversionContext {
    pub name_checker: Arc<dyn NameChecker>,
    pub type_registry: Arc<dyn TypeRegistry>,
    /// Offset in minutes from UTC.
    pub implicit_timezone: i16,
    pub collations: Arc<CollationRegistry>,
    pub default_collation: Option<String>,
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self {
            name_checker: Arc::new(Xml11NameChecker),
            type_registry: Arc::new(BuiltinTypeRegistry::default()),
            implicit_timezone: 0,
            collations: Arc::new(CollationRegistry::default()),
            default_collation: None,
        }
    }
}

impl core::fmt::Debug for ConversionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConversionContext")
            .field("implicit_timezone", &self.implicit_timezone)
            .field("collations", &self.collations)
            .field("default_collation", &self.default_collation)
            .finish_non_exhaustive()
    }
}

impl ConversionContext {
    pub fn name_checker(&self) -> &dyn NameChecker {
        self.name_checker.as_ref()
    }

    pub fn type_registry(&self) -> &dyn TypeRegistry {
        self.type_registry.as_ref()
    }
}

pub struct ConversionContextBuilder {
    ctx: ConversionContext,
}

impl Default for ConversionContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionContextBuilder {
    pub fn new() -> Self {
        Self {
            ctx: ConversionContext::default(),
        }
    }

    pub fn with_name_checker(mut self, checker: Arc<dyn NameChecker>) -> Self {
        self.ctx.name_checker = checker;
        self
    }

    pub fn with_type_registry(mut self, registry: Arc<dyn TypeRegistry>) -> Self {
        self.ctx.type_registry = registry;
        self
    }

    /// Offsets outside +/-14:00 are ignored, keeping the previous value.
    pub fn with_implicit_timezone(mut self, offset_minutes: i32) -> Self {
        if let Ok(tz) = i16::try_from(offset_minutes)
            && crate::temporal::is_valid_timezone(tz)
        {
            self.ctx.implicit_timezone = tz;
        }
        self
    }

    pub fn with_collations(mut self, reg: Arc<CollationRegistry>) -> Self {
        self.ctx.collations = reg;
        self
    }

    pub fn with_default_collation(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_collation = Some(uri.into());
        self
    }

    pub fn build(self) -> ConversionContext {
        self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::Xml10NameChecker;

    #[test]
    fn builder_overrides_defaults() {
        let ctx = ConversionContextBuilder::new()
            .with_name_checker(Arc::new(Xml10NameChecker))
            .with_implicit_timezone(-300)
            .build();
        assert_eq!(ctx.implicit_timezone, -300);
        assert!(!ctx.name_checker().is_ncname("a\u{10000}"));
    }

    #[test]
    fn out_of_range_timezone_is_ignored() {
        let ctx = ConversionContextBuilder::new()
            .with_implicit_timezone(15 * 60)
            .build();
        assert_eq!(ctx.implicit_timezone, 0);
    }
}
