//! `xs:QName` and `xs:NOTATION` payloads.
//!
//! A name is a flat `(prefix, namespace, local)` triple. The prefix is for display only:
//! equality and hashing look at the namespace and local part. An empty namespace string
//! is normalized to "no namespace" by every constructor.

use core::fmt;
use core::hash::{Hash, Hasher};

use compact_str::CompactString;
use string_cache::DefaultAtom;

use crate::consts::XML_URI;
use crate::error::{ConversionResult, ErrorCode, ValidationError};
use crate::names::{ExpandedName, NameChecker};

#[derive(Clone, Debug)]
pub struct QNameValue {
    prefix: CompactString,
    namespace: Option<DefaultAtom>,
    local: CompactString,
}

fn normalize_namespace(ns: Option<&str>) -> Option<DefaultAtom> {
    ns.filter(|s| !s.is_empty()).map(DefaultAtom::from)
}

impl QNameValue {
    /// Trusted constructor: the parts are taken as valid.
    pub fn new(prefix: &str, namespace: Option<&str>, local: &str) -> Self {
        Self {
            prefix: CompactString::from(prefix),
            namespace: normalize_namespace(namespace),
            local: CompactString::from(local),
        }
    }

    /// Validating constructor. Checks run only when a checker is supplied: both parts must
    /// be `NCName`s and a prefix requires a namespace (`FOCA0002`).
    pub fn new_checked(
        prefix: &str,
        namespace: Option<&str>,
        local: &str,
        checker: Option<&dyn NameChecker>,
    ) -> ConversionResult<Self> {
        let value = Self::new(prefix, namespace, local);
        if let Some(checker) = checker {
            if !checker.is_ncname(local) {
                return Err(ValidationError::new(
                    ErrorCode::FOCA0002,
                    format!("invalid local name '{local}'"),
                ));
            }
            if !prefix.is_empty() {
                if !checker.is_ncname(prefix) {
                    return Err(ValidationError::new(
                        ErrorCode::FOCA0002,
                        format!("invalid prefix '{prefix}'"),
                    ));
                }
                if value.namespace.is_none() {
                    return Err(ValidationError::new(
                        ErrorCode::FOCA0002,
                        format!("prefix '{prefix}' is not bound to a namespace"),
                    ));
                }
            }
        }
        Ok(value)
    }

    /// Parse `Q{uri}local`, `{uri}local`, `xml:local` or an unprefixed `NCName`.
    ///
    /// Other prefixes cannot be resolved here and fail with `FONS0004`.
    pub fn parse(lexical: &str, checker: &dyn NameChecker) -> ConversionResult<Self> {
        let s = crate::value::string::trim_xml_whitespace(lexical);
        let invalid = || ValidationError::invalid(format!("invalid lexical QName '{lexical}'"));
        let braced = s.strip_prefix("Q{").or_else(|| s.strip_prefix('{'));
        if let Some(rest) = braced {
            let (uri, local) = rest.split_once('}').ok_or_else(invalid)?;
            if !checker.is_ncname(local) {
                return Err(invalid());
            }
            return Ok(Self::new("", Some(uri), local));
        }
        match crate::names::split_qname(checker, s).ok_or_else(invalid)? {
            (None, local) => Ok(Self::new("", None, local)),
            (Some("xml"), local) => Ok(Self::new("xml", Some(XML_URI), local)),
            (Some(prefix), _) => Err(ValidationError::new(
                ErrorCode::FONS0004,
                format!("no namespace binding for prefix '{prefix}'"),
            )),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// `{uri}local`, or just `local` without a namespace.
    pub fn clark_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{ns}}}{}", self.local),
            None => self.local.to_string(),
        }
    }

    /// `Q{uri}local`.
    pub fn eqname(&self) -> String {
        format!("Q{{{}}}{}", self.namespace().unwrap_or(""), self.local)
    }

    pub fn to_expanded_name(&self) -> ExpandedName {
        ExpandedName::new(self.namespace().map(str::to_string), self.local.as_str())
    }
}

impl PartialEq for QNameValue {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.local == other.local
    }
}

impl Eq for QNameValue {}

impl Hash for QNameValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for QNameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{}:{}", self.prefix, self.local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::Xml11NameChecker;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(q: &QNameValue) -> u64 {
        let mut h = DefaultHasher::new();
        q.hash(&mut h);
        h.finish()
    }

    #[test]
    fn equality_ignores_prefix() {
        let a = QNameValue::new("a", Some("urn:x"), "n");
        let b = QNameValue::new("b", Some("urn:x"), "n");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.to_string(), "a:n");
    }

    #[test]
    fn empty_namespace_is_no_namespace() {
        let a = QNameValue::new("", Some(""), "n");
        let b = QNameValue::new("", None, "n");
        assert_eq!(a, b);
        assert_eq!(a.namespace(), None);
    }

    #[test]
    fn prefix_without_namespace_needs_checker_to_fail() {
        let checker = Xml11NameChecker;
        let e = QNameValue::new_checked("p", Some(""), "n", Some(&checker)).unwrap_err();
        assert_eq!(e.code, ErrorCode::FOCA0002);
        let e = QNameValue::new_checked("p", None, "n", Some(&checker)).unwrap_err();
        assert_eq!(e.code, ErrorCode::FOCA0002);
        // trusted callers bypass the check
        assert!(QNameValue::new_checked("p", None, "n", None).is_ok());
    }

    #[test]
    fn parse_forms() {
        let c = Xml11NameChecker;
        let q = QNameValue::parse("Q{urn:a}b", &c).unwrap();
        assert_eq!(q.clark_name(), "{urn:a}b");
        let q = QNameValue::parse("xml:lang", &c).unwrap();
        assert_eq!(q.namespace(), Some(XML_URI));
        let q = QNameValue::parse(" local ", &c).unwrap();
        assert_eq!(q.eqname(), "Q{}local");
        assert_eq!(QNameValue::parse("p:x", &c).unwrap_err().code, ErrorCode::FONS0004);
        assert_eq!(QNameValue::parse("1x", &c).unwrap_err().code, ErrorCode::FORG0001);
    }
}
