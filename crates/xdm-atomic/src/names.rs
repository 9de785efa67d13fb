//! Name handling: expanded names and the XML name grammar.
//!
//! Validation of `NCName`-like lexical forms is delegated to a [`NameChecker`] so that a
//! host can choose between the XML 1.0 and XML 1.1 character classes. The checker is
//! reached through the [`crate::context::ConversionContext`].

use core::fmt;
use unicode_normalization::char::canonical_combining_class;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self {
            ns_uri,
            local: local.into(),
        }
    }

    /// Name in the XML Schema namespace (`xs:local`).
    pub fn xs(local: impl Into<String>) -> Self {
        Self::new(Some(crate::consts::XS.to_string()), local)
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "Q{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Predicate over the XML name grammar.
///
/// Only the two character-class predicates are required; everything else is derived.
pub trait NameChecker: Send + Sync {
    fn is_ncname_start_char(&self, ch: char) -> bool;
    fn is_ncname_char(&self, ch: char) -> bool;

    fn is_ncname(&self, s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) if self.is_ncname_start_char(first) => {
                chars.all(|c| self.is_ncname_char(c))
            }
            _ => false,
        }
    }

    /// `Nmtoken ::= (NameChar)+`
    fn is_nmtoken(&self, s: &str) -> bool {
        !s.is_empty() && s.chars().all(|c| c == ':' || self.is_ncname_char(c))
    }

    /// `prefix:local` or `local`, both parts `NCName`s.
    fn is_qname(&self, s: &str) -> bool {
        match s.split_once(':') {
            Some((prefix, local)) => self.is_ncname(prefix) && self.is_ncname(local),
            None => self.is_ncname(s),
        }
    }
}

/// XML 1.0 (fourth edition) name rules: letters and digits are restricted to the BMP and
/// combining characters are recognised by their canonical combining class.
#[derive(Debug, Default, Clone, Copy)]
pub struct Xml10NameChecker;

impl NameChecker for Xml10NameChecker {
    fn is_ncname_start_char(&self, ch: char) -> bool {
        ch == '_' || (ch <= '\u{FFFF}' && ch.is_alphabetic())
    }

    fn is_ncname_char(&self, ch: char) -> bool {
        if self.is_ncname_start_char(ch) || matches!(ch, '-' | '.' | '\u{B7}') {
            return true;
        }
        if ch > '\u{FFFF}' {
            return false;
        }
        ch.is_numeric() || canonical_combining_class(ch) != 0
    }
}

/// XML 1.1 (and XML 1.0 fifth edition) name rules, expressed as code point ranges.
#[derive(Debug, Default, Clone, Copy)]
pub struct Xml11NameChecker;

impl NameChecker for Xml11NameChecker {
    fn is_ncname_start_char(&self, ch: char) -> bool {
        matches!(ch,
            'A'..='Z' | '_' | 'a'..='z'
            | '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}')
    }

    fn is_ncname_char(&self, ch: char) -> bool {
        self.is_ncname_start_char(ch)
            || matches!(ch,
                '-' | '.' | '0'..='9' | '\u{B7}'
                | '\u{300}'..='\u{36F}'
                | '\u{203F}'..='\u{2040}')
    }
}

/// Split a lexical QName into `(prefix, local)`. Returns `None` when either part is not
/// a valid `NCName`.
pub fn split_qname<'a>(checker: &dyn NameChecker, lexical: &'a str) -> Option<(Option<&'a str>, &'a str)> {
    match lexical.split_once(':') {
        Some((prefix, local)) if checker.is_ncname(prefix) && checker.is_ncname(local) => {
            Some((Some(prefix), local))
        }
        Some(_) => None,
        None if checker.is_ncname(lexical) => Some((None, lexical)),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc", true)]
    #[case("_abc", true)]
    #[case("a-b.c", true)]
    #[case("1abc", false)]
    #[case("-abc", false)]
    #[case("a:b", false)]
    #[case("", false)]
    #[case("\u{e9}t\u{e9}", true)]
    fn ncname_rules_agree_for_common_names(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(Xml10NameChecker.is_ncname(input), expected);
        assert_eq!(Xml11NameChecker.is_ncname(input), expected);
    }

    #[test]
    fn supplementary_characters_only_in_xml11() {
        let name = "a\u{10000}";
        assert!(Xml11NameChecker.is_ncname(name));
        assert!(!Xml10NameChecker.is_ncname(name));
    }

    #[test]
    fn nmtoken_allows_leading_digits_and_colons() {
        assert!(Xml11NameChecker.is_nmtoken("1a:b"));
        assert!(!Xml11NameChecker.is_nmtoken("a b"));
        assert!(!Xml11NameChecker.is_nmtoken(""));
    }

    #[test]
    fn split_qname_checks_both_parts() {
        let c = Xml11NameChecker;
        assert_eq!(split_qname(&c, "p:local"), Some((Some("p"), "local")));
        assert_eq!(split_qname(&c, "local"), Some((None, "local")));
        assert_eq!(split_qname(&c, "p:1x"), None);
        assert_eq!(split_qname(&c, "a:b:c"), None);
    }
}
