//! String payloads and the restricted string types.

use core::fmt;
use std::sync::OnceLock;

use compact_str::CompactString;
use fancy_regex::Regex;
use itertools::Itertools;

use crate::error::{ConversionResult, ErrorCode, ValidationError};
use crate::names::NameChecker;

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Strip leading and trailing XML whitespace (space, tab, CR, LF).
pub fn trim_xml_whitespace(s: &str) -> &str {
    s.trim_matches(is_xml_whitespace)
}

/// The `whiteSpace` facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whitespace {
    Preserve,
    /// Tab, CR and LF become spaces.
    Replace,
    /// Replace, then collapse runs of spaces and trim.
    Collapse,
}

impl Whitespace {
    pub fn apply(self, s: &str) -> CompactString {
        match self {
            Whitespace::Preserve => CompactString::from(s),
            Whitespace::Replace => s
                .chars()
                .map(|c| if is_xml_whitespace(c) { ' ' } else { c })
                .collect(),
            Whitespace::Collapse => {
                CompactString::from(s.split(is_xml_whitespace).filter(|p| !p.is_empty()).join(" "))
            }
        }
    }
}

/// The string types derived from `xs:string` by restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    NormalizedString,
    Token,
    Language,
    NmToken,
    Name,
    NCName,
    Id,
    IdRef,
    Entity,
}

impl StringKind {
    pub fn whitespace(self) -> Whitespace {
        match self {
            StringKind::NormalizedString => Whitespace::Replace,
            _ => Whitespace::Collapse,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StringKind::NormalizedString => "xs:normalizedString",
            StringKind::Token => "xs:token",
            StringKind::Language => "xs:language",
            StringKind::NmToken => "xs:NMTOKEN",
            StringKind::Name => "xs:Name",
            StringKind::NCName => "xs:NCName",
            StringKind::Id => "xs:ID",
            StringKind::IdRef => "xs:IDREF",
            StringKind::Entity => "xs:ENTITY",
        }
    }
}

static LANGUAGE: OnceLock<Option<Regex>> = OnceLock::new();

fn is_language(s: &str) -> bool {
    LANGUAGE
        .get_or_init(|| Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s).unwrap_or(false))
}

/// Apply the whitespace facet of `kind` and check the result against its lexical space.
///
/// `token` and `normalizedString` only transform whitespace and never fail.
pub fn validate_restricted(
    kind: StringKind,
    value: &str,
    checker: &dyn NameChecker,
) -> ConversionResult<CompactString> {
    let normalized = kind.whitespace().apply(value);
    let ok = match kind {
        StringKind::NormalizedString | StringKind::Token => true,
        StringKind::Language => is_language(&normalized),
        StringKind::NmToken => checker.is_nmtoken(&normalized),
        // Name is NCName with colons allowed anywhere
        StringKind::Name => checker.is_ncname(&normalized.replace(':', "_")),
        StringKind::NCName | StringKind::Id | StringKind::IdRef | StringKind::Entity => {
            checker.is_ncname(&normalized)
        }
    };
    if ok {
        Ok(normalized)
    } else {
        Err(ValidationError::invalid(format!(
            "the value '{value}' is not a valid {}",
            kind.display_name()
        )))
    }
}

/// Character payload of string-like values, with a memoized XPath length.
#[derive(Clone, Default)]
pub struct StringValue {
    text: CompactString,
    length: OnceLock<usize>,
}

impl StringValue {
    pub fn new(text: impl Into<CompactString>) -> Self {
        Self {
            text: text.into(),
            length: OnceLock::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of characters; a character outside the BMP counts once.
    pub fn length(&self) -> usize {
        *self.length.get_or_init(|| self.text.chars().count())
    }

    /// Code points of the string.
    pub fn expand(&self) -> Vec<u32> {
        self.text.chars().map(u32::from).collect()
    }

    /// Build a string from code points; surrogates and non-characters fail with
    /// `FOCH0001`.
    pub fn contract(codepoints: &[u32]) -> ConversionResult<Self> {
        let mut text = CompactString::with_capacity(codepoints.len());
        for &cp in codepoints {
            match char::from_u32(cp) {
                Some(c) if is_xml_char(c) => text.push(c),
                _ => {
                    return Err(ValidationError::new(
                        ErrorCode::FOCH0001,
                        format!("invalid XML character [x{cp:X}]"),
                    ));
                }
            }
        }
        Ok(Self::new(text))
    }

    /// Equality by code points, no collation involved.
    pub fn codepoint_equals(&self, other: &StringValue) -> bool {
        self.text == other.text
    }

    /// `true` when the string holds characters that UTF-16 encodes as surrogate pairs.
    pub fn contains_surrogate_pairs(&self) -> bool {
        self.text.chars().any(|c| u32::from(c) > 0xFFFF)
    }

    pub fn into_compact(self) -> CompactString {
        self.text
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

impl PartialEq for StringValue {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for StringValue {}

impl core::hash::Hash for StringValue {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Debug for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.text.as_str(), f)
    }
}

impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for StringValue {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StringValue {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<CompactString> for StringValue {
    fn from(s: CompactString) -> Self {
        Self::new(s)
    }
}
