use compact_str::CompactString;
use url::{ParseError, Url};

use crate::error::{ConversionResult, ValidationError};
use crate::value::string::Whitespace;

/// Base against which relative references are checked for well-formedness.
const PROBE_BASE: &str = "http://probe.invalid/";

/// Collapse whitespace and check that the result is an absolute URI or a relative
/// reference. Returns the collapsed form; the original spelling is preserved otherwise.
pub fn validate_any_uri(lexical: &str) -> ConversionResult<CompactString> {
    let collapsed = Whitespace::Collapse.apply(lexical);
    let invalid = || ValidationError::invalid(format!("invalid xs:anyURI value '{lexical}'"));
    if collapsed.matches('#').count() > 1 || has_bad_escape(&collapsed) {
        return Err(invalid());
    }
    match Url::parse(&collapsed) {
        Ok(_) => Ok(collapsed),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(PROBE_BASE).map_err(|_| invalid())?;
            base.join(&collapsed).map(|_| collapsed.clone()).map_err(|_| invalid())
        }
        Err(_) => Err(invalid()),
    }
}

/// A `%` must be followed by two hex digits.
fn has_bad_escape(s: &str) -> bool {
    let b = s.as_bytes();
    b.iter().enumerate().any(|(i, &c)| {
        c == b'%'
            && !(b.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && b.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://example.com/a?b#c")]
    #[case("urn:isbn:0451450523")]
    #[case("../relative/path")]
    #[case("")]
    #[case("%20x")]
    fn accepts(#[case] input: &str) {
        assert!(validate_any_uri(input).is_ok(), "{input}");
    }

    #[rstest]
    #[case("http://a/#x#y")]
    #[case("%zz")]
    #[case("http://[::1")]
    fn rejects(#[case] input: &str) {
        assert!(validate_any_uri(input).is_err(), "{input}");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(validate_any_uri("  http://a/b  ").unwrap(), "http://a/b");
    }
}
