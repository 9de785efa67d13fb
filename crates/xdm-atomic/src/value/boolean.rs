use crate::error::{ConversionResult, ValidationError};
use crate::value::string::trim_xml_whitespace;

/// Parse `true`, `false`, `1` or `0`, surrounding whitespace ignored.
pub fn parse_boolean(lexical: &str) -> ConversionResult<bool> {
    match trim_xml_whitespace(lexical) {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ValidationError::invalid(format!(
            "invalid lexical form for xs:boolean: '{lexical}'"
        ))),
    }
}

pub fn format_boolean(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("true", true)]
    #[case(" 1 ", true)]
    #[case("false", false)]
    #[case("0", false)]
    fn accepts(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(parse_boolean(input).unwrap(), expected);
    }

    #[rstest]
    #[case("TRUE")]
    #[case("yes")]
    #[case("")]
    #[case("2")]
    fn rejects(#[case] input: &str) {
        assert!(parse_boolean(input).is_err());
    }
}
