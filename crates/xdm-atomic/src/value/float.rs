//! Lexical handling of `xs:float` and `xs:double`.

use crate::error::{ConversionResult, ValidationError};
use crate::value::string::trim_xml_whitespace;

/// Lower bound of the magnitudes printed without exponent.
const PLAIN_MIN: f64 = 1e-6;
/// Upper bound (exclusive) of the magnitudes printed without exponent.
const PLAIN_MAX: f64 = 1e6;

/// Check `[+-]?(digits(.digits?)?|.digits)([eE][+-]?digits)?`, or one of the special values.
fn is_float_lexical(s: &str) -> bool {
    if matches!(s, "INF" | "-INF" | "+INF" | "NaN") {
        return true;
    }
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !digits(int_part) || !digits(frac_part) {
        return false;
    }
    match exponent {
        None => true,
        Some(e) => {
            let e = e.strip_prefix(['+', '-']).unwrap_or(e);
            !e.is_empty() && digits(e)
        }
    }
}

pub fn parse_double(lexical: &str) -> ConversionResult<f64> {
    let s = trim_xml_whitespace(lexical);
    if !is_float_lexical(s) {
        return Err(ValidationError::invalid(format!(
            "invalid lexical form for xs:double: '{lexical}'"
        )));
    }
    match s {
        "INF" | "+INF" => Ok(f64::INFINITY),
        "-INF" => Ok(f64::NEG_INFINITY),
        "NaN" => Ok(f64::NAN),
        _ => s.parse::<f64>().map_err(|_| {
            ValidationError::invalid(format!("invalid lexical form for xs:double: '{lexical}'"))
        }),
    }
}

pub fn parse_float(lexical: &str) -> ConversionResult<f32> {
    let s = trim_xml_whitespace(lexical);
    if !is_float_lexical(s) {
        return Err(ValidationError::invalid(format!(
            "invalid lexical form for xs:float: '{lexical}'"
        )));
    }
    match s {
        "INF" | "+INF" => Ok(f32::INFINITY),
        "-INF" => Ok(f32::NEG_INFINITY),
        "NaN" => Ok(f32::NAN),
        _ => s.parse::<f32>().map_err(|_| {
            ValidationError::invalid(format!("invalid lexical form for xs:float: '{lexical}'"))
        }),
    }
}

fn special(v: f64) -> Option<&'static str> {
    if v.is_nan() {
        Some("NaN")
    } else if v == f64::INFINITY {
        Some("INF")
    } else if v == f64::NEG_INFINITY {
        Some("-INF")
    } else if v == 0.0 {
        Some(if v.is_sign_negative() { "-0" } else { "0" })
    } else {
        None
    }
}

/// Turn Rust's `{:e}` output (`1.5e-7`, `1e6`) into the XPath form (`1.5E-7`, `1.0E6`).
fn exponent_form(sci: &str) -> String {
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci, "0"));
    if mantissa.contains('.') {
        format!("{mantissa}E{exp}")
    } else {
        format!("{mantissa}.0E{exp}")
    }
}

/// XPath string value of a double: plain notation inside `[1e-6, 1e6)`, otherwise the
/// shortest round-tripping mantissa with an exponent.
pub fn format_double(v: f64) -> String {
    if let Some(s) = special(v) {
        return s.to_string();
    }
    let magnitude = v.abs();
    if (PLAIN_MIN..PLAIN_MAX).contains(&magnitude) {
        v.to_string()
    } else {
        exponent_form(&format!("{v:e}"))
    }
}

pub fn format_float(v: f32) -> String {
    if let Some(s) = special(f64::from(v)) {
        return s.to_string();
    }
    let magnitude = f64::from(v.abs());
    if (PLAIN_MIN..PLAIN_MAX).contains(&magnitude) {
        v.to_string()
    } else {
        exponent_form(&format!("{v:e}"))
    }
}

/// Canonical lexical form: always in exponent notation.
pub fn canonical_double(v: f64) -> String {
    match special(v) {
        Some("0") => "0.0E0".to_string(),
        Some("-0") => "-0.0E0".to_string(),
        Some(s) => s.to_string(),
        None => exponent_form(&format!("{v:e}")),
    }
}

pub fn canonical_float(v: f32) -> String {
    match special(f64::from(v)) {
        Some("0") => "0.0E0".to_string(),
        Some("-0") => "-0.0E0".to_string(),
        Some(s) => s.to_string(),
        None => exponent_form(&format!("{v:e}")),
    }
}

/// XPath `round` on doubles: ties toward positive infinity, signed zero preserved.
pub fn round_double(v: f64) -> f64 {
    if !v.is_finite() || v == 0.0 {
        return v;
    }
    let f = v.floor();
    let r = if v - f >= 0.5 { f + 1.0 } else { f };
    if r == 0.0 && v < 0.0 { -0.0 } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, "1")]
    #[case(0.5, "0.5")]
    #[case(-123_456.75, "-123456.75")]
    #[case(1e6, "1.0E6")]
    #[case(1.5e-7, "1.5E-7")]
    #[case(1e-6, "0.000001")]
    #[case(f64::INFINITY, "INF")]
    #[case(f64::NEG_INFINITY, "-INF")]
    #[case(-0.0, "-0")]
    fn double_string_values(#[case] v: f64, #[case] expected: &str) {
        assert_eq!(format_double(v), expected);
    }

    #[test]
    fn nan_formats_and_parses() {
        assert_eq!(format_double(f64::NAN), "NaN");
        assert!(parse_double("NaN").unwrap().is_nan());
    }

    #[test]
    fn float_keeps_single_precision_digits() {
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(3.0e10), "3.0E10");
    }

    #[rstest]
    #[case(1000.0, "1.0E3")]
    #[case(0.0, "0.0E0")]
    #[case(-1.25, "-1.25E0")]
    fn canonical_forms(#[case] v: f64, #[case] expected: &str) {
        assert_eq!(canonical_double(v), expected);
    }

    #[rstest]
    #[case("1", 1.0)]
    #[case(" -1.5e3 ", -1500.0)]
    #[case(".5", 0.5)]
    #[case("5.", 5.0)]
    #[case("-INF", f64::NEG_INFINITY)]
    fn parses(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_double(input).unwrap(), expected);
    }

    #[rstest]
    #[case("inf")]
    #[case("infinity")]
    #[case("nan")]
    #[case("1e")]
    #[case(".")]
    #[case("e5")]
    #[case("")]
    fn rejects_rust_only_spellings(#[case] input: &str) {
        assert!(parse_double(input).is_err());
    }

    #[rstest]
    #[case(2.5, 3.0)]
    #[case(-2.5, -2.0)]
    #[case(0.499_999_999_999_999_94, 0.0)]
    #[case(-0.3, -0.0)]
    fn rounding(#[case] v: f64, #[case] expected: f64) {
        let r = round_double(v);
        assert_eq!(r, expected);
        assert_eq!(r.is_sign_negative(), expected.is_sign_negative());
    }
}
