//! Error types for the atomic value system.
//!
//! Two channels are kept apart on purpose:
//! - [`ValidationError`] is returned (never thrown) by casts and lexical parsing, so a
//!   caller implementing `castable as` can treat a failure as an ordinary outcome.
//! - [`Error`] is the dynamic error raised by arithmetic, comparison and interop code.
//!
//! A [`ValidationError`] converts into an [`Error`] via `From`, so `?` propagates it
//! when the caller did not anticipate the failure.

use core::fmt;
use std::sync::Arc;

use crate::consts::{ERR_NS, PLATYNUI_ERR_NS};
use crate::names::ExpandedName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FOAR0001, // division by zero
    FOAR0002, // numeric overflow / underflow
    FOCA0001, // input value too large for decimal
    FOCA0002, // invalid lexical value / special value cast
    FOCA0003, // input value too large for integer
    FOCA0005, // NaN supplied as float/double value
    FODT0001, // overflow/underflow in date/time operation
    FODT0002, // overflow/underflow in duration operation
    FOCH0001, // code point not valid
    FOCH0002, // unsupported collation
    FODT0003, // invalid timezone value
    FORG0001, // invalid value for cast/constructor
    FONS0004, // no namespace found for prefix
    FORG0006, // invalid argument type (effective boolean value)
    XPTY0004, // type error
    XDMI0001, // project specific: no host representation for a value
    // Fallback / unknown (kept last)
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FOAR0001 => "FOAR0001",
            ErrorCode::FOAR0002 => "FOAR0002",
            ErrorCode::FOCA0001 => "FOCA0001",
            ErrorCode::FOCA0002 => "FOCA0002",
            ErrorCode::FOCA0003 => "FOCA0003",
            ErrorCode::FOCA0005 => "FOCA0005",
            ErrorCode::FODT0001 => "FODT0001",
            ErrorCode::FODT0002 => "FODT0002",
            ErrorCode::FOCH0001 => "FOCH0001",
            ErrorCode::FOCH0002 => "FOCH0002",
            ErrorCode::FODT0003 => "FODT0003",
            ErrorCode::FORG0001 => "FORG0001",
            ErrorCode::FONS0004 => "FONS0004",
            ErrorCode::FORG0006 => "FORG0006",
            ErrorCode::XPTY0004 => "XPTY0004",
            ErrorCode::XDMI0001 => "XDMI0001",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }

    /// Expanded name of the code: W3C codes live in the xqt-errors namespace,
    /// project codes in the PlatynUI namespace.
    pub fn qname(&self) -> ExpandedName {
        let ns = match self {
            ErrorCode::XDMI0001 => PLATYNUI_ERR_NS,
            _ => ERR_NS,
        };
        ExpandedName::new(Some(ns.to_string()), self.as_str())
    }

    pub fn from_code(s: &str) -> Self {
        use ErrorCode::*;
        match s.strip_prefix("err:").unwrap_or(s) {
            "FOAR0001" => FOAR0001,
            "FOAR0002" => FOAR0002,
            "FOCA0001" => FOCA0001,
            "FOCA0002" => FOCA0002,
            "FOCA0003" => FOCA0003,
            "FOCA0005" => FOCA0005,
            "FODT0001" => FODT0001,
            "FODT0002" => FODT0002,
            "FOCH0001" => FOCH0001,
            "FOCH0002" => FOCH0002,
            "FODT0003" => FODT0003,
            "FORG0001" => FORG0001,
            "FONS0004" => FONS0004,
            "FORG0006" => FORG0006,
            "XPTY0004" => XPTY0004,
            "XDMI0001" => XDMI0001,
            _ => Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dynamic error raised by operations on atomic values.
#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub is_type_error: bool,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>, // optional chained cause
}

impl Error {
    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            is_type_error: false,
            source: None,
        }
    }

    /// Shorthand for an `XPTY0004` type error.
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self {
            is_type_error: true,
            ..Self::from_code(ErrorCode::XPTY0004, msg)
        }
    }

    pub fn code_enum(&self) -> ErrorCode {
        self.code
    }

    /// Format the code as a human-readable string (`err:LOCAL`).
    pub fn format_code(&self) -> String {
        format!("err:{}", self.code.as_str())
    }

    /// Compose an error with a source cause.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>,
    ) -> Self {
        self.source = source.into();
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} ({})", self.message, self.format_code())
    }
}

/// Failure of a cast or lexical validation, returned as a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {message} (err:{code})")]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
    pub is_type_error: bool,
}

impl ValidationError {
    pub fn new(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            is_type_error: false,
        }
    }

    /// `FORG0001`: the lexical form or value is not valid for the target type.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::FORG0001, msg)
    }

    /// `XPTY0004`: the conversion is not permitted between the two types.
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self {
            is_type_error: true,
            ..Self::new(ErrorCode::XPTY0004, msg)
        }
    }

    pub fn code_enum(&self) -> ErrorCode {
        self.code
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self {
            code: e.code,
            message: e.message,
            is_type_error: e.is_type_error,
            source: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
pub type ConversionResult<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_strings() {
        for code in [ErrorCode::FOAR0001, ErrorCode::FORG0001, ErrorCode::XPTY0004] {
            assert_eq!(ErrorCode::from_code(code.as_str()), code);
            assert_eq!(ErrorCode::from_code(&format!("err:{code}")), code);
        }
        assert_eq!(ErrorCode::from_code("NOPE0000"), ErrorCode::Unknown);
    }

    #[test]
    fn validation_error_keeps_code_and_type_flag() {
        let v = ValidationError::type_error("cannot convert");
        let e: Error = v.into();
        assert_eq!(e.code_enum(), ErrorCode::XPTY0004);
        assert!(e.is_type_error);
        assert_eq!(e.to_string(), "error: cannot convert (err:XPTY0004)");
    }

    #[test]
    fn project_codes_use_their_own_namespace() {
        assert_eq!(
            ErrorCode::XDMI0001.qname().ns_uri.as_deref(),
            Some(PLATYNUI_ERR_NS)
        );
        assert_eq!(ErrorCode::FOAR0001.qname().ns_uri.as_deref(), Some(ERR_NS));
    }
}
