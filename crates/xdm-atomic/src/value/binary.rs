//! `xs:hexBinary` and `xs:base64Binary`: both wrap raw octets.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{ConversionResult, ValidationError};
use crate::value::string::trim_xml_whitespace;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BinaryValue(Arc<[u8]>);

impl BinaryValue {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_hex(lexical: &str) -> ConversionResult<Self> {
        let s = trim_xml_whitespace(lexical).as_bytes();
        let invalid = || ValidationError::invalid(format!("invalid xs:hexBinary value '{lexical}'"));
        if s.len() % 2 != 0 {
            return Err(invalid());
        }
        let bytes = s
            .chunks_exact(2)
            .map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(invalid)?;
        Ok(Self::new(bytes))
    }

    /// Canonical form: upper-case hex digits.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 2);
        for &b in self.0.iter() {
            out.push(char::from(HEX_DIGITS[usize::from(b >> 4)]));
            out.push(char::from(HEX_DIGITS[usize::from(b & 0xf)]));
        }
        out
    }

    /// Whitespace inside the lexical form is ignored.
    pub fn from_base64(lexical: &str) -> ConversionResult<Self> {
        let compact: String = lexical.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact.as_bytes()).map(Self::new).map_err(|e| {
            ValidationError::invalid(format!("invalid xs:base64Binary value '{lexical}': {e}"))
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl From<Vec<u8>> for BinaryValue {
    fn from(v: Vec<u8>) -> Self {
        Self::new(v)
    }
}
