/// XML Schema namespace (built-in atomic types).
pub const XS: &str = "http://www.w3.org/2001/XMLSchema";
/// Namespace for W3C-defined XPath/XQuery error codes (xqt-errors).
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";
/// Namespace for library-specific error codes.
pub const PLATYNUI_ERR_NS: &str = "urn:platynui:error";
/// Namespace of project-defined type names.
pub const PLATYNUI_XDM_NS: &str = "urn:platynui:xdm";
/// The reserved `xml` namespace.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

pub const CODEPOINT_URI: &str = "http://www.w3.org/2005/xpath-functions/collation/codepoint";
pub const SIMPLE_CASE_URI: &str = "urn:platynui:collation:simple-case";
pub const SIMPLE_ACCENT_URI: &str = "urn:platynui:collation:simple-accent";
pub const SIMPLE_CASE_ACCENT_URI: &str = "urn:platynui:collation:simple-case-accent";
