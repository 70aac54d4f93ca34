//! Protocol method identifiers

use super::error::TlsError;

/// Protocol method selected once at context creation
///
/// The token set is fixed and matched case-sensitively: `"sslv3"`,
/// `"tlsv1"`, and `"sslv23"` (any supported version, the usual choice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// SSL 3.0 only (deprecated, kept for interop testing)
    Sslv3,
    /// TLS 1.0 only
    Tlsv1,
    /// Any version the engine supports
    Any,
}

impl Method {
    /// Parse a protocol method name
    pub fn from_name(name: &str) -> Result<Self, TlsError> {
        match name {
            "sslv3" => Ok(Method::Sslv3),
            "tlsv1" => Ok(Method::Tlsv1),
            "sslv23" => Ok(Method::Any),
            _ => Err(TlsError::InvalidProtocol(name.to_string())),
        }
    }

    /// Get the method name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Sslv3 => "sslv3",
            Method::Tlsv1 => "tlsv1",
            Method::Any => "sslv23",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
