//! Symbolic flag tables and bitset accumulators
//!
//! Each configuration call names its flags with string tokens. The parse
//! functions here validate a whole argument list before merging anything, so
//! a single bad token rejects the call without partial application. The
//! facade keeps the merged result in an accumulator that only ever grows;
//! there is no API to clear an individual flag.

use std::ops::{BitOr, BitOrAssign};

use super::error::TlsError;

/// Peer verification flags
///
/// `none` maps to the empty set, mirroring the engine convention that
/// "verify nothing" is the absence of every other bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerifyFlags(u32);

impl VerifyFlags {
    /// Verify nothing (the empty set)
    pub const NONE: VerifyFlags = VerifyFlags(0);
    /// Request and verify the peer certificate
    pub const PEER: VerifyFlags = VerifyFlags(1 << 0);
    /// Ask for a client certificate only on the initial handshake
    pub const CLIENT_ONCE: VerifyFlags = VerifyFlags(1 << 1);
    /// Abort the handshake if the peer presents no certificate
    pub const FAIL_IF_NO_PEER_CERT: VerifyFlags = VerifyFlags(1 << 2);

    pub fn empty() -> Self {
        VerifyFlags(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: VerifyFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Look up a single verify token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "none" => Some(Self::NONE),
            "peer" => Some(Self::PEER),
            "client_once" => Some(Self::CLIENT_ONCE),
            "fail_if_no_peer_cert" => Some(Self::FAIL_IF_NO_PEER_CERT),
            _ => None,
        }
    }

    /// Validate a token list and merge it into a single flag set
    ///
    /// All-or-nothing: the first unknown token rejects the whole list.
    pub fn parse(tokens: &[&str]) -> Result<Self, TlsError> {
        let mut flags = Self::empty();
        for token in tokens {
            match Self::from_token(token) {
                Some(flag) => flags |= flag,
                None => return Err(TlsError::InvalidVerifyOption(token.to_string())),
            }
        }
        Ok(flags)
    }
}

impl BitOr for VerifyFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        VerifyFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for VerifyFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Protocol-level toggles
///
/// The token table covers the toggles every supported engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolOptions(u32);

impl ProtocolOptions {
    /// Enable the engine's full bug-workaround set
    pub const ALL: ProtocolOptions = ProtocolOptions(1 << 0);
    /// Prefer the server's cipher order over the client's
    pub const CIPHER_SERVER_PREFERENCE: ProtocolOptions = ProtocolOptions(1 << 1);
    /// Disable TLS-level compression
    pub const NO_COMPRESSION: ProtocolOptions = ProtocolOptions(1 << 2);
    pub const NO_SSLV2: ProtocolOptions = ProtocolOptions(1 << 3);
    pub const NO_SSLV3: ProtocolOptions = ProtocolOptions(1 << 4);
    /// Disable stateless session tickets
    pub const NO_TICKET: ProtocolOptions = ProtocolOptions(1 << 5);
    pub const NO_TLSV1: ProtocolOptions = ProtocolOptions(1 << 6);
    pub const NO_TLSV1_1: ProtocolOptions = ProtocolOptions(1 << 7);
    pub const NO_TLSV1_2: ProtocolOptions = ProtocolOptions(1 << 8);
    /// Permit legacy (insecure) renegotiation with old peers
    pub const ALLOW_UNSAFE_LEGACY_RENEGOTIATION: ProtocolOptions = ProtocolOptions(1 << 9);

    /// Token table, in documentation order
    pub const TABLE: &'static [(&'static str, ProtocolOptions)] = &[
        ("all", Self::ALL),
        ("cipher_server_preference", Self::CIPHER_SERVER_PREFERENCE),
        ("no_compression", Self::NO_COMPRESSION),
        ("no_sslv2", Self::NO_SSLV2),
        ("no_sslv3", Self::NO_SSLV3),
        ("no_ticket", Self::NO_TICKET),
        ("no_tlsv1", Self::NO_TLSV1),
        ("no_tlsv1_1", Self::NO_TLSV1_1),
        ("no_tlsv1_2", Self::NO_TLSV1_2),
        (
            "allow_unsafe_legacy_renegotiation",
            Self::ALLOW_UNSAFE_LEGACY_RENEGOTIATION,
        ),
    ];

    pub fn empty() -> Self {
        ProtocolOptions(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: ProtocolOptions) -> bool {
        self.0 & other.0 == other.0
    }

    /// Look up a single option token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, opt)| *opt)
    }

    /// Validate a token list and merge it into a single option set
    ///
    /// All-or-nothing: the first unknown token rejects the whole list.
    pub fn parse(tokens: &[&str]) -> Result<Self, TlsError> {
        let mut opts = Self::empty();
        for token in tokens {
            match Self::from_token(token) {
                Some(opt) => opts |= opt,
                None => return Err(TlsError::InvalidOption(token.to_string())),
            }
        }
        Ok(opts)
    }
}

impl BitOr for ProtocolOptions {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        ProtocolOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for ProtocolOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Session resumption cache policy
///
/// `off` is the empty set, matching the engine convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionCacheMode(u32);

impl SessionCacheMode {
    /// No session caching
    pub const OFF: SessionCacheMode = SessionCacheMode(0);
    /// Cache client-side sessions
    pub const CLIENT: SessionCacheMode = SessionCacheMode(1 << 0);
    /// Cache server-side sessions
    pub const SERVER: SessionCacheMode = SessionCacheMode(1 << 1);
    /// Cache both directions
    pub const BOTH: SessionCacheMode = SessionCacheMode(1 << 0 | 1 << 1);
    /// Don't expire sessions automatically on cache access
    pub const NO_AUTO_CLEAR: SessionCacheMode = SessionCacheMode(1 << 2);
    /// Bypass the internal cache on lookup
    pub const NO_INTERNAL_LOOKUP: SessionCacheMode = SessionCacheMode(1 << 3);
    /// Don't store new sessions in the internal cache
    pub const NO_INTERNAL_STORE: SessionCacheMode = SessionCacheMode(1 << 4);
    /// Bypass the internal cache entirely
    pub const NO_INTERNAL: SessionCacheMode = SessionCacheMode(1 << 3 | 1 << 4);

    pub fn empty() -> Self {
        SessionCacheMode(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: SessionCacheMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// Look up a single cache mode token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "off" => Some(Self::OFF),
            "client" => Some(Self::CLIENT),
            "server" => Some(Self::SERVER),
            "both" => Some(Self::BOTH),
            "no_auto_clear" => Some(Self::NO_AUTO_CLEAR),
            "no_internal_lookup" => Some(Self::NO_INTERNAL_LOOKUP),
            "no_internal_store" => Some(Self::NO_INTERNAL_STORE),
            "no_internal" => Some(Self::NO_INTERNAL),
            _ => None,
        }
    }

    /// Validate a mixed boolean/token argument list and merge it
    ///
    /// Booleans map to `both` (true) and `off` (false). All-or-nothing: the
    /// first unknown token rejects the whole list and nothing is committed.
    pub fn parse(args: &[CacheModeArg<'_>]) -> Result<Self, TlsError> {
        let mut mode = Self::empty();
        for arg in args {
            match arg {
                CacheModeArg::Enabled(true) => mode |= Self::BOTH,
                CacheModeArg::Enabled(false) => mode |= Self::OFF,
                CacheModeArg::Named(token) => match Self::from_token(token) {
                    Some(m) => mode |= m,
                    None => return Err(TlsError::InvalidCacheMode(token.to_string())),
                },
            }
        }
        Ok(mode)
    }
}

impl BitOr for SessionCacheMode {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        SessionCacheMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for SessionCacheMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// One argument to `set_session_cache_mode`: a switch or a named mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheModeArg<'a> {
    Enabled(bool),
    Named(&'a str),
}

impl From<bool> for CacheModeArg<'_> {
    fn from(enabled: bool) -> Self {
        CacheModeArg::Enabled(enabled)
    }
}

impl<'a> From<&'a str> for CacheModeArg<'a> {
    fn from(token: &'a str) -> Self {
        CacheModeArg::Named(token)
    }
}
