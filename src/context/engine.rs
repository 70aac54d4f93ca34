//! The engine seam
//!
//! [`TlsEngine`] is the contract between the configuration facade and the
//! underlying TLS library. The facade performs no cryptography, parses no
//! certificates, and opens no files itself; every such operation is a call
//! through this trait. One engine handle backs exactly one context and is
//! freed by dropping the engine value.

use std::path::Path;

use super::flags::{ProtocolOptions, SessionCacheMode, VerifyFlags};
use super::method::Method;

/// A diagnostic produced by the engine when it rejects an operation
///
/// Carries the engine's reason string verbatim (bad file, malformed PEM,
/// unparsable cipher spec, ...).
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct EngineError {
    reason: String,
}

impl EngineError {
    pub fn new(reason: impl Into<String>) -> Self {
        EngineError {
            reason: reason.into(),
        }
    }

    /// The engine's diagnostic text
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Passphrase hook registered with the engine while a key is being loaded
///
/// The engine invokes it with a scratch buffer when it encounters an
/// encrypted key; the hook writes the secret and returns the number of bytes
/// written. Returning 0 means no secret is available and decryption fails
/// inside the engine.
pub type PassphraseHook = Box<dyn FnMut(&mut [u8]) -> usize>;

/// Session statistics snapshot
///
/// A pure passthrough of the engine's counters. All counters are
/// monotonically non-decreasing for the life of the context except where the
/// engine itself resets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextStats {
    /// Sessions currently in the cache
    pub number: u64,
    /// Client handshakes started
    pub connect: u64,
    /// Client handshakes completed
    pub connect_good: u64,
    /// Client renegotiations requested
    pub connect_renegotiate: u64,
    /// Server handshakes started
    pub accept: u64,
    /// Server handshakes completed
    pub accept_good: u64,
    /// Server renegotiations requested
    pub accept_renegotiate: u64,
    /// Sessions resumed from the internal cache
    pub hits: u64,
    /// Sessions resumed through the external lookup callback
    pub cb_hits: u64,
    /// Resumption attempts that missed the cache
    pub misses: u64,
    /// Resumption attempts that found an expired session
    pub timeouts: u64,
    /// Sessions evicted because the cache was full
    pub cache_full: u64,
}

/// Contract with the underlying TLS library
///
/// Implementors own one engine context handle for their whole lifetime;
/// dropping the implementor frees the handle. Fallible operations return the
/// engine's diagnostic in [`EngineError`]; infallible ones mirror engine
/// calls that cannot report failure.
pub trait TlsEngine {
    /// Allocate a context handle for the given protocol method
    fn new_context(method: Method) -> Result<Self, EngineError>
    where
        Self: Sized;

    /// Load trusted CA certificates from a file and/or a directory
    fn load_verify_locations(
        &mut self,
        ca_file: Option<&Path>,
        ca_dir: Option<&Path>,
    ) -> Result<(), EngineError>;

    /// Load the certificate chain (leaf first) from a PEM file
    fn use_certificate_chain_file(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Load the private key from a PEM file
    ///
    /// If a passphrase hook is registered it answers the engine's decryption
    /// callback; otherwise an encrypted key fails without prompting.
    fn use_private_key_file(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Register or clear the passphrase hook
    ///
    /// The hook must only ever be live across a single
    /// `use_private_key_file` call; the facade guarantees this.
    fn set_passphrase_hook(&mut self, hook: Option<PassphraseHook>);

    /// Set the cipher preference list; the spec string is engine syntax
    fn set_cipher_list(&mut self, spec: &str) -> Result<(), EngineError>;

    /// Apply peer verification flags, replacing the previous set
    fn set_verify(&mut self, flags: VerifyFlags);

    /// Apply protocol options
    fn set_options(&mut self, opts: ProtocolOptions);

    /// Limit the certificate chain verification depth
    fn set_verify_depth(&mut self, depth: u32);

    /// Set the session id context distinguishing this context in caches
    fn set_session_id_context(&mut self, sid_ctx: &[u8]) -> Result<(), EngineError>;

    /// Apply the session cache policy, replacing the previous one
    fn set_session_cache_mode(&mut self, mode: SessionCacheMode);

    /// Set the session cache capacity, returning the previous value
    ///
    /// 0 means unlimited per engine convention.
    fn set_session_cache_size(&mut self, size: u64) -> u64;

    /// Current session cache capacity
    fn session_cache_size(&self) -> u64;

    /// Set the session timeout in seconds, returning the previous value
    fn set_timeout(&mut self, seconds: u64) -> u64;

    /// Snapshot the session statistics counters
    fn stats(&self) -> ContextStats;
}
