//! The TLS context facade
//!
//! [`TlsContext`] validates symbolic configuration input, keeps the
//! accumulated flag state, and drives the engine. The protocol method is
//! chosen once at creation and is immutable afterwards; flag sets only grow
//! across calls; the engine handle is exclusively owned and released exactly
//! once.
//!
//! Configuration is synchronous and single-threaded with respect to one
//! context: callers sharing a context across threads must serialize
//! externally. The passphrase provider runs inline during key loading; a
//! hanging provider hangs the caller.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use super::engine::{ContextStats, PassphraseHook, TlsEngine};
use super::error::TlsError;
use super::flags::{CacheModeArg, ProtocolOptions, SessionCacheMode, VerifyFlags};
use super::method::Method;
use super::openssl::OpenSslEngine;
use super::Result;

/// Upper bound on a passphrase delivered to the engine, in bytes
///
/// Longer secrets are truncated; engine scratch buffers are typically far
/// smaller than this anyway.
pub const MAX_PASSPHRASE_LEN: usize = 256;

/// Handshake role of a context
///
/// A fresh context is `Uninitialized`; a handshake driver must find it set
/// to `Server` or `Client` before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeMode {
    Uninitialized,
    Server,
    Client,
}

impl std::fmt::Display for HandshakeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            HandshakeMode::Uninitialized => "uninitialized",
            HandshakeMode::Server => "server",
            HandshakeMode::Client => "client",
        })
    }
}

/// Where the secret for an encrypted private key comes from
///
/// With `Absent`, the engine's interactive prompt is suppressed, so loading
/// an encrypted key simply fails. A `Provider` is invoked synchronously at
/// most once per load attempt; returning `None` fails the load with
/// [`TlsError::InvalidPassphrase`]. Secrets longer than
/// [`MAX_PASSPHRASE_LEN`] bytes are truncated.
pub enum PassphraseSource {
    Absent,
    Static(String),
    Provider(Box<dyn FnMut() -> Option<String>>),
}

impl PassphraseSource {
    /// Compile the source into an engine hook
    ///
    /// `provider_failed` is raised when the provider yields no usable
    /// secret, so the caller can distinguish that from an engine-side
    /// decryption failure.
    fn into_hook(self, provider_failed: Rc<Cell<bool>>) -> PassphraseHook {
        fn fill(secret: &str, buf: &mut [u8]) -> usize {
            let n = secret.len().min(buf.len()).min(MAX_PASSPHRASE_LEN);
            buf[..n].copy_from_slice(&secret.as_bytes()[..n]);
            n
        }

        match self {
            PassphraseSource::Absent => Box::new(|_| 0),
            PassphraseSource::Static(secret) => Box::new(move |buf| fill(&secret, buf)),
            PassphraseSource::Provider(provider) => {
                let mut provider = Some(provider);
                Box::new(move |buf| match provider.take() {
                    Some(mut produce) => match produce() {
                        Some(secret) => fill(&secret, buf),
                        None => {
                            provider_failed.set(true);
                            0
                        }
                    },
                    // Invoked a second time within one load attempt; the
                    // at-most-once contract means there is nothing to say.
                    None => 0,
                })
            }
        }
    }
}

/// Keeps the engine's passphrase hook alive for exactly one load call
///
/// Deregistration happens in `Drop`, so every exit path out of
/// `load_private_key` (success, engine failure, panic) clears the hook.
struct HookGuard<'a, E: TlsEngine> {
    engine: &'a mut E,
}

impl<'a, E: TlsEngine> HookGuard<'a, E> {
    fn register(engine: &'a mut E, hook: PassphraseHook) -> Self {
        engine.set_passphrase_hook(Some(hook));
        HookGuard { engine }
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        self.engine.use_private_key_file(path)?;
        Ok(())
    }
}

impl<E: TlsEngine> Drop for HookGuard<'_, E> {
    fn drop(&mut self) {
        self.engine.set_passphrase_hook(None);
    }
}

/// A reusable TLS configuration object
///
/// Created from a protocol method name, configured through the methods
/// below, then handed to a handshake driver. The engine handle is owned
/// exclusively; [`TlsContext::release`] frees it early and is idempotent,
/// and dropping the context frees it otherwise.
pub struct TlsContext<E: TlsEngine = OpenSslEngine> {
    engine: Option<E>,
    method: Method,
    mode: HandshakeMode,
    verify_flags: VerifyFlags,
    protocol_options: ProtocolOptions,
    cache_mode: SessionCacheMode,
}

impl<E: TlsEngine> std::fmt::Debug for TlsContext<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsContext")
            .field("engine", &self.engine.as_ref().map(|_| ..))
            .field("method", &self.method)
            .field("mode", &self.mode)
            .field("verify_flags", &self.verify_flags)
            .field("protocol_options", &self.protocol_options)
            .field("cache_mode", &self.cache_mode)
            .finish()
    }
}

impl<E: TlsEngine> TlsContext<E> {
    /// Create a context for the named protocol method
    ///
    /// Unknown names fail with [`TlsError::InvalidProtocol`]; an engine
    /// allocation failure surfaces as [`TlsError::AllocationFailed`]. The
    /// fresh context is uninitialized with every flag set empty.
    pub fn create(method_name: &str) -> Result<Self> {
        let method = Method::from_name(method_name)?;
        let engine = E::new_context(method).map_err(|_| TlsError::AllocationFailed)?;
        Ok(Self::from_engine(engine, method))
    }

    /// Wrap an already-allocated engine handle
    pub(crate) fn from_engine(engine: E, method: Method) -> Self {
        TlsContext {
            engine: Some(engine),
            method,
            mode: HandshakeMode::Uninitialized,
            verify_flags: VerifyFlags::empty(),
            protocol_options: ProtocolOptions::empty(),
            cache_mode: SessionCacheMode::empty(),
        }
    }

    fn engine_mut(&mut self) -> Result<&mut E> {
        self.engine.as_mut().ok_or(TlsError::ContextReleased)
    }

    fn engine_ref(&self) -> Result<&E> {
        self.engine.as_ref().ok_or(TlsError::ContextReleased)
    }

    /// Protocol method selected at creation
    pub fn method(&self) -> Method {
        self.method
    }

    /// Current handshake role
    pub fn mode(&self) -> HandshakeMode {
        self.mode
    }

    /// Accumulated verify flags
    pub fn verify_flags(&self) -> VerifyFlags {
        self.verify_flags
    }

    /// Accumulated protocol options
    pub fn protocol_options(&self) -> ProtocolOptions {
        self.protocol_options
    }

    /// Accumulated session cache mode
    pub fn session_cache_mode(&self) -> SessionCacheMode {
        self.cache_mode
    }

    /// Whether the engine handle has been released
    pub fn is_released(&self) -> bool {
        self.engine.is_none()
    }

    /// Set the handshake role: `"server"` or `"client"`
    ///
    /// Any other token is rejected without touching the stored mode. Real
    /// use sets the mode exactly once; re-setting is not rejected and the
    /// last write wins.
    pub fn set_mode(&mut self, mode: &str) -> Result<()> {
        self.engine_ref()?;
        match mode {
            "server" => {
                self.mode = HandshakeMode::Server;
                Ok(())
            }
            "client" => {
                self.mode = HandshakeMode::Client;
                Ok(())
            }
            other => Err(TlsError::InvalidMode(other.to_string())),
        }
    }

    /// Load trusted CA certificates from a file and/or directory
    ///
    /// At least one location should be supplied; path validation and
    /// certificate parsing belong entirely to the engine.
    pub fn load_trust_store(
        &mut self,
        ca_file: Option<&Path>,
        ca_dir: Option<&Path>,
    ) -> Result<()> {
        self.engine_mut()?.load_verify_locations(ca_file, ca_dir)?;
        Ok(())
    }

    /// Load the certificate chain (leaf first) from a PEM file
    pub fn load_certificate_chain(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.engine_mut()?
            .use_certificate_chain_file(path.as_ref())?;
        Ok(())
    }

    /// Load the private key from a PEM file
    ///
    /// The passphrase source is registered with the engine only for the
    /// duration of this call and is deregistered on every exit path, so it
    /// can never fire from an unrelated engine operation afterwards.
    pub fn load_private_key(
        &mut self,
        path: impl AsRef<Path>,
        source: PassphraseSource,
    ) -> Result<()> {
        let provider_failed = Rc::new(Cell::new(false));
        let hook = source.into_hook(Rc::clone(&provider_failed));
        let engine = self.engine.as_mut().ok_or(TlsError::ContextReleased)?;

        let result = HookGuard::register(engine, hook).load(path.as_ref());

        match result {
            Ok(()) => Ok(()),
            Err(_) if provider_failed.get() => Err(TlsError::InvalidPassphrase),
            Err(e) => Err(e),
        }
    }

    /// Set the cipher preference list
    ///
    /// The spec string is opaque here and validated only by the engine.
    pub fn set_cipher_list(&mut self, spec: &str) -> Result<()> {
        self.engine_mut()?.set_cipher_list(spec)?;
        Ok(())
    }

    /// Limit the certificate chain verification depth
    ///
    /// Always succeeds locally; any clamping is the engine's business.
    pub fn set_verify_depth(&mut self, depth: u32) -> Result<()> {
        self.engine_mut()?.set_verify_depth(depth);
        Ok(())
    }

    /// Add peer verification flags
    ///
    /// Tokens: `none`, `peer`, `client_once`, `fail_if_no_peer_cert`.
    /// Flags accumulate across calls; the engine always receives the full
    /// union. A single unknown token rejects the call with no partial
    /// application. An empty token list succeeds without touching the
    /// engine.
    pub fn set_verify(&mut self, tokens: &[&str]) -> Result<()> {
        self.engine_ref()?;
        if tokens.is_empty() {
            return Ok(());
        }
        let parsed = VerifyFlags::parse(tokens)?;
        let merged = self.verify_flags | parsed;
        self.engine_mut()?.set_verify(merged);
        self.verify_flags = merged;
        Ok(())
    }

    /// Add protocol options
    ///
    /// Same accumulate-and-commit semantics as [`TlsContext::set_verify`],
    /// against the table in [`ProtocolOptions::TABLE`].
    pub fn set_protocol_options(&mut self, tokens: &[&str]) -> Result<()> {
        self.engine_ref()?;
        if tokens.is_empty() {
            return Ok(());
        }
        let parsed = ProtocolOptions::parse(tokens)?;
        let merged = self.protocol_options | parsed;
        self.engine_mut()?.set_options(merged);
        self.protocol_options = merged;
        Ok(())
    }

    /// Set the opaque byte string distinguishing this context in session
    /// caches
    ///
    /// Required when resumption is enabled across multiple contexts in one
    /// process. Length limits are the engine's.
    pub fn set_session_id_context(&mut self, sid_ctx: &[u8]) -> Result<()> {
        self.engine_mut()?.set_session_id_context(sid_ctx)?;
        Ok(())
    }

    /// Add session cache mode flags
    ///
    /// Each argument is either a boolean (`true` = `both`, `false` = `off`)
    /// or a named token. All-or-nothing like [`TlsContext::set_verify`]: a
    /// single bad argument commits nothing.
    pub fn set_session_cache_mode(&mut self, args: &[CacheModeArg<'_>]) -> Result<()> {
        self.engine_ref()?;
        let parsed = SessionCacheMode::parse(args)?;
        let merged = self.cache_mode | parsed;
        self.engine_mut()?.set_session_cache_mode(merged);
        self.cache_mode = merged;
        Ok(())
    }

    /// Set the session timeout in seconds, returning the previous value
    pub fn set_session_timeout(&mut self, seconds: u64) -> Result<u64> {
        Ok(self.engine_mut()?.set_timeout(seconds))
    }

    /// Set the session cache capacity, returning the previous value
    ///
    /// 0 means unlimited per engine convention.
    pub fn set_session_cache_size(&mut self, size: u64) -> Result<u64> {
        Ok(self.engine_mut()?.set_session_cache_size(size))
    }

    /// Current session cache capacity
    pub fn session_cache_size(&self) -> Result<u64> {
        Ok(self.engine_ref()?.session_cache_size())
    }

    /// Snapshot the engine's session statistics
    pub fn stats(&self) -> Result<ContextStats> {
        Ok(self.engine_ref()?.stats())
    }

    /// Release the engine handle
    ///
    /// Idempotent: the first call frees the handle, later calls are no-ops.
    /// Dropping an unreleased context frees the handle the same way.
    pub fn release(&mut self) {
        self.engine = None;
    }
}
