//! OpenSSL-backed engine
//!
//! Implements [`TlsEngine`] over `openssl::ssl::SslContextBuilder`. The safe
//! wrapper covers most of the contract; the remainder (CA directory loading,
//! the `client_once` verify bit, session statistics, cache sizing, session
//! timeout) goes through `openssl-sys` against the raw `SSL_CTX`, using the
//! stable `ssl.h` control numbers where the sys crate does not name them.

use std::ffi::CString;
use std::fs;
use std::path::Path;
use std::ptr;

use libc::{c_int, c_long};
use openssl::error::ErrorStack;
use openssl::pkey::PKey;
use openssl::ssl::{SslContextBuilder, SslMethod, SslOptions, SslSessionCacheMode, SslVersion};
use openssl_sys as sys;

use super::engine::{ContextStats, EngineError, PassphraseHook, TlsEngine};
use super::flags::{ProtocolOptions, SessionCacheMode, VerifyFlags};
use super::method::Method;

// ssl.h control numbers, unchanged since OpenSSL 0.9.x; the sys crate does
// not export the session counter set.
const SSL_CTRL_SESS_NUMBER: c_int = 20;
const SSL_CTRL_SESS_CONNECT: c_int = 21;
const SSL_CTRL_SESS_CONNECT_GOOD: c_int = 22;
const SSL_CTRL_SESS_CONNECT_RENEGOTIATE: c_int = 23;
const SSL_CTRL_SESS_ACCEPT: c_int = 24;
const SSL_CTRL_SESS_ACCEPT_GOOD: c_int = 25;
const SSL_CTRL_SESS_ACCEPT_RENEGOTIATE: c_int = 26;
const SSL_CTRL_SESS_HIT: c_int = 27;
const SSL_CTRL_SESS_CB_HIT: c_int = 28;
const SSL_CTRL_SESS_MISSES: c_int = 29;
const SSL_CTRL_SESS_TIMEOUTS: c_int = 30;
const SSL_CTRL_SESS_CACHE_FULL: c_int = 31;
const SSL_CTRL_SET_SESS_CACHE_SIZE: c_int = 42;
const SSL_CTRL_GET_SESS_CACHE_SIZE: c_int = 43;

// SSL_VERIFY_CLIENT_ONCE is absent from the safe wrapper's SslVerifyMode.
const SSL_VERIFY_CLIENT_ONCE: c_int = 0x04;

extern "C" {
    // Real function in libssl, not exported by the sys crate.
    fn SSL_CTX_set_timeout(ctx: *mut sys::SSL_CTX, t: c_long) -> c_long;
}

/// Production TLS engine over the `openssl` crate
pub struct OpenSslEngine {
    builder: SslContextBuilder,
    hook: Option<PassphraseHook>,
}

impl OpenSslEngine {
    fn ctrl(&self, cmd: c_int, larg: c_long) -> c_long {
        unsafe { sys::SSL_CTX_ctrl(self.builder.as_ptr(), cmd, larg, ptr::null_mut()) }
    }

    fn counter(&self, cmd: c_int) -> u64 {
        self.ctrl(cmd, 0).max(0) as u64
    }
}

/// Extract the engine's reason string from the thread error queue
fn engine_error(stack: ErrorStack) -> EngineError {
    let reason = stack
        .errors()
        .last()
        .and_then(|e| e.reason().map(str::to_string))
        .unwrap_or_else(|| stack.to_string());
    EngineError::new(reason)
}

fn path_cstring(path: &Path) -> Result<CString, EngineError> {
    let s = path
        .to_str()
        .ok_or_else(|| EngineError::new("path is not valid UTF-8"))?;
    CString::new(s).map_err(|_| EngineError::new("path contains a NUL byte"))
}

impl TlsEngine for OpenSslEngine {
    fn new_context(method: Method) -> Result<Self, EngineError> {
        let mut builder = SslContextBuilder::new(SslMethod::tls()).map_err(engine_error)?;

        // Single-version methods pin both ends of the negotiable range.
        let pinned = match method {
            Method::Sslv3 => Some(SslVersion::SSL3),
            Method::Tlsv1 => Some(SslVersion::TLS1),
            Method::Any => None,
        };
        if let Some(version) = pinned {
            builder
                .set_min_proto_version(Some(version))
                .map_err(engine_error)?;
            builder
                .set_max_proto_version(Some(version))
                .map_err(engine_error)?;
        }

        Ok(OpenSslEngine {
            builder,
            hook: None,
        })
    }

    fn load_verify_locations(
        &mut self,
        ca_file: Option<&Path>,
        ca_dir: Option<&Path>,
    ) -> Result<(), EngineError> {
        let ca_file = ca_file.map(path_cstring).transpose()?;
        let ca_dir = ca_dir.map(path_cstring).transpose()?;
        let ret = unsafe {
            sys::SSL_CTX_load_verify_locations(
                self.builder.as_ptr(),
                ca_file.as_ref().map_or_else(ptr::null, |cs| cs.as_ptr()),
                ca_dir.as_ref().map_or_else(ptr::null, |cs| cs.as_ptr()),
            )
        };
        if ret != 1 {
            return Err(engine_error(ErrorStack::get()));
        }
        Ok(())
    }

    fn use_certificate_chain_file(&mut self, path: &Path) -> Result<(), EngineError> {
        self.builder
            .set_certificate_chain_file(path)
            .map_err(engine_error)
    }

    fn use_private_key_file(&mut self, path: &Path) -> Result<(), EngineError> {
        let pem = fs::read(path).map_err(|e| EngineError::new(e.to_string()))?;
        // Decrypt through the registered hook; with no hook a zero-length
        // answer suppresses the library's terminal prompt and the load fails
        // inside the engine.
        let key = match self.hook.as_mut() {
            Some(hook) => PKey::private_key_from_pem_callback(&pem, |buf| Ok(hook(buf))),
            None => PKey::private_key_from_pem_callback(&pem, |_| Ok(0)),
        }
        .map_err(engine_error)?;
        self.builder.set_private_key(&key).map_err(engine_error)
    }

    fn set_passphrase_hook(&mut self, hook: Option<PassphraseHook>) {
        self.hook = hook;
    }

    fn set_cipher_list(&mut self, spec: &str) -> Result<(), EngineError> {
        self.builder.set_cipher_list(spec).map_err(engine_error)
    }

    fn set_verify(&mut self, flags: VerifyFlags) {
        let mut mode = sys::SSL_VERIFY_NONE;
        if flags.contains(VerifyFlags::PEER) {
            mode |= sys::SSL_VERIFY_PEER;
        }
        if flags.contains(VerifyFlags::CLIENT_ONCE) {
            mode |= SSL_VERIFY_CLIENT_ONCE;
        }
        if flags.contains(VerifyFlags::FAIL_IF_NO_PEER_CERT) {
            mode |= sys::SSL_VERIFY_FAIL_IF_NO_PEER_CERT;
        }
        unsafe { sys::SSL_CTX_set_verify(self.builder.as_ptr(), mode, None) }
    }

    fn set_options(&mut self, opts: ProtocolOptions) {
        const MAP: &[(ProtocolOptions, SslOptions)] = &[
            (ProtocolOptions::ALL, SslOptions::ALL),
            (
                ProtocolOptions::CIPHER_SERVER_PREFERENCE,
                SslOptions::CIPHER_SERVER_PREFERENCE,
            ),
            (ProtocolOptions::NO_COMPRESSION, SslOptions::NO_COMPRESSION),
            (ProtocolOptions::NO_SSLV2, SslOptions::NO_SSLV2),
            (ProtocolOptions::NO_SSLV3, SslOptions::NO_SSLV3),
            (ProtocolOptions::NO_TICKET, SslOptions::NO_TICKET),
            (ProtocolOptions::NO_TLSV1, SslOptions::NO_TLSV1),
            (ProtocolOptions::NO_TLSV1_1, SslOptions::NO_TLSV1_1),
            (ProtocolOptions::NO_TLSV1_2, SslOptions::NO_TLSV1_2),
            (
                ProtocolOptions::ALLOW_UNSAFE_LEGACY_RENEGOTIATION,
                SslOptions::ALLOW_UNSAFE_LEGACY_RENEGOTIATION,
            ),
        ];
        let mut engine_opts = SslOptions::empty();
        for (ours, theirs) in MAP {
            if opts.contains(*ours) {
                engine_opts |= *theirs;
            }
        }
        self.builder.set_options(engine_opts);
    }

    fn set_verify_depth(&mut self, depth: u32) {
        self.builder.set_verify_depth(depth);
    }

    fn set_session_id_context(&mut self, sid_ctx: &[u8]) -> Result<(), EngineError> {
        self.builder
            .set_session_id_context(sid_ctx)
            .map_err(engine_error)
    }

    fn set_session_cache_mode(&mut self, mode: SessionCacheMode) {
        let mut engine_mode = SslSessionCacheMode::OFF;
        if mode.contains(SessionCacheMode::CLIENT) {
            engine_mode |= SslSessionCacheMode::CLIENT;
        }
        if mode.contains(SessionCacheMode::SERVER) {
            engine_mode |= SslSessionCacheMode::SERVER;
        }
        if mode.contains(SessionCacheMode::NO_AUTO_CLEAR) {
            engine_mode |= SslSessionCacheMode::NO_AUTO_CLEAR;
        }
        if mode.contains(SessionCacheMode::NO_INTERNAL_LOOKUP) {
            engine_mode |= SslSessionCacheMode::NO_INTERNAL_LOOKUP;
        }
        if mode.contains(SessionCacheMode::NO_INTERNAL_STORE) {
            engine_mode |= SslSessionCacheMode::NO_INTERNAL_STORE;
        }
        self.builder.set_session_cache_mode(engine_mode);
    }

    fn set_session_cache_size(&mut self, size: u64) -> u64 {
        self.ctrl(SSL_CTRL_SET_SESS_CACHE_SIZE, size as c_long).max(0) as u64
    }

    fn session_cache_size(&self) -> u64 {
        self.ctrl(SSL_CTRL_GET_SESS_CACHE_SIZE, 0).max(0) as u64
    }

    fn set_timeout(&mut self, seconds: u64) -> u64 {
        let previous =
            unsafe { SSL_CTX_set_timeout(self.builder.as_ptr(), seconds as c_long) };
        previous.max(0) as u64
    }

    fn stats(&self) -> ContextStats {
        ContextStats {
            number: self.counter(SSL_CTRL_SESS_NUMBER),
            connect: self.counter(SSL_CTRL_SESS_CONNECT),
            connect_good: self.counter(SSL_CTRL_SESS_CONNECT_GOOD),
            connect_renegotiate: self.counter(SSL_CTRL_SESS_CONNECT_RENEGOTIATE),
            accept: self.counter(SSL_CTRL_SESS_ACCEPT),
            accept_good: self.counter(SSL_CTRL_SESS_ACCEPT_GOOD),
            accept_renegotiate: self.counter(SSL_CTRL_SESS_ACCEPT_RENEGOTIATE),
            hits: self.counter(SSL_CTRL_SESS_HIT),
            cb_hits: self.counter(SSL_CTRL_SESS_CB_HIT),
            misses: self.counter(SSL_CTRL_SESS_MISSES),
            timeouts: self.counter(SSL_CTRL_SESS_TIMEOUTS),
            cache_full: self.counter(SSL_CTRL_SESS_CACHE_FULL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_for_flexible_method() {
        let engine = OpenSslEngine::new_context(Method::Any).unwrap();
        assert_eq!(engine.stats(), ContextStats::default());
    }

    #[test]
    fn test_new_context_for_pinned_method() {
        // Version pinning must not fail at allocation time even when the
        // runtime library would refuse the handshake itself.
        OpenSslEngine::new_context(Method::Tlsv1).unwrap();
    }

    #[test]
    fn test_cache_size_round_trip() {
        let mut engine = OpenSslEngine::new_context(Method::Any).unwrap();
        engine.set_session_cache_size(77);
        assert_eq!(engine.session_cache_size(), 77);
    }

    #[test]
    fn test_set_timeout_returns_previous() {
        let mut engine = OpenSslEngine::new_context(Method::Any).unwrap();
        engine.set_timeout(100);
        assert_eq!(engine.set_timeout(200), 100);
    }

    #[test]
    fn test_verify_and_options_translation() {
        let mut engine = OpenSslEngine::new_context(Method::Any).unwrap();
        engine.set_verify(VerifyFlags::PEER | VerifyFlags::CLIENT_ONCE);
        engine.set_options(ProtocolOptions::NO_COMPRESSION | ProtocolOptions::NO_TICKET);
        engine.set_session_cache_mode(SessionCacheMode::SERVER | SessionCacheMode::NO_INTERNAL);
    }
}
