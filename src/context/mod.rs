//! TLS context configuration
//!
//! This module builds reusable TLS context objects from which individual
//! connections are later derived. It validates symbolic configuration input
//! (protocol method names, verify flags, protocol options, session cache
//! tokens), translates it into engine-level settings, and hands certificate
//! and key material to the engine for loading.
//!
//! # Architecture
//!
//! 1. [`TlsContext`] is the facade: it owns the engine handle, tracks the
//!    handshake mode and the accumulated flag sets, and exposes the
//!    configuration operations.
//! 2. [`TlsEngine`] is the seam to the underlying TLS library. The facade
//!    never touches OpenSSL directly; [`OpenSslEngine`] is the production
//!    implementation.
//! 3. Flag parsing lives in pure functions in [`flags`], so the
//!    all-or-nothing token semantics are testable without any engine.
//!
//! # Examples
//!
//! ## Server context
//!
//! ```no_run
//! use tlsctx::context::{PassphraseSource, TlsContext};
//!
//! let mut ctx: TlsContext = TlsContext::create("sslv23").unwrap();
//! ctx.set_mode("server").unwrap();
//! ctx.load_certificate_chain("server-chain.pem").unwrap();
//! ctx.load_private_key("server-key.pem", PassphraseSource::Absent)
//!     .unwrap();
//! ctx.set_verify(&["peer", "fail_if_no_peer_cert"]).unwrap();
//! ctx.set_protocol_options(&["no_compression", "no_ticket"]).unwrap();
//! ```
//!
//! ## Client context with a passphrase provider
//!
//! ```no_run
//! use tlsctx::context::{PassphraseSource, TlsContext};
//!
//! let mut ctx: TlsContext = TlsContext::create("tlsv1").unwrap();
//! ctx.set_mode("client").unwrap();
//! ctx.load_trust_store(Some("ca.pem".as_ref()), None).unwrap();
//! let source = PassphraseSource::Provider(Box::new(|| {
//!     Some("secret".to_string())
//! }));
//! ctx.load_private_key("client-key.pem", source).unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod flags;
pub mod method;
pub mod openssl;

pub use config::{HandshakeMode, PassphraseSource, TlsContext, MAX_PASSPHRASE_LEN};
pub use engine::{ContextStats, EngineError, PassphraseHook, TlsEngine};
pub use error::TlsError;
pub use flags::{CacheModeArg, ProtocolOptions, SessionCacheMode, VerifyFlags};
pub use method::Method;
pub use openssl::OpenSslEngine;

/// Result type for context configuration operations
pub type Result<T> = std::result::Result<T, TlsError>;
