//! tlsctx - TLS Context Configuration Facade
//!
//! This crate assembles a named protocol method, certificate chain, private
//! key, verification policy, cipher list, and session-cache policy into a
//! single context object suitable for driving a client or server TLS
//! handshake. All cryptographic and protocol work is delegated to an engine
//! behind the [`context::TlsEngine`] trait; the default engine wraps the
//! `openssl` crate.

pub mod context;
