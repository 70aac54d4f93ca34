//! Context configuration errors

use super::engine::EngineError;

/// Errors returned by context configuration operations
///
/// Every error is returned as a value to the immediate caller; nothing is
/// retried and no global error state exists. A failed load leaves the
/// context usable, with the affected facility simply unset.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// Unknown protocol method name at creation
    #[error("invalid protocol: {0}")]
    InvalidProtocol(String),

    /// The engine could not allocate a context handle
    #[error("error creating context")]
    AllocationFailed,

    /// `set_mode` received something other than "server" or "client"
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// Unrecognized verify flag token; no flag from the call was applied
    #[error("invalid verify option: {0}")]
    InvalidVerifyOption(String),

    /// Unrecognized protocol option token; no option from the call was applied
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Unrecognized session cache mode token; no mode bit from the call was
    /// applied
    #[error("unknown session cache mode: {0}")]
    InvalidCacheMode(String),

    /// The passphrase provider produced no usable secret
    #[error("invalid passphrase callback value")]
    InvalidPassphrase,

    /// The engine rejected the operation; carries its diagnostic verbatim
    #[error("engine failure: {0}")]
    Engine(#[from] EngineError),

    /// The context was already released
    #[error("context has been released")]
    ContextReleased,
}
