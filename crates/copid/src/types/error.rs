//! Lookup error taxonomy.
//!
//! Every stage of the pipeline reports a typed outcome. None of these
//! escape the top-level lookup: the caller sees a process id or the
//! unknown sentinel, and the error kinds feed the debug log.

use thiserror::Error;

/// Result type for lookup operations
pub type Result<T> = std::result::Result<T, LookupError>;

/// Stage-level failures of the pid lookup pipeline
#[derive(Error, Debug)]
pub enum LookupError {
    /// The caller supplied no proxy handle
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The buffer is not a recognizable object reference
    #[error("invalid object reference: {0}")]
    InvalidFormat(String),

    /// Custom-marshaled or unrecognized reference flavor; no identifiers
    /// can be extracted from it
    #[error("unsupported object reference shape: flags 0x{0:08x}")]
    UnsupportedShape(u32),

    /// The marshaling service failed to produce a wire-format reference
    #[error("marshaling failed: {0}")]
    Marshal(String),

    /// Binding composition or binding-handle creation failed
    #[error("resolver binding failed: {0}")]
    Binding(String),

    /// Applying authentication settings to the binding failed
    #[error("resolver authentication failed: {0}")]
    Auth(String),

    /// The resolve call itself failed (transport, service, or response)
    #[error("OXID resolution failed: {0}")]
    Resolution(String),

    /// Resolution produced bindings, but no port or owning process matched
    #[error("no connection matches the resolved endpoint")]
    NotFound,
}

impl LookupError {
    /// A truncated record cannot be decoded; report it as a format error
    /// with the missing-byte diagnostic.
    pub(crate) fn underflow(needed: usize, have: usize) -> Self {
        Self::InvalidFormat(format!("buffer underflow: need {needed} bytes, have {have}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underflow_is_a_format_error() {
        let err = LookupError::underflow(8, 2);
        assert!(matches!(err, LookupError::InvalidFormat(_)));
        assert_eq!(
            err.to_string(),
            "invalid object reference: buffer underflow: need 8 bytes, have 2"
        );
    }
}
