//! Connection-oriented RPC substrate, modeled as an injected capability.
//!
//! The lookup core composes the binding, chooses the security settings,
//! and encodes the call; the wire exchange itself belongs to the host's
//! RPC runtime. Implementations of these traits adapt that runtime.
//! Tests drive the resolver client with scripted implementations.

use bytes::Bytes;

use super::security::SecuritySpec;
use crate::types::Result;

/// Well-known port of the local resolution service.
pub const RESOLVER_PORT: u16 = 135;

/// Components of a string binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingSpec {
    /// Protocol sequence, e.g. `ncacn_ip_tcp`
    pub protseq: &'static str,
    /// Network address of the server host
    pub address: String,
    /// Endpoint (port or pipe name) on that host
    pub endpoint: String,
}

impl BindingSpec {
    /// The fixed local resolution endpoint: connection-oriented TCP to
    /// loopback, well-known port.
    pub fn local_resolver() -> Self {
        Self {
            protseq: "ncacn_ip_tcp",
            address: "127.0.0.1".to_string(),
            endpoint: RESOLVER_PORT.to_string(),
        }
    }

    /// Compose the string binding, `protseq:address[endpoint]`.
    pub fn compose(&self) -> String {
        format!("{}:{}[{}]", self.protseq, self.address, self.endpoint)
    }
}

/// Factory for RPC connections.
///
/// `connect` covers string-binding composition and binding-handle
/// creation; failures surface as [`LookupError::Binding`].
///
/// [`LookupError::Binding`]: crate::types::LookupError::Binding
pub trait RpcTransport {
    /// One bound connection
    type Connection: RpcConnection;

    /// Create a binding handle for the composed string binding.
    fn connect(&self, binding: &BindingSpec) -> Result<Self::Connection>;
}

/// One bound, callable RPC connection.
///
/// The binding handle is released when the connection is dropped, which
/// covers every exit path of the resolver client.
pub trait RpcConnection {
    /// Apply authentication settings to the binding. Failures surface
    /// as [`LookupError::Auth`].
    ///
    /// [`LookupError::Auth`]: crate::types::LookupError::Auth
    fn set_security(&mut self, security: &SecuritySpec) -> Result<()>;

    /// Issue one call: operation number plus marshaled stub data in,
    /// response stub data out. Transport or service failures surface as
    /// [`LookupError::Resolution`].
    ///
    /// [`LookupError::Resolution`]: crate::types::LookupError::Resolution
    fn call(&mut self, opnum: u16, stub: Bytes) -> Result<Bytes>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_resolver_composition() {
        let spec = BindingSpec::local_resolver();
        assert_eq!(spec.compose(), "ncacn_ip_tcp:127.0.0.1[135]");
    }
}
