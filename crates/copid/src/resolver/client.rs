//! OXID resolver client.

use tracing::debug;

use super::protocol::{opnum, ResolveOxidRequest, ResolveOxidResponse};
use super::security::SecuritySpec;
use super::transport::{BindingSpec, RpcConnection, RpcTransport};
use crate::types::{LookupError, Oxid, Result};

/// Client for the resolution service on the well-known local endpoint.
///
/// Each resolve call opens its own authenticated binding and releases it
/// before returning, success or failure. Nothing is cached between
/// calls.
pub struct OxidResolverClient<'a, T> {
    transport: &'a T,
}

impl<'a, T: RpcTransport> OxidResolverClient<'a, T> {
    /// Create a client over the given substrate
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Resolve an OXID to the string bindings of its exporter.
    ///
    /// This is itself the fallback path of the lookup, so there is no
    /// retry: any failure at the binding, authentication, or call stage
    /// is final.
    pub fn resolve_oxid(&self, oxid: Oxid, protseqs: &[u16]) -> Result<ResolveOxidResponse> {
        let binding = BindingSpec::local_resolver();
        debug!(binding = %binding.compose(), %oxid, "resolving OXID");

        let mut conn = self.transport.connect(&binding)?;
        conn.set_security(&SecuritySpec::local_machine_account())?;

        let request = ResolveOxidRequest::new(oxid, protseqs.to_vec());
        let stub = conn.call(opnum::RESOLVE_OXID, request.encode(true))?;

        let mut cursor = stub;
        let response = ResolveOxidResponse::decode(&mut cursor, true)
            .map_err(|err| LookupError::Resolution(format!("malformed resolver response: {err}")))?;

        if response.status != 0 {
            return Err(LookupError::Resolution(format!(
                "resolver returned status 0x{:08x}",
                response.status
            )));
        }

        debug!(
            bindings = response.oxid_bindings.string_bindings.len(),
            "OXID resolved"
        );
        Ok(response)
    }
}
