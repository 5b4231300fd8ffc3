//! Two-stage lookup orchestration.
//!
//! Stage one is cheap and local: marshal the proxy, parse the object
//! reference, and read the pid hint embedded in the interface id. Stage
//! two runs only when the hint is unusable: ask the resolution service
//! for the exporter's endpoints and correlate them against the
//! connection table.
//!
//! The whole pipeline is best-effort. Every stage failure is recorded at
//! debug level and degrades to "unknown"; no error reaches the caller.

use tracing::debug;

use crate::correlate;
use crate::marshal::ProxyMarshaler;
use crate::resolver::{OxidResolverClient, RpcTransport};
use crate::tcp_table::ConnectionTable;
use crate::types::{protocol_id, LookupError, ObjRef};

/// Pid lookup over the three OS capabilities.
///
/// Stateless apart from the capability handles: every call re-acquires
/// its own marshal stream, resolver binding, and table snapshot, so a
/// `PidLookup` can be shared freely as long as the capabilities are.
pub struct PidLookup<M, T, C> {
    marshaler: M,
    transport: T,
    connections: C,
}

impl<M, T, C> PidLookup<M, T, C>
where
    M: ProxyMarshaler,
    T: RpcTransport,
    C: ConnectionTable,
{
    /// Assemble a lookup from its capabilities
    pub fn new(marshaler: M, transport: T, connections: C) -> Self {
        Self {
            marshaler,
            transport,
            connections,
        }
    }

    /// Best-effort recovery of the pid of the process serving `proxy`.
    ///
    /// `None` means the pid could not be determined; the reason is in
    /// the debug log, not the return value.
    pub fn server_process_id(&self, proxy: &M::Proxy) -> Option<u32> {
        let buffer = match self.marshaler.marshal(proxy) {
            Ok(buffer) => buffer,
            Err(err) => {
                debug!(%err, "marshal stage failed");
                return None;
            }
        };

        let mut cursor = buffer;
        let objref = match ObjRef::decode(&mut cursor, true) {
            Ok(objref) => objref,
            Err(err) => {
                debug!(%err, "object reference not usable");
                return None;
            }
        };

        if let Some(pid) = objref.ipid().pid_hint() {
            debug!(pid, "pid recovered from interface id");
            return Some(u32::from(pid));
        }
        debug!(oxid = %objref.oxid(), "pid hint not representable, querying resolver");

        let client = OxidResolverClient::new(&self.transport);
        let response = match client.resolve_oxid(objref.oxid(), &[protocol_id::NCACN_IP_TCP]) {
            Ok(response) => response,
            Err(err) => {
                debug!(%err, "resolver fallback failed");
                return None;
            }
        };

        match correlate::owning_process_id(
            &response.oxid_bindings,
            protocol_id::NCACN_IP_TCP,
            &self.connections,
        ) {
            Ok(pid) => {
                debug!(pid, "pid recovered from connection table");
                Some(pid)
            }
            Err(err) => {
                debug!(%err, "endpoint correlation failed");
                None
            }
        }
    }

    /// Host-facing entry point: a process id, or `0` when it could not
    /// be determined (including when no proxy handle was supplied).
    pub fn server_process_id_or_zero(&self, proxy: Option<&M::Proxy>) -> u32 {
        let Some(proxy) = proxy else {
            debug!(err = %LookupError::InvalidArgument("proxy handle is absent"), "lookup refused");
            return 0;
        };
        self.server_process_id(proxy).unwrap_or(0)
    }
}

#[cfg(windows)]
impl<T: RpcTransport> PidLookup<crate::marshal::ComMarshaler, T, crate::tcp_table::IpHelperTable> {
    /// Lookup wired to the in-process COM marshaler and the IP Helper
    /// connection table; the RPC substrate comes from the host.
    pub fn with_host_transport(transport: T) -> Self {
        Self::new(
            crate::marshal::ComMarshaler,
            transport,
            crate::tcp_table::IpHelperTable,
        )
    }
}
