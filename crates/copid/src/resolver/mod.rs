//! Resolver fallback: an authenticated client for the local OXID
//! resolution service.
//!
//! The client composes the binding and security settings and speaks the
//! IObjectExporter wire protocol; the RPC exchange itself runs on a
//! host-injected [`RpcTransport`].

mod client;
mod protocol;
mod security;
mod transport;

pub use client::OxidResolverClient;
pub use protocol::{
    opnum, ResolveOxidRequest, ResolveOxidResponse, OBJECT_EXPORTER_UUID, OBJECT_EXPORTER_VERSION,
};
pub use security::{AuthnLevel, AuthnService, IdentityTracking, ImpersonationLevel, SecuritySpec};
pub use transport::{BindingSpec, RpcConnection, RpcTransport, RESOLVER_PORT};
