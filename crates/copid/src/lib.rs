//! Recover the process id of the server behind a COM proxy.
//!
//! Given nothing but an opaque in-process proxy handle, this crate
//! determines which OS process actually hosts the object, without any
//! cooperation from that process.
//!
//! # Pipeline
//!
//! ```text
//!  proxy handle ──▶ marshal ──▶ parse OBJREF ──▶ pid hint ──▶ pid
//!                               (OXID + IPID)        │
//!                                            hint == 0xFFFF
//!                                                    │
//!                                                    ▼
//!                                   ResolveOxid on ncacn_ip_tcp:127.0.0.1[135]
//!                                     (non-causal, mutual-auth, pkt-privacy)
//!                                                    │ endpoints
//!                                                    ▼
//!                                   connection-table correlation ──▶ pid
//! ```
//!
//! The hint path reads a 16-bit pid the marshaling subsystem packs into
//! freshly generated interface ids. That encoding is an observed
//! convention, not a contract, and it cannot represent pids above
//! `0xFFFE`; the resolver path is the authoritative fallback.
//!
//! Every stage is best-effort: the public result is a pid or "unknown",
//! never an error. Stage outcomes are reported through `tracing` at
//! debug level.
//!
//! # Capabilities
//!
//! The three OS services the pipeline consumes are injected as traits,
//! so the parsing and correlation logic runs against synthetic data in
//! tests:
//!
//! - [`marshal::ProxyMarshaler`]: proxy → wire-format object reference
//! - [`resolver::RpcTransport`]: the connection-oriented RPC substrate
//! - [`tcp_table::ConnectionTable`]: live TCP connections with owner pids
//!
//! On Windows, `ComMarshaler` and `IpHelperTable` implement the first
//! and last; the RPC substrate is supplied by the host runtime.
//!
//! # Modules
//!
//! - [`types`]: wire structure model (identifiers, OBJREF, string arrays)
//! - [`resolver`]: OXID resolution client and protocol
//! - [`correlate`]: endpoint-to-process correlation
//! - [`marshal`], [`tcp_table`]: capability seams and Windows backends

pub mod correlate;
pub mod marshal;
pub mod resolver;
pub mod tcp_table;
pub mod types;

mod lookup;

pub use lookup::PidLookup;
pub use types::{Ipid, LookupError, ObjRef, Oxid, Result};
