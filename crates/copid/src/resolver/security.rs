//! Security parameters for the resolver binding.
//!
//! The resolution service accepts mutually authenticated callers without
//! an explicit password when they present a machine service account, so
//! the canonical configuration here is fixed rather than caller-tunable.

/// Authentication services (MS-RPCE 2.2.1.1.7)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum AuthnService {
    /// No authentication
    None = 0,
    /// GSS Negotiate (SPNEGO)
    GssNegotiate = 9,
    /// Windows NT LAN Manager
    WinNt = 10,
    /// GSS Kerberos
    GssKerberos = 16,
}

/// Authentication levels (MS-RPCE 2.2.1.1.8)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
pub enum AuthnLevel {
    /// No authentication
    None = 1,
    /// Authenticate at connection establishment only
    Connect = 2,
    /// Authenticate at the start of each call
    Call = 3,
    /// Authenticate each packet
    Pkt = 4,
    /// Sign each packet
    PktIntegrity = 5,
    /// Sign and encrypt each packet
    PktPrivacy = 6,
}

/// Impersonation levels granted to the server
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ImpersonationLevel {
    Anonymous = 1,
    Identify = 2,
    Impersonate = 3,
    Delegate = 4,
}

/// How the client identity is bound to the connection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum IdentityTracking {
    /// Identity captured once, at binding time
    Static = 0,
    /// Identity re-evaluated on each call
    Dynamic = 1,
}

/// Complete security configuration for one binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecuritySpec {
    /// Server principal name presented for mutual authentication
    pub principal: String,
    /// Authentication service
    pub authn_service: AuthnService,
    /// Protection level
    pub authn_level: AuthnLevel,
    /// Impersonation granted to the server
    pub impersonation: ImpersonationLevel,
    /// Identity tracking mode
    pub identity_tracking: IdentityTracking,
    /// Require the server to prove its identity
    pub mutual_auth: bool,
    /// Allow calls to complete out of order on the binding
    pub noncausal: bool,
}

impl SecuritySpec {
    /// The configuration the local resolution service expects: mutual,
    /// packet-privacy NTLM as the machine's service account, static
    /// identity, non-causal binding.
    pub fn local_machine_account() -> Self {
        Self {
            principal: "NT Authority\\NetworkService".to_string(),
            authn_service: AuthnService::WinNt,
            authn_level: AuthnLevel::PktPrivacy,
            impersonation: ImpersonationLevel::Impersonate,
            identity_tracking: IdentityTracking::Static,
            mutual_auth: true,
            noncausal: true,
        }
    }
}
