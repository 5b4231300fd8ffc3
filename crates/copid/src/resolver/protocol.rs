//! IObjectExporter wire protocol (MS-DCOM 3.1.2.5.2)
//!
//! Request and response records for the one operation the lookup needs,
//! ResolveOxid. The service's other operations are listed in [`opnum`]
//! for reference but have no counterpart here.

use bytes::{Buf, Bytes, BytesMut};

use crate::types::wire;
use crate::types::{DualStringArray, Ipid, Oxid, Result};

/// IObjectExporter interface UUID
pub const OBJECT_EXPORTER_UUID: &str = "99fcfec4-5260-101b-bbcb-00aa0021347a";

/// IObjectExporter interface version
pub const OBJECT_EXPORTER_VERSION: (u16, u16) = (0, 0);

/// Operation numbers for IObjectExporter
pub mod opnum {
    /// ResolveOxid
    pub const RESOLVE_OXID: u16 = 0;
    /// SimplePing
    pub const SIMPLE_PING: u16 = 1;
    /// ComplexPing
    pub const COMPLEX_PING: u16 = 2;
    /// ServerAlive
    pub const SERVER_ALIVE: u16 = 3;
    /// ResolveOxid2
    pub const RESOLVE_OXID2: u16 = 4;
    /// ServerAlive2
    pub const SERVER_ALIVE2: u16 = 5;
}

/// ResolveOxid request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveOxidRequest {
    /// OXID to resolve
    pub oxid: Oxid,
    /// Transport protocols the caller can use, in preference order
    pub requested_protseqs: Vec<u16>,
}

impl ResolveOxidRequest {
    /// Create a new request
    pub fn new(oxid: Oxid, requested_protseqs: Vec<u16>) -> Self {
        Self {
            oxid,
            requested_protseqs,
        }
    }

    /// Encode to a stub buffer
    pub fn encode(&self, little_endian: bool) -> Bytes {
        let mut buf = BytesMut::new();
        self.oxid.encode(&mut buf, little_endian);
        wire::write_u16(&mut buf, self.requested_protseqs.len() as u16, little_endian);
        for protseq in &self.requested_protseqs {
            wire::write_u16(&mut buf, *protseq, little_endian);
        }
        buf.freeze()
    }

    /// Decode from a stub buffer
    pub fn decode<B: Buf>(buf: &mut B, little_endian: bool) -> Result<Self> {
        let oxid = Oxid::decode(buf, little_endian)?;
        let count = wire::read_u16(buf, little_endian)?;
        let mut requested_protseqs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            requested_protseqs.push(wire::read_u16(buf, little_endian)?);
        }
        Ok(Self {
            oxid,
            requested_protseqs,
        })
    }
}

/// ResolveOxid response
#[derive(Clone, Debug)]
pub struct ResolveOxidResponse {
    /// Endpoints where the exporter can be reached
    pub oxid_bindings: DualStringArray,
    /// IPID of the exporter's remote-unknown interface
    pub ipid_rem_unknown: Ipid,
    /// Authentication hint for calls to the exporter
    pub authn_hint: u32,
    /// Service status; zero on success
    pub status: u32,
}

impl ResolveOxidResponse {
    /// Encode to a stub buffer
    pub fn encode(&self, little_endian: bool) -> Bytes {
        let mut buf = BytesMut::new();
        self.oxid_bindings.encode(&mut buf, little_endian);
        self.ipid_rem_unknown.encode(&mut buf, little_endian);
        wire::write_u32(&mut buf, self.authn_hint, little_endian);
        wire::write_u32(&mut buf, self.status, little_endian);
        buf.freeze()
    }

    /// Decode from a stub buffer
    pub fn decode<B: Buf>(buf: &mut B, little_endian: bool) -> Result<Self> {
        let oxid_bindings = DualStringArray::decode(buf, little_endian)?;
        let ipid_rem_unknown = Ipid::decode(buf, little_endian)?;
        let authn_hint = wire::read_u32(buf, little_endian)?;
        let status = wire::read_u32(buf, little_endian)?;
        Ok(Self {
            oxid_bindings,
            ipid_rem_unknown,
            authn_hint,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{protocol_id, StringBinding, Uuid};

    #[test]
    fn object_exporter_uuid_parses() {
        assert!(Uuid::parse(OBJECT_EXPORTER_UUID).is_some());
    }

    #[test]
    fn request_layout() {
        let request = ResolveOxidRequest::new(
            Oxid::new(0x0102030405060708),
            vec![protocol_id::NCACN_IP_TCP],
        );
        let stub = request.encode(true);
        // oxid (8) + count (2) + one protseq (2)
        assert_eq!(stub.len(), 12);
        assert_eq!(&stub[..8], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&stub[8..10], &[0x01, 0x00]);
        assert_eq!(&stub[10..12], &[0x07, 0x00]);

        let mut cursor = stub;
        assert_eq!(ResolveOxidRequest::decode(&mut cursor, true).unwrap(), request);
    }

    #[test]
    fn response_round_trip() {
        let response = ResolveOxidResponse {
            oxid_bindings: DualStringArray::with_bindings(vec![StringBinding::tcp(
                "192.168.0.1[4152]",
            )]),
            ipid_rem_unknown: Ipid::generate(),
            authn_hint: 6,
            status: 0,
        };
        let stub = response.encode(true);

        let mut cursor = stub;
        let decoded = ResolveOxidResponse::decode(&mut cursor, true).unwrap();
        assert_eq!(decoded.oxid_bindings.string_bindings.len(), 1);
        assert_eq!(decoded.oxid_bindings.string_bindings[0].port(), Some(4152));
        assert_eq!(decoded.ipid_rem_unknown, response.ipid_rem_unknown);
        assert_eq!(decoded.authn_hint, 6);
        assert_eq!(decoded.status, 0);
        // The array walk must leave the cursor exactly at the trailing
        // fixed fields; nothing may remain.
        assert!(cursor.is_empty());
    }
}
