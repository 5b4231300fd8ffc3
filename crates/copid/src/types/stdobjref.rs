//! STDOBJREF structure (MS-DCOM 2.2.18.1)
//!
//! The fixed-size core of a marshaled interface pointer. All three
//! resolvable object-reference shapes start with this record, which is
//! where the identifiers of interest live.

use bytes::{Buf, BufMut};

use super::error::Result;
use super::identifiers::{Ipid, Oid, Oxid};
use super::wire;

/// STDOBJREF flags (SORF_*)
pub mod flags {
    /// Plain reference
    pub const SORF_NULL: u32 = 0x00000000;
    /// The reference is excluded from ping-based garbage collection
    pub const SORF_NOPING: u32 = 0x00001000;
}

/// Standard Object Reference (40 bytes)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StdObjRef {
    /// SORF_* flags
    pub flags: u32,
    /// Number of public references transferred with the marshal
    pub public_refs: u32,
    /// Object exporter hosting the object
    pub oxid: Oxid,
    /// Object within the exporter
    pub oid: Oid,
    /// Interface pointer on the object
    pub ipid: Ipid,
}

impl StdObjRef {
    /// Size in bytes (4 + 4 + 8 + 8 + 16)
    pub const SIZE: usize = 40;

    /// Create a new STDOBJREF
    pub fn new(oxid: Oxid, oid: Oid, ipid: Ipid, public_refs: u32) -> Self {
        Self {
            flags: flags::SORF_NULL,
            public_refs,
            oxid,
            oid,
            ipid,
        }
    }

    /// Encode to buffer
    pub fn encode<B: BufMut>(&self, buf: &mut B, little_endian: bool) {
        wire::write_u32(buf, self.flags, little_endian);
        wire::write_u32(buf, self.public_refs, little_endian);
        self.oxid.encode(buf, little_endian);
        self.oid.encode(buf, little_endian);
        self.ipid.encode(buf, little_endian);
    }

    /// Decode from buffer
    pub fn decode<B: Buf>(buf: &mut B, little_endian: bool) -> Result<Self> {
        let flags = wire::read_u32(buf, little_endian)?;
        let public_refs = wire::read_u32(buf, little_endian)?;
        let oxid = Oxid::decode(buf, little_endian)?;
        let oid = Oid::decode(buf, little_endian)?;
        let ipid = Ipid::decode(buf, little_endian)?;

        Ok(Self {
            flags,
            public_refs,
            oxid,
            oid,
            ipid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn encoded_size_is_fixed() {
        let mut buf = BytesMut::new();
        StdObjRef::default().encode(&mut buf, true);
        assert_eq!(buf.len(), StdObjRef::SIZE);
    }

    #[test]
    fn encode_decode_round_trip() {
        let record = StdObjRef::new(
            Oxid::new(0x123456789ABCDEF0),
            Oid::new(0xFEDCBA9876543210),
            Ipid::generate(),
            5,
        );
        let mut buf = BytesMut::new();
        record.encode(&mut buf, true);

        let decoded = StdObjRef::decode(&mut buf.freeze(), true).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn truncated_record_is_rejected() {
        let record = StdObjRef::new(Oxid::new(1), Oid::new(2), Ipid::generate(), 1);
        let mut buf = BytesMut::new();
        record.encode(&mut buf, true);
        let mut short = buf.freeze().slice(..StdObjRef::SIZE - 1);
        assert!(StdObjRef::decode(&mut short, true).is_err());
    }
}
