//! OBJREF structure (MS-DCOM 2.2.18)
//!
//! OBJREF is the record a marshaled interface pointer serializes to.
//! This crate only needs the identifiers in its fixed-size prefix, so the
//! decoder here validates the header and reads the embedded [`StdObjRef`],
//! and deliberately does not interpret the trailing resolver bindings,
//! handler CLSID, or extension arrays. Length fields inside the buffer
//! are never trusted beyond locating that prefix.

use bytes::{Buf, BufMut};

use super::error::{LookupError, Result};
use super::identifiers::{Ipid, Oxid, Uuid};
use super::stdobjref::StdObjRef;
use super::wire;

/// OBJREF signature ("MEOW" in little-endian ASCII)
pub const OBJREF_SIGNATURE: u32 = 0x574F454D;

/// OBJREF flags indicating the variant type
pub mod objref_flags {
    /// Standard reference (STDOBJREF + resolver bindings)
    pub const OBJREF_STANDARD: u32 = 0x00000001;
    /// Handler reference (STDOBJREF + handler CLSID + resolver bindings)
    pub const OBJREF_HANDLER: u32 = 0x00000002;
    /// Custom marshaling (opaque unmarshaler payload; no STDOBJREF)
    pub const OBJREF_CUSTOM: u32 = 0x00000004;
    /// Extended reference (STDOBJREF + envoy extension data)
    pub const OBJREF_EXTENDED: u32 = 0x00000008;
}

/// Resolvable object-reference shapes.
///
/// All three begin with a [`StdObjRef`] immediately after the interface
/// id, which is the only part of the payload this crate reads. CUSTOM is
/// not represented: a custom-marshaled reference carries no standard
/// record and is rejected during decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjRefKind {
    Standard,
    Handler,
    Extended,
}

impl ObjRefKind {
    /// Map a flags word to a shape. Exactly one recognized bit must be
    /// set; zero, multi-bit, custom, and unknown values have no shape.
    fn from_flags(flags: u32) -> Option<Self> {
        match flags {
            objref_flags::OBJREF_STANDARD => Some(Self::Standard),
            objref_flags::OBJREF_HANDLER => Some(Self::Handler),
            objref_flags::OBJREF_EXTENDED => Some(Self::Extended),
            _ => None,
        }
    }

    /// The flags word for this shape
    pub fn flags(&self) -> u32 {
        match self {
            Self::Standard => objref_flags::OBJREF_STANDARD,
            Self::Handler => objref_flags::OBJREF_HANDLER,
            Self::Extended => objref_flags::OBJREF_EXTENDED,
        }
    }
}

/// Decoded prefix of a marshaled object reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjRef {
    /// Which resolvable shape the record carried
    pub kind: ObjRefKind,
    /// Interface id the pointer was marshaled as
    pub iid: Uuid,
    /// The embedded standard reference
    pub std: StdObjRef,
}

impl ObjRef {
    /// Header size (signature + flags)
    pub const HEADER_SIZE: usize = 8;

    /// Create a standard-shape reference
    pub fn standard(iid: Uuid, std: StdObjRef) -> Self {
        Self {
            kind: ObjRefKind::Standard,
            iid,
            std,
        }
    }

    /// Object exporter identifier
    pub fn oxid(&self) -> Oxid {
        self.std.oxid
    }

    /// Interface pointer identifier
    pub fn ipid(&self) -> Ipid {
        self.std.ipid
    }

    /// Encode the reference prefix (header, interface id, standard
    /// record). Used to build synthetic references; trailing payload
    /// bytes, if a test wants them, are appended by the caller.
    pub fn encode<B: BufMut>(&self, buf: &mut B, little_endian: bool) {
        wire::write_u32(buf, OBJREF_SIGNATURE, little_endian);
        wire::write_u32(buf, self.kind.flags(), little_endian);
        self.iid.encode(buf, little_endian);
        self.std.encode(buf, little_endian);
    }

    /// Decode the reference prefix from a marshaled buffer.
    ///
    /// The signature is validated before anything else is read; a
    /// mismatch fails without touching further bytes. A flags word that
    /// does not name exactly one resolvable shape fails with
    /// [`LookupError::UnsupportedShape`], which callers treat as "hint
    /// path unavailable" rather than a hard error.
    pub fn decode<B: Buf>(buf: &mut B, little_endian: bool) -> Result<Self> {
        let signature = wire::read_u32(buf, little_endian)?;
        if signature != OBJREF_SIGNATURE {
            return Err(LookupError::InvalidFormat(format!(
                "bad signature: expected 0x{OBJREF_SIGNATURE:08x}, got 0x{signature:08x}"
            )));
        }

        let flags = wire::read_u32(buf, little_endian)?;
        let kind = ObjRefKind::from_flags(flags).ok_or(LookupError::UnsupportedShape(flags))?;

        let iid = Uuid::decode(buf, little_endian)?;
        let std = StdObjRef::decode(buf, little_endian)?;

        Ok(Self { kind, iid, std })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::identifiers::Oid;
    use bytes::BytesMut;

    fn sample(kind: ObjRefKind) -> ObjRef {
        ObjRef {
            kind,
            iid: Uuid::parse("00000000-0000-0000-c000-000000000046").unwrap(),
            std: StdObjRef::new(
                Oxid::new(0x1122334455667788),
                Oid::new(0x99AABBCCDDEEFF00),
                Ipid::with_embedded_pid(0x1234),
                1,
            ),
        }
    }

    #[test]
    fn signature_spells_meow() {
        assert_eq!(&OBJREF_SIGNATURE.to_le_bytes(), b"MEOW");
    }

    #[test]
    fn resolvable_shapes_round_trip() {
        for kind in [ObjRefKind::Standard, ObjRefKind::Handler, ObjRefKind::Extended] {
            let objref = sample(kind);
            let mut buf = BytesMut::new();
            objref.encode(&mut buf, true);

            let decoded = ObjRef::decode(&mut buf.freeze(), true).unwrap();
            assert_eq!(decoded, objref);
            assert_eq!(decoded.oxid(), objref.std.oxid);
            assert_eq!(decoded.ipid(), objref.std.ipid);
        }
    }

    #[test]
    fn trailing_payload_is_ignored() {
        let objref = sample(ObjRefKind::Standard);
        let mut buf = BytesMut::new();
        objref.encode(&mut buf, true);
        // Resolver bindings would follow here; the decoder must not care.
        buf.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let mut bytes = buf.freeze();
        let decoded = ObjRef::decode(&mut bytes, true).unwrap();
        assert_eq!(decoded, objref);
    }

    #[test]
    fn bad_signature_is_invalid_format() {
        let objref = sample(ObjRefKind::Standard);
        let mut buf = BytesMut::new();
        objref.encode(&mut buf, true);
        let mut bytes = buf.freeze().to_vec();
        bytes[0] ^= 0xFF;

        let err = ObjRef::decode(&mut bytes.as_slice(), true).unwrap_err();
        assert!(matches!(err, LookupError::InvalidFormat(_)));
    }

    #[test]
    fn truncated_buffer_is_invalid_format() {
        let mut two_bytes: &[u8] = &[0x4D, 0x45];
        let err = ObjRef::decode(&mut two_bytes, true).unwrap_err();
        assert!(matches!(err, LookupError::InvalidFormat(_)));
    }

    #[test]
    fn custom_shape_is_unsupported() {
        let mut buf = BytesMut::new();
        wire::write_u32(&mut buf, OBJREF_SIGNATURE, true);
        wire::write_u32(&mut buf, objref_flags::OBJREF_CUSTOM, true);

        let err = ObjRef::decode(&mut buf.freeze(), true).unwrap_err();
        assert!(matches!(
            err,
            LookupError::UnsupportedShape(f) if f == objref_flags::OBJREF_CUSTOM
        ));
    }

    #[test]
    fn ambiguous_flags_are_unsupported() {
        for flags in [0u32, 0x3, 0x10, 0xFFFF_FFFF] {
            let mut buf = BytesMut::new();
            wire::write_u32(&mut buf, OBJREF_SIGNATURE, true);
            wire::write_u32(&mut buf, flags, true);

            let err = ObjRef::decode(&mut buf.freeze(), true).unwrap_err();
            assert!(matches!(err, LookupError::UnsupportedShape(f) if f == flags));
        }
    }
}
