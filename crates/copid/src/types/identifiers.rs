//! DCOM identifier types (MS-DCOM 2.2.18)
//!
//! - OXID: identifies the object exporter (the hosting process's export
//!   machinery) within a machine
//! - OID: identifies one object within an exporter
//! - IPID: identifies one interface pointer on one object
//!
//! The IPID additionally carries the embedded process-id hint this crate
//! exists to read; see [`Ipid::pid_hint`].

use std::fmt;

use bytes::{Buf, BufMut};

use super::error::Result;
use super::wire;

/// DCE UUID with the standard field split (RFC 4122 / C 706).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uuid {
    pub time_low: u32,
    pub time_mid: u16,
    pub time_hi_and_version: u16,
    pub clock_seq_hi_and_reserved: u8,
    pub clock_seq_low: u8,
    pub node: [u8; 6],
}

impl Uuid {
    /// Size in bytes
    pub const SIZE: usize = 16;

    /// Nil UUID (all zeros)
    pub const NIL: Self = Self {
        time_low: 0,
        time_mid: 0,
        time_hi_and_version: 0,
        clock_seq_hi_and_reserved: 0,
        clock_seq_low: 0,
        node: [0; 6],
    };

    /// Parse the canonical form "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 5 {
            return None;
        }
        if parts[0].len() != 8 || parts[1].len() != 4 || parts[2].len() != 4 {
            return None;
        }
        let time_low = u32::from_str_radix(parts[0], 16).ok()?;
        let time_mid = u16::from_str_radix(parts[1], 16).ok()?;
        let time_hi_and_version = u16::from_str_radix(parts[2], 16).ok()?;
        let clock = u16::from_str_radix(parts[3], 16).ok()?;
        let node_str = parts[4];
        if parts[3].len() != 4 || node_str.len() != 12 {
            return None;
        }

        let mut node = [0u8; 6];
        for (i, byte) in node.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&node_str[i * 2..i * 2 + 2], 16).ok()?;
        }

        Some(Self {
            time_low,
            time_mid,
            time_hi_and_version,
            clock_seq_hi_and_reserved: (clock >> 8) as u8,
            clock_seq_low: (clock & 0xFF) as u8,
            node,
        })
    }

    /// Generate a random v4 UUID
    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let b = uuid.as_bytes();
        Self {
            time_low: u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
            time_mid: u16::from_be_bytes([b[4], b[5]]),
            time_hi_and_version: u16::from_be_bytes([b[6], b[7]]),
            clock_seq_hi_and_reserved: b[8],
            clock_seq_low: b[9],
            node: [b[10], b[11], b[12], b[13], b[14], b[15]],
        }
    }

    /// Encode to buffer
    pub fn encode<B: BufMut>(&self, buf: &mut B, little_endian: bool) {
        wire::write_u32(buf, self.time_low, little_endian);
        wire::write_u16(buf, self.time_mid, little_endian);
        wire::write_u16(buf, self.time_hi_and_version, little_endian);
        buf.put_u8(self.clock_seq_hi_and_reserved);
        buf.put_u8(self.clock_seq_low);
        buf.put_slice(&self.node);
    }

    /// Decode from buffer
    pub fn decode<B: Buf>(buf: &mut B, little_endian: bool) -> Result<Self> {
        let time_low = wire::read_u32(buf, little_endian)?;
        let time_mid = wire::read_u16(buf, little_endian)?;
        let time_hi_and_version = wire::read_u16(buf, little_endian)?;
        let clock_seq_hi_and_reserved = wire::read_u8(buf)?;
        let clock_seq_low = wire::read_u8(buf)?;
        let mut node = [0u8; 6];
        wire::read_bytes(buf, &mut node)?;
        Ok(Self {
            time_low,
            time_mid,
            time_hi_and_version,
            clock_seq_hi_and_reserved,
            clock_seq_low,
            node,
        })
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{}",
            self.time_low,
            self.time_mid,
            self.time_hi_and_version,
            self.clock_seq_hi_and_reserved,
            self.clock_seq_low,
            self.node.iter().map(|b| format!("{b:02x}")).collect::<String>()
        )
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({self})")
    }
}

/// Object Exporter Identifier (8 bytes)
///
/// Opaque within a lookup: produced by parsing the object reference and
/// consumed only as the resolution key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Oxid(pub u64);

impl Oxid {
    /// Size in bytes
    pub const SIZE: usize = 8;

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn encode<B: BufMut>(&self, buf: &mut B, little_endian: bool) {
        wire::write_u64(buf, self.0, little_endian);
    }

    pub fn decode<B: Buf>(buf: &mut B, little_endian: bool) -> Result<Self> {
        Ok(Self(wire::read_u64(buf, little_endian)?))
    }
}

impl fmt::Debug for Oxid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OXID({:016x})", self.0)
    }
}

impl fmt::Display for Oxid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Object Identifier (8 bytes)
///
/// Part of the standard reference record; carried through decoding but not
/// consumed by the lookup.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Oid(pub u64);

impl Oid {
    /// Size in bytes
    pub const SIZE: usize = 8;

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn encode<B: BufMut>(&self, buf: &mut B, little_endian: bool) {
        wire::write_u64(buf, self.0, little_endian);
    }

    pub fn decode<B: Buf>(buf: &mut B, little_endian: bool) -> Result<Self> {
        Ok(Self(wire::read_u64(buf, little_endian)?))
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OID({:016x})", self.0)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Sentinel stored in the IPID when the server's pid exceeds 16 bits.
pub const PID_NOT_REPRESENTABLE: u16 = 0xFFFF;

/// Interface Pointer Identifier (16 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ipid(pub Uuid);

impl Ipid {
    /// Size in bytes
    pub const SIZE: usize = Uuid::SIZE;

    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random IPID
    pub fn generate() -> Self {
        Self(Uuid::generate())
    }

    /// Nil IPID
    pub fn nil() -> Self {
        Self(Uuid::NIL)
    }

    pub fn is_nil(&self) -> bool {
        self.0 == Uuid::NIL
    }

    /// The underlying UUID
    pub fn uuid(&self) -> &Uuid {
        &self.0
    }

    /// Build an IPID whose embedded pid word is `pid`, with the remaining
    /// bytes randomized. Intended for constructing synthetic references.
    pub fn with_embedded_pid(pid: u16) -> Self {
        let mut uuid = Uuid::generate();
        uuid.time_mid = pid;
        Self(uuid)
    }

    /// The server process id packed into this IPID by the proxy manager,
    /// or `None` when the stored word is the [`PID_NOT_REPRESENTABLE`]
    /// sentinel (pid did not fit in 16 bits).
    ///
    /// The word sits at byte offset 4 of the identifier (`time_mid` as
    /// stored). This is an observed convention of the marshaling
    /// subsystem, not part of its public contract; callers must treat the
    /// value as a hint and be prepared to resolve the pid another way.
    pub fn pid_hint(&self) -> Option<u16> {
        match self.0.time_mid {
            PID_NOT_REPRESENTABLE => None,
            pid => Some(pid),
        }
    }

    pub fn encode<B: BufMut>(&self, buf: &mut B, little_endian: bool) {
        self.0.encode(buf, little_endian);
    }

    pub fn decode<B: Buf>(buf: &mut B, little_endian: bool) -> Result<Self> {
        Ok(Self(Uuid::decode(buf, little_endian)?))
    }
}

impl fmt::Debug for Ipid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPID({})", self.0)
    }
}

impl fmt::Display for Ipid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn uuid_parse_and_display_round_trip() {
        let text = "99fcfec4-5260-101b-bbcb-00aa0021347a";
        let uuid = Uuid::parse(text).unwrap();
        assert_eq!(uuid.time_low, 0x99FCFEC4);
        assert_eq!(uuid.time_mid, 0x5260);
        assert_eq!(uuid.to_string(), text);

        assert!(Uuid::parse("not-a-uuid").is_none());
        assert!(Uuid::parse("99fcfec4-5260-101b-bbcb").is_none());
    }

    #[test]
    fn uuid_wire_offsets() {
        // Little-endian layout: time_low at 0..4, time_mid at 4..6.
        let mut uuid = Uuid::NIL;
        uuid.time_mid = 0x1234;
        let mut buf = BytesMut::new();
        uuid.encode(&mut buf, true);
        assert_eq!(buf.len(), Uuid::SIZE);
        assert_eq!(&buf[4..6], &[0x34, 0x12]);

        let decoded = Uuid::decode(&mut buf.freeze(), true).unwrap();
        assert_eq!(decoded, uuid);
    }

    #[test]
    fn oxid_encode_decode() {
        let oxid = Oxid::new(0x123456789ABCDEF0);
        let mut buf = BytesMut::new();
        oxid.encode(&mut buf, true);
        assert_eq!(buf.len(), Oxid::SIZE);
        assert_eq!(Oxid::decode(&mut buf.freeze(), true).unwrap(), oxid);
    }

    #[test]
    fn pid_hint_reads_the_embedded_word() {
        assert_eq!(Ipid::with_embedded_pid(0x1234).pid_hint(), Some(0x1234));
        // Zero is not the sentinel; it comes back unchanged.
        assert_eq!(Ipid::with_embedded_pid(0).pid_hint(), Some(0));
    }

    #[test]
    fn pid_hint_sentinel_is_unusable() {
        assert_eq!(Ipid::with_embedded_pid(PID_NOT_REPRESENTABLE).pid_hint(), None);
    }

    #[test]
    fn ipid_generate_is_unique() {
        let a = Ipid::generate();
        let b = Ipid::generate();
        assert_ne!(a, b);
        assert!(!a.is_nil());
    }
}
