//! String binding and dual string array types (MS-DCOM 2.2.19)
//!
//! A resolver response conveys the endpoints of an object exporter as a
//! DUALSTRINGARRAY: a flattened sequence of 16-bit words holding
//! variable-length (protocol id, null-terminated address) pairs, then a
//! zero word, then security bindings, then a final zero word. There is
//! no per-entry length field; the array can only be walked token by
//! token.

use std::fmt;

use bytes::{Buf, BufMut};

use super::error::Result;
use super::wire;

/// Protocol tower identifiers (C 706 Appendix I)
pub mod protocol_id {
    /// Connection-oriented TCP/IP
    pub const NCACN_IP_TCP: u16 = 0x07;
    /// Named pipes
    pub const NCACN_NP: u16 = 0x0F;
    /// Local RPC
    pub const NCALRPC: u16 = 0x10;
    /// HTTP
    pub const NCACN_HTTP: u16 = 0x1F;
}

/// One (protocol, network address) endpoint of an exporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringBinding {
    /// Tower id (protocol sequence)
    pub tower_id: u16,
    /// Network address, usually of the form `host[endpoint]`
    pub network_addr: String,
}

impl StringBinding {
    /// Create a new string binding
    pub fn new(tower_id: u16, network_addr: impl Into<String>) -> Self {
        Self {
            tower_id,
            network_addr: network_addr.into(),
        }
    }

    /// Create a TCP/IP binding
    pub fn tcp(addr: impl Into<String>) -> Self {
        Self::new(protocol_id::NCACN_IP_TCP, addr)
    }

    /// The port token of the address: the first bracket-delimited
    /// substring, parsed as a decimal port number. `None` when the
    /// address carries no parseable `[port]` token.
    pub fn port(&self) -> Option<u16> {
        let start = self.network_addr.find('[')?;
        let rest = &self.network_addr[start + 1..];
        let end = rest.find(']')?;
        rest[..end].trim().parse().ok()
    }

    /// Encoded size in words (protocol word + characters + terminator)
    fn encoded_words(&self) -> usize {
        1 + self.network_addr.encode_utf16().count() + 1
    }

    /// Encode as a protocol word followed by the null-terminated UTF-16
    /// address
    pub fn encode<B: BufMut>(&self, buf: &mut B, little_endian: bool) {
        wire::write_u16(buf, self.tower_id, little_endian);
        for unit in self.network_addr.encode_utf16() {
            wire::write_u16(buf, unit, little_endian);
        }
        wire::write_u16(buf, 0, little_endian);
    }
}

impl fmt::Display for StringBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let proto = match self.tower_id {
            protocol_id::NCACN_IP_TCP => "ncacn_ip_tcp",
            protocol_id::NCACN_NP => "ncacn_np",
            protocol_id::NCALRPC => "ncalrpc",
            protocol_id::NCACN_HTTP => "ncacn_http",
            _ => "unknown",
        };
        write!(f, "{}:{}", proto, self.network_addr)
    }
}

/// One security binding of a DUALSTRINGARRAY.
///
/// Parsed so the walk stays aligned; the lookup itself has no use for
/// the authentication hints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityBinding {
    /// Authentication service
    pub authn_svc: u16,
    /// Authorization service
    pub authz_svc: u16,
    /// Principal name
    pub principal_name: String,
}

impl SecurityBinding {
    /// Create a new security binding
    pub fn new(authn_svc: u16, authz_svc: u16, principal_name: impl Into<String>) -> Self {
        Self {
            authn_svc,
            authz_svc,
            principal_name: principal_name.into(),
        }
    }

    fn encoded_words(&self) -> usize {
        2 + self.principal_name.encode_utf16().count() + 1
    }

    fn encode<B: BufMut>(&self, buf: &mut B, little_endian: bool) {
        wire::write_u16(buf, self.authn_svc, little_endian);
        wire::write_u16(buf, self.authz_svc, little_endian);
        for unit in self.principal_name.encode_utf16() {
            wire::write_u16(buf, unit, little_endian);
        }
        wire::write_u16(buf, 0, little_endian);
    }
}

/// Dual String Array (MS-DCOM 2.2.19.1)
#[derive(Clone, Debug, Default)]
pub struct DualStringArray {
    /// Total length of the word sequence, in words
    pub num_entries: u16,
    /// Offset of the security bindings, in words from the sequence start
    pub security_offset: u16,
    /// Decoded endpoint entries, in array order
    pub string_bindings: Vec<StringBinding>,
    /// Decoded security entries
    pub security_bindings: Vec<SecurityBinding>,
}

impl DualStringArray {
    /// Fixed header size in bytes (num_entries + security_offset)
    pub const HEADER_SIZE: usize = 4;

    /// Create an empty array
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an array holding the given endpoint entries
    pub fn with_bindings(string_bindings: Vec<StringBinding>) -> Self {
        Self {
            num_entries: 0,
            security_offset: 0,
            string_bindings,
            security_bindings: Vec::new(),
        }
    }

    /// Encode header and word sequence, computing both header fields
    /// from the entries.
    pub fn encode<B: BufMut>(&self, buf: &mut B, little_endian: bool) {
        let string_words: usize =
            self.string_bindings.iter().map(StringBinding::encoded_words).sum::<usize>() + 1;
        let security_words: usize =
            self.security_bindings.iter().map(SecurityBinding::encoded_words).sum::<usize>() + 1;

        wire::write_u16(buf, (string_words + security_words) as u16, little_endian);
        wire::write_u16(buf, string_words as u16, little_endian);

        for binding in &self.string_bindings {
            binding.encode(buf, little_endian);
        }
        wire::write_u16(buf, 0, little_endian);

        for binding in &self.security_bindings {
            binding.encode(buf, little_endian);
        }
        wire::write_u16(buf, 0, little_endian);
    }

    /// Decode header and walk the word sequence.
    ///
    /// Entries are variable length, so the walk advances by content: one
    /// protocol word, then characters up to the null terminator. It ends
    /// at the zero-word sentinel, at the declared security offset, or
    /// when too few words remain for another entry, whichever comes
    /// first.
    pub fn decode<B: Buf>(buf: &mut B, little_endian: bool) -> Result<Self> {
        let num_entries = wire::read_u16(buf, little_endian)?;
        let security_offset = wire::read_u16(buf, little_endian)?;

        let mut string_bindings = Vec::new();
        let mut security_bindings = Vec::new();
        let mut cursor = 0u16;

        // Endpoint entries occupy [0, security_offset - 1); the word
        // before the security offset is their terminator.
        while cursor + 1 < security_offset && buf.remaining() >= 2 {
            let tower_id = wire::read_u16(buf, little_endian)?;
            cursor += 1;
            if tower_id == 0 {
                break;
            }

            let mut units = Vec::new();
            while buf.remaining() >= 2 {
                let unit = wire::read_u16(buf, little_endian)?;
                cursor += 1;
                if unit == 0 {
                    break;
                }
                units.push(unit);
            }

            string_bindings.push(StringBinding {
                tower_id,
                network_addr: String::from_utf16_lossy(&units),
            });
        }

        // Skip padding up to the declared security offset.
        while cursor < security_offset && buf.remaining() >= 2 {
            wire::read_u16(buf, little_endian)?;
            cursor += 1;
        }

        while cursor < num_entries && buf.remaining() >= 4 {
            let authn_svc = wire::read_u16(buf, little_endian)?;
            cursor += 1;
            if authn_svc == 0 {
                break;
            }
            let authz_svc = wire::read_u16(buf, little_endian)?;
            cursor += 1;

            let mut units = Vec::new();
            while buf.remaining() >= 2 {
                let unit = wire::read_u16(buf, little_endian)?;
                cursor += 1;
                if unit == 0 {
                    break;
                }
                units.push(unit);
            }

            security_bindings.push(SecurityBinding {
                authn_svc,
                authz_svc,
                principal_name: String::from_utf16_lossy(&units),
            });
        }

        // Consume any remaining declared words so whatever follows the
        // array in an enclosing record stays aligned.
        while cursor < num_entries && buf.remaining() >= 2 {
            wire::read_u16(buf, little_endian)?;
            cursor += 1;
        }

        Ok(Self {
            num_entries,
            security_offset,
            string_bindings,
            security_bindings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn port_token_extraction() {
        assert_eq!(StringBinding::tcp("192.168.0.1[4152]").port(), Some(4152));
        assert_eq!(StringBinding::tcp("host.example[135]").port(), Some(135));
        assert_eq!(StringBinding::tcp("192.168.0.1").port(), None);
        assert_eq!(StringBinding::tcp("192.168.0.1[]").port(), None);
        assert_eq!(StringBinding::tcp("192.168.0.1[notaport]").port(), None);
    }

    #[test]
    fn display_names_the_protocol() {
        let binding = StringBinding::tcp("127.0.0.1[135]");
        assert_eq!(binding.to_string(), "ncacn_ip_tcp:127.0.0.1[135]");
    }

    #[test]
    fn walk_recovers_variable_length_entries() {
        let dsa = DualStringArray::with_bindings(vec![
            StringBinding::new(6, "192.168.0.1[445]"),
            StringBinding::new(7, "192.168.0.1[4152]"),
        ]);
        let mut buf = BytesMut::new();
        dsa.encode(&mut buf, true);

        let decoded = DualStringArray::decode(&mut buf.freeze(), true).unwrap();
        assert_eq!(decoded.string_bindings.len(), 2);
        assert_eq!(decoded.string_bindings[0].tower_id, 6);
        assert_eq!(decoded.string_bindings[1].tower_id, 7);
        assert_eq!(decoded.string_bindings[1].network_addr, "192.168.0.1[4152]");
    }

    #[test]
    fn security_bindings_keep_the_walk_aligned() {
        let mut dsa = DualStringArray::with_bindings(vec![StringBinding::tcp("10.0.0.1[9000]")]);
        dsa.security_bindings.push(SecurityBinding::new(10, 0xFFFF, "host/machine"));

        let mut buf = BytesMut::new();
        dsa.encode(&mut buf, true);

        let decoded = DualStringArray::decode(&mut buf.freeze(), true).unwrap();
        assert_eq!(decoded.string_bindings.len(), 1);
        assert_eq!(decoded.security_bindings.len(), 1);
        assert_eq!(decoded.security_bindings[0].authn_svc, 10);
        assert_eq!(decoded.security_bindings[0].principal_name, "host/machine");
    }

    #[test]
    fn empty_array_is_two_zero_words() {
        let mut buf = BytesMut::new();
        DualStringArray::new().encode(&mut buf, true);
        // Header declares two words; the sequence is the double-zero
        // sentinel.
        assert_eq!(&buf[..], &[2, 0, 1, 0, 0, 0, 0, 0]);

        let decoded = DualStringArray::decode(&mut buf.freeze(), true).unwrap();
        assert!(decoded.string_bindings.is_empty());
        assert!(decoded.security_bindings.is_empty());
    }

    #[test]
    fn walk_stops_on_exhausted_sequence() {
        // Header promises more words than the buffer holds; the walk
        // must stop cleanly instead of reading out of bounds.
        let mut buf = BytesMut::new();
        wire::write_u16(&mut buf, 64, true);
        wire::write_u16(&mut buf, 60, true);
        wire::write_u16(&mut buf, 7, true);
        for unit in "10.0.0.1[4152]".encode_utf16() {
            wire::write_u16(&mut buf, unit, true);
        }
        // No terminator, no security region.

        let decoded = DualStringArray::decode(&mut buf.freeze(), true).unwrap();
        assert_eq!(decoded.string_bindings.len(), 1);
        assert_eq!(decoded.string_bindings[0].network_addr, "10.0.0.1[4152]");
    }
}
