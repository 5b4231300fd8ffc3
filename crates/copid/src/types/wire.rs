//! Width-explicit buffer accessors.
//!
//! All wire structures in this crate are externally defined, packed
//! layouts. They are decoded exclusively through these bounds-checked
//! reads; a short buffer yields [`LookupError::InvalidFormat`] rather
//! than a panic or an out-of-bounds access.

use bytes::{Buf, BufMut};

use super::error::{LookupError, Result};

pub(crate) fn read_u8<B: Buf>(buf: &mut B) -> Result<u8> {
    if buf.remaining() < 1 {
        return Err(LookupError::underflow(1, buf.remaining()));
    }
    Ok(buf.get_u8())
}

pub(crate) fn read_u16<B: Buf>(buf: &mut B, little_endian: bool) -> Result<u16> {
    if buf.remaining() < 2 {
        return Err(LookupError::underflow(2, buf.remaining()));
    }
    Ok(if little_endian { buf.get_u16_le() } else { buf.get_u16() })
}

pub(crate) fn read_u32<B: Buf>(buf: &mut B, little_endian: bool) -> Result<u32> {
    if buf.remaining() < 4 {
        return Err(LookupError::underflow(4, buf.remaining()));
    }
    Ok(if little_endian { buf.get_u32_le() } else { buf.get_u32() })
}

pub(crate) fn read_u64<B: Buf>(buf: &mut B, little_endian: bool) -> Result<u64> {
    if buf.remaining() < 8 {
        return Err(LookupError::underflow(8, buf.remaining()));
    }
    Ok(if little_endian { buf.get_u64_le() } else { buf.get_u64() })
}

pub(crate) fn read_bytes<B: Buf>(buf: &mut B, out: &mut [u8]) -> Result<()> {
    if buf.remaining() < out.len() {
        return Err(LookupError::underflow(out.len(), buf.remaining()));
    }
    buf.copy_to_slice(out);
    Ok(())
}

pub(crate) fn write_u16<B: BufMut>(buf: &mut B, value: u16, little_endian: bool) {
    if little_endian {
        buf.put_u16_le(value);
    } else {
        buf.put_u16(value);
    }
}

pub(crate) fn write_u32<B: BufMut>(buf: &mut B, value: u32, little_endian: bool) {
    if little_endian {
        buf.put_u32_le(value);
    } else {
        buf.put_u32(value);
    }
}

pub(crate) fn write_u64<B: BufMut>(buf: &mut B, value: u64, little_endian: bool) {
    if little_endian {
        buf.put_u64_le(value);
    } else {
        buf.put_u64(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reads_fail_without_consuming() {
        let mut buf: &[u8] = &[0xAB, 0xCD];
        assert!(read_u32(&mut buf, true).is_err());
        // The failed read must not have advanced the cursor.
        assert_eq!(read_u16(&mut buf, false).unwrap(), 0xABCD);
    }

    #[test]
    fn endianness_is_explicit() {
        let mut out = Vec::new();
        write_u16(&mut out, 0x1234, true);
        write_u16(&mut out, 0x1234, false);
        assert_eq!(out, vec![0x34, 0x12, 0x12, 0x34]);
    }
}
