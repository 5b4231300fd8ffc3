//! Live TCP connection table access.
//!
//! The table is the OS view of current transport connections with owner
//! attribution. It is re-queried on every lookup; rows are never cached,
//! since connections come and go between calls.

use crate::types::Result;

/// One row of the connection table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TcpConnection {
    /// Local port, already converted to host byte order
    pub local_port: u16,
    /// Process that owns the connection
    pub owning_pid: u32,
}

/// Snapshot query over the OS connection table.
pub trait ConnectionTable {
    /// Enumerate all current TCP connections with their owning process
    /// ids. A fresh snapshot per call.
    fn snapshot(&self) -> Result<Vec<TcpConnection>>;
}

/// Recover the local port from the table's raw doubleword field.
///
/// The field is typed for host order but carries the port in network
/// byte order in its low word, so the value has to be rebuilt from the
/// in-memory bytes rather than used as-is.
pub fn local_port_from_raw(raw: u32) -> u16 {
    let bytes = raw.to_le_bytes();
    u16::from_be_bytes([bytes[0], bytes[1]])
}

#[cfg(windows)]
pub use self::win32::IpHelperTable;

#[cfg(windows)]
mod win32 {
    use tracing::debug;
    use windows::Win32::Foundation::{ERROR_INSUFFICIENT_BUFFER, NO_ERROR, WIN32_ERROR};
    use windows::Win32::NetworkManagement::IpHelper::{
        GetExtendedTcpTable, MIB_TCPROW_OWNER_PID, MIB_TCPTABLE_OWNER_PID, TCP_TABLE_OWNER_PID_ALL,
    };
    use windows::Win32::Networking::WinSock::AF_INET;

    use super::{local_port_from_raw, ConnectionTable, TcpConnection};
    use crate::types::{LookupError, Result};

    /// Connection table backed by the IP Helper API
    /// (`GetExtendedTcpTable`, owner-pid table class, IPv4, all states).
    #[derive(Clone, Copy, Debug, Default)]
    pub struct IpHelperTable;

    impl ConnectionTable for IpHelperTable {
        fn snapshot(&self) -> Result<Vec<TcpConnection>> {
            // Two-call protocol: first ask for the required size, then
            // fill. The table can grow in between, so a second
            // insufficient-buffer status is a failed snapshot.
            let mut size = 0u32;
            let status = unsafe {
                GetExtendedTcpTable(
                    None,
                    &mut size,
                    false,
                    AF_INET.0 as u32,
                    TCP_TABLE_OWNER_PID_ALL,
                    0,
                )
            };
            if WIN32_ERROR(status) != ERROR_INSUFFICIENT_BUFFER {
                debug!(status, "connection table size query failed");
                return Err(LookupError::NotFound);
            }

            let mut buf = vec![0u8; size as usize];
            let status = unsafe {
                GetExtendedTcpTable(
                    Some(buf.as_mut_ptr().cast()),
                    &mut size,
                    false,
                    AF_INET.0 as u32,
                    TCP_TABLE_OWNER_PID_ALL,
                    0,
                )
            };
            if WIN32_ERROR(status) != NO_ERROR {
                debug!(status, "connection table query failed");
                return Err(LookupError::NotFound);
            }

            let table = buf.as_ptr().cast::<MIB_TCPTABLE_OWNER_PID>();
            let count = unsafe { std::ptr::addr_of!((*table).dwNumEntries).read_unaligned() };
            let rows = unsafe { std::ptr::addr_of!((*table).table).cast::<MIB_TCPROW_OWNER_PID>() };

            let mut connections = Vec::with_capacity(count as usize);
            for index in 0..count as usize {
                let row = unsafe { rows.add(index).read_unaligned() };
                connections.push(TcpConnection {
                    local_port: local_port_from_raw(row.dwLocalPort),
                    owning_pid: row.dwOwningPid,
                });
            }
            Ok(connections)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_port_is_rebuilt_from_network_order() {
        // Port 4152 = 0x1038 arrives as the bytes [0x10, 0x38, 0, 0],
        // which read back as the doubleword 0x3810 on a little-endian
        // host.
        assert_eq!(local_port_from_raw(0x3810), 4152);
        assert_eq!(local_port_from_raw(0x8700), 135);
        assert_eq!(local_port_from_raw(0), 0);
    }
}
