//! Endpoint-to-process correlation.
//!
//! Second half of the fallback path: take the endpoints the resolver
//! returned, pick the port the exporter listens on for the requested
//! transport, and find the process that owns that listening connection
//! in the live table.

use tracing::debug;

use crate::tcp_table::ConnectionTable;
use crate::types::{DualStringArray, LookupError, Result};

/// The port advertised for `protocol`, taken from the first entry in
/// array order whose tower id matches and whose address carries a
/// parseable port token. Entries for other transports are skipped, as
/// are matching entries without a usable token.
pub fn endpoint_port(bindings: &DualStringArray, protocol: u16) -> Option<u16> {
    bindings
        .string_bindings
        .iter()
        .filter(|binding| binding.tower_id == protocol)
        .find_map(|binding| binding.port())
}

/// Cross-reference the resolved endpoints against the connection table
/// and return the owning process id of the first row whose local port
/// matches.
pub fn owning_process_id<C: ConnectionTable>(
    bindings: &DualStringArray,
    protocol: u16,
    table: &C,
) -> Result<u32> {
    let port = endpoint_port(bindings, protocol).ok_or(LookupError::NotFound)?;
    debug!(port, "matching resolved endpoint against connection table");

    let connections = table.snapshot()?;
    connections
        .iter()
        .find(|conn| conn.local_port == port)
        .map(|conn| conn.owning_pid)
        .ok_or(LookupError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcp_table::TcpConnection;
    use crate::types::{protocol_id, StringBinding};

    struct FixedTable(Vec<TcpConnection>);

    impl ConnectionTable for FixedTable {
        fn snapshot(&self) -> Result<Vec<TcpConnection>> {
            Ok(self.0.clone())
        }
    }

    fn sample_bindings() -> DualStringArray {
        DualStringArray::with_bindings(vec![
            StringBinding::new(6, "192.168.0.1[445]"),
            StringBinding::new(7, "192.168.0.1[4152]"),
        ])
    }

    #[test]
    fn first_entry_for_the_target_protocol_wins() {
        let bindings = sample_bindings();
        assert_eq!(endpoint_port(&bindings, 7), Some(4152));
        assert_eq!(endpoint_port(&bindings, 6), Some(445));
        assert_eq!(endpoint_port(&bindings, protocol_id::NCACN_NP), None);
    }

    #[test]
    fn entries_without_a_port_token_are_skipped() {
        let bindings = DualStringArray::with_bindings(vec![
            StringBinding::tcp("192.168.0.1"),
            StringBinding::tcp("192.168.0.1[4152]"),
        ]);
        assert_eq!(endpoint_port(&bindings, protocol_id::NCACN_IP_TCP), Some(4152));
    }

    #[test]
    fn matching_row_yields_its_owner() {
        let table = FixedTable(vec![
            TcpConnection {
                local_port: 135,
                owning_pid: 1048,
            },
            TcpConnection {
                local_port: 4152,
                owning_pid: 8824,
            },
        ]);

        let pid = owning_process_id(&sample_bindings(), 7, &table).unwrap();
        assert_eq!(pid, 8824);
    }

    #[test]
    fn no_matching_row_is_not_found() {
        let table = FixedTable(vec![TcpConnection {
            local_port: 135,
            owning_pid: 1048,
        }]);

        let err = owning_process_id(&sample_bindings(), 7, &table).unwrap_err();
        assert!(matches!(err, LookupError::NotFound));
    }

    #[test]
    fn no_usable_endpoint_is_not_found() {
        let bindings = DualStringArray::new();
        let table = FixedTable(vec![]);

        let err = owning_process_id(&bindings, 7, &table).unwrap_err();
        assert!(matches!(err, LookupError::NotFound));
    }
}
