//! Native socket-table backend using netstat2 and sysinfo.

use netstat2::{AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, TcpState};
use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System};

use crate::error::{Error, Result};
use crate::models::PortBinding;

use super::{normalize, InventorySource, RawBinding};

/// Inventory backend that reads the kernel TCP socket table directly,
/// requiring no external process.
pub struct SocketTableSource;

impl SocketTableSource {
    /// Create a new native socket-table source.
    pub fn new() -> Self {
        Self
    }

    fn collect(&self) -> Result<Vec<RawBinding>> {
        let families = AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6;
        let sockets = netstat2::iterate_sockets_info(families, ProtocolFlags::TCP)
            .map_err(|e| Error::Enumeration(e.to_string()))?;

        // Snapshot the process table once, after socket enumeration. A
        // process that exits in between simply fails the name lookup and
        // keeps the "unknown" sentinel.
        let processes = System::new_with_specifics(
            RefreshKind::new().with_processes(ProcessRefreshKind::new()),
        );

        let mut raw = Vec::new();
        for socket in sockets {
            // Entries the kernel refuses to describe are dropped, not fatal.
            let Ok(info) = socket else { continue };
            let ProtocolSocketInfo::Tcp(ref tcp) = info.protocol_socket_info else {
                continue;
            };
            if tcp.state != TcpState::Listen {
                continue;
            }
            let Some(&pid) = info.associated_pids.first() else {
                continue;
            };
            if pid == 0 {
                continue;
            }

            let process_name = processes
                .process(Pid::from_u32(pid))
                .map(|process| process.name().to_string());

            raw.push(RawBinding {
                port: tcp.local_port,
                pid,
                process_name,
            });
        }

        Ok(raw)
    }
}

impl Default for SocketTableSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InventorySource for SocketTableSource {
    async fn resolve(&self) -> Result<Vec<PortBinding>> {
        Ok(normalize(self.collect()?))
    }
}
