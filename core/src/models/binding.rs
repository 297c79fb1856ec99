//! Port binding data structure.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection state tracked by the inventory. Listening sockets only.
pub const LISTEN_STATE: &str = "LISTEN";

/// Display name used when the owning process cannot be resolved.
pub const UNKNOWN_PROCESS: &str = "unknown";

/// One row of the port inventory: a TCP port in LISTEN state and the process
/// that owned it at observation time.
///
/// A `PortBinding` is a point-in-time snapshot and is never mutated; a
/// refresh produces an entirely new sequence, replacing the old one
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortBinding {
    /// The local TCP port (e.g. 3000, 8080).
    pub port: u16,

    /// Process ID of the owning process.
    pub pid: u32,

    /// Name of the owning process, or `"unknown"` when the lookup raced a
    /// process exit or was denied.
    pub process_name: String,

    /// Connection state; always `"LISTEN"`.
    pub state: String,
}

impl PortBinding {
    /// Create a binding with a resolved process name.
    pub fn new(port: u16, pid: u32, process_name: impl Into<String>) -> Self {
        Self {
            port,
            pid,
            process_name: process_name.into(),
            state: LISTEN_STATE.to_string(),
        }
    }

    /// Create a binding whose owning process could not be resolved.
    pub fn unresolved(port: u16, pid: u32) -> Self {
        Self::new(port, pid, UNKNOWN_PROCESS)
    }
}

impl fmt::Display for PortBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ":{} (PID: {}, Process: {})",
            self.port, self.pid, self.process_name
        )
    }
}
