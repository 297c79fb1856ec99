//! Port inventory resolution with two interchangeable backends.
//!
//! The native backend walks the kernel socket table directly; the command
//! backend shells out to the platform listing utility. Both feed the same
//! normalization pipeline, so the output contract is identical either way:
//! listening sockets with a known owning process, one entry per port
//! (first-seen wins), sorted ascending by port.

mod command;
mod native;
mod parse;

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::PortBinding;

pub use command::CommandSource;
pub use native::SocketTableSource;

/// Trait for inventory data-source backends.
pub trait InventorySource: Send + Sync {
    /// Enumerate all listening TCP ports with a known owning process.
    fn resolve(&self) -> impl std::future::Future<Output = Result<Vec<PortBinding>>> + Send;
}

/// A socket-table entry as reported by a backend, before normalization.
///
/// `process_name` is `None` when the backend saw the socket but could not
/// resolve its owner (race with a process exit, or per-process permission).
pub(crate) struct RawBinding {
    pub port: u16,
    pub pid: u32,
    pub process_name: Option<String>,
}

/// Deduplicate by port (first occurrence in OS-reported order wins),
/// substitute the `"unknown"` sentinel for unresolved names, and sort
/// ascending by port.
pub(crate) fn normalize(raw: Vec<RawBinding>) -> Vec<PortBinding> {
    let mut seen: HashSet<u16> = HashSet::new();
    let mut bindings: Vec<PortBinding> = raw
        .into_iter()
        .filter(|entry| seen.insert(entry.port))
        .map(|entry| match entry.process_name {
            Some(name) => PortBinding::new(entry.port, entry.pid, name),
            None => PortBinding::unresolved(entry.port, entry.pid),
        })
        .collect();
    bindings.sort_by_key(|binding| binding.port);
    bindings
}

/// The main port resolver.
///
/// Holds no state beyond the backend choice; each `resolve()` call is an
/// independent snapshot of OS state.
pub struct PortResolver {
    backend: Backend,
}

enum Backend {
    Native(SocketTableSource),
    Command(CommandSource),
}

impl PortResolver {
    /// Probe the native socket table; fall back to the external listing
    /// command if it is unavailable.
    ///
    /// The choice is made once and kept for the lifetime of the resolver.
    pub async fn probe() -> Self {
        let native = SocketTableSource::new();
        match native.resolve().await {
            Ok(_) => {
                debug!("using native socket-table backend");
                Self {
                    backend: Backend::Native(native),
                }
            }
            Err(err) => {
                warn!("native socket table unavailable ({err}), falling back to listing command");
                Self {
                    backend: Backend::Command(CommandSource::new()),
                }
            }
        }
    }

    /// Resolve the current inventory.
    ///
    /// Never fails: an unusable backend yields an empty inventory, which the
    /// UI presents as a "no data" state rather than an error.
    pub async fn resolve(&self) -> Vec<PortBinding> {
        let result = match &self.backend {
            Backend::Native(source) => source.resolve().await,
            Backend::Command(source) => source.resolve().await,
        };

        match result {
            Ok(bindings) => bindings,
            Err(err) => {
                warn!("port enumeration failed: {err}");
                Vec::new()
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn with_command_backend(source: CommandSource) -> Self {
        Self {
            backend: Backend::Command(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_PROCESS;

    fn raw(port: u16, pid: u32, name: Option<&str>) -> RawBinding {
        RawBinding {
            port,
            pid,
            process_name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_sorts_ascending_by_port() {
        let bindings = normalize(vec![
            raw(8080, 30, Some("nginx")),
            raw(22, 10, Some("sshd")),
            raw(3000, 20, Some("node")),
        ]);

        let ports: Vec<u16> = bindings.iter().map(|b| b.port).collect();
        assert_eq!(ports, vec![22, 3000, 8080]);
    }

    #[test]
    fn test_normalize_keeps_first_binding_per_port() {
        // Dual-stack: the same port reported once per address family.
        let bindings = normalize(vec![
            raw(3000, 1234, Some("node")),
            raw(3000, 5678, Some("impostor")),
        ]);

        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].pid, 1234);
        assert_eq!(bindings[0].process_name, "node");
    }

    #[test]
    fn test_normalize_substitutes_unknown_sentinel() {
        let bindings = normalize(vec![raw(5432, 99, None)]);

        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].process_name, UNKNOWN_PROCESS);
        assert_eq!(bindings[0].pid, 99);
    }

    #[tokio::test]
    async fn test_missing_listing_command_degrades_to_empty() {
        let resolver =
            PortResolver::with_command_backend(CommandSource::with_program("/nonexistent/ss"));
        assert!(resolver.resolve().await.is_empty());
    }
}
