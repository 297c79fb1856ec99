//! Portman Core Library
//!
//! Library behind the portman TUI. Provides functionality to:
//! - Resolve a deduplicated, port-sorted inventory of processes listening
//!   on TCP ports
//! - Terminate the owning process of a selected binding (SIGTERM)
//!
//! # Backends
//! Two interchangeable inventory backends sit behind the `InventorySource`
//! trait:
//! - native: kernel socket table via `netstat2`, process names via `sysinfo`
//! - command: `ss` (Linux) or `lsof` (macOS) output parsing
//!
//! A capability probe at startup picks the native backend when it works and
//! falls back to the command backend otherwise. Either way the output
//! contract is the same: unique ports, ascending order, `"unknown"` where a
//! process name cannot be resolved.
//!
//! # Platform Support
//! - Linux: native socket table, or `ss`
//! - macOS: native socket table, or `lsof`

pub mod error;
pub mod models;
pub mod resolver;
pub mod terminator;

pub use error::{Error, Result};
pub use models::{PortBinding, LISTEN_STATE, UNKNOWN_PROCESS};
pub use resolver::{CommandSource, InventorySource, PortResolver, SocketTableSource};
pub use terminator::{ProcessTerminator, TerminationOutcome};
