//! Error types for the portman-core library.

use thiserror::Error;

/// Result type alias for portman-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while enumerating ports.
///
/// These stay internal to the resolver: the public `resolve()` surface
/// absorbs them into an empty inventory, which the UI presents as a
/// "no data" state rather than a fault.
#[derive(Error, Debug)]
pub enum Error {
    /// The native socket-table enumeration failed outright.
    #[error("socket table enumeration failed: {0}")]
    Enumeration(String),

    /// Failed to execute the external listing command.
    #[error("command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse command output.
    #[error("failed to parse output: {0}")]
    ParseError(String),
}
