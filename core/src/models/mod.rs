//! Data models for the port inventory.

mod binding;

pub use binding::{PortBinding, LISTEN_STATE, UNKNOWN_PROCESS};
