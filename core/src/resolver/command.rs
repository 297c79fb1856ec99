//! External listing-command backend (`ss` on Linux, `lsof` on macOS).

use std::process::Stdio;

#[cfg(target_os = "linux")]
use regex::Regex;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::models::PortBinding;

use super::parse::local_port;
use super::{normalize, InventorySource, RawBinding};

#[cfg(target_os = "linux")]
const LISTING_PROGRAM: &str = "/usr/sbin/ss";

#[cfg(target_os = "macos")]
const LISTING_PROGRAM: &str = "/usr/sbin/lsof";

/// Inventory backend that shells out to the platform listing utility and
/// parses its text output line by line. A malformed line is skipped, never
/// fatal.
pub struct CommandSource {
    program: &'static str,
}

impl CommandSource {
    /// Create a source using the platform listing command.
    pub fn new() -> Self {
        Self {
            program: LISTING_PROGRAM,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_program(program: &'static str) -> Self {
        Self { program }
    }

    /// Run the listing command with stdin closed and stderr discarded.
    ///
    /// A failed exit is "no data", not an error: on locked-down systems the
    /// tool exits non-zero without printing anything usable.
    async fn listing(&self) -> Result<String> {
        let output = Command::new(self.program)
            .args(listing_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Ok(String::new());
        }

        String::from_utf8(output.stdout).map_err(|e| {
            Error::ParseError(format!("invalid UTF-8 in {} output: {}", self.program, e))
        })
    }
}

impl Default for CommandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InventorySource for CommandSource {
    async fn resolve(&self) -> Result<Vec<PortBinding>> {
        let listing = self.listing().await?;
        Ok(normalize(parse_listing(&listing)))
    }
}

/// Arguments selecting TCP, listening-only, numeric output.
#[cfg(target_os = "linux")]
fn listing_args() -> &'static [&'static str] {
    // -H no header, -t TCP only, -l listening only, -n numeric, -p processes
    &["-Htlnp"]
}

#[cfg(target_os = "macos")]
fn listing_args() -> &'static [&'static str] {
    // -iTCP TCP only, -sTCP:LISTEN listening only, -P/-n numeric ports/hosts
    &["-iTCP", "-sTCP:LISTEN", "-P", "-n"]
}

/// Parse `ss -Htlnp` output.
///
/// Expected line format:
/// ```text
/// LISTEN 0 4096 [::ffff:127.0.0.1]:63342 *:* users:(("rustrover",pid=53561,fd=54))
/// ```
///
/// Lines without a process column (insufficient privilege for that socket)
/// have no usable PID and are dropped.
#[cfg(target_os = "linux")]
fn parse_listing(output: &str) -> Vec<RawBinding> {
    let process_column = Regex::new(r#"users:\(\("(.+?)",pid=(\d+),"#).unwrap();
    let mut raw = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }

        // Columns: [State] [Recv-Q] [Send-Q] [Local Address:Port] [Peer Address:Port] [Process]
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 6 {
            continue;
        }
        if components[0] != "LISTEN" {
            continue;
        }

        let Some(caps) = process_column.captures(components[5]) else {
            continue;
        };

        let process_name = caps[1].to_string();
        let pid: u32 = match caps[2].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };
        if pid == 0 {
            continue;
        }

        let Some(port) = local_port(components[3]) else {
            continue;
        };

        raw.push(RawBinding {
            port,
            pid,
            process_name: Some(process_name),
        });
    }

    raw
}

/// Parse `lsof -iTCP -sTCP:LISTEN -P -n` output.
///
/// Expected line format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// ```
#[cfg(target_os = "macos")]
fn parse_listing(output: &str) -> Vec<RawBinding> {
    let mut raw = Vec::new();

    // Skip header line
    for line in output.lines().skip(1) {
        if line.is_empty() {
            continue;
        }

        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 10 {
            continue;
        }
        if components[components.len() - 1] != "(LISTEN)" {
            continue;
        }

        // lsof escapes spaces and slashes in command names
        let process_name = components[0].replace("\\x20", " ").replace("\\x2f", "/");

        let pid: u32 = match components[1].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };
        if pid == 0 {
            continue;
        }

        let Some(port) = local_port(components[components.len() - 2]) else {
            continue;
        };

        raw.push(RawBinding {
            port,
            pid,
            process_name: Some(process_name),
        });
    }

    raw
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ss_listing() {
        let output = r#"LISTEN 0 511 *:80 *:* users:(("nginx",pid=55316,fd=6))
LISTEN 0 50 [::ffff:127.0.0.1]:3000 *:* users:(("node",pid=53561,fd=187))"#;

        let bindings = normalize(parse_listing(output));
        assert_eq!(bindings.len(), 2);

        // Sorted by port
        assert_eq!(bindings[0].port, 80);
        assert_eq!(bindings[0].pid, 55316);
        assert_eq!(bindings[0].process_name, "nginx");

        assert_eq!(bindings[1].port, 3000);
        assert_eq!(bindings[1].process_name, "node");
    }

    #[test]
    fn test_dual_stack_dedup() {
        // The same listener reported once per address family; first wins.
        let output = r#"LISTEN 0 128 0.0.0.0:22 0.0.0.0:* users:(("sshd",pid=700,fd=3))
LISTEN 0 128 [::]:22 [::]:* users:(("sshd",pid=700,fd=4))"#;

        let bindings = normalize(parse_listing(output));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].port, 22);
    }

    #[test]
    fn test_line_without_process_column_dropped() {
        // Sockets owned by other users have no process column without root.
        let output = r#"LISTEN 0 128 0.0.0.0:631 0.0.0.0:*
LISTEN 0 4096 127.0.0.1:6379 0.0.0.0:* users:(("redis-server",pid=612,fd=6))"#;

        let bindings = normalize(parse_listing(output));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].port, 6379);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let output = r#"garbage
LISTEN 0 4096 not-an-address users:(("x",pid=1,fd=1))
LISTEN 0 4096 127.0.0.1:8080 0.0.0.0:* users:(("python",pid=4321,fd=3))"#;

        let bindings = normalize(parse_listing(output));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].port, 8080);
        assert_eq!(bindings[0].process_name, "python");
    }

    #[test]
    fn test_non_listen_state_dropped() {
        let output = r#"ESTAB 0 0 127.0.0.1:44444 127.0.0.1:80 users:(("curl",pid=9,fd=5))
LISTEN 0 511 *:80 *:* users:(("nginx",pid=55316,fd=6))"#;

        let bindings = normalize(parse_listing(output));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].process_name, "nginx");
    }
}
