//! List command - show all listening ports.

use anyhow::Result;
use portman_core::PortResolver;

pub async fn run(json: bool) -> Result<()> {
    let resolver = PortResolver::probe().await;
    let bindings = resolver.resolve().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&bindings)?);
        return Ok(());
    }

    if bindings.is_empty() {
        println!("No processes listening on ports found (may require elevated privileges).");
        return Ok(());
    }

    // Table header
    println!("{:<6} {:<8} {:<25} STATE", "PORT", "PID", "PROCESS");
    println!("{}", "-".repeat(48));

    for binding in &bindings {
        println!(
            "{:<6} {:<8} {:<25} {}",
            binding.port,
            binding.pid,
            truncate(&binding.process_name, 25),
            binding.state
        );
    }

    println!("\nTotal: {} ports", bindings.len());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…", &s[..max - 1])
    }
}
