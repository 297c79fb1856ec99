//! Example: Resolve and display all listening ports.

use portman_core::PortResolver;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let resolver = PortResolver::probe().await;
    let bindings = resolver.resolve().await;

    if bindings.is_empty() {
        println!("No listening ports found (may require elevated privileges).");
        return;
    }

    println!("{:<6} {:<8} {:<25} STATE", "PORT", "PID", "PROCESS");
    println!("{}", "-".repeat(48));

    for binding in &bindings {
        println!(
            "{:<6} {:<8} {:<25} {}",
            binding.port, binding.pid, binding.process_name, binding.state
        );
    }

    println!("\nTotal: {} ports", bindings.len());
}
