//! Live resolution tests against this process's own listening sockets.

use std::net::TcpListener;

use portman_core::{PortBinding, PortResolver, LISTEN_STATE};

fn entry_for(inventory: &[PortBinding], port: u16) -> Option<&PortBinding> {
    inventory.iter().find(|binding| binding.port == port)
}

#[tokio::test]
async fn test_resolves_own_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    let resolver = PortResolver::probe().await;
    let inventory = resolver.resolve().await;

    let matches: Vec<&PortBinding> = inventory
        .iter()
        .filter(|binding| binding.port == port)
        .collect();
    assert_eq!(matches.len(), 1, "exactly one entry for our port");
    assert_eq!(matches[0].pid, std::process::id());
    assert_eq!(matches[0].state, LISTEN_STATE);
}

#[tokio::test]
async fn test_inventory_is_sorted_and_unique() {
    // Hold a listener so the inventory is not empty.
    let _listener = TcpListener::bind("127.0.0.1:0").expect("bind");

    let resolver = PortResolver::probe().await;
    let inventory = resolver.resolve().await;

    assert!(!inventory.is_empty());
    for pair in inventory.windows(2) {
        assert!(
            pair[0].port < pair[1].port,
            "ports must be strictly ascending: {} before {}",
            pair[0].port,
            pair[1].port
        );
    }
}

#[tokio::test]
async fn test_immediate_reresolution_agrees() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    let resolver = PortResolver::probe().await;
    let first = resolver.resolve().await;
    let second = resolver.resolve().await;

    // Our listener is stable across the two snapshots.
    assert_eq!(entry_for(&first, port), entry_for(&second, port));
    assert!(entry_for(&first, port).is_some());
}

#[tokio::test]
async fn test_closed_listener_absent_after_refresh() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    let resolver = PortResolver::probe().await;
    assert!(entry_for(&resolver.resolve().await, port).is_some());

    drop(listener);

    let refreshed = resolver.resolve().await;
    assert!(
        entry_for(&refreshed, port).is_none(),
        "port {} must disappear once the listener is closed",
        port
    );
}
