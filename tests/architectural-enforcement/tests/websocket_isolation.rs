//! Integration Test: WebSocket Isolation
//!
//! **Policy**: `tokio_tungstenite` is the transport module's private
//! concern. The sync engine and everything above it see connections
//! only as channels and `ConnectionId`s, which is what keeps the core
//! testable without a socket.

use architectural_enforcement::{files_mentioning, workspace_root};

#[test]
fn websocket_library_is_confined_to_the_transport_module() {
    let core = workspace_root().join("client/core/src");
    let offenders: Vec<_> = files_mentioning(&core, "tokio_tungstenite")
        .into_iter()
        .filter(|p| !p.ends_with("transport.rs"))
        .collect();
    assert!(
        offenders.is_empty(),
        "tokio_tungstenite used outside transport.rs: {offenders:?}"
    );
}
