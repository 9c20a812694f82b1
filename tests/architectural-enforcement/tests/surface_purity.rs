//! Integration Test: Surface Purity
//!
//! **Policy**: The terminal surface is a thin display client. All
//! network traffic and wire decoding happen in `neuroflow_core`; the
//! surface translates terminal events in and buffers out, nothing
//! else.

use architectural_enforcement::{files_mentioning, workspace_root};

#[test]
fn surface_crate_never_touches_sockets_or_http() {
    let tui = workspace_root().join("tui/src");
    for needle in ["tungstenite", "reqwest", "TcpStream"] {
        let offenders = files_mentioning(&tui, needle);
        assert!(
            offenders.is_empty(),
            "surface code references {needle}: {offenders:?}"
        );
    }
}

#[test]
fn surface_crate_never_parses_wire_json() {
    // Decoding lives behind neuroflow_core::protocol; a surface that
    // parses JSON itself is bypassing the sync engine.
    let tui = workspace_root().join("tui/src");
    let offenders = files_mentioning(&tui, "serde_json");
    assert!(
        offenders.is_empty(),
        "surface code parses JSON directly: {offenders:?}"
    );
}
