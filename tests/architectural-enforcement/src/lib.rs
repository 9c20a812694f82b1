//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce the layering
//! of the client:
//! - The WebSocket library is used by the transport module only
//! - The terminal surface never touches sockets, HTTP or raw JSON
//!
//! These tests are designed to catch violations early in the
//! development cycle. The source-scanning helpers live here; the
//! per-concern tests are under `tests/`.

use std::path::{Path, PathBuf};

/// Workspace root, resolved from this crate's manifest
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .expect("workspace root exists")
}

/// All Rust sources under `dir`, recursively
pub fn rust_sources(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Source files under `dir` whose text contains `needle`
pub fn files_mentioning(dir: &Path, needle: &str) -> Vec<PathBuf> {
    rust_sources(dir)
        .into_iter()
        .filter(|path| {
            std::fs::read_to_string(path)
                .map(|text| text.contains(needle))
                .unwrap_or(false)
        })
        .collect()
}
