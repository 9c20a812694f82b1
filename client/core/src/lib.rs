//! NeuroFlow Core - Headless Client for Remote Grid Experiments
//!
//! This crate keeps a locally-consistent view of a simulation that
//! only a remote engine can authoritatively advance, completely
//! independent of any UI framework. It can drive a TUI, a native GUI,
//! or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! pointer/keys          ┌──────────────────┐   ws text frames
//!   ──────────────────▶ │ InteractionLayer │ ◀────────────────┐
//!                       └────────┬─────────┘                  │
//!        CoordinateMapper        │ commands                   │
//!        BrushState              ▼                            │
//!                       ┌──────────────────┐   ClientCommand  │
//!                       │    SyncEngine    │ ────────────────▶│ transport
//!                       │  (state machine) │ ◀──────────────  │  tasks
//!                       └────────┬─────────┘   EngineEvent    │
//!                                │ Frame / overlay            │
//!                                ▼                            │
//!                       ┌──────────────────┐                  │
//!                       │  render::render  │ ─▶ RGB raster ─▶ surface
//!                       └──────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`SyncEngine`]: owns the single logical connection and the
//!   lifecycle state machine
//! - [`ClientCommand`] / [`ServerMessage`]: the closed wire vocabulary
//! - [`Frame`] / [`ConnectionOverlay`]: the two grid-shaped snapshots
//! - [`InteractionLayer`]: drag gestures → de-duplicated paint stream
//! - [`render::render`]: pure scene → raster compositing

pub mod brush;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod frame;
pub mod interact;
pub mod mapper;
pub mod protocol;
pub mod render;
pub mod transport;

pub use brush::{BrushMode, BrushShape, BrushState};
pub use catalog::{default_experiments, fetch_experiments, ExperimentInfo};
pub use config::{ClientConfig, ExperimentConfig};
pub use engine::{ConnectionId, ConnectionState, EngineEvent, SyncEngine};
pub use frame::{ConnectionOverlay, Frame, Weight, SELF_WEIGHT};
pub use interact::{InteractionLayer, PointerEvent};
pub use mapper::CoordinateMapper;
pub use protocol::{Cell, ClientCommand, ProtocolError, ServerMessage, StatusState};
pub use render::{render, IoRows, Raster, Rgb, Scene};
pub use transport::{connect, Connection, TransportError};
