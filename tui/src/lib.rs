//! NeuroFlow TUI - Terminal surface for the NeuroFlow client
//!
//! This crate provides a full-screen terminal viewer for a remote
//! NeuroFlow grid experiment: a half-block pixel canvas, an experiment
//! sidebar, and mouse painting over the live grid.
//!
//! # Architecture
//!
//! - **Compositor**: Four fixed panels stacked back to front, with mouse hit-testing
//! - **Grid view**: Blits the engine raster as `▀` half-block pixels
//! - **App**: Event loop wiring terminal events into `neuroflow_core`
//!
//! All protocol and lifecycle decisions live in `neuroflow_core`; this
//! crate only translates terminal events in and buffers out.

pub mod app;
pub mod compositor;
pub mod grid_view;
pub mod theme;

pub use app::App;
