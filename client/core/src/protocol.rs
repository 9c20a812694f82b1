//! Wire Protocol
//!
//! The message vocabulary spoken between this client and the remote
//! simulation engine, over a persistent WebSocket carrying JSON text
//! frames. Outbound commands are tagged by `action`, inbound messages
//! by `type`. Both sides are closed unions: a payload with an unknown
//! tag decodes to a [`ProtocolError`] and is surfaced as a recoverable
//! error event, never applied to state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ExperimentConfig;

/// A single grid coordinate carried in paint commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Column, `0..width`
    pub x: u32,
    /// Row, `0..height`
    pub y: u32,
}

impl Cell {
    /// Create a cell coordinate
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Commands from client to simulation engine
///
/// Every user-visible affordance reduces to exactly one of these. The
/// engine replies asynchronously through [`ServerMessage`]s; commands
/// never have a return value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Build a fresh experiment instance and make it the active one
    Start {
        /// Experiment id, e.g. `"von_neumann"`
        experiment: String,
        /// Grid dimensions and experiment parameters
        config: ExperimentConfig,
    },

    /// Rebuild the currently active experiment with new parameters
    ///
    /// Used when a configuration-only change (connectivity mask,
    /// balance) requires rebuilding server state without changing
    /// which experiment is selected.
    Reconnect {
        /// Grid dimensions and experiment parameters
        config: ExperimentConfig,
    },

    /// Advance the simulation by `count` discrete steps
    Step {
        /// Number of steps, at least 1
        count: u32,
    },

    /// Start continuous stepping
    Play {
        /// Target frames per second (server may cap)
        fps: u32,
        /// Steps computed per frame tick
        steps_per_tick: u32,
    },

    /// Stop continuous stepping
    Pause,

    /// Rebuild the active experiment at its last-known configuration
    Reset,

    /// Force-set a batch of cells to `value`
    ///
    /// Cells are pre-filtered to grid bounds client-side; the server
    /// silently accepts out-of-range coordinates.
    Paint {
        /// Cells to write
        cells: Vec<Cell>,
        /// 1.0 = fully active, 0.0 = fully inactive
        value: f32,
    },

    /// Request the connection-weight overlay for one cell
    Inspect {
        /// Column of the inspected cell
        x: u32,
        /// Row of the inspected cell
        y: u32,
    },
}

/// Lifecycle states the server reports in `status` messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    /// Continuous stepping in progress
    Running,
    /// Continuous stepping stopped, experiment live
    Paused,
    /// Experiment built and idle
    Ready,
    /// Experiment finished (e.g. automaton reached its last row)
    Complete,
    /// Experiment instance is being built
    Initializing,
}

/// Per-frame scalar statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of cells with value > 0
    pub active_cells: u64,
    /// Steps computed so far
    #[serde(default)]
    pub steps: u64,
    /// Total steps for bounded experiments, if known
    #[serde(default)]
    pub total_steps: Option<u64>,
}

/// Timing metrics for the last step batch
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerfMetrics {
    /// Steps in the measured batch
    pub steps: u32,
    /// Wall time for the batch
    pub elapsed_ms: f64,
    /// Throughput
    pub steps_per_second: f64,
}

/// Messages from simulation engine to client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Authoritative snapshot of the activation grid
    ///
    /// Pushed after every command that mutates state and periodically
    /// while running. Replaces the previous frame atomically.
    Frame {
        /// Monotonic step counter for the active experiment
        generation: u64,
        /// Row-major cell values, 0 = inactive, > 0 = active intensity
        grid: Vec<Vec<f32>>,
        /// Scalar statistics for this snapshot
        stats: Stats,
        /// Timing for the step batch that produced this frame
        #[serde(default, skip_serializing_if = "Option::is_none")]
        perf: Option<PerfMetrics>,
        /// Parallel signed per-cell tension grid, same dimensions
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tension_grid: Option<Vec<Vec<f32>>>,
        /// Id of the experiment this frame belongs to
        ///
        /// Lets the client drop frames from a superseded build when a
        /// new `start` raced an in-flight play loop. Untagged frames
        /// are trusted on the strength of connection ordering.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        experiment: Option<String>,
    },

    /// Lifecycle acknowledgment, decoupled from frame delivery
    Status {
        /// New lifecycle state
        state: StatusState,
    },

    /// Response to an `inspect` command
    Connections {
        /// Column of the inspected cell
        x: u32,
        /// Row of the inspected cell
        y: u32,
        /// Incoming dendrite count of the inspected cell
        total_dendrites: u32,
        /// Incoming synapse count of the inspected cell
        total_synapses: u32,
        /// Effective weight from every cell to the inspected one;
        /// `None` = no connection, 999 marks the inspected cell itself
        weight_grid: Vec<Vec<Option<f32>>>,
    },

    /// Non-fatal server-side error; logged and displayed, never
    /// changes lifecycle state
    Error {
        /// Human-readable description
        message: String,
    },
}

/// Wire decode/encode failures
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Payload was not valid JSON, or its tag is not part of the
    /// closed union
    #[error("malformed server message: {0}")]
    Decode(#[source] serde_json::Error),

    /// Outbound command could not be serialized (should not happen
    /// for well-formed commands)
    #[error("failed to encode command: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Decode one inbound text frame.
pub fn decode(text: &str) -> Result<ServerMessage, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

/// Encode one outbound command as a text frame.
pub fn encode(command: &ClientCommand) -> Result<String, ProtocolError> {
    serde_json::to_string(command).map_err(ProtocolError::Encode)
}
