//! Sync Engine
//!
//! Owns the single logical connection to the remote simulation engine
//! and keeps the local view consistent with it: lifecycle state, the
//! last authoritative frame, the current connection overlay, and the
//! brush/inspect flags that gate user input.
//!
//! # Design Philosophy
//!
//! The engine is UI-agnostic and sans-IO. Outbound commands go into an
//! mpsc sender owned exclusively here (no other component may write to
//! the transport); inbound traffic arrives as [`EngineEvent`]s tagged
//! with the [`ConnectionId`] they belong to. Everything is driven from
//! one cooperative event loop, so there are no locks — but ordering
//! discipline matters:
//!
//! - Events from a connection that is no longer the current one are
//!   dropped, never applied. Successive connections get monotonic ids.
//! - `start`/`reconnect`/`reset` force `Initializing` immediately and
//!   only the next accepted frame clears it, which is what makes
//!   restart-during-play safe: frames tagged with a superseded
//!   experiment are dropped while the new build is in flight.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::brush::BrushState;
use crate::config::ExperimentConfig;
use crate::frame::{ConnectionOverlay, Frame};
use crate::protocol::{Cell, ClientCommand, ServerMessage, StatusState};

/// Monotonic identifier for one transport connection
///
/// A new id is minted per connection attempt; late events from a
/// superseded connection fail the identity check and are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Mint the next connection id
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn_{}", self.0)
    }
}

/// The client's belief about what the remote engine is doing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live transport
    #[default]
    Disconnected,
    /// Connected; experiment built (or none started yet) and idle
    Ready,
    /// A build request is in flight; controls must not look usable
    Initializing,
    /// Continuous stepping in progress
    Running,
    /// Continuous stepping stopped
    Paused,
    /// Experiment finished
    Complete,
}

impl ConnectionState {
    /// Human-readable description for status displays
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Ready => "Ready",
            Self::Initializing => "Building experiment...",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Complete => "Complete",
        }
    }

    /// Whether a transport is live
    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl From<StatusState> for ConnectionState {
    fn from(state: StatusState) -> Self {
        match state {
            StatusState::Running => Self::Running,
            StatusState::Paused => Self::Paused,
            StatusState::Ready => Self::Ready,
            StatusState::Complete => Self::Complete,
            StatusState::Initializing => Self::Initializing,
        }
    }
}

/// Inbound traffic, tagged with the connection it arrived on
#[derive(Debug)]
pub enum EngineEvent {
    /// Transport reported open
    Opened {
        /// Connection the event belongs to
        conn: ConnectionId,
    },
    /// One decoded server message
    Message {
        /// Connection the message arrived on
        conn: ConnectionId,
        /// The decoded payload
        msg: ServerMessage,
    },
    /// Transport closed (deliberate or failure)
    Closed {
        /// Connection that closed
        conn: ConnectionId,
    },
}

/// Sender half for outbound commands, owned by the engine
pub type CommandSender = mpsc::UnboundedSender<ClientCommand>;

/// The sync engine: lifecycle state machine plus last-known frames.
#[derive(Default)]
pub struct SyncEngine {
    state: ConnectionState,
    frame: Option<Frame>,
    overlay: Option<ConnectionOverlay>,
    active_experiment: Option<String>,
    grid_width: u32,
    grid_height: u32,
    brush: BrushState,
    inspect_mode: bool,
    conn: Option<(ConnectionId, CommandSender)>,
    last_error: Option<String>,
}

impl SyncEngine {
    /// A fresh engine with no transport
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================
    // Transport lifecycle
    // ========================================================

    /// Adopt a new transport connection, superseding any previous one.
    ///
    /// The previous sender is dropped, which closes its writer task;
    /// late events from it fail the [`ConnectionId`] check. That check
    /// also drops the old connection's `Closed`, so the old session is
    /// torn down here: frame and overlay do not carry over, and the
    /// new connection's `Opened` starts from `Ready`.
    pub fn attach(&mut self, conn: ConnectionId, sender: CommandSender) {
        if let Some((old, _)) = &self.conn {
            tracing::info!(%old, new = %conn, "superseding transport connection");
            self.disconnect();
        }
        self.conn = Some((conn, sender));
    }

    /// Apply one inbound event. Returns `false` when the event was
    /// stale (wrong connection) or otherwise not applied.
    pub fn handle_event(&mut self, event: EngineEvent) -> bool {
        match event {
            EngineEvent::Opened { conn } => {
                if !self.is_current(conn) {
                    return false;
                }
                tracing::info!(%conn, "transport open");
                if self.state == ConnectionState::Disconnected {
                    self.state = ConnectionState::Ready;
                }
                true
            }
            EngineEvent::Message { conn, msg } => {
                if !self.is_current(conn) {
                    tracing::debug!(%conn, "dropping message from stale connection");
                    return false;
                }
                self.apply_message(msg)
            }
            EngineEvent::Closed { conn } => {
                if !self.is_current(conn) {
                    return false;
                }
                tracing::info!(%conn, "transport closed");
                self.disconnect();
                true
            }
        }
    }

    fn is_current(&self, conn: ConnectionId) -> bool {
        matches!(&self.conn, Some((current, _)) if *current == conn)
    }

    /// Force the disconnected state, revoking all affordances.
    /// Frame and overlay do not survive a full disconnect.
    fn disconnect(&mut self) {
        self.conn = None;
        self.state = ConnectionState::Disconnected;
        self.frame = None;
        self.overlay = None;
        self.inspect_mode = false;
    }

    fn apply_message(&mut self, msg: ServerMessage) -> bool {
        match msg {
            ServerMessage::Frame {
                generation,
                grid,
                stats,
                perf,
                tension_grid,
                experiment,
            } => {
                // A frame tagged with a superseded experiment belongs
                // to a build we already abandoned.
                if let (Some(tag), Some(active)) = (&experiment, &self.active_experiment) {
                    if tag != active {
                        tracing::debug!(
                            tag, active, generation,
                            "dropping frame from superseded experiment"
                        );
                        return false;
                    }
                }
                self.frame = Some(Frame {
                    generation,
                    grid,
                    stats,
                    perf,
                    tension: tension_grid,
                });
                // The new frame supersedes any overlay on screen.
                self.overlay = None;
                if self.state == ConnectionState::Initializing {
                    self.state = ConnectionState::Ready;
                }
                true
            }
            ServerMessage::Status { state } => {
                let next = ConnectionState::from(state);
                if next != self.state {
                    tracing::debug!(from = ?self.state, to = ?next, "lifecycle change");
                }
                self.state = next;
                true
            }
            ServerMessage::Connections {
                x,
                y,
                total_dendrites,
                total_synapses,
                weight_grid,
            } => {
                let overlay = ConnectionOverlay {
                    x,
                    y,
                    total_dendrites,
                    total_synapses,
                    weights: weight_grid,
                };
                if !overlay.matches(self.grid_width, self.grid_height) {
                    tracing::warn!(
                        x, y,
                        grid_width = self.grid_width,
                        grid_height = self.grid_height,
                        "discarding overlay with mismatched dimensions"
                    );
                    return false;
                }
                self.overlay = Some(overlay);
                true
            }
            ServerMessage::Error { message } => {
                // Non-fatal: surfaced for display, lifecycle untouched.
                tracing::warn!(message, "server error");
                self.last_error = Some(message);
                true
            }
        }
    }

    // ========================================================
    // Commands (all no-ops without a live transport)
    // ========================================================

    /// Build a fresh instance of `experiment` and make it active.
    ///
    /// Legal while another experiment is running: local state is
    /// forced to `Initializing` immediately and frames from the old
    /// build are suppressed until the new build's first frame lands.
    pub fn start(&mut self, experiment: &str, config: ExperimentConfig) {
        if self.conn.is_none() {
            return;
        }
        self.active_experiment = Some(experiment.to_string());
        self.begin_build(&config);
        self.send(ClientCommand::Start {
            experiment: experiment.to_string(),
            config,
        });
    }

    /// Rebuild the active experiment with a new configuration,
    /// keeping the experiment selection. No-op when nothing is active.
    pub fn reconnect(&mut self, config: ExperimentConfig) {
        if self.conn.is_none() || self.active_experiment.is_none() {
            return;
        }
        self.begin_build(&config);
        self.send(ClientCommand::Reconnect { config });
    }

    fn begin_build(&mut self, config: &ExperimentConfig) {
        (self.grid_width, self.grid_height) = config.dims();
        self.state = ConnectionState::Initializing;
        self.overlay = None;
    }

    /// Advance `count` steps synchronously (server-side).
    pub fn step(&mut self, count: u32) {
        self.send(ClientCommand::Step {
            count: count.max(1),
        });
    }

    /// Request continuous stepping. Local state is not changed
    /// optimistically; `Running` is reflected only once the server
    /// confirms it with a status message.
    pub fn play(&mut self, fps: u32, steps_per_tick: u32) {
        self.send(ClientCommand::Play {
            fps,
            steps_per_tick: steps_per_tick.max(1),
        });
    }

    /// Request continuous stepping stop.
    pub fn pause(&mut self) {
        self.send(ClientCommand::Pause);
    }

    /// Rebuild the active experiment from scratch at its last-known
    /// configuration.
    pub fn reset(&mut self) {
        if self.conn.is_none() {
            return;
        }
        self.state = ConnectionState::Initializing;
        self.overlay = None;
        self.send(ClientCommand::Reset);
    }

    /// Force-set a batch of cells. Never changes lifecycle state.
    /// Callers pre-filter to grid bounds; empty batches are dropped.
    pub fn paint(&mut self, cells: Vec<Cell>, value: f32) {
        if cells.is_empty() {
            return;
        }
        self.send(ClientCommand::Paint { cells, value });
    }

    /// Request the connection overlay for one cell.
    pub fn inspect(&mut self, x: u32, y: u32) {
        self.send(ClientCommand::Inspect { x, y });
    }

    fn send(&mut self, command: ClientCommand) {
        let Some((conn, sender)) = &self.conn else {
            return;
        };
        tracing::debug!(%conn, ?command, "sending command");
        if sender.send(command).is_err() {
            // Writer task is gone; the Closed event is on its way.
            tracing::warn!(%conn, "command channel closed");
        }
    }

    // ========================================================
    // Local flags
    // ========================================================

    /// Enter or leave inspect mode. Leaving dismisses the overlay and
    /// restores plain rendering.
    pub fn set_inspect_mode(&mut self, on: bool) {
        self.inspect_mode = on;
        if !on {
            self.overlay = None;
        }
    }

    /// Flip inspect mode.
    pub fn toggle_inspect_mode(&mut self) {
        self.set_inspect_mode(!self.inspect_mode);
    }

    /// Whether clicks currently inspect instead of paint
    pub fn inspect_mode(&self) -> bool {
        self.inspect_mode
    }

    /// Current brush selection
    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    /// Mutable brush selection (size stepping, mode toggle)
    pub fn brush_mut(&mut self) -> &mut BrushState {
        &mut self.brush
    }

    // ========================================================
    // Accessors
    // ========================================================

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Last authoritative frame, if any
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Current connection overlay, if one is displayed
    pub fn overlay(&self) -> Option<&ConnectionOverlay> {
        self.overlay.as_ref()
    }

    /// Id of the experiment considered active
    pub fn active_experiment(&self) -> Option<&str> {
        self.active_experiment.as_deref()
    }

    /// Grid dimensions of the active experiment's configuration
    pub fn grid_dims(&self) -> (u32, u32) {
        (self.grid_width, self.grid_height)
    }

    /// Take the most recent server error for display, clearing it
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }
}
