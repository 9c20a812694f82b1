//! Frame and Overlay Snapshots
//!
//! The two grid-shaped datasets the engine pushes: the authoritative
//! activation [`Frame`] and the on-demand [`ConnectionOverlay`].
//! Both tolerate ragged data (a row shorter than the declared width,
//! or fewer rows than declared) — accessors return `None` instead of
//! indexing out of bounds, and renderers draw only what is present.

use crate::protocol::{PerfMetrics, Stats};

/// Distinguished weight marking the inspected cell itself in a
/// connection overlay (a self loop, not a real weight).
pub const SELF_WEIGHT: f32 = 999.0;

/// One authoritative snapshot of the simulation state.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Step counter at the time of this snapshot
    pub generation: u64,
    /// Row-major activation values; 0 = inactive, > 0 = intensity
    pub grid: Vec<Vec<f32>>,
    /// Scalar statistics
    pub stats: Stats,
    /// Timing for the batch that produced this frame, if measured
    pub perf: Option<PerfMetrics>,
    /// Parallel signed tension grid, if the experiment exposes one
    pub tension: Option<Vec<Vec<f32>>>,
}

impl Frame {
    /// Activation at `(x, y)`, or `None` if the frame has no data
    /// there (ragged row, missing row).
    pub fn value(&self, x: u32, y: u32) -> Option<f32> {
        self.grid.get(y as usize)?.get(x as usize).copied()
    }

    /// Tension at `(x, y)`, if a tension grid is present and covers
    /// that cell.
    pub fn tension_value(&self, x: u32, y: u32) -> Option<f32> {
        self.tension
            .as_ref()?
            .get(y as usize)?
            .get(x as usize)
            .copied()
    }

    /// Whether the tension grid exists and matches the given
    /// dimensions. Mismatched tension grids are not rendered.
    pub fn tension_matches(&self, width: u32, height: u32) -> bool {
        match &self.tension {
            Some(rows) => {
                rows.len() == height as usize
                    && rows.iter().all(|row| row.len() == width as usize)
            }
            None => false,
        }
    }
}

/// Signed connection weight of one cell toward the inspected cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Weight {
    /// No connection
    None,
    /// The inspected cell itself
    SelfLoop,
    /// Effective signed weight, clamped to `[-1, 1]` by the server
    Value(f32),
}

/// The per-cell connectivity snapshot returned by `inspect`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionOverlay {
    /// Coordinate the overlay was computed for
    pub x: u32,
    /// Coordinate the overlay was computed for
    pub y: u32,
    /// Incoming dendrite count
    pub total_dendrites: u32,
    /// Incoming synapse count
    pub total_synapses: u32,
    /// Effective weight from every cell; `None` = no connection
    pub weights: Vec<Vec<Option<f32>>>,
}

impl ConnectionOverlay {
    /// Classified weight at `(x, y)`.
    pub fn weight(&self, x: u32, y: u32) -> Weight {
        match self.weights.get(y as usize).and_then(|row| row.get(x as usize)) {
            Some(Some(w)) if *w == SELF_WEIGHT => Weight::SelfLoop,
            Some(Some(w)) => Weight::Value(*w),
            _ => Weight::None,
        }
    }

    /// Whether the overlay covers exactly `width`×`height` cells.
    /// Overlays that disagree with the active grid are discarded.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.weights.len() == height as usize
            && self.weights.iter().all(|row| row.len() == width as usize)
    }
}
