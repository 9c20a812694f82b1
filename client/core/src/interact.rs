//! Interaction Layer
//!
//! Turns pointer gestures on the rendered surface into commands: a
//! drag becomes a de-duplicated stream of paint commands (one per new
//! cell entered, never per pixel of movement), and in inspect mode a
//! click becomes a single `inspect` query instead.

use crate::engine::SyncEngine;
use crate::mapper::CoordinateMapper;
use crate::protocol::Cell;

/// A pointer event in surface device-pixel coordinates.
///
/// `Release` carries no position: a pointer-up anywhere, including
/// outside the surface, ends the gesture.
#[derive(Clone, Copy, Debug)]
pub enum PointerEvent {
    /// Button pressed at a pixel position
    Press {
        /// Horizontal pixel offset into the surface
        px: i64,
        /// Vertical pixel offset into the surface
        py: i64,
    },
    /// Pointer moved while pressed
    Move {
        /// Horizontal pixel offset into the surface
        px: i64,
        /// Vertical pixel offset into the surface
        py: i64,
    },
    /// Button released
    Release,
}

/// Drag state for the paint gesture.
#[derive(Debug, Default)]
pub struct InteractionLayer {
    pressed: bool,
    /// Cell the last paint command was issued for, within the
    /// current gesture. Suppresses duplicate re-issue.
    last_cell: Option<(u32, u32)>,
}

impl InteractionLayer {
    /// A fresh layer with no gesture in progress
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one pointer event through the mapper into the engine.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        mapper: &CoordinateMapper,
        engine: &mut SyncEngine,
    ) {
        match event {
            PointerEvent::Press { px, py } => {
                let Some((x, y)) = mapper.cell_at(px, py) else {
                    return;
                };
                if engine.inspect_mode() {
                    // Inspect clicks never paint and never start a drag.
                    engine.inspect(x, y);
                    return;
                }
                self.pressed = true;
                self.last_cell = Some((x, y));
                Self::paint_at(x, y, engine);
            }
            PointerEvent::Move { px, py } => {
                if !self.pressed || engine.inspect_mode() {
                    return;
                }
                let Some(cell) = mapper.cell_at(px, py) else {
                    // Dragged off the grid; gesture stays alive.
                    return;
                };
                if self.last_cell == Some(cell) {
                    return;
                }
                self.last_cell = Some(cell);
                Self::paint_at(cell.0, cell.1, engine);
            }
            PointerEvent::Release => self.cancel(),
        }
    }

    /// Drop any in-progress gesture (pointer-up, disconnect).
    pub fn cancel(&mut self) {
        self.pressed = false;
        self.last_cell = None;
    }

    /// Whether a drag is in progress
    pub fn dragging(&self) -> bool {
        self.pressed
    }

    /// Issue one paint command for the brush footprint centered at
    /// `(x, y)`, pre-filtered to the grid bounds.
    fn paint_at(x: u32, y: u32, engine: &mut SyncEngine) {
        let (width, height) = engine.grid_dims();
        let value = engine.brush().mode.value();
        let cells: Vec<Cell> = engine
            .brush()
            .footprint()
            .into_iter()
            .filter_map(|(dx, dy)| {
                let cx = x as i64 + dx as i64;
                let cy = y as i64 + dy as i64;
                if (0..width as i64).contains(&cx) && (0..height as i64).contains(&cy) {
                    Some(Cell::new(cx as u32, cy as u32))
                } else {
                    None
                }
            })
            .collect();
        engine.paint(cells, value);
    }
}
