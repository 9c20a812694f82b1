//! Brush Geometry
//!
//! Pure footprint math for the paint tool: which grid offsets a
//! gesture touches, before any bounds filtering. Sizes are odd so the
//! footprint stays symmetric around the pressed cell.

/// Smallest square brush size
pub const MIN_SIZE: u32 = 1;
/// Largest square brush size
pub const MAX_SIZE: u32 = 15;

/// What a paint command writes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrushMode {
    /// Write fully active (1.0)
    #[default]
    Activate,
    /// Write fully inactive (0.0)
    Deactivate,
}

impl BrushMode {
    /// Value written through paint commands in this mode
    pub fn value(self) -> f32 {
        match self {
            Self::Activate => 1.0,
            Self::Deactivate => 0.0,
        }
    }

    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::Activate => Self::Deactivate,
            Self::Deactivate => Self::Activate,
        }
    }
}

/// Footprint shape
///
/// `Square` is sized through [`grow`]/[`shrink`]; the named shapes are
/// fixed footprints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrushShape {
    /// `size`×`size` square
    #[default]
    Square,
    /// 5-wide plus sign
    Cross,
    /// Radius-2 diamond
    Diamond,
}

/// Full square of `size²` offsets for an odd `size`.
///
/// Offsets run `(dx, dy)` with both in `[-size/2, size/2]`, row by
/// row, so `(0, 0)` is always included.
pub fn generate_offsets(size: u32) -> Vec<(i32, i32)> {
    let half = (size / 2) as i32;
    let mut offsets = Vec::with_capacity((size * size) as usize);
    for dy in -half..=half {
        for dx in -half..=half {
            offsets.push((dx, dy));
        }
    }
    offsets
}

/// Next size up, clamped at [`MAX_SIZE`]. Identity at the bound.
pub fn grow(size: u32) -> u32 {
    (size + 2).min(MAX_SIZE)
}

/// Next size down, clamped at [`MIN_SIZE`]. Identity at the bound.
pub fn shrink(size: u32) -> u32 {
    size.saturating_sub(2).max(MIN_SIZE)
}

/// Current brush selection: shape, square size, and paint mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrushState {
    /// Selected footprint shape
    pub shape: BrushShape,
    /// Square brush size, odd, in `[MIN_SIZE, MAX_SIZE]`
    pub size: u32,
    /// Value written by paint commands
    pub mode: BrushMode,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            shape: BrushShape::Square,
            size: MIN_SIZE,
            mode: BrushMode::Activate,
        }
    }
}

impl BrushState {
    /// Footprint offsets for the current shape.
    pub fn footprint(&self) -> Vec<(i32, i32)> {
        match self.shape {
            BrushShape::Square => generate_offsets(self.size),
            BrushShape::Cross => vec![
                (0, -2),
                (0, -1),
                (-2, 0),
                (-1, 0),
                (0, 0),
                (1, 0),
                (2, 0),
                (0, 1),
                (0, 2),
            ],
            BrushShape::Diamond => vec![
                (0, -2),
                (-1, -1),
                (0, -1),
                (1, -1),
                (-2, 0),
                (-1, 0),
                (0, 0),
                (1, 0),
                (2, 0),
                (-1, 1),
                (0, 1),
                (1, 1),
                (0, 2),
            ],
        }
    }

    /// Step the square size up. Named shapes keep their footprint.
    pub fn grow(&mut self) {
        self.size = grow(self.size);
    }

    /// Step the square size down.
    pub fn shrink(&mut self) {
        self.size = shrink(self.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_offsets_count_and_symmetry() {
        for size in (1..=15).step_by(2) {
            let offsets = generate_offsets(size);
            assert_eq!(offsets.len(), (size * size) as usize);
            assert!(offsets.contains(&(0, 0)));
            for &(dx, dy) in &offsets {
                assert!(offsets.contains(&(-dx, -dy)), "asymmetric at {size}");
            }
        }
    }

    #[test]
    fn grow_and_shrink_stay_in_bounds() {
        assert_eq!(grow(15), 15);
        assert_eq!(shrink(1), 1);

        let mut size = 1;
        for _ in 0..20 {
            size = grow(size);
            assert!(size % 2 == 1 && (1..=15).contains(&size));
        }
        assert_eq!(size, 15);
        for _ in 0..20 {
            size = shrink(size);
            assert!(size % 2 == 1 && (1..=15).contains(&size));
        }
        assert_eq!(size, 1);
    }

    #[test]
    fn cross_and_diamond_include_center() {
        for shape in [BrushShape::Cross, BrushShape::Diamond] {
            let state = BrushState {
                shape,
                ..BrushState::default()
            };
            assert!(state.footprint().contains(&(0, 0)));
        }
    }

    #[test]
    fn diamond_is_radius_two_by_manhattan_distance() {
        let state = BrushState {
            shape: BrushShape::Diamond,
            ..BrushState::default()
        };
        for (dx, dy) in state.footprint() {
            assert!(dx.abs() + dy.abs() <= 2);
        }
        assert_eq!(state.footprint().len(), 13);
    }

    #[test]
    fn mode_values() {
        assert_eq!(BrushMode::Activate.value(), 1.0);
        assert_eq!(BrushMode::Deactivate.value(), 0.0);
        assert_eq!(BrushMode::Activate.toggled(), BrushMode::Deactivate);
    }
}
