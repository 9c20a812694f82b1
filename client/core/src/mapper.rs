//! Coordinate Mapper
//!
//! Converts pointer positions on a rendered surface into grid cell
//! indices, given the surface size in device pixels and the logical
//! grid dimensions. Stateless beyond the current layout.

/// Floor of the smallest device-pixel cell edge we will draw.
/// Smaller grids get larger cells; cells never go sub-pixel.
pub const MIN_CELL_PIXELS: u32 = 2;

/// Pixel-space layout of a grid on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinateMapper {
    /// Edge of one rendered cell in device pixels
    pub cell_size: u32,
    /// Logical grid width in cells
    pub grid_width: u32,
    /// Logical grid height in cells
    pub grid_height: u32,
}

impl CoordinateMapper {
    /// Lay out a `grid_width`×`grid_height` grid on a surface of
    /// `surface_width`×`surface_height` device pixels.
    ///
    /// Cell size is the largest integer that fits both axes, floored,
    /// never below [`MIN_CELL_PIXELS`]. A surface too small for the
    /// grid still gets a valid (overflowing) layout; rendering clips.
    pub fn new(
        surface_width: u32,
        surface_height: u32,
        grid_width: u32,
        grid_height: u32,
    ) -> Self {
        let fit_w = if grid_width > 0 { surface_width / grid_width } else { 0 };
        let fit_h = if grid_height > 0 { surface_height / grid_height } else { 0 };
        Self {
            cell_size: fit_w.min(fit_h).max(MIN_CELL_PIXELS),
            grid_width,
            grid_height,
        }
    }

    /// Rendered grid extent in device pixels.
    pub fn pixel_extent(&self) -> (u32, u32) {
        (
            self.cell_size * self.grid_width,
            self.cell_size * self.grid_height,
        )
    }

    /// Grid cell under the pixel `(px, py)`, or `None` when the
    /// position falls outside the rendered grid.
    pub fn cell_at(&self, px: i64, py: i64) -> Option<(u32, u32)> {
        if px < 0 || py < 0 || self.cell_size == 0 {
            return None;
        }
        let x = (px as u64 / self.cell_size as u64) as u32;
        let y = (py as u64 / self.cell_size as u64) as u32;
        if x < self.grid_width && y < self.grid_height {
            Some((x, y))
        } else {
            None
        }
    }
}
