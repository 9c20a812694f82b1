//! Grid View
//!
//! Blits the engine's pixel raster into a terminal buffer using the
//! upper-half-block glyph: one terminal cell shows two vertically
//! stacked pixels (foreground on top, background below). That doubles
//! the vertical resolution and keeps grid cells close to square in
//! typical terminal fonts.
//!
//! The same 1 column × 2 rows mapping converts mouse positions back
//! into raster pixels for the paint gesture.

use neuroflow_core::{Raster, Rgb};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::theme::pixel_color;

/// Upper half block: foreground paints the top pixel, background the
/// bottom one.
const HALF_BLOCK: &str = "▀";

/// Pixels a terminal area can display: one per column, two per row.
pub fn surface_pixels(area: Rect) -> (u32, u32) {
    (area.width as u32, area.height as u32 * 2)
}

/// Raster pixel under a terminal cell, relative to the same origin.
///
/// A terminal row covers two pixel rows; the top one is reported.
/// Coordinates are signed so callers can pass positions left or above
/// the canvas and get a miss from the mapper instead of a wrap.
pub fn pixel_at(col: i32, row: i32) -> (i64, i64) {
    (col as i64, row as i64 * 2)
}

/// Blit a raster into the buffer, top-left aligned.
///
/// Pixels outside the raster stay untouched, which leaves them
/// transparent to the compositor.
pub fn blit(buf: &mut Buffer, raster: &Raster) {
    let area = buf.area;
    for ty in 0..area.height {
        for tx in 0..area.width {
            let top = raster.get(tx as u32, ty as u32 * 2);
            let bottom = raster.get(tx as u32, ty as u32 * 2 + 1);
            let Some(top) = top else {
                continue;
            };
            // Rasters always have even coverage per cell pair except
            // at the bottom edge; pad the dangling row with black.
            let bottom = bottom.unwrap_or(Rgb::new(0, 0, 0));

            if let Some(cell) = buf.cell_mut((tx, ty)) {
                cell.set_symbol(HALF_BLOCK);
                cell.set_fg(pixel_color(top));
                cell.set_bg(pixel_color(bottom));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::style::Color;

    #[test]
    fn one_terminal_cell_covers_two_pixel_rows() {
        let mut raster = Raster::filled(2, 4, Rgb::new(10, 10, 10));
        raster.fill_rect(0, 0, 2, 1, Rgb::new(255, 255, 255));

        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 2));
        blit(&mut buf, &raster);

        let cell = &buf.content[buf.index_of(0, 0)];
        assert_eq!(cell.symbol(), HALF_BLOCK);
        assert_eq!(cell.fg, Color::Rgb(255, 255, 255));
        assert_eq!(cell.bg, Color::Rgb(10, 10, 10));
    }

    #[test]
    fn cells_beyond_the_raster_stay_transparent() {
        let raster = Raster::filled(2, 2, Rgb::new(10, 10, 10));
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 3));
        blit(&mut buf, &raster);

        let outside = &buf.content[buf.index_of(4, 2)];
        assert_eq!(outside.symbol(), " ");
    }

    #[test]
    fn mouse_rows_map_to_top_pixel_of_the_pair() {
        assert_eq!(pixel_at(3, 0), (3, 0));
        assert_eq!(pixel_at(3, 1), (3, 2));
        assert_eq!(pixel_at(0, 7), (0, 14));
    }
}
