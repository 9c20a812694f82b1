//! Rendering / Compositing Engine
//!
//! Deterministic mapping from the current scene (activation frame,
//! optional tension mode, optional connection overlay) to an RGB
//! raster. Pure: same inputs, same pixels, no state across redraws.
//! Surfaces blit the raster however they like (the TUI uses half-block
//! glyphs).

use crate::frame::{ConnectionOverlay, Frame, Weight};
use crate::mapper::CoordinateMapper;

/// One device pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Build a pixel from channel values
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// Base activation palette
const BACKGROUND: Rgb = Rgb::new(10, 10, 10);
const INACTIVE: Rgb = Rgb::new(10, 10, 10);
const ACTIVE: Rgb = Rgb::new(255, 255, 255);
const INPUT_INACTIVE: Rgb = Rgb::new(13, 27, 42);
const INPUT_ACTIVE: Rgb = Rgb::new(76, 201, 240);
const OUTPUT_INACTIVE: Rgb = Rgb::new(26, 10, 10);
const OUTPUT_ACTIVE: Rgb = Rgb::new(247, 37, 133);

// Diverging tension palette
const TENSION_NEUTRAL: Rgb = Rgb::new(16, 16, 24);
const TENSION_WARM: Rgb = Rgb::new(255, 120, 40);
const TENSION_COOL: Rgb = Rgb::new(80, 140, 255);

// Connection overlay palette
const WEIGHT_NONE: Rgb = Rgb::new(17, 17, 17);
const WEIGHT_SELF: Rgb = Rgb::new(255, 215, 0);
const INSPECT_OUTLINE: Rgb = Rgb::new(255, 255, 255);

/// Overlay blend factor over the base layer
const OVERLAY_ALPHA: f32 = 0.65;

/// A rendered pixel grid, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    /// Width in device pixels
    pub width: u32,
    /// Height in device pixels
    pub height: u32,
    pixels: Vec<Rgb>,
}

impl Raster {
    /// A raster filled with one color
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the raster
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    fn set(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    /// Fill a rectangle, clipped to the raster
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
        for py in y..y.saturating_add(h).min(self.height) {
            for px in x..x.saturating_add(w).min(self.width) {
                self.set(px, py, color);
            }
        }
    }

    fn blend_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb, alpha: f32) {
        for py in y..y.saturating_add(h).min(self.height) {
            for px in x..x.saturating_add(w).min(self.width) {
                if let Some(base) = self.get(px, py) {
                    self.set(px, py, blend(base, color, alpha));
                }
            }
        }
    }
}

fn blend(base: Rgb, over: Rgb, alpha: f32) -> Rgb {
    let mix = |b: u8, o: u8| -> u8 {
        (f32::from(b) * (1.0 - alpha) + f32::from(o) * alpha).round() as u8
    };
    Rgb::new(mix(base.r, over.r), mix(base.g, over.g), mix(base.b, over.b))
}

/// Linear interpolation toward `to`, `t` in `[0, 1]`.
fn lerp(from: Rgb, to: Rgb, t: f32) -> Rgb {
    blend(from, to, t.clamp(0.0, 1.0))
}

/// Designated input/output rows for experiments that have them
/// (elementary automata feed the bottom row, read the top row).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IoRows {
    /// Row painted with the input palette
    pub input: u32,
    /// Row painted with the output palette
    pub output: u32,
}

impl IoRows {
    /// Conventional placement: input at the bottom row, output at the
    /// top row.
    pub fn conventional(height: u32) -> Self {
        Self {
            input: height.saturating_sub(1),
            output: 0,
        }
    }
}

/// Everything the compositor needs for one redraw.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    /// Last authoritative frame, if any
    pub frame: Option<&'a Frame>,
    /// Connection overlay to composite, with its inspected cell
    pub overlay: Option<&'a ConnectionOverlay>,
    /// Declared grid width of the active experiment
    pub grid_width: u32,
    /// Declared grid height of the active experiment
    pub grid_height: u32,
    /// Input/output rows, when the experiment designates them
    pub io_rows: Option<IoRows>,
    /// Render the tension palette instead of activation
    pub tension_mode: bool,
}

/// Render one scene onto a surface of the given device-pixel size.
///
/// The raster covers the full grid extent (cells are never sub-pixel,
/// so a small surface can be overflowed; surfaces clip when blitting).
/// Ragged frames render only the cells that carry data.
pub fn render(scene: &Scene<'_>, surface_width: u32, surface_height: u32) -> Raster {
    let mapper = CoordinateMapper::new(
        surface_width,
        surface_height,
        scene.grid_width,
        scene.grid_height,
    );
    let (extent_w, extent_h) = mapper.pixel_extent();
    let mut raster = Raster::filled(extent_w.max(1), extent_h.max(1), BACKGROUND);

    let Some(frame) = scene.frame else {
        return raster;
    };

    let cell = mapper.cell_size;
    // 1-pixel grid line between cells, kept as long as cells have room
    let inset = (cell - 1).max(1);
    let tension_on =
        scene.tension_mode && frame.tension_matches(scene.grid_width, scene.grid_height);

    for y in 0..scene.grid_height {
        for x in 0..scene.grid_width {
            // Missing cells (ragged row / short frame) are not drawn.
            let Some(value) = frame.value(x, y) else {
                continue;
            };
            let color = if tension_on {
                // value() returned data, so the matching tension grid
                // covers this cell too
                tension_color(frame.tension_value(x, y).unwrap_or(0.0))
            } else {
                activation_color(value, y, scene.io_rows)
            };
            raster.fill_rect(x * cell, y * cell, inset, inset, color);
        }
    }

    if let Some(overlay) = scene.overlay {
        composite_overlay(&mut raster, overlay, scene, cell, inset);
    }

    raster
}

fn activation_color(value: f32, row: u32, io_rows: Option<IoRows>) -> Rgb {
    let active = value > 0.0;
    match io_rows {
        Some(io) if row == io.input => {
            if active {
                INPUT_ACTIVE
            } else {
                INPUT_INACTIVE
            }
        }
        Some(io) if row == io.output => {
            if active {
                OUTPUT_ACTIVE
            } else {
                OUTPUT_INACTIVE
            }
        }
        _ => {
            if active {
                ACTIVE
            } else {
                INACTIVE
            }
        }
    }
}

/// Diverging tension map: warm for positive, cool for negative,
/// neutral at zero, magnitude capped at 1.0, symmetric.
fn tension_color(t: f32) -> Rgb {
    let magnitude = t.abs().min(1.0);
    if t > 0.0 {
        lerp(TENSION_NEUTRAL, TENSION_WARM, magnitude)
    } else if t < 0.0 {
        lerp(TENSION_NEUTRAL, TENSION_COOL, magnitude)
    } else {
        TENSION_NEUTRAL
    }
}

/// Signed weight → overlay color: green for excitatory, violet for
/// inhibitory, black at zero, fixed highlight for the self loop,
/// dark gray where no connection exists.
fn weight_color(weight: Weight) -> Rgb {
    match weight {
        Weight::None => WEIGHT_NONE,
        Weight::SelfLoop => WEIGHT_SELF,
        Weight::Value(w) => {
            let magnitude = w.abs().min(1.0);
            if w > 0.0 {
                Rgb::new(0, (255.0 * magnitude) as u8, 0)
            } else if w < 0.0 {
                Rgb::new((139.0 * magnitude) as u8, 0, (255.0 * magnitude) as u8)
            } else {
                Rgb::new(0, 0, 0)
            }
        }
    }
}

fn composite_overlay(
    raster: &mut Raster,
    overlay: &ConnectionOverlay,
    scene: &Scene<'_>,
    cell: u32,
    inset: u32,
) {
    for y in 0..scene.grid_height {
        for x in 0..scene.grid_width {
            let color = weight_color(overlay.weight(x, y));
            raster.blend_rect(x * cell, y * cell, inset, inset, color, OVERLAY_ALPHA);
        }
    }

    // Inspected cell gets a full-opacity outline on top of the blend.
    let (ox, oy) = (overlay.x * cell, overlay.y * cell);
    for px in 0..inset {
        raster.set(ox + px, oy, INSPECT_OUTLINE);
        raster.set(ox + px, oy + inset - 1, INSPECT_OUTLINE);
    }
    for py in 0..inset {
        raster.set(ox, oy + py, INSPECT_OUTLINE);
        raster.set(ox + inset - 1, oy + py, INSPECT_OUTLINE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SELF_WEIGHT;
    use crate::protocol::Stats;

    fn frame(grid: Vec<Vec<f32>>) -> Frame {
        Frame {
            generation: 0,
            grid,
            stats: Stats::default(),
            perf: None,
            tension: None,
        }
    }

    fn scene<'a>(frame: Option<&'a Frame>, w: u32, h: u32) -> Scene<'a> {
        Scene {
            frame,
            overlay: None,
            grid_width: w,
            grid_height: h,
            io_rows: None,
            tension_mode: false,
        }
    }

    #[test]
    fn empty_scene_renders_background() {
        let raster = render(&scene(None, 10, 10), 100, 100);
        assert_eq!(raster.get(0, 0), Some(BACKGROUND));
        assert_eq!((raster.width, raster.height), (100, 100));
    }

    #[test]
    fn active_and_inactive_cells_differ() {
        let mut grid = vec![vec![0.0; 4]; 4];
        grid[1][2] = 1.0;
        let f = frame(grid);
        let raster = render(&scene(Some(&f), 4, 4), 40, 40);
        // cell size 10, inset 9; sample interior pixels
        assert_eq!(raster.get(24, 14), Some(ACTIVE));
        assert_eq!(raster.get(4, 4), Some(INACTIVE));
    }

    #[test]
    fn io_rows_use_their_own_palette() {
        let mut grid = vec![vec![0.0; 3]; 3];
        grid[0][0] = 1.0;
        grid[2][0] = 1.0;
        let f = frame(grid);
        let mut sc = scene(Some(&f), 3, 3);
        sc.io_rows = Some(IoRows::conventional(3));
        let raster = render(&sc, 30, 30);
        assert_eq!(raster.get(4, 4), Some(OUTPUT_ACTIVE)); // top row
        assert_eq!(raster.get(4, 24), Some(INPUT_ACTIVE)); // bottom row
        assert_eq!(raster.get(14, 14), Some(INACTIVE)); // middle
    }

    #[test]
    fn ragged_frame_renders_without_panicking() {
        // Declared 4x4, but one short row and one missing row.
        let f = frame(vec![vec![1.0, 1.0, 1.0, 1.0], vec![1.0], vec![1.0; 4]]);
        let raster = render(&scene(Some(&f), 4, 4), 40, 40);
        assert_eq!(raster.get(4, 4), Some(ACTIVE));
        // Missing cells stay background.
        assert_eq!(raster.get(14, 14), Some(BACKGROUND));
        assert_eq!(raster.get(4, 34), Some(BACKGROUND));
    }

    #[test]
    fn tension_mode_needs_a_matching_tension_grid() {
        let mut f = frame(vec![vec![1.0; 2]; 2]);
        {
            // No tension grid: falls back to the activation palette.
            let mut sc = scene(Some(&f), 2, 2);
            sc.tension_mode = true;
            let raster = render(&sc, 20, 20);
            assert_eq!(raster.get(4, 4), Some(ACTIVE));
        }

        f.tension = Some(vec![vec![1.0, -1.0], vec![0.0, 0.5]]);
        let mut sc = scene(Some(&f), 2, 2);
        sc.tension_mode = true;
        let raster = render(&sc, 20, 20);
        assert_eq!(raster.get(4, 4), Some(TENSION_WARM));
        assert_eq!(raster.get(14, 4), Some(TENSION_COOL));
        assert_eq!(raster.get(4, 14), Some(TENSION_NEUTRAL));
    }

    #[test]
    fn tension_saturates_beyond_unit_magnitude() {
        assert_eq!(tension_color(3.5), TENSION_WARM);
        assert_eq!(tension_color(-9.0), TENSION_COOL);
        assert_eq!(tension_color(0.0), TENSION_NEUTRAL);
        // Monotonic in magnitude
        let half = tension_color(0.5);
        assert!(half.r < TENSION_WARM.r && half.r > TENSION_NEUTRAL.r);
    }

    #[test]
    fn overlay_composites_and_outlines_inspected_cell() {
        let f = frame(vec![vec![0.0; 3]; 3]);
        let overlay = ConnectionOverlay {
            x: 1,
            y: 1,
            total_dendrites: 1,
            total_synapses: 8,
            weights: vec![
                vec![Some(1.0), Some(-1.0), None],
                vec![None, Some(SELF_WEIGHT), None],
                vec![None, None, Some(0.0)],
            ],
        };
        let mut sc = scene(Some(&f), 3, 3);
        sc.overlay = Some(&overlay);
        let raster = render(&sc, 30, 30);

        // Base layer still visible underneath: blended, not replaced.
        let excitatory = raster.get(4, 4).unwrap();
        assert!(excitatory.g > 100, "excitatory cell should read green");
        let inhibitory = raster.get(14, 4).unwrap();
        assert!(inhibitory.b > 100, "inhibitory cell should read violet");

        // The inspected cell is outlined at full opacity.
        assert_eq!(raster.get(10, 10), Some(INSPECT_OUTLINE));
    }

    #[test]
    fn small_surface_uses_minimum_cell_size() {
        let f = frame(vec![vec![1.0; 50]; 50]);
        let raster = render(&scene(Some(&f), 50, 50), 60, 60);
        // 50 cells at the 2px floor overflow a 60px surface.
        assert_eq!((raster.width, raster.height), (100, 100));
    }

    #[test]
    fn weight_color_scales_with_magnitude() {
        let strong = weight_color(Weight::Value(1.0));
        let weak = weight_color(Weight::Value(0.25));
        assert!(strong.g > weak.g);
        assert_eq!(weight_color(Weight::Value(0.0)), Rgb::new(0, 0, 0));
        assert_eq!(weight_color(Weight::None), WEIGHT_NONE);
        assert_eq!(weight_color(Weight::SelfLoop), WEIGHT_SELF);
    }
}
