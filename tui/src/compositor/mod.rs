//! Panel Compositor
//!
//! The display is four fixed panels: the grid canvas, the experiment
//! sidebar, the palette legend, and the status bar. Each panel draws
//! into its own origin-based buffer; `composite` stacks them back to
//! front into one output buffer, and `panel_at` routes mouse events
//! to whichever panel is on top under the cursor.
//!
//! The canvas needs this rather than plain ratatui widgets: the grid
//! is blitted pixel-by-pixel and the chrome panels must occlude it
//! cleanly at any terminal size. The layout is computed here so the
//! draw order and the hit-test order can never disagree.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

/// Sidebar width (columns)
pub const SIDEBAR_WIDTH: u16 = 34;

/// The four fixed panels of the display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelId {
    Canvas,
    Sidebar,
    Legend,
    Status,
}

/// Draw order, back to front. Hit-testing walks it reversed, so the
/// chrome panels win ties against the canvas.
const DRAW_ORDER: [PanelId; 4] = [
    PanelId::Canvas,
    PanelId::Sidebar,
    PanelId::Legend,
    PanelId::Status,
];

/// One panel: its screen rectangle plus a private draw buffer
struct Panel {
    bounds: Rect,
    buffer: Buffer,
}

impl Panel {
    fn new(bounds: Rect) -> Self {
        // The buffer lives at (0,0); bounds carry the screen position
        Self {
            bounds,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        }
    }

    fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.bounds.x
            && x < self.bounds.x + self.bounds.width
            && y >= self.bounds.y
            && y < self.bounds.y + self.bounds.height
    }
}

/// Composites the four panels into one terminal-sized buffer
pub struct Compositor {
    canvas: Panel,
    sidebar: Panel,
    legend: Panel,
    status: Panel,
    /// Output buffer (composited result)
    output: Buffer,
    /// Total area
    area: Rect,
}

impl Compositor {
    /// Create a compositor laid out for the given terminal area
    pub fn new(area: Rect) -> Self {
        let [canvas, sidebar, legend, status] = layout(area);
        Self {
            canvas: Panel::new(canvas),
            sidebar: Panel::new(sidebar),
            legend: Panel::new(legend),
            status: Panel::new(status),
            output: Buffer::empty(area),
            area,
        }
    }

    fn panel(&self, id: PanelId) -> &Panel {
        match id {
            PanelId::Canvas => &self.canvas,
            PanelId::Sidebar => &self.sidebar,
            PanelId::Legend => &self.legend,
            PanelId::Status => &self.status,
        }
    }

    /// A panel's buffer, for drawing into
    pub fn panel_buffer_mut(&mut self, id: PanelId) -> &mut Buffer {
        match id {
            PanelId::Canvas => &mut self.canvas.buffer,
            PanelId::Sidebar => &mut self.sidebar.buffer,
            PanelId::Legend => &mut self.legend.buffer,
            PanelId::Status => &mut self.status.buffer,
        }
    }

    /// A panel's screen rectangle
    pub fn panel_bounds(&self, id: PanelId) -> Rect {
        self.panel(id).bounds
    }

    /// Recompute the layout for a new terminal size, discarding all
    /// panel contents
    pub fn resize(&mut self, area: Rect) {
        let [canvas, sidebar, legend, status] = layout(area);
        self.canvas = Panel::new(canvas);
        self.sidebar = Panel::new(sidebar);
        self.legend = Panel::new(legend);
        self.status = Panel::new(status);
        self.output = Buffer::empty(area);
        self.area = area;
    }

    /// Stack the panels back to front into the output buffer
    pub fn composite(&mut self) -> &Buffer {
        self.output.reset();
        for panel in [&self.canvas, &self.sidebar, &self.legend, &self.status] {
            blit_panel(&mut self.output, self.area, panel);
        }
        &self.output
    }

    /// The topmost panel at a screen position
    pub fn panel_at(&self, x: u16, y: u16) -> Option<PanelId> {
        DRAW_ORDER
            .iter()
            .rev()
            .copied()
            .find(|&id| self.panel(id).contains(x, y))
    }
}

/// Screen rectangles for the panels, in [`DRAW_ORDER`]: the sidebar
/// takes the left columns, the canvas the rest, and the legend and
/// status bar the bottom two rows.
fn layout(area: Rect) -> [Rect; 4] {
    let bar_height = area.height.min(1);
    let panel_height = area.height.saturating_sub(2);
    let sidebar_width = SIDEBAR_WIDTH.min(area.width);
    [
        Rect::new(
            sidebar_width,
            0,
            area.width.saturating_sub(sidebar_width),
            panel_height,
        ),
        Rect::new(0, 0, sidebar_width, panel_height),
        Rect::new(0, area.height.saturating_sub(2), area.width, bar_height),
        Rect::new(0, area.height.saturating_sub(1), area.width, bar_height),
    ]
}

/// Blit a panel onto the output buffer (solid occlusion: non-space
/// cells overwrite, spaces stay transparent so the panel behind shows
/// through)
fn blit_panel(output: &mut Buffer, area: Rect, panel: &Panel) {
    let pb = panel.bounds;

    for py in 0..pb.height {
        for px in 0..pb.width {
            let dst_x = pb.x + px;
            let dst_y = pb.y + py;

            if dst_x >= area.width || dst_y >= area.height {
                continue;
            }

            let src_idx = panel.buffer.index_of(px, py);
            if src_idx >= panel.buffer.content.len() {
                continue;
            }

            let src_cell = &panel.buffer.content[src_idx];
            if src_cell.symbol() != " " {
                let dst_idx = output.index_of(dst_x, dst_y);
                if dst_idx < output.content.len() {
                    output.content[dst_idx] = src_cell.clone();
                }
            }
        }
    }
}
