//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - `SyncEngine` for protocol and lifecycle decisions
//! - Compositor panels for the canvas, sidebar, legend and status bar
//!
//! The App never decides protocol questions itself. It converts
//! terminal events into engine calls and pointer events, drains the
//! connection's event stream into the engine, and renders whatever
//! state the engine holds.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::Terminal;
use tokio::sync::mpsc;

use neuroflow_core::{
    connect, fetch_experiments, render, BrushMode, BrushShape, ClientConfig, ConnectionState,
    CoordinateMapper, EngineEvent, ExperimentConfig, ExperimentInfo, InteractionLayer, IoRows,
    PointerEvent, Scene, SyncEngine,
};

use crate::compositor::{Compositor, PanelId, SIDEBAR_WIDTH};
use crate::grid_view;
use crate::theme;

/// Playback rate requested from the server
const PLAY_FPS: u32 = 10;

/// Bounds for the steps-per-tick batch size
const MIN_STEPS_PER_TICK: u32 = 1;
const MAX_STEPS_PER_TICK: u32 = 100;

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,

    // === Engine Integration ===
    /// Endpoints, from the environment
    config: ClientConfig,
    /// Protocol state machine and view state
    engine: SyncEngine,
    /// Paint gesture tracking
    interaction: InteractionLayer,
    /// Event stream of the live connection, if any
    events: Option<mpsc::UnboundedReceiver<EngineEvent>>,

    // === Catalog / Selection ===
    /// Available experiments (from the API, or built-in defaults)
    experiments: Vec<ExperimentInfo>,
    /// Index of the highlighted experiment
    selected: usize,
    /// Config to send with the next start/reconnect
    experiment_config: ExperimentConfig,
    /// Steps computed per play tick / step command
    steps_per_tick: u32,
    /// Render tension palette instead of activation
    tension_mode: bool,
    /// Transient line for the status bar
    status_note: Option<String>,

    // === UI Components ===
    /// The four-panel compositor
    compositor: Compositor,
    /// Terminal size
    size: (u16, u16),
}

impl App {
    /// Create a new App instance and open the initial connection
    pub async fn new() -> anyhow::Result<Self> {
        let size = crossterm::terminal::size()?;
        let area = Rect::new(0, 0, size.0, size.1);

        let compositor = Compositor::new(area);

        let config = ClientConfig::from_env();
        let experiments = fetch_experiments(&config.api_url).await;
        let experiment_config = experiments
            .first()
            .map(|e| e.default_config.clone())
            .unwrap_or_default();

        let mut app = Self {
            running: true,
            config,
            engine: SyncEngine::new(),
            interaction: InteractionLayer::new(),
            events: None,
            experiments,
            selected: 0,
            experiment_config,
            steps_per_tick: 1,
            tension_mode: false,
            status_note: None,
            compositor,
            size: (size.0, size.1),
        };

        app.open_connection().await;
        Ok(app)
    }

    /// Open a fresh connection and hand its sender to the engine.
    ///
    /// Any previous connection is superseded; its late events fail the
    /// engine's identity check.
    async fn open_connection(&mut self) {
        match connect(&self.config.ws_url).await {
            Ok(conn) => {
                self.engine.attach(conn.id, conn.commands);
                self.events = Some(conn.events);
                self.status_note = None;
            }
            Err(error) => {
                tracing::warn!(%error, "connection attempt failed");
                self.status_note = Some(format!("{error} - press c to retry"));
            }
        }
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // ~10 FPS redraw; the server paces simulation frames
        let frame_duration = Duration::from_millis(100);

        let mut event_stream = EventStream::new();

        // Render initial frame immediately so the user sees the UI
        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        match event {
                            // Only handle Press events (not Release or Repeat)
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key(key).await
                            }
                            Event::Mouse(mouse) => self.handle_mouse(mouse),
                            Event::Resize(w, h) => self.handle_resize(w, h),
                            _ => {}
                        }
                    }
                }

                // Frame tick
                _ = tokio::time::sleep(Duration::from_millis(16)) => {}
            }

            // Drain everything the connection produced since last tick
            self.process_engine_events();

            self.render(terminal)?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        Ok(())
    }

    /// Feed pending connection events through the engine
    fn process_engine_events(&mut self) {
        let mut batch = Vec::new();
        if let Some(rx) = self.events.as_mut() {
            while let Ok(ev) = rx.try_recv() {
                batch.push(ev);
            }
        }

        for ev in batch {
            let was_close = matches!(&ev, EngineEvent::Closed { .. });
            let applied = self.engine.handle_event(ev);
            if applied && was_close {
                // The live connection is gone; a half-finished paint
                // gesture must not resume against a future session.
                self.interaction.cancel();
                self.events = None;
                self.status_note = Some("connection closed - press c to reconnect".into());
            }
        }

        if let Some(message) = self.engine.take_error() {
            self.status_note = Some(message);
        }
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key: event::KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc | KeyCode::Char('q') => {
                self.running = false;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Experiment selection
            KeyCode::Up => self.select_experiment(self.selected.saturating_sub(1)),
            KeyCode::Down => self.select_experiment(self.selected + 1),
            KeyCode::Left => self.cycle_variant(-1),
            KeyCode::Right => self.cycle_variant(1),

            // Session
            KeyCode::Enter => {
                if let Some(info) = self.experiments.get(self.selected) {
                    let id = info.id.clone();
                    self.engine.start(&id, self.experiment_config.clone());
                }
            }
            KeyCode::Char('c') => {
                if self.events.is_none() {
                    self.open_connection().await;
                    // A rebuilt socket means a fresh server session; if an
                    // experiment was live, rebuild it with the same config.
                    if self.engine.active_experiment().is_some() {
                        self.engine.reconnect(self.experiment_config.clone());
                    }
                }
            }

            // Stepping
            KeyCode::Char(' ') => match self.engine.state() {
                ConnectionState::Running => self.engine.pause(),
                ConnectionState::Ready | ConnectionState::Paused | ConnectionState::Complete => {
                    self.engine.play(PLAY_FPS, self.steps_per_tick)
                }
                _ => {}
            },
            KeyCode::Char('s') => self.engine.step(self.steps_per_tick),
            KeyCode::Char('r') => self.engine.reset(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.steps_per_tick = (self.steps_per_tick + 1).min(MAX_STEPS_PER_TICK);
            }
            KeyCode::Char('-') => {
                self.steps_per_tick = self.steps_per_tick.saturating_sub(1).max(MIN_STEPS_PER_TICK);
            }

            // Brush
            KeyCode::Char('[') => self.engine.brush_mut().shrink(),
            KeyCode::Char(']') => self.engine.brush_mut().grow(),
            KeyCode::Char('x') => {
                let brush = self.engine.brush_mut();
                brush.mode = brush.mode.toggled();
            }
            KeyCode::Char('f') => {
                let brush = self.engine.brush_mut();
                brush.shape = match brush.shape {
                    BrushShape::Square => BrushShape::Cross,
                    BrushShape::Cross => BrushShape::Diamond,
                    BrushShape::Diamond => BrushShape::Square,
                };
            }

            // View modes
            KeyCode::Char('i') => self.engine.toggle_inspect_mode(),
            KeyCode::Char('t') => self.tension_mode = !self.tension_mode,

            _ => {}
        }
    }

    /// Highlight an experiment and load its default config.
    ///
    /// Selection is local; nothing is sent until Enter starts it.
    fn select_experiment(&mut self, index: usize) {
        if self.experiments.is_empty() {
            return;
        }
        let index = index.min(self.experiments.len() - 1);
        if index != self.selected {
            self.selected = index;
            self.experiment_config = self.experiments[index].default_config.clone();
        }
    }

    /// Cycle the rule (automata) or mask (lab experiments) of the
    /// highlighted experiment. Takes effect on the next start.
    fn cycle_variant(&mut self, direction: i32) {
        let Some(info) = self.experiments.get(self.selected) else {
            return;
        };

        if let Some(rules) = &info.rules {
            if rules.is_empty() {
                return;
            }
            let current = self
                .experiment_config
                .rule
                .and_then(|r| rules.iter().position(|&x| x == r))
                .unwrap_or(0);
            let next = cycle_index(current, rules.len(), direction);
            self.experiment_config.rule = Some(rules[next]);
        } else if let Some(masks) = &info.masks {
            if masks.is_empty() {
                return;
            }
            let current = self
                .experiment_config
                .mask
                .as_deref()
                .and_then(|m| masks.iter().position(|x| x.id == m))
                .unwrap_or(0);
            let next = cycle_index(current, masks.len(), direction);
            self.experiment_config.mask = Some(masks[next].id.clone());
        }
    }

    /// Handle mouse input over the canvas
    fn handle_mouse(&mut self, mouse: event::MouseEvent) {
        let canvas = self.compositor.panel_bounds(PanelId::Canvas);
        let over_canvas =
            self.compositor.panel_at(mouse.column, mouse.row) == Some(PanelId::Canvas);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if over_canvas => {
                self.pointer(pointer_press(mouse, canvas));
            }
            // Drags keep feeding the gesture even when the cursor
            // leaves the canvas; the mapper rejects what falls outside.
            MouseEventKind::Drag(MouseButton::Left) => {
                self.pointer(pointer_move(mouse, canvas));
            }
            // A release anywhere ends the gesture
            MouseEventKind::Up(MouseButton::Left) => {
                self.pointer(PointerEvent::Release);
            }
            _ => {}
        }
    }

    /// Feed one pointer event through mapper and engine
    fn pointer(&mut self, event: PointerEvent) {
        let canvas = self.compositor.panel_bounds(PanelId::Canvas);
        let (sw, sh) = grid_view::surface_pixels(canvas);
        let (gw, gh) = self.engine.grid_dims();
        let mapper = CoordinateMapper::new(sw, sh, gw, gh);
        self.interaction.handle(event, &mapper, &mut self.engine);
    }

    /// Handle terminal resize
    fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.compositor.resize(Rect::new(0, 0, width, height));
    }

    /// Render the UI
    fn render(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        self.render_canvas();
        self.render_sidebar();
        self.render_legend();
        self.render_status();

        terminal.draw(|frame| {
            let output = self.compositor.composite();
            let area = frame.area();
            let buf = frame.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    let idx = output.index_of(x, y);
                    if idx < output.content.len() {
                        buf[(x, y)] = output.content[idx].clone();
                    }
                }
            }
        })?;

        Ok(())
    }

    /// Experiment info for the session driving the canvas
    fn active_info(&self) -> Option<&ExperimentInfo> {
        let id = self.engine.active_experiment()?;
        self.experiments.iter().find(|e| e.id == id)
    }

    /// Render the grid canvas panel
    fn render_canvas(&mut self) {
        let bounds = self.compositor.panel_bounds(PanelId::Canvas);
        let (sw, sh) = grid_view::surface_pixels(bounds);
        let (gw, gh) = self.engine.grid_dims();

        let io_rows = self
            .active_info()
            .filter(|info| info.has_io_rows())
            .map(|_| IoRows::conventional(gh));

        let scene = Scene {
            frame: self.engine.frame(),
            overlay: self.engine.overlay(),
            grid_width: gw,
            grid_height: gh,
            io_rows,
            tension_mode: self.tension_mode,
        };
        let raster = render(&scene, sw, sh);
        let no_frame = scene.frame.is_none();

        let buf = self.compositor.panel_buffer_mut(PanelId::Canvas);
        buf.reset();
        grid_view::blit(buf, &raster);

        if no_frame {
            let area = buf.area;
            let hint = "press Enter to start the highlighted experiment";
            if area.width as usize > hint.len() && area.height > 2 {
                let x = (area.width - hint.len() as u16) / 2;
                buf.set_string(
                    x,
                    area.height / 2,
                    hint,
                    Style::default().fg(theme::DIM_GRAY),
                );
            }
        }
    }

    /// Render the experiment sidebar panel
    fn render_sidebar(&mut self) {
        let brush = *self.engine.brush();
        let inspect = self.engine.inspect_mode();
        let tension = self.tension_mode;
        let selected = self.selected;
        let config = self.experiment_config.clone();

        let lines = sidebar_lines(
            &self.experiments,
            selected,
            &config,
            brush.shape,
            brush.size,
            brush.mode,
            inspect,
            tension,
        );

        let buf = self.compositor.panel_buffer_mut(PanelId::Sidebar);
        buf.reset();
        let area = buf.area;
        for (i, (text, style)) in lines.iter().enumerate() {
            if i as u16 >= area.height {
                break;
            }
            let clipped: String = text.chars().take(area.width as usize).collect();
            buf.set_string(0, i as u16, &clipped, *style);
        }
    }

    /// Render the palette legend line
    fn render_legend(&mut self) {
        let legend = if self.engine.overlay().is_some() {
            " weights: green excite / violet inhibit / gold self / dark none"
        } else if self.tension_mode {
            " tension: red positive / blue negative / gray neutral"
        } else {
            " activation: bright active / dark idle (bottom row feeds in, top row reads out)"
        };

        let buf = self.compositor.panel_buffer_mut(PanelId::Legend);
        buf.reset();
        buf.set_string(0, 0, legend, Style::default().fg(theme::DIM_GRAY));
    }

    /// Render the status bar
    fn render_status(&mut self) {
        let state = self.engine.state();
        let state_style = match state {
            ConnectionState::Running => Style::default().fg(theme::RUNNING_GREEN),
            ConnectionState::Initializing => Style::default().fg(theme::BUSY_YELLOW),
            ConnectionState::Disconnected => Style::default().fg(theme::ERROR_RED),
            _ => Style::default().fg(theme::TEXT),
        };

        let counters = match self.engine.frame() {
            Some(frame) => {
                let perf = match &frame.perf {
                    Some(perf) => format!(" | {:.0} steps/s", perf.steps_per_second),
                    None => String::new(),
                };
                format!(
                    " | gen {} | active {}{}",
                    frame.generation, frame.stats.active_cells, perf
                )
            }
            None => String::new(),
        };

        let note = match &self.status_note {
            Some(note) => format!(" | {note}"),
            None => String::new(),
        };

        let status = format!(
            " {}{} | x{} per tick{}",
            state.description(),
            counters,
            self.steps_per_tick,
            note
        );

        let buf = self.compositor.panel_buffer_mut(PanelId::Status);
        buf.reset();
        buf.set_string(0, 0, &status, state_style);
    }
}

/// Step an index through a cycle of `len` entries
fn cycle_index(current: usize, len: usize, direction: i32) -> usize {
    let len = len as i32;
    (((current as i32 + direction) % len + len) % len) as usize
}

fn pointer_press(mouse: event::MouseEvent, canvas: Rect) -> PointerEvent {
    let (px, py) = canvas_pixel(mouse, canvas);
    PointerEvent::Press { px, py }
}

fn pointer_move(mouse: event::MouseEvent, canvas: Rect) -> PointerEvent {
    let (px, py) = canvas_pixel(mouse, canvas);
    PointerEvent::Move { px, py }
}

/// Mouse position to raster pixel, relative to the canvas origin
fn canvas_pixel(mouse: event::MouseEvent, canvas: Rect) -> (i64, i64) {
    grid_view::pixel_at(
        mouse.column as i32 - canvas.x as i32,
        mouse.row as i32 - canvas.y as i32,
    )
}

/// Build the sidebar text as (line, style) pairs
#[allow(clippy::too_many_arguments)]
fn sidebar_lines(
    experiments: &[ExperimentInfo],
    selected: usize,
    config: &ExperimentConfig,
    shape: BrushShape,
    size: u32,
    mode: BrushMode,
    inspect: bool,
    tension: bool,
) -> Vec<(String, Style)> {
    let accent = Style::default().fg(theme::ACCENT);
    let text = Style::default().fg(theme::TEXT);
    let dim = Style::default().fg(theme::DIM_GRAY);

    let mut lines = vec![
        (" NeuroFlow".to_string(), accent),
        (format!(" {}", "-".repeat(SIDEBAR_WIDTH as usize - 2)), dim),
    ];

    for (i, info) in experiments.iter().enumerate() {
        let marker = if i == selected { ">" } else { " " };
        let style = if i == selected { accent } else { text };
        lines.push((format!(" {} {}", marker, info.name), style));
    }

    lines.push((String::new(), dim));
    let mut cfg = format!(" config: {}x{}", config.width, config.height);
    if let Some(rule) = config.rule {
        cfg.push_str(&format!(", rule {rule}"));
    }
    if let Some(mask) = &config.mask {
        cfg.push_str(&format!(", mask {mask}"));
    }
    if let Some(balance) = config.balance {
        cfg.push_str(&format!(", balance {balance:.1}"));
    }
    lines.push((cfg, text));

    let shape_name = match shape {
        BrushShape::Square => "square",
        BrushShape::Cross => "cross",
        BrushShape::Diamond => "diamond",
    };
    let mode_name = match mode {
        BrushMode::Activate => "paint",
        BrushMode::Deactivate => "erase",
    };
    lines.push((
        format!(" brush: {shape_name} {size} ({mode_name})"),
        if mode == BrushMode::Activate {
            Style::default().fg(theme::ACCENT_WARM)
        } else {
            text
        },
    ));

    let mut modes = Vec::new();
    if inspect {
        modes.push("inspect");
    }
    if tension {
        modes.push("tension");
    }
    if !modes.is_empty() {
        lines.push((format!(" view: {}", modes.join(" + ")), accent));
    }

    lines.push((String::new(), dim));
    for help in [
        " enter start    c reconnect",
        " space play/pause   s step",
        " r reset    +/- batch size",
        " [/] brush size  f shape  x mode",
        " i inspect  t tension  q quit",
        " arrows: experiment / variant",
    ] {
        lines.push((help.to_string(), dim));
    }

    lines
}
