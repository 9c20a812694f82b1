//! End-to-End Session Flow Tests
//!
//! Drive a full client session — connect, start, paint, inspect,
//! supersede — through the sync engine and the compositor, with a
//! scripted server on the other side of the channels instead of a
//! live socket. The transport tasks are bypassed on purpose: every
//! behavior under test lives between the channel boundary and the
//! rendered raster.

use tokio::sync::mpsc;

use neuroflow_core::{
    Cell, ClientCommand, ConnectionId, ConnectionState, CoordinateMapper, EngineEvent,
    ExperimentConfig, InteractionLayer, IoRows, PointerEvent, Scene, ServerMessage, StatusState,
    SyncEngine,
};
use neuroflow_core::protocol::Stats;

/// A scripted stand-in for the remote engine: captures outbound
/// commands and lets tests push inbound messages.
struct ScriptedServer {
    conn: ConnectionId,
    outbound: mpsc::UnboundedReceiver<ClientCommand>,
}

impl ScriptedServer {
    fn connect(engine: &mut SyncEngine) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = ConnectionId::next();
        engine.attach(conn, tx);
        engine.handle_event(EngineEvent::Opened { conn });
        Self { conn, outbound: rx }
    }

    fn push(&self, engine: &mut SyncEngine, msg: ServerMessage) -> bool {
        engine.handle_event(EngineEvent::Message {
            conn: self.conn,
            msg,
        })
    }

    fn sent(&mut self) -> Vec<ClientCommand> {
        let mut commands = Vec::new();
        while let Ok(cmd) = self.outbound.try_recv() {
            commands.push(cmd);
        }
        commands
    }

    fn frame_for(&self, experiment: &str, grid: Vec<Vec<f32>>) -> ServerMessage {
        let active = grid
            .iter()
            .flatten()
            .filter(|v| **v > 0.0)
            .count() as u64;
        ServerMessage::Frame {
            generation: 0,
            grid,
            stats: Stats {
                active_cells: active,
                ..Stats::default()
            },
            perf: None,
            tension_grid: None,
            experiment: Some(experiment.to_string()),
        }
    }
}

fn render_engine(engine: &SyncEngine, surface: (u32, u32)) -> neuroflow_core::Raster {
    let (width, height) = engine.grid_dims();
    let scene = Scene {
        frame: engine.frame(),
        overlay: engine.overlay(),
        grid_width: width,
        grid_height: height,
        io_rows: Some(IoRows::conventional(height)),
        tension_mode: false,
    };
    neuroflow_core::render::render(&scene, surface.0, surface.1)
}

#[test]
fn connect_start_first_frame_renders_all_inactive() {
    let mut engine = SyncEngine::new();
    let mut server = ScriptedServer::connect(&mut engine);
    assert_eq!(engine.state(), ConnectionState::Ready);

    engine.start("sim_a", ExperimentConfig::sized(10, 10));
    assert_eq!(engine.state(), ConnectionState::Initializing);
    assert!(matches!(
        server.sent().as_slice(),
        [ClientCommand::Start { experiment, .. }] if experiment == "sim_a"
    ));

    server.push(
        &mut engine,
        server.frame_for("sim_a", vec![vec![0.0; 10]; 10]),
    );
    assert_eq!(engine.state(), ConnectionState::Ready);

    let raster = render_engine(&engine, (100, 100));
    assert_eq!((raster.width, raster.height), (100, 100));
    // Every rendered pixel comes from an inactive palette entry: no
    // white "active" pixels anywhere.
    for y in 0..raster.height {
        for x in 0..raster.width {
            let px = raster.get(x, y).unwrap();
            assert!(
                !(px.r == 255 && px.g == 255 && px.b == 255),
                "active pixel at ({x},{y}) in an all-zero frame"
            );
        }
    }
}

#[test]
fn paint_then_frame_updates_pixels_without_lifecycle_change() {
    let mut engine = SyncEngine::new();
    let mut server = ScriptedServer::connect(&mut engine);
    engine.start("sim_a", ExperimentConfig::sized(10, 10));
    server.push(
        &mut engine,
        server.frame_for("sim_a", vec![vec![0.0; 10]; 10]),
    );
    server.sent();

    // One press paints the 1x1 footprint at (5,5) exactly once.
    let mapper = CoordinateMapper::new(100, 100, 10, 10);
    let mut interaction = InteractionLayer::new();
    interaction.handle(PointerEvent::Press { px: 55, py: 55 }, &mapper, &mut engine);
    interaction.handle(PointerEvent::Release, &mapper, &mut engine);

    let sent = server.sent();
    assert!(matches!(
        sent.as_slice(),
        [ClientCommand::Paint { cells, value }]
            if cells == &[Cell::new(5, 5)] && *value == 1.0
    ));

    let before = render_engine(&engine, (100, 100));
    let mut grid = vec![vec![0.0; 10]; 10];
    grid[5][5] = 1.0;
    server.push(&mut engine, server.frame_for("sim_a", grid));
    assert_eq!(engine.state(), ConnectionState::Ready, "paint echo must not change lifecycle");

    let after = render_engine(&engine, (100, 100));
    assert_ne!(before.get(55, 55), after.get(55, 55));
}

#[test]
fn inspect_composites_overlay_and_toggle_off_restores_plain_rendering() {
    let mut engine = SyncEngine::new();
    let mut server = ScriptedServer::connect(&mut engine);
    engine.start("sim_a", ExperimentConfig::sized(10, 10));
    let mut grid = vec![vec![0.0; 10]; 10];
    grid[0][0] = 1.0;
    server.push(&mut engine, server.frame_for("sim_a", grid));
    server.sent();

    engine.set_inspect_mode(true);
    let mapper = CoordinateMapper::new(100, 100, 10, 10);
    let mut interaction = InteractionLayer::new();
    interaction.handle(PointerEvent::Press { px: 33, py: 33 }, &mapper, &mut engine);
    assert!(matches!(
        server.sent().as_slice(),
        [ClientCommand::Inspect { x: 3, y: 3 }]
    ));

    let plain = render_engine(&engine, (100, 100));

    let mut weights = vec![vec![None; 10]; 10];
    weights[3][3] = Some(999.0);
    weights[3][4] = Some(1.0);
    weights[3][2] = Some(-1.0);
    server.push(
        &mut engine,
        ServerMessage::Connections {
            x: 3,
            y: 3,
            total_dendrites: 2,
            total_synapses: 8,
            weight_grid: weights,
        },
    );
    assert!(engine.overlay().is_some());

    let composited = render_engine(&engine, (100, 100));
    // The base layer survives underneath the overlay: the active cell
    // at (0,0) still reads bright.
    let base_px = composited.get(4, 4).unwrap();
    assert!(base_px.r > 60, "base activation lost under overlay");
    assert_ne!(plain, composited);

    // Frame data is untouched by the overlay.
    assert_eq!(engine.frame().unwrap().value(0, 0), Some(1.0));

    engine.toggle_inspect_mode();
    assert!(engine.overlay().is_none());
    assert_eq!(render_engine(&engine, (100, 100)), plain);
}

#[test]
fn restart_during_play_never_applies_superseded_frames() {
    let mut engine = SyncEngine::new();
    let mut server = ScriptedServer::connect(&mut engine);
    engine.start("sim_a", ExperimentConfig::sized(10, 10));
    server.push(
        &mut engine,
        server.frame_for("sim_a", vec![vec![0.0; 10]; 10]),
    );
    engine.play(10, 1);
    server.push(
        &mut engine,
        ServerMessage::Status {
            state: StatusState::Running,
        },
    );
    assert_eq!(engine.state(), ConnectionState::Running);

    // User starts sim_b while sim_a's play loop is still emitting.
    engine.start("sim_b", ExperimentConfig::sized(20, 20));
    assert_eq!(engine.state(), ConnectionState::Initializing);
    assert_eq!(engine.active_experiment(), Some("sim_b"));

    // In-flight sim_a frame arrives after the new start: dropped.
    let applied = server.push(
        &mut engine,
        server.frame_for("sim_a", vec![vec![1.0; 10]; 10]),
    );
    assert!(!applied);
    // The last accepted frame (sim_a, all zeros) is still what is
    // held; the dropped all-ones frame never landed.
    assert_eq!(engine.frame().unwrap().value(0, 0), Some(0.0));
    assert_eq!(engine.state(), ConnectionState::Initializing);

    // The new build's first frame lands and unlocks the controls.
    server.push(
        &mut engine,
        server.frame_for("sim_b", vec![vec![0.0; 20]; 20]),
    );
    assert_eq!(engine.state(), ConnectionState::Ready);
    assert_eq!(engine.active_experiment(), Some("sim_b"));
}

#[test]
fn ragged_frame_renders_full_surface_without_panics() {
    let mut engine = SyncEngine::new();
    let mut server = ScriptedServer::connect(&mut engine);
    engine.start("sim_a", ExperimentConfig::sized(8, 8));

    // Declared 8x8, delivered with a short row and missing rows.
    let mut grid = vec![vec![1.0; 8]; 5];
    grid[2] = vec![1.0; 3];
    server.push(&mut engine, server.frame_for("sim_a", grid));

    let raster = render_engine(&engine, (80, 80));
    assert_eq!((raster.width, raster.height), (80, 80));
    for y in 0..raster.height {
        for x in 0..raster.width {
            raster.get(x, y).expect("raster fully populated");
        }
    }
}

#[test]
fn disconnect_mid_session_revokes_affordances() {
    let mut engine = SyncEngine::new();
    let mut server = ScriptedServer::connect(&mut engine);
    engine.start("sim_a", ExperimentConfig::sized(10, 10));
    server.push(
        &mut engine,
        server.frame_for("sim_a", vec![vec![0.0; 10]; 10]),
    );
    server.sent();

    engine.handle_event(EngineEvent::Closed { conn: server.conn });
    assert_eq!(engine.state(), ConnectionState::Disconnected);
    assert!(engine.frame().is_none());

    // Commands after disconnect go nowhere.
    engine.step(5);
    engine.play(10, 1);
    assert!(server.sent().is_empty());

    // A fresh connection is a fresh session starting at ready.
    let server2 = ScriptedServer::connect(&mut engine);
    assert_eq!(engine.state(), ConnectionState::Ready);
    assert!(engine.frame().is_none());
    drop(server2);
}
