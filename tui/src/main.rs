//! NeuroFlow TUI Entry Point
//!
//! Launches the terminal viewer for a running NeuroFlow engine.
//!
//! Usage:
//!   neuroflow-tui
//!
//! Environment:
//!   NEUROFLOW_WS_URL   WebSocket experiment endpoint
//!                      (default: ws://127.0.0.1:8000/ws/experiment)
//!   NEUROFLOW_API_URL  HTTP catalog endpoint
//!                      (default: http://127.0.0.1:8000)
//!   RUST_LOG           Log filter (trace, debug, info, warn, error)

use std::io;
use std::panic;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neuroflow_tui::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to a file; the alternate screen owns the terminal
    let log_path = std::env::temp_dir().join("neuroflow-tui.log");
    let log_file = std::fs::File::create(&log_path)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Arc::new(log_file)),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: neuroflow-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - Running in a non-interactive environment (CI, container)");
        eprintln!("  - SSH without -t flag");
        eprintln!("  - Piped stdin/stdout");
        std::process::exit(1);
    }

    // Restore the terminal even when we panic mid-frame
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
    let mut app = App::new().await?;
    app.run(terminal).await
}
