//! datachat TUI Entry Point
//!
//! Launches the terminal UI for asking questions about a project's tables.
//!
//! Usage:
//!   datachat-tui [OPTIONS]
//!
//! Options:
//!   --project <ID>        Project to query (env: DATACHAT_PROJECT)
//!   --api-url <URL>       Analysis service base URL
//!   --timeout <SECS>      Request timeout in seconds
//!   --config <PATH>       Config file (default: ~/.config/datachat/conductor.toml)
//!   --log-file <PATH>     Write logs here (datachat-tui.log when only RUST_LOG is set)

use std::fs::File;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datachat_conductor::{default_config_path, load_config_from_path, ConfigOverrides};
use datachat_tui::App;

/// Log file used when `RUST_LOG` is set without `--log-file`
const DEFAULT_LOG_FILE: &str = "datachat-tui.log";

#[derive(Parser, Debug)]
#[command(name = "datachat-tui", about = "Ask questions about your data")]
struct Args {
    /// Project to query
    #[arg(long, env = "DATACHAT_PROJECT")]
    project: Option<String>,

    /// Analysis service base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file; the terminal belongs to the UI
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to a file only, never to the screen the UI draws on
    let log_file = args.log_file.clone().or_else(|| {
        std::env::var_os("RUST_LOG").map(|_| PathBuf::from(DEFAULT_LOG_FILE))
    });
    if let Some(path) = &log_file {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let mut config = load_config_from_path(args.config.clone().or_else(default_config_path))?;
    let mut overrides = ConfigOverrides::new();
    if let Some(project) = args.project {
        overrides = overrides.with_project_id(project);
    }
    if let Some(url) = args.api_url {
        overrides = overrides.with_api_url(url);
    }
    if let Some(secs) = args.timeout {
        overrides = overrides.with_request_timeout_secs(secs);
    }
    overrides.apply(&mut config);
    config.validate()?;
    config.require_project()?;

    tracing::info!(
        api_url = %config.api_url,
        source = ?config.source(),
        "Configuration loaded"
    );

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: datachat-tui requires a terminal (TTY)");
        std::process::exit(1);
    }

    let mut app = App::new(config)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}
