//! busticket - Terminal Bus Ticket Booking
//!
//! Walks the user through an eight-step booking form and issues a mock
//! ticket with a synthetic transaction ID and QR payload. Nothing is sent
//! anywhere except the optional QR image request.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use busticket::application::{App, MockConfig};
use busticket::infrastructure::{QrEndpoint, DEFAULT_QR_ENDPOINT, DEFAULT_QR_SIZE};
use busticket::presentation::{render_ui, InputHandler};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "busticket", version, about = "Mock bus ticket booking in the terminal")]
struct Cli {
    /// Date stamped into transaction IDs (DDMMYYYY)
    #[arg(long)]
    mock_date: Option<String>,

    /// Booking time shown on the ticket
    #[arg(long)]
    booking_time: Option<String>,

    /// QR image renderer endpoint
    #[arg(long, default_value = DEFAULT_QR_ENDPOINT)]
    qr_endpoint: String,

    /// QR image edge length in pixels
    #[arg(long, default_value_t = DEFAULT_QR_SIZE)]
    qr_size: u16,

    /// Never contact the QR renderer; always show the placeholder
    #[arg(long)]
    offline: bool,

    /// Write logs to this file (RUST_LOG controls the level, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Entry point for the booking application.
///
/// Parses flags, sets up the terminal, runs the event loop until the user
/// quits and restores the terminal on the way out.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = MockConfig::from_overrides(cli.mock_date.as_deref(), cli.booking_time.as_deref())
        .context("invalid mock configuration")?;
    let endpoint = QrEndpoint {
        base_url: cli.qr_endpoint,
        size: cli.qr_size,
        offline: cli.offline,
        ..QrEndpoint::default()
    };
    info!(mock_date = %config.mock_date, offline = endpoint.offline, "starting busticket");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, endpoint);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Polls for keys with a short timeout so a finished QR image request is
/// shown without waiting for the next key press.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.poll_qr_image();
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    InputHandler::handle_key_event(app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
