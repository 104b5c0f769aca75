//! Memeologia terminal client.
//!
//! Opens on the login screen unless a session is already stored, and
//! offers `login` and `logout` sub-commands for use without the TUI.

mod app;
mod ui;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use memeologia_core::{AuthClient, Config, LoginView, Route, Router, Session};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written while the TUI owns the terminal
const LOG_FILE: &str = "memeologia.log";

/// Initialize the tracing subscriber for logging.
///
/// With a directory, logs go to a file there (the TUI owns stderr);
/// without one they go to stderr. The returned guard flushes the file
/// writer on drop and must live until exit.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("login") => {
            let _guard = init_tracing(None);
            return login_command().await;
        }
        Some("logout") => {
            let _guard = init_tracing(None);
            return logout_command();
        }
        Some(other) => {
            return Err(anyhow::anyhow!(
                "Unknown command '{}'. Usage: memeologia [login|logout]",
                other
            ));
        }
        None => {}
    }

    // Tracing goes up before the session is read so load problems are logged
    let config_path = Config::default_path()?;
    let config = Config::load_from(&config_path)?;
    let log_dir = config.cache_dir().ok();
    let _guard = init_tracing(log_dir.as_deref());

    let mut app = App::new(config, config_path)?;
    info!(
        login_url = %app.api.login_url(),
        authenticated = app.is_authenticated(),
        "Memeologia starting"
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Memeologia shutting down");
    Ok(())
}

/// Log in from the prompt, without the TUI
async fn login_command() -> Result<()> {
    let mut config = Config::load()?;
    let mut session = Session::new(config.cache_dir()?);
    let api = AuthClient::new(config.login_url(), config.request_timeout())?;

    let mut view = LoginView::new(prompt_email(&config.initial_email())?);
    view.credentials.password = match Config::initial_password() {
        password if password.is_empty() => rpassword::prompt_password("Contraseña: ")?,
        password => password,
    };

    eprintln!("Iniciando sesión en {}...", api.login_url());

    let mut router = Router::new(Route::Login);
    if view.submit(&api, &mut session, &mut router).await {
        config.last_email = Some(view.credentials.email.clone());
        config.save()?;
        println!("Sesión iniciada");
        Ok(())
    } else {
        let message = view.error_message().unwrap_or("Error desconocido");
        Err(anyhow::anyhow!("{}", message))
    }
}

fn prompt_email(default: &str) -> Result<String> {
    if default.is_empty() {
        print!("Correo Electrónico: ");
    } else {
        print!("Correo Electrónico [{}]: ", default);
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input.to_string())
    }
}

/// Remove the stored session
fn logout_command() -> Result<()> {
    let config = Config::load()?;
    let mut session = Session::new(config.cache_dir()?);
    session.clear()?;
    println!("Sesión cerrada");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout so login results show up promptly
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
