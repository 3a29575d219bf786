mod api;
mod app;
mod config;
mod logging;
mod state;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use api::{HttpRecommendationClient, RecommendationSource};
use app::{App, Popup};
use config::AppConfig;
use state::{FetchOutcome, RecommendationController, RequestState};

#[derive(Parser, Debug)]
#[command(name = "prodrec")]
#[command(version)]
#[command(about = "A terminal client for a personalized product recommendation service")]
struct Args {
    /// Recommendation service base URL (overrides the config file)
    #[arg(long, env = "PRODREC_BASE_URL")]
    base_url: Option<String>,

    /// Use this config file instead of the default one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fill in a user id and fetch its recommendations on startup
    #[arg(short, long)]
    user_id: Option<String>,

    /// Fetch recommendations once, print them as JSON and exit
    #[arg(long, value_name = "USER_ID", conflicts_with = "user_id")]
    once: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let _log_guard = if args.once.is_some() {
        logging::init_stderr();
        None
    } else {
        logging::init_file()
    };

    let config = load_config(args.config.as_deref()).with_base_url(args.base_url);
    tracing::info!(base_url = config.base_url(), "using recommendation service");

    let source: Arc<dyn RecommendationSource> = Arc::new(HttpRecommendationClient::new(&config)?);

    if let Some(user_id) = args.once {
        return print_once(source.as_ref(), &user_id).await;
    }

    run_tui(source, args.user_id).await
}

fn load_config(path: Option<&Path>) -> AppConfig {
    match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load().unwrap_or_default(),
    }
}

async fn print_once(source: &dyn RecommendationSource, user_id: &str) -> Result<()> {
    let state = fetch_once(source, user_id).await;
    println!("{}", serde_json::to_string(&once_output(user_id, &state))?);

    if let Some(error) = state.error() {
        anyhow::bail!("{}", error);
    }
    Ok(())
}

/// Run one request through the controller and return where it ended up
async fn fetch_once(source: &dyn RecommendationSource, user_id: &str) -> RequestState {
    let mut controller = RecommendationController::new();
    if let Some(request) = controller.submit(user_id) {
        let result = source.recommend(&request.user_id).await;
        controller.resolve(FetchOutcome {
            seq: request.seq,
            result,
        });
    }
    controller.state().clone()
}

fn once_output(user_id: &str, state: &RequestState) -> serde_json::Value {
    match state.error() {
        Some(error) => serde_json::json!({ "user_id": user_id, "error": error }),
        None => serde_json::json!({
            "user_id": user_id,
            "recommendations": state.recommendations(),
        }),
    }
}

async fn run_tui(source: Arc<dyn RecommendationSource>, user_id: Option<String>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(source);
    if let Some(user_id) = user_id {
        app.request_for(&user_id);
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Apply finished fetches, advance spinner
        app.tick();
    }
}
