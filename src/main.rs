use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tvtube::app::App;
use tvtube::config::Config;
use tvtube::{input, ui};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Start with this query already searched
  query: Option<String>,

  /// Device vendor used for decoder workarounds (overrides prefs.toml)
  #[arg(long)]
  vendor: Option<String>,

  /// Disable search suggestions for this session
  #[arg(long)]
  no_suggestions: bool,

  /// Print shell completions and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

// --- Logging ---

/// Log to a daily file: stdout belongs to the terminal UI.
fn init_logging() -> Option<WorkerGuard> {
  let dirs = ProjectDirs::from("", "", "tvtube")?;
  let log_dir = dirs.data_local_dir().join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;

  let appender = tracing_appender::rolling::daily(log_dir, "tvtube.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tvtube=info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), "tvtube", &mut std::io::stdout());
    return Ok(());
  }

  let _guard = init_logging();
  info!(version = env!("CARGO_PKG_VERSION"), "tvtube starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args) -> Result<()> {
  let mut config = Config::load();
  if let Some(vendor) = args.vendor {
    config.device_vendor = Some(vendor);
  }
  if args.no_suggestions {
    config.suggestions = Some(false);
  }

  let mut app = App::new(config);
  app.ticker.start();

  if let Some(query) = args.query {
    app.input = query;
    app.cursor_position = app.input.chars().count();
    app.trigger_search();
  }

  loop {
    app.check_pending().await?;
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app)).context("Failed to draw frame")?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  info!("tvtube exiting");
  app.shutdown().await
}
