mod api;
mod app;
mod catalog;
mod comments;
mod config;
mod constants;
mod duration;
mod forms;
mod input;
mod interact;
mod model;
mod session;
mod studio;
mod theme;
mod timefmt;
mod ui;

use anyhow::Result;
use clap::Parser;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use api::ApiClient;
use app::App;
use config::Config;
use constants::constants;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Backend API base URL (overrides the config file).
  #[arg(long)]
  api: Option<String>,

  /// Log filter, e.g. 'info' or 'tubular=debug'.
  #[arg(long, default_value = "info")]
  log_level: String,
}

/// Log to a rolling file in the platform data dir; the terminal is
/// owned by the UI, so nothing may write to stdout/stderr.
fn init_logging(filter: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let proj_dirs = directories::ProjectDirs::from("", "", "tubular")?;
  let log_dir = proj_dirs.data_dir().join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;
  let appender = tracing_appender::rolling::daily(log_dir, "tubular.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = init_logging(&args.log_level);

  let config = Config::load();
  let base = args.api.or(config.api_base).unwrap_or_else(|| constants().default_api_base.clone());
  let api = ApiClient::new(&base);

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, api).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, api: ApiClient) -> Result<()> {
  let mut app = App::new(api);
  app.trigger_catalog();

  loop {
    app.check_pending()?;
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key)?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  Ok(())
}
