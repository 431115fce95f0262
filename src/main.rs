mod app;
mod config;
mod constants;
mod dates;
mod display;
mod error;
mod filter;
mod graphics;
mod input;
mod model;
mod normalize;
mod poller;
mod report;
mod search;
mod sheet;
mod theme;
mod thumbnail;
mod ui;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use reqwest::Client;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use constants::constants;
use display::CliDisplayMode;
use filter::{ALL_REGIONS, Criteria, RegionFilter, TimeRange};
use search::ApproxMatcher;
use sheet::{DatasetSource, SheetClient};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Thumbnail display mode: 'auto', 'direct', 'ascii', or 'off' (default: auto-detect)
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// Fetch once, print the grouped list to stdout and exit
  #[arg(short, long)]
  print: bool,

  /// Initial search query
  #[arg(short, long, default_value = "")]
  query: String,

  /// Initial region filter, e.g. 'US' ('All' for every region)
  #[arg(short, long, default_value = ALL_REGIONS)]
  region: String,

  /// Initial time range
  #[arg(long, value_enum, default_value_t = TimeRange::All)]
  range: TimeRange,

  /// Theme for this session ('Light' or 'Dark'); overrides the saved preference
  #[arg(short, long)]
  theme: Option<String>,
}

impl Args {
  fn criteria(&self) -> Criteria {
    Criteria { query: self.query.clone(), region: RegionFilter::from(self.region.as_str()), range: self.range }
  }
}

// --- Logging ---

/// Log to a file so the TUI keeps the terminal. The guard flushes on drop.
fn init_file_logging() -> Option<WorkerGuard> {
  let dirs = ProjectDirs::from("", "", "trendboard")?;
  let appender = tracing_appender::rolling::never(dirs.data_local_dir(), "trendboard.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();
  Some(guard)
}

fn init_stderr_logging() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let http = Client::builder()
    .timeout(constants().request_timeout())
    .user_agent(concat!("trendboard/", env!("CARGO_PKG_VERSION")))
    .build()
    .context("Failed to build HTTP client")?;

  if args.print {
    init_stderr_logging();
    return print_report(http, &args.criteria()).await;
  }

  let _log_guard = init_file_logging();
  info!(version = env!("CARGO_PKG_VERSION"), "starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let display_mode = display::resolve_display_mode(args.display_mode);
  let mut config = Config::load();
  if let Some(theme) = &args.theme {
    config.theme_name = Some(theme.clone());
  }
  let mut app = App::new(display_mode, http.clone(), &config);
  app.set_criteria(args.criteria());
  app.start_polling(SheetClient::new(http));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, &mut app);
  ratatui::restore();
  app.stop_polling();
  info!("exiting");
  result
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  loop {
    app.check_pending();
    app.expire_error();
    app.sync_thumbnail();

    terminal.draw(|frame| ui::ui(frame, app)).context("Failed to draw frame")?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(app, key);
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

async fn print_report(http: Client, criteria: &Criteria) -> Result<()> {
  let dataset = SheetClient::new(http).fetch_all().await.context("Failed to load video data")?;
  let groups = filter::run(&dataset.videos, criteria, Local::now().date_naive(), &ApproxMatcher::default());
  print!("{}", report::render(&groups));
  Ok(())
}
