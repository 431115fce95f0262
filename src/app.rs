use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use image::DynamicImage;
use ratatui::widgets::ListState;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::constants::constants;
use crate::display::DisplayMode;
use crate::filter::{self, Criteria, MonthGroup, RegionFilter};
use crate::model::{Dataset, ProcessedRecord};
use crate::poller::{FetchOutcome, Generation, Poller};
use crate::search::ApproxMatcher;
use crate::sheet::DatasetSource;
use crate::theme::{THEMES, Theme, theme_index};
use crate::thumbnail::fetch_thumbnail;

/// Shown whenever a fetch fails; details go to the log.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to load video data. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Typing in the search box.
  Search,
  /// Moving through the result cards.
  Results,
}

/// One line of the results list: a month heading or a video card.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
  Header { label: String, count: usize },
  Video(ProcessedRecord),
}

type ThumbnailResult = (String, Result<DynamicImage>);

/// Thumbnail of the selected card.
#[derive(Default)]
pub struct ThumbnailState {
  /// Video the image (or pending request) belongs to.
  pub video_id: Option<String>,
  pub image: Option<DynamicImage>,
  /// Every tier failed; draw the textual placeholder.
  pub failed: bool,
  /// Image resized for the last drawn area, keyed by (video, width, height).
  pub resized: Option<(String, u16, u16, DynamicImage)>,
  rx: Option<oneshot::Receiver<ThumbnailResult>>,
}

pub struct App {
  pub dataset: Dataset,
  pub criteria: Criteria,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub mode: AppMode,
  pub theme_index: usize,
  pub display_mode: DisplayMode,
  /// Filtered, grouped view flattened for the list widget.
  pub rows: Vec<Row>,
  pub list_state: ListState,
  /// No dataset has arrived yet.
  pub loading: bool,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub last_updated: Option<DateTime<Local>>,
  pub should_quit: bool,
  pub thumb: ThumbnailState,
  http: Client,
  searcher: ApproxMatcher,
  generation: Generation,
  error_time: Option<Instant>,
  outcomes_rx: Option<mpsc::UnboundedReceiver<FetchOutcome>>,
  poller: Option<Poller>,
}

impl App {
  /// `config` holds the saved preferences, already merged with any
  /// command-line override.
  pub fn new(display_mode: DisplayMode, http: Client, config: &Config) -> Self {
    let theme_index = theme_index(config.theme_name.as_deref());

    Self {
      dataset: Dataset::default(),
      criteria: Criteria::default(),
      cursor_position: 0,
      input_scroll: 0,
      mode: AppMode::Search,
      theme_index,
      display_mode,
      rows: Vec::new(),
      list_state: ListState::default(),
      loading: true,
      last_error: None,
      status_message: Some("Loading trending videos…".to_string()),
      last_updated: None,
      should_quit: false,
      thumb: ThumbnailState::default(),
      http,
      searcher: ApproxMatcher::default(),
      generation: Generation::default(),
      error_time: None,
      outcomes_rx: None,
      poller: None,
    }
  }

  /// Start the scheduled refresh; the first fetch begins immediately.
  pub fn start_polling<S: DatasetSource>(&mut self, source: S) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.poller = Some(Poller::start(source, constants().refresh_interval(), tx));
    self.outcomes_rx = Some(rx);
  }

  /// Stop the scheduled refresh (teardown).
  pub fn stop_polling(&mut self) {
    if let Some(poller) = self.poller.take() {
      poller.stop();
    }
    self.outcomes_rx = None;
  }

  pub fn request_refresh(&mut self) {
    if let Some(poller) = &self.poller {
      info!("manual refresh requested");
      poller.refresh_now();
      self.status_message = Some("Refreshing…".to_string());
    }
  }

  pub fn theme(&self) -> &'static Theme {
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    Config { theme_name: Some(self.theme().name.to_string()) }.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages. With nothing loaded the error is the whole
  /// screen, so it stays.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && !self.dataset.videos.is_empty()
      && t.elapsed() >= Duration::from_secs(constants().error_display_secs)
    {
      self.clear_error();
    }
  }

  // --- Data ---

  /// Drain finished fetches and thumbnail downloads.
  pub fn check_pending(&mut self) {
    let mut outcomes = Vec::new();
    if let Some(rx) = &mut self.outcomes_rx {
      while let Ok(outcome) = rx.try_recv() {
        outcomes.push(outcome);
      }
    }
    for outcome in outcomes {
      self.apply_outcome(outcome);
    }

    if let Some(mut rx) = self.thumb.rx.take() {
      match rx.try_recv() {
        Ok((video_id, result)) => {
          if self.thumb.video_id.as_deref() == Some(video_id.as_str()) {
            match result {
              Ok(image) => {
                self.thumb.image = Some(image);
                self.thumb.failed = false;
              }
              Err(e) => {
                debug!(err = %e, video_id = %video_id, "thumbnail unavailable");
                self.thumb.failed = true;
              }
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.thumb.rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.thumb.failed = true;
        }
      }
    }
  }

  /// Swap in a fetched dataset, unless a newer fetch has already landed.
  pub fn apply_outcome(&mut self, outcome: FetchOutcome) {
    let generation = outcome.generation;
    if !self.generation.accept(generation) {
      debug!(generation, "dropping stale fetch outcome");
      return;
    }
    self.loading = false;
    self.status_message = None;
    match outcome.result {
      Ok(dataset) => {
        info!(generation, videos = dataset.videos.len(), regions = dataset.regions.len(), "dataset replaced");
        self.dataset = dataset;
        self.last_updated = Some(Local::now());
        self.clear_error();
        self.recompute_view();
      }
      Err(e) => {
        error!(generation, err = %e, "fetch failed; keeping previous dataset");
        self.set_error(FETCH_ERROR_MESSAGE.to_string());
      }
    }
  }

  pub fn recompute_view(&mut self) {
    self.recompute_view_on(Local::now().date_naive());
  }

  /// Re-run the filter pipeline and rebuild the list rows, keeping the
  /// selected video selected when it survives.
  pub fn recompute_view_on(&mut self, today: NaiveDate) {
    let selected_id = self.selected_video().map(|v| v.id.clone());
    let groups = filter::run(&self.dataset.videos, &self.criteria, today, &self.searcher);
    self.rows = flatten(groups);

    let keep = selected_id.and_then(|id| self.rows.iter().position(|r| matches!(r, Row::Video(v) if v.id == id)));
    let first = self.rows.iter().position(|r| matches!(r, Row::Video(_)));
    self.list_state.select(keep.or(first));
    if self.rows.is_empty() {
      self.list_state = ListState::default();
    }
  }

  pub fn video_count(&self) -> usize {
    self.rows.iter().filter(|r| matches!(r, Row::Video(_))).count()
  }

  pub fn selected_video(&self) -> Option<&ProcessedRecord> {
    match self.rows.get(self.list_state.selected()?) {
      Some(Row::Video(v)) => Some(v),
      _ => None,
    }
  }

  /// Move to the next/previous card, skipping headings and wrapping around.
  pub fn move_selection(&mut self, forward: bool) {
    let cards: Vec<usize> =
      self.rows.iter().enumerate().filter(|(_, r)| matches!(r, Row::Video(_))).map(|(i, _)| i).collect();
    if cards.is_empty() {
      return;
    }
    let current = self.list_state.selected().and_then(|sel| cards.iter().position(|&i| i == sel));
    let next = match (current, forward) {
      (None, _) => 0,
      (Some(pos), true) => (pos + 1) % cards.len(),
      (Some(0), false) => cards.len() - 1,
      (Some(pos), false) => pos - 1,
    };
    self.list_state.select(Some(cards[next]));
  }

  /// Replace every filter at once, e.g. from command-line flags.
  pub fn set_criteria(&mut self, criteria: Criteria) {
    self.cursor_position = criteria.query.chars().count();
    self.criteria = criteria;
    self.recompute_view();
  }

  pub fn cycle_time_range(&mut self) {
    self.criteria.range = self.criteria.range.next();
    self.recompute_view();
  }

  /// All Regions -> each region in order -> back to All Regions.
  pub fn cycle_region(&mut self, forward: bool) {
    let regions = &self.dataset.regions;
    let current = match &self.criteria.region {
      RegionFilter::All => None,
      RegionFilter::Only(r) => regions.iter().position(|x| x == r),
    };
    // Slot 0 is "All"; slot i + 1 is regions[i].
    let slots = regions.len() + 1;
    let pos = current.map_or(0, |i| i + 1);
    let next = if forward { (pos + 1) % slots } else { (pos + slots - 1) % slots };
    self.criteria.region = if next == 0 { RegionFilter::All } else { RegionFilter::Only(regions[next - 1].clone()) };
    self.recompute_view();
  }

  // --- Thumbnails ---

  /// Start downloading the selected card's thumbnail if it isn't the one shown.
  pub fn sync_thumbnail(&mut self) {
    if !self.display_mode.shows_thumbnails() {
      return;
    }
    let Some(video_id) = self.selected_video().map(|v| v.id.clone()) else { return };
    if self.thumb.video_id.as_deref() == Some(video_id.as_str()) {
      return;
    }

    self.thumb = ThumbnailState { video_id: Some(video_id.clone()), ..ThumbnailState::default() };
    let client = self.http.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let result = fetch_thumbnail(&client, &video_id).await;
      let _ = tx.send((video_id, result));
    });
    self.thumb.rx = Some(rx);
  }

  // --- Browser ---

  pub fn open_selected(&mut self) {
    let Some(url) = self.selected_video().map(|v| v.video_url.clone()) else { return };
    if url.is_empty() {
      return;
    }
    #[cfg(target_os = "macos")]
    let cmd = "open";
    #[cfg(not(target_os = "macos"))]
    let cmd = "xdg-open";
    match std::process::Command::new(cmd)
      .arg(&url)
      .stdin(std::process::Stdio::null())
      .stdout(std::process::Stdio::null())
      .stderr(std::process::Stdio::null())
      .spawn()
    {
      Ok(mut child) => {
        info!(url = %url, "opened in browser");
        // Reap the child in a background thread to avoid zombie processes.
        std::thread::spawn(move || {
          let _ = child.wait();
        });
      }
      Err(e) => {
        warn!(err = %e, "failed to launch browser");
        self.set_error(format!("Failed to open browser: {}", e));
      }
    }
  }
}

fn flatten(groups: Vec<MonthGroup>) -> Vec<Row> {
  let mut rows = Vec::new();
  for group in groups {
    rows.push(Row::Header { label: group.label, count: group.videos.len() });
    rows.extend(group.videos.into_iter().map(Row::Video));
  }
  rows
}
