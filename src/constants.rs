//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! with no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Google Sheet source
  pub sheet_id: String,
  pub sheet_name: String,

  // Polling
  pub refresh_interval_secs: u64,
  pub request_timeout_secs: u64,

  // Fuzzy search
  pub search_threshold: f64,
  pub search_location: usize,
  pub search_distance: usize,

  // Thumbnails
  pub thumbnail_host: String,
  pub thumbnail_tiers: Vec<String>,
  pub thumbnail_placeholder: String,

  // UI
  pub error_display_secs: u64,
}

impl Constants {
  /// The gviz JSON export endpoint for the configured sheet.
  pub fn sheet_url(&self) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:json&sheet={}", self.sheet_id, self.sheet_name)
  }

  pub fn refresh_interval(&self) -> Duration {
    Duration::from_secs(self.refresh_interval_secs)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed the first access panics in every test run.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
