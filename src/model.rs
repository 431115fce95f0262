use chrono::NaiveDate;

/// One spreadsheet row. Several rows may share a `video_id`, one per region it trended in.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
  pub rank: f64,
  pub title: String,
  pub description: String,
  pub published_date: NaiveDate,
  pub video_id: String,
  pub video_url: String,
  pub channel_name: String,
  /// Thumbnail metadata exactly as stored in the sheet (a JSON string).
  pub thumbnails: String,
  pub output_date: String,
  pub trending_region: String,
}

impl RawRecord {
  /// Rows without a video id or with a non-positive rank are noise.
  pub fn is_valid(&self) -> bool {
    !self.video_id.is_empty() && self.rank > 0.0
  }
}

/// A video after merging all of its regional rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
  pub id: String,
  pub best_rank: f64,
  pub title: String,
  pub channel_name: String,
  pub video_url: String,
  pub published_date: NaiveDate,
  /// e.g. `Mar 15, 2024`
  pub published_display: String,
  pub best_region: String,
}

/// Everything one fetch produces; the UI swaps it in wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
  /// Sorted by publish date, newest first.
  pub videos: Vec<ProcessedRecord>,
  /// Sorted, deduplicated region codes across all raw rows.
  pub regions: Vec<String>,
}
