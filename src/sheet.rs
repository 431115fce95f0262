//! Google Sheets gviz adapter.
//!
//! The export endpoint answers with JSONP:
//!
//!   /*O_o*/
//!   google.visualization.Query.setResponse({"table":{"rows":[{"c":[{"v":1,"f":"1"},...]}]}});
//!
//! Cells are positional; see [`Column`] for the layout.

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::constants::constants;
use crate::dates::parse_sheet_date;
use crate::error::{FetchError, ParseError, SheetError};
use crate::model::{Dataset, RawRecord};
use crate::normalize::normalize;

static ENVELOPE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)google\.visualization\.Query\.setResponse\((.*)\);").expect("envelope pattern is valid")
});

/// Column positions in the sheet.
#[derive(Debug, Clone, Copy)]
enum Column {
  Rank = 0,
  Title = 1,
  Description = 2,
  PublishedDate = 3,
  VideoId = 4,
  VideoUrl = 5,
  ChannelName = 6,
  Thumbnails = 7,
  OutputDate = 8,
  TrendingRegion = 9,
}

#[derive(Debug, Deserialize)]
struct GvizResponse {
  table: Option<GvizTable>,
}

#[derive(Debug, Deserialize)]
struct GvizTable {
  rows: Option<Vec<GvizRow>>,
}

#[derive(Debug, Deserialize)]
struct GvizRow {
  #[serde(default)]
  c: Vec<Option<GvizCell>>,
}

#[derive(Debug, Default, Deserialize)]
struct GvizCell {
  #[serde(default)]
  v: Option<Value>,
  #[serde(default)]
  f: Option<String>,
}

impl GvizRow {
  fn cell(&self, col: Column) -> Option<&GvizCell> {
    self.c.get(col as usize).and_then(Option::as_ref)
  }

  fn raw(&self, col: Column) -> Option<&Value> {
    self.cell(col).and_then(|c| c.v.as_ref())
  }

  fn string(&self, col: Column) -> String {
    self.raw(col).map(coerce_string).unwrap_or_default()
  }

  fn to_record(&self) -> RawRecord {
    let date_cell = self.cell(Column::PublishedDate);
    let thumbnails = self.string(Column::Thumbnails);
    RawRecord {
      rank: self.raw(Column::Rank).map(coerce_number).unwrap_or(0.0),
      title: self.string(Column::Title),
      description: self.string(Column::Description),
      published_date: parse_sheet_date(date_cell.and_then(|c| c.v.as_ref()), date_cell.and_then(|c| c.f.as_deref())),
      video_id: self.string(Column::VideoId),
      video_url: self.string(Column::VideoUrl),
      channel_name: self.string(Column::ChannelName),
      thumbnails: if thumbnails.is_empty() { "{}".to_string() } else { thumbnails },
      output_date: self.string(Column::OutputDate),
      trending_region: self.string(Column::TrendingRegion),
    }
  }
}

/// Numeric cell coercion; anything unreadable is 0. Fractions are kept.
fn coerce_number(v: &Value) -> f64 {
  let n = match v {
    Value::Number(n) => n.as_f64().unwrap_or(0.0),
    Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
    Value::Bool(b) => f64::from(u8::from(*b)),
    _ => 0.0,
  };
  if n.is_finite() { n } else { 0.0 }
}

/// String cell coercion; null is empty and whole numbers print without `.0`.
fn coerce_string(v: &Value) -> String {
  match v {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    Value::Number(n) => match n.as_f64() {
      Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
      _ => n.to_string(),
    },
    other => other.to_string(),
  }
}

/// Pull the JSON argument out of the `setResponse(...)` callback.
pub fn extract_envelope(body: &str) -> Result<&str, ParseError> {
  ENVELOPE.captures(body).and_then(|c| c.get(1)).map(|m| m.as_str()).ok_or(ParseError::MissingEnvelope)
}

/// Decode a full response body into raw rows, dropping invalid ones.
pub fn parse_rows(body: &str) -> Result<Vec<RawRecord>, ParseError> {
  let json = extract_envelope(body)?;
  let response: GvizResponse = serde_json::from_str(json)?;
  let rows = response.table.and_then(|t| t.rows).filter(|r| !r.is_empty()).ok_or(ParseError::NoData)?;

  let total = rows.len();
  let records: Vec<RawRecord> = rows.iter().map(GvizRow::to_record).filter(RawRecord::is_valid).collect();
  debug!(total, valid = records.len(), "sheet: rows decoded");
  Ok(records)
}

/// Decode and normalize a response body.
pub fn parse_dataset(body: &str) -> Result<Dataset, ParseError> {
  Ok(normalize(parse_rows(body)?))
}

/// Anything that can produce a fresh dataset. The poller only needs this.
pub trait DatasetSource: Send + Sync + 'static {
  fn fetch_all(&self) -> impl Future<Output = Result<Dataset, SheetError>> + Send;
}

/// HTTP client for the trending sheet.
#[derive(Debug, Clone)]
pub struct SheetClient {
  http: Client,
  url: String,
}

impl SheetClient {
  pub fn new(http: Client) -> Self {
    Self::with_url(http, constants().sheet_url())
  }

  pub fn with_url(http: Client, url: impl Into<String>) -> Self {
    Self { http, url: url.into() }
  }
}

impl DatasetSource for SheetClient {
  async fn fetch_all(&self) -> Result<Dataset, SheetError> {
    info!(url = %self.url, "sheet: fetching");
    let response = self.http.get(&self.url).send().await?;
    let status = response.status();
    debug!(status = %status, "sheet: response received");
    if !status.is_success() {
      return Err(FetchError::Status(status).into());
    }
    let body = response.text().await?;
    let dataset = parse_dataset(&body)?;
    info!(videos = dataset.videos.len(), regions = dataset.regions.len(), "sheet: dataset ready");
    Ok(dataset)
  }
}
