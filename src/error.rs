use reqwest::StatusCode;
use thiserror::Error;

/// Why a sheet fetch failed. Both kinds are non-fatal to the dashboard.
#[derive(Error, Debug)]
pub enum SheetError {
  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error(transparent)]
  Parse(#[from] ParseError),
}

#[derive(Error, Debug)]
pub enum FetchError {
  #[error("network error: {0}")]
  Network(#[from] reqwest::Error),

  #[error("sheet responded with HTTP {0}")]
  Status(StatusCode),
}

#[derive(Error, Debug)]
pub enum ParseError {
  #[error("response is not a gviz setResponse(...) envelope")]
  MissingEnvelope,

  #[error("invalid JSON payload: {0}")]
  InvalidJson(#[from] serde_json::Error),

  #[error("no data found in sheet or sheet is empty")]
  NoData,
}

impl From<reqwest::Error> for SheetError {
  fn from(e: reqwest::Error) -> Self {
    SheetError::Fetch(FetchError::Network(e))
  }
}
