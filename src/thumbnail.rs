use anyhow::{Result, anyhow};
use image::DynamicImage;
use reqwest::Client;
use tracing::debug;

use crate::constants::constants;

/// Candidate image URLs for a video, highest resolution first, ending with the
/// generic placeholder.
pub fn thumbnail_urls(video_id: &str) -> Vec<String> {
  let c = constants();
  c.thumbnail_tiers
    .iter()
    .map(|tier| format!("{}/{}/{}.jpg", c.thumbnail_host, video_id, tier))
    .chain(std::iter::once(c.thumbnail_placeholder.clone()))
    .collect()
}

/// Walk the fallback chain until one URL yields a decodable image.
pub async fn fetch_thumbnail(client: &Client, video_id: &str) -> Result<DynamicImage> {
  for url in thumbnail_urls(video_id) {
    let response = match client.get(&url).send().await {
      Ok(r) if r.status().is_success() => r,
      Ok(r) => {
        debug!(url = %url, status = %r.status(), "thumbnail: tier unavailable");
        continue;
      }
      Err(e) => {
        debug!(url = %url, err = %e, "thumbnail: request failed");
        continue;
      }
    };
    match response.bytes().await.map_err(anyhow::Error::from).and_then(|b| Ok(image::load_from_memory(&b)?)) {
      Ok(image) => return Ok(image),
      Err(e) => debug!(url = %url, err = %e, "thumbnail: undecodable body"),
    }
  }
  Err(anyhow!("Failed to fetch any thumbnail for video ID: {}", video_id))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tiers_descend_then_placeholder() {
    let urls = thumbnail_urls("abc123");
    assert_eq!(
      urls,
      vec![
        "https://i.ytimg.com/vi/abc123/maxresdefault.jpg".to_string(),
        "https://i.ytimg.com/vi/abc123/sddefault.jpg".to_string(),
        "https://i.ytimg.com/vi/abc123/hqdefault.jpg".to_string(),
        constants().thumbnail_placeholder.clone(),
      ]
    );
  }
}
