use std::collections::{BTreeSet, HashMap};

use crate::dates::display_date;
use crate::model::{Dataset, ProcessedRecord, RawRecord};

/// Merge regional rows into one record per video (best rank wins, first seen
/// on ties), collect every region seen, and sort newest first.
pub fn normalize(raw: Vec<RawRecord>) -> Dataset {
  let mut regions = BTreeSet::new();
  // Insertion order is kept alongside the map so equal publish dates sort deterministically.
  let mut order: Vec<String> = Vec::new();
  let mut best: HashMap<String, RawRecord> = HashMap::new();

  for record in raw {
    if !record.trending_region.is_empty() {
      regions.insert(record.trending_region.clone());
    }
    match best.get(&record.video_id) {
      Some(existing) if record.rank >= existing.rank => {}
      Some(_) => {
        best.insert(record.video_id.clone(), record);
      }
      None => {
        order.push(record.video_id.clone());
        best.insert(record.video_id.clone(), record);
      }
    }
  }

  let mut videos: Vec<ProcessedRecord> = order
    .iter()
    .filter_map(|id| best.remove(id))
    .map(|v| ProcessedRecord {
      published_display: display_date(v.published_date),
      id: v.video_id,
      best_rank: v.rank,
      title: v.title,
      channel_name: v.channel_name,
      video_url: v.video_url,
      published_date: v.published_date,
      best_region: v.trending_region,
    })
    .collect();

  videos.sort_by(|a, b| b.published_date.cmp(&a.published_date));

  Dataset { videos, regions: regions.into_iter().collect() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dates::parse_date_literal;
  use std::collections::HashSet;

  fn row(rank: i32, id: &str, region: &str, date: &str) -> RawRecord {
    RawRecord {
      rank: f64::from(rank),
      title: format!("title {id}"),
      description: String::new(),
      published_date: parse_date_literal(date).unwrap(),
      video_id: id.to_string(),
      video_url: format!("https://www.youtube.com/watch?v={id}"),
      channel_name: format!("channel {id}"),
      thumbnails: "{}".to_string(),
      output_date: String::new(),
      trending_region: region.to_string(),
    }
  }

  #[test]
  fn two_regions_one_video() {
    let data = normalize(vec![row(2, "a", "US", "Date(2024,0,1)"), row(1, "a", "GB", "Date(2024,0,1)")]);
    assert_eq!(data.videos.len(), 1);
    let v = &data.videos[0];
    assert_eq!(v.id, "a");
    assert_eq!(v.best_rank, 1.0);
    assert_eq!(v.best_region, "GB");
    assert_eq!(v.published_display, "Jan 1, 2024");
    assert_eq!(data.regions, vec!["GB", "US"]);
  }

  #[test]
  fn best_rank_is_minimum_with_its_region() {
    let data = normalize(vec![
      row(7, "x", "JP", "Date(2024,4,2)"),
      row(3, "x", "KR", "Date(2024,4,2)"),
      row(5, "x", "DE", "Date(2024,4,2)"),
      row(4, "y", "FR", "Date(2024,4,1)"),
      row(9, "y", "CA", "Date(2024,4,1)"),
    ]);
    let x = data.videos.iter().find(|v| v.id == "x").unwrap();
    let y = data.videos.iter().find(|v| v.id == "y").unwrap();
    assert_eq!((x.best_rank, x.best_region.as_str()), (3.0, "KR"));
    assert_eq!((y.best_rank, y.best_region.as_str()), (4.0, "FR"));
  }

  #[test]
  fn equal_rank_keeps_first_seen() {
    let data = normalize(vec![row(2, "a", "US", "Date(2024,0,1)"), row(2, "a", "GB", "Date(2024,0,1)")]);
    assert_eq!(data.videos[0].best_region, "US");
  }

  #[test]
  fn region_set_includes_merge_losers_and_skips_empty() {
    let data = normalize(vec![
      row(1, "a", "US", "Date(2024,0,1)"),
      row(8, "a", "TW", "Date(2024,0,1)"),
      row(3, "b", "", "Date(2024,0,2)"),
      row(2, "c", "HK", "Date(2024,0,3)"),
    ]);
    assert_eq!(data.regions, vec!["HK", "TW", "US"]);
    let winners: HashSet<&str> = data.videos.iter().map(|v| v.best_region.as_str()).collect();
    assert!(!winners.contains("TW"));
  }

  #[test]
  fn sorted_newest_first() {
    let data = normalize(vec![
      row(1, "old", "US", "Date(2023,10,5)"),
      row(1, "new", "US", "Date(2024,1,20)"),
      row(1, "mid", "US", "Date(2024,0,9)"),
    ]);
    let ids: Vec<&str> = data.videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
  }

  #[test]
  fn normalizing_twice_is_identical() {
    let rows = vec![
      row(3, "a", "US", "Date(2024,0,1)"),
      row(1, "a", "GB", "Date(2024,0,1)"),
      row(2, "b", "JP", "Date(2024,0,1)"),
      row(4, "c", "JP", "Date(2023,5,1)"),
    ];
    assert_eq!(normalize(rows.clone()), normalize(rows));
  }

  #[test]
  fn empty_input() {
    assert_eq!(normalize(Vec::new()), Dataset::default());
  }
}
