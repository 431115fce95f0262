//! Plain-text rendering of grouped results for `--print`.

use std::fmt::Write;

use crate::filter::MonthGroup;

pub fn render(groups: &[MonthGroup]) -> String {
  let mut out = String::new();
  if groups.is_empty() {
    out.push_str("No videos found.\n");
    return out;
  }
  for (i, group) in groups.iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    let noun = if group.videos.len() == 1 { "video" } else { "videos" };
    let _ = writeln!(out, "{} ({} {})", group.label, group.videos.len(), noun);
    for video in &group.videos {
      let _ = writeln!(
        out,
        "  #{:<3} {}  ·  {}  [{}]  {}",
        video.best_rank, video.title, video.channel_name, video.best_region, video.published_display
      );
      if !video.video_url.is_empty() {
        let _ = writeln!(out, "       {}", video.video_url);
      }
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::ProcessedRecord;
  use chrono::NaiveDate;

  fn video(id: &str, rank: f64) -> ProcessedRecord {
    ProcessedRecord {
      id: id.to_string(),
      best_rank: rank,
      title: format!("Title {id}"),
      channel_name: "Chan".to_string(),
      video_url: format!("https://www.youtube.com/watch?v={id}"),
      published_date: NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
      published_display: "Mar 18, 2024".to_string(),
      best_region: "US".to_string(),
    }
  }

  #[test]
  fn empty_result_says_so() {
    assert_eq!(render(&[]), "No videos found.\n");
  }

  #[test]
  fn groups_are_headed_and_listed() {
    let groups = vec![
      MonthGroup { label: "March 2024".to_string(), videos: vec![video("a", 1.0), video("b", 12.0)] },
      MonthGroup { label: "February 2024".to_string(), videos: vec![video("c", 3.0)] },
    ];
    let text = render(&groups);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "March 2024 (2 videos)");
    assert_eq!(lines[1], "  #1   Title a  ·  Chan  [US]  Mar 18, 2024");
    assert_eq!(lines[2], "       https://www.youtube.com/watch?v=a");
    assert!(text.contains("\nFebruary 2024 (1 video)\n"));
  }
}
