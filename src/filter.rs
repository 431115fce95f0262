use chrono::{Datelike, Months, NaiveDate, TimeDelta};
use clap::ValueEnum;

use crate::dates::{calendar_date, month_label};
use crate::model::ProcessedRecord;
use crate::search::FuzzySearch;

/// Region selector value meaning "no region constraint".
pub const ALL_REGIONS: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegionFilter {
  #[default]
  All,
  Only(String),
}

impl RegionFilter {
  pub fn matches(&self, record: &ProcessedRecord) -> bool {
    match self {
      RegionFilter::All => true,
      RegionFilter::Only(region) => record.best_region == *region,
    }
  }

  pub fn label(&self) -> &str {
    match self {
      RegionFilter::All => "All Regions",
      RegionFilter::Only(region) => region,
    }
  }
}

impl From<&str> for RegionFilter {
  fn from(s: &str) -> Self {
    if s == ALL_REGIONS { RegionFilter::All } else { RegionFilter::Only(s.to_string()) }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TimeRange {
  #[default]
  All,
  Week,
  Month,
  #[value(name = "3months")]
  ThreeMonths,
  #[value(name = "since_august")]
  SinceAugust,
}

impl TimeRange {
  pub const ALL: [TimeRange; 5] =
    [TimeRange::All, TimeRange::Week, TimeRange::Month, TimeRange::ThreeMonths, TimeRange::SinceAugust];

  pub fn label(self) -> &'static str {
    match self {
      TimeRange::All => "All Time",
      TimeRange::Week => "This Week",
      TimeRange::Month => "This Month",
      TimeRange::ThreeMonths => "Last 3 Months",
      TimeRange::SinceAugust => "Since August",
    }
  }

  pub fn next(self) -> Self {
    let idx = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }

  /// Whether a publish date falls inside the range as seen on `today`.
  pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
    match self {
      TimeRange::All => true,
      TimeRange::Week => date >= today - TimeDelta::days(7),
      TimeRange::Month => date.year() == today.year() && date.month() == today.month(),
      TimeRange::ThreeMonths => date >= three_months_before(today),
      TimeRange::SinceAugust => date >= last_august_first(today),
    }
  }
}

/// Same day-of-month three months back, overflowing into the next month
/// when that day doesn't exist (May 31 -> Mar 3 in a non-leap year).
fn three_months_before(today: NaiveDate) -> NaiveDate {
  calendar_date(i64::from(today.year()), i64::from(today.month0()) - 3, i64::from(today.day()))
    .or_else(|| today.checked_sub_months(Months::new(3)))
    .unwrap_or(NaiveDate::MIN)
}

/// Aug 1 of this year once it has passed, otherwise Aug 1 of last year.
fn last_august_first(today: NaiveDate) -> NaiveDate {
  let this_year = NaiveDate::from_ymd_opt(today.year(), 8, 1).unwrap_or(NaiveDate::MIN);
  if today >= this_year { this_year } else { NaiveDate::from_ymd_opt(today.year() - 1, 8, 1).unwrap_or(NaiveDate::MIN) }
}

/// Everything the user can narrow the list by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
  pub query: String,
  pub region: RegionFilter,
  pub range: TimeRange,
}

/// Videos published in one calendar month, e.g. "March 2024".
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
  pub label: String,
  pub videos: Vec<ProcessedRecord>,
}

/// Fuzzy search first (relevance order), then region and time-range predicates.
/// With an empty query the incoming date order is kept.
pub fn apply<'a>(
  videos: &'a [ProcessedRecord],
  criteria: &Criteria,
  today: NaiveDate,
  searcher: &dyn FuzzySearch,
) -> Vec<&'a ProcessedRecord> {
  let candidates: Vec<&ProcessedRecord> = if criteria.query.trim().is_empty() {
    videos.iter().collect()
  } else {
    searcher.search(videos, &criteria.query).into_iter().map(|hit| hit.record).collect()
  };

  candidates
    .into_iter()
    .filter(|v| criteria.region.matches(v) && criteria.range.contains(v.published_date, today))
    .collect()
}

/// Group by month label in first-seen order; members keep their incoming order.
pub fn group_by_month<'a>(videos: impl IntoIterator<Item = &'a ProcessedRecord>) -> Vec<MonthGroup> {
  let mut groups: Vec<MonthGroup> = Vec::new();
  for video in videos {
    let label = month_label(video.published_date);
    match groups.iter_mut().find(|g| g.label == label) {
      Some(group) => group.videos.push(video.clone()),
      None => groups.push(MonthGroup { label, videos: vec![video.clone()] }),
    }
  }
  groups
}

/// The whole pipeline: filter, then group.
pub fn run(
  videos: &[ProcessedRecord],
  criteria: &Criteria,
  today: NaiveDate,
  searcher: &dyn FuzzySearch,
) -> Vec<MonthGroup> {
  group_by_month(apply(videos, criteria, today, searcher))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dates::display_date;
  use crate::search::ApproxMatcher;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn video(id: &str, title: &str, region: &str, date: NaiveDate) -> ProcessedRecord {
    ProcessedRecord {
      id: id.to_string(),
      best_rank: 1.0,
      title: title.to_string(),
      channel_name: format!("{id} channel"),
      video_url: String::new(),
      published_date: date,
      published_display: display_date(date),
      best_region: region.to_string(),
    }
  }

  fn matcher() -> ApproxMatcher {
    ApproxMatcher { threshold: 0.4, location: 0, distance: 100 }
  }

  fn ids(videos: &[&ProcessedRecord]) -> Vec<String> {
    videos.iter().map(|v| v.id.clone()).collect()
  }

  #[test]
  fn month_range_is_calendar_month() {
    let today = ymd(2024, 3, 20);
    assert!(TimeRange::Month.contains(ymd(2024, 3, 1), today));
    assert!(!TimeRange::Month.contains(ymd(2024, 2, 28), today));
    assert!(!TimeRange::Month.contains(ymd(2023, 3, 15), today));
  }

  #[test]
  fn week_range_includes_boundary() {
    let today = ymd(2024, 3, 20);
    assert!(TimeRange::Week.contains(ymd(2024, 3, 13), today));
    assert!(!TimeRange::Week.contains(ymd(2024, 3, 12), today));
  }

  #[test]
  fn since_august_boundary_depends_on_today() {
    assert_eq!(last_august_first(ymd(2024, 5, 1)), ymd(2023, 8, 1));
    assert_eq!(last_august_first(ymd(2024, 9, 1)), ymd(2024, 8, 1));
    assert_eq!(last_august_first(ymd(2024, 8, 1)), ymd(2024, 8, 1));
    assert!(TimeRange::SinceAugust.contains(ymd(2023, 8, 1), ymd(2024, 5, 1)));
    assert!(!TimeRange::SinceAugust.contains(ymd(2023, 7, 31), ymd(2024, 5, 1)));
    assert!(!TimeRange::SinceAugust.contains(ymd(2024, 7, 31), ymd(2024, 9, 1)));
  }

  #[test]
  fn three_months_keeps_day_of_month() {
    assert_eq!(three_months_before(ymd(2024, 5, 15)), ymd(2024, 2, 15));
    assert_eq!(three_months_before(ymd(2024, 2, 10)), ymd(2023, 11, 10));
    assert_eq!(three_months_before(ymd(2023, 5, 31)), ymd(2023, 3, 3));
  }

  #[test]
  fn all_range_has_no_constraint() {
    assert!(TimeRange::All.contains(crate::dates::epoch(), ymd(2024, 1, 1)));
  }

  #[test]
  fn range_cycle_wraps() {
    assert_eq!(TimeRange::All.next(), TimeRange::Week);
    assert_eq!(TimeRange::SinceAugust.next(), TimeRange::All);
  }

  #[test]
  fn range_names_match_selector_values() {
    assert_eq!(TimeRange::from_str("3months", true), Ok(TimeRange::ThreeMonths));
    assert_eq!(TimeRange::from_str("since_august", true), Ok(TimeRange::SinceAugust));
    assert_eq!(TimeRange::from_str("week", true), Ok(TimeRange::Week));
  }

  #[test]
  fn region_sentinel() {
    assert_eq!(RegionFilter::from("All"), RegionFilter::All);
    assert_eq!(RegionFilter::from("US"), RegionFilter::Only("US".to_string()));
    let v = video("a", "t", "US", ymd(2024, 1, 1));
    assert!(RegionFilter::All.matches(&v));
    assert!(RegionFilter::from("US").matches(&v));
    assert!(!RegionFilter::from("GB").matches(&v));
  }

  #[test]
  fn empty_query_keeps_date_order_and_applies_predicates() {
    let today = ymd(2024, 3, 20);
    let videos = vec![
      video("a", "Alpha", "US", ymd(2024, 3, 18)),
      video("b", "Bravo", "GB", ymd(2024, 3, 10)),
      video("c", "Charlie", "US", ymd(2024, 2, 1)),
    ];
    let criteria = Criteria { region: RegionFilter::from("US"), ..Criteria::default() };
    assert_eq!(ids(&apply(&videos, &criteria, today, &matcher())), vec!["a", "c"]);

    let criteria = Criteria { range: TimeRange::Month, ..Criteria::default() };
    assert_eq!(ids(&apply(&videos, &criteria, today, &matcher())), vec!["a", "b"]);
  }

  #[test]
  fn query_narrows_before_predicates_in_relevance_order() {
    let today = ymd(2024, 3, 20);
    let videos = vec![
      video("late", "Top 10 football goals", "US", ymd(2024, 3, 18)),
      video("early", "Football", "US", ymd(2024, 3, 1)),
      video("other", "Cooking show", "US", ymd(2024, 3, 2)),
      video("gb", "Football", "GB", ymd(2024, 3, 3)),
    ];
    let criteria = Criteria { query: "football".to_string(), region: RegionFilter::from("US"), range: TimeRange::All };
    assert_eq!(ids(&apply(&videos, &criteria, today, &matcher())), vec!["early", "late"]);
  }

  #[test]
  fn groups_keep_first_seen_order() {
    let videos = vec![
      video("1", "a", "US", ymd(2024, 3, 18)),
      video("2", "b", "US", ymd(2024, 2, 10)),
      video("3", "c", "US", ymd(2024, 3, 1)),
      video("4", "d", "US", ymd(2023, 12, 24)),
    ];
    let groups = group_by_month(&videos);
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["March 2024", "February 2024", "December 2023"]);
    assert_eq!(groups[0].videos.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(), vec!["1", "3"]);
  }

  #[test]
  fn groups_concatenate_to_the_filtered_list() {
    let today = ymd(2024, 3, 20);
    // Newest first, as normalize() emits them.
    let videos = vec![
      video("1", "news today", "US", ymd(2024, 3, 18)),
      video("2", "news daily", "US", ymd(2024, 3, 1)),
      video("3", "news recap", "GB", ymd(2024, 1, 10)),
      video("4", "news night", "JP", ymd(2024, 1, 2)),
      video("5", "weather", "US", ymd(2023, 12, 24)),
    ];
    for criteria in [
      Criteria::default(),
      Criteria { region: RegionFilter::from("US"), ..Criteria::default() },
      Criteria { range: TimeRange::ThreeMonths, ..Criteria::default() },
    ] {
      let filtered = apply(&videos, &criteria, today, &matcher());
      let flattened: Vec<ProcessedRecord> =
        run(&videos, &criteria, today, &matcher()).into_iter().flat_map(|g| g.videos).collect();
      let expected: Vec<ProcessedRecord> = filtered.into_iter().cloned().collect();
      assert_eq!(flattened, expected, "criteria {criteria:?}");
    }
  }

  #[test]
  fn interleaved_months_are_merged_into_the_first_group() {
    let videos = vec![
      video("1", "a", "US", ymd(2024, 3, 18)),
      video("2", "b", "US", ymd(2024, 1, 10)),
      video("3", "c", "US", ymd(2024, 3, 1)),
    ];
    let groups = group_by_month(&videos);
    let shape: Vec<(&str, Vec<&str>)> =
      groups.iter().map(|g| (g.label.as_str(), g.videos.iter().map(|v| v.id.as_str()).collect())).collect();
    assert_eq!(shape, vec![("March 2024", vec!["1", "3"]), ("January 2024", vec!["2"])]);
  }

  #[test]
  fn empty_input_yields_no_groups() {
    assert!(run(&[], &Criteria::default(), ymd(2024, 1, 1), &matcher()).is_empty());
  }
}
