//! Typo-tolerant ranked text search over processed records.
//!
//! [`ApproxMatcher`] scores each searchable field by the cheapest edit-distance
//! alignment of the query anywhere inside it, penalised by how far from the
//! expected location the alignment starts:
//!
//!   score = errors / query_len + |start - location| / distance
//!
//! 0.0 is a perfect match, 1.0 a complete mismatch. A field matches when its
//! score is at or below the threshold.

use crate::constants::constants;
use crate::model::ProcessedRecord;

/// A matched record with its relevance score (lower is better).
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
  pub record: &'a ProcessedRecord,
  pub score: f64,
}

/// Narrow seam for the fuzzy search capability; any ranked matcher fits.
pub trait FuzzySearch {
  /// Matches in relevance order, best first. Ties keep corpus order.
  fn search<'a>(&self, corpus: &'a [ProcessedRecord], query: &str) -> Vec<SearchHit<'a>>;
}

#[derive(Debug, Clone, Copy)]
pub struct ApproxMatcher {
  pub threshold: f64,
  pub location: usize,
  pub distance: usize,
}

impl Default for ApproxMatcher {
  fn default() -> Self {
    let c = constants();
    Self { threshold: c.search_threshold, location: c.search_location, distance: c.search_distance }
  }
}

impl ApproxMatcher {
  /// Score a single field, or `None` when it doesn't match.
  pub fn score_field(&self, pattern: &[char], text: &str) -> Option<f64> {
    if pattern.is_empty() {
      return None;
    }
    let text: Vec<char> = text.to_lowercase().chars().collect();
    if text == pattern {
      return Some(0.0);
    }
    let score = best_alignment(pattern, &text)
      .into_iter()
      .map(|(errors, start)| self.alignment_score(pattern.len(), errors, start))
      .fold(f64::INFINITY, f64::min);
    (score <= self.threshold).then_some(score)
  }

  fn alignment_score(&self, pattern_len: usize, errors: usize, start: usize) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    let proximity = start.abs_diff(self.location);
    if self.distance == 0 {
      return if proximity == 0 { accuracy } else { 1.0 };
    }
    accuracy + proximity as f64 / self.distance as f64
  }

  /// Combined score over the searchable keys: the product of the matched
  /// key scores, so matching several keys ranks higher.
  fn score_record(&self, pattern: &[char], record: &ProcessedRecord) -> Option<f64> {
    let keys = [record.title.as_str(), record.channel_name.as_str(), record.best_region.as_str()];
    keys
      .iter()
      .filter_map(|text| self.score_field(pattern, text))
      .map(|s| s.max(f64::EPSILON))
      .reduce(|acc, s| acc * s)
  }
}

impl FuzzySearch for ApproxMatcher {
  fn search<'a>(&self, corpus: &'a [ProcessedRecord], query: &str) -> Vec<SearchHit<'a>> {
    let pattern: Vec<char> = query.trim().to_lowercase().chars().collect();
    if pattern.is_empty() {
      return Vec::new();
    }
    let mut hits: Vec<SearchHit<'a>> = corpus
      .iter()
      .filter_map(|record| self.score_record(&pattern, record).map(|score| SearchHit { record, score }))
      .collect();
    // Stable sort keeps corpus order for equal scores.
    hits.sort_by(|a, b| a.score.total_cmp(&b.score));
    hits
  }
}

/// For every end position in `text`, the cheapest alignment of the whole
/// pattern ending there, as `(errors, start)`. Sellers' variant of the
/// edit-distance table: the pattern may begin anywhere in the text for free.
fn best_alignment(pattern: &[char], text: &[char]) -> Vec<(usize, usize)> {
  let m = pattern.len();
  // (cost, start) per pattern prefix length for the previous text column.
  let mut prev: Vec<(usize, usize)> = (0..=m).map(|i| (i, 0)).collect();
  let mut cur = prev.clone();
  let mut ends = Vec::with_capacity(text.len());

  for (j, &tc) in text.iter().enumerate() {
    cur[0] = (0, j + 1);
    for i in 1..=m {
      let subst = (prev[i - 1].0 + usize::from(pattern[i - 1] != tc), prev[i - 1].1);
      let skip_text = (prev[i].0 + 1, prev[i].1);
      let skip_pattern = (cur[i - 1].0 + 1, cur[i - 1].1);
      cur[i] = subst.min(skip_text).min(skip_pattern);
    }
    ends.push(cur[m]);
    std::mem::swap(&mut prev, &mut cur);
  }
  ends
}
