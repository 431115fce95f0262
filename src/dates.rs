//! Calendar helpers for the loosely-typed date cells of the sheet export.
//!
//! gviz encodes dates as `Date(YYYY,M,D[,h,m,s])` literals with a zero-indexed
//! month. Everything here works on local calendar dates (`NaiveDate`).

use chrono::{DateTime, Local, NaiveDate, TimeDelta};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static DATE_LITERAL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"Date\((\d+),(\d+),(\d+)").expect("date literal pattern is valid"));

/// Sentinel for cells that could not be read as a date.
pub fn epoch() -> NaiveDate {
  DateTime::UNIX_EPOCH.date_naive()
}

/// Build a date from a year, a zero-indexed month and a day, rolling overflow
/// into neighbouring months and years (month 12 is January of the next year,
/// day 0 is the last day of the previous month).
pub fn calendar_date(year: i64, month0: i64, day: i64) -> Option<NaiveDate> {
  let total_months = year.checked_mul(12)?.checked_add(month0)?;
  let y = i32::try_from(total_months.div_euclid(12)).ok()?;
  let m = u32::try_from(total_months.rem_euclid(12) + 1).ok()?;
  let first = NaiveDate::from_ymd_opt(y, m, 1)?;
  first.checked_add_signed(TimeDelta::try_days(day.checked_sub(1)?)?)
}

/// Parse a `Date(YYYY,M,D...)` literal. Trailing time components are ignored.
pub fn parse_date_literal(s: &str) -> Option<NaiveDate> {
  let caps = DATE_LITERAL.captures(s)?;
  let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i64>().ok());
  calendar_date(num(1)?, num(2)?, num(3)?)
}

/// Resolve a date cell: the formatted hint wins, then the raw value, then the epoch.
/// Never fails; one bad cell must not sink the whole fetch.
pub fn parse_sheet_date(raw: Option<&Value>, formatted: Option<&str>) -> NaiveDate {
  if let Some(date) = formatted.and_then(parse_date_literal) {
    return date;
  }
  if let Some(Value::String(s)) = raw {
    if let Some(date) = parse_date_literal(s) {
      return date;
    }
    if let Ok(dt) = dateparser::parse_with_timezone(s.trim(), &Local) {
      return dt.with_timezone(&Local).date_naive();
    }
  }
  epoch()
}

/// Card date, e.g. `Mar 15, 2024`.
pub fn display_date(date: NaiveDate) -> String {
  date.format("%b %-d, %Y").to_string()
}

/// Group heading, e.g. `March 2024`.
pub fn month_label(date: NaiveDate) -> String {
  date.format("%B %Y").to_string()
}
