use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('c') => {
        app.should_quit = true;
        return;
      }
      KeyCode::Char('t') => {
        app.next_theme();
        return;
      }
      KeyCode::Char('r') => {
        app.request_refresh();
        return;
      }
      KeyCode::Char('o') => {
        app.open_selected();
        return;
      }
      _ => {}
    }
  }

  match key.code {
    KeyCode::Tab => {
      app.cycle_time_range();
      return;
    }
    KeyCode::BackTab => {
      app.cycle_region(true);
      return;
    }
    _ => {}
  }

  match app.mode {
    AppMode::Search => handle_search_key(app, key),
    AppMode::Results => handle_results_key(app, key),
  }
}

fn handle_search_key(app: &mut App, key: event::KeyEvent) {
  let query = &mut app.criteria.query;
  match key.code {
    KeyCode::Enter | KeyCode::Down => {
      if app.video_count() > 0 {
        app.mode = AppMode::Results;
      }
    }
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(query, app.cursor_position);
      query.insert(byte_idx, c);
      app.cursor_position += 1;
      app.recompute_view();
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(query, app.cursor_position);
        query.remove(byte_idx);
        app.recompute_view();
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < query.chars().count() {
        let byte_idx = char_to_byte_index(query, app.cursor_position);
        query.remove(byte_idx);
        app.recompute_view();
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < query.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = query.chars().count();
    }
    KeyCode::Esc => {
      if !query.is_empty() {
        query.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
        app.recompute_view();
      } else if app.video_count() > 0 {
        app.mode = AppMode::Results;
      } else {
        app.should_quit = true;
      }
    }
    _ => {}
  }
}

fn handle_results_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter | KeyCode::Char('o') => app.open_selected(),
    KeyCode::Down | KeyCode::Char('j') => app.move_selection(true),
    KeyCode::Up | KeyCode::Char('k') => app.move_selection(false),
    KeyCode::Char('t') => app.cycle_time_range(),
    KeyCode::Char('r') => app.cycle_region(true),
    KeyCode::Char('R') => app.cycle_region(false),
    KeyCode::Char('/') | KeyCode::Esc => {
      app.mode = AppMode::Search;
      app.cursor_position = app.criteria.query.chars().count();
    }
    KeyCode::Char('q') => app.should_quit = true,
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Config;
  use crate::display::DisplayMode;
  use crate::filter::{RegionFilter, TimeRange};
  use crate::model::{Dataset, ProcessedRecord};
  use crate::poller::FetchOutcome;
  use chrono::NaiveDate;
  use ratatui::crossterm::event::KeyEvent;
  use reqwest::Client;

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0); // 'a'
    assert_eq!(char_to_byte_index(s, 1), 1); // 'é' starts at byte 1
    assert_eq!(char_to_byte_index(s, 2), 3); // '日' starts at byte 3
    assert_eq!(char_to_byte_index(s, 3), 6); // past end
  }

  #[test]
  fn char_to_byte_empty() {
    assert_eq!(char_to_byte_index("", 0), 0);
    assert_eq!(char_to_byte_index("", 5), 0);
  }

  // --- key handling ---

  fn loaded_app() -> App {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let record = |id: &str, title: &str, region: &str| ProcessedRecord {
      id: id.to_string(),
      best_rank: 1.0,
      title: title.to_string(),
      channel_name: "channel".to_string(),
      video_url: String::new(),
      published_date: date,
      published_display: "Mar 1, 2024".to_string(),
      best_region: region.to_string(),
    };
    let mut app = App::new(DisplayMode::Off, Client::new(), &Config::default());
    let dataset = Dataset {
      videos: vec![record("a", "Rust conference", "US"), record("b", "Cooking show", "JP")],
      regions: vec!["JP".to_string(), "US".to_string()],
    };
    app.apply_outcome(FetchOutcome { generation: 1, result: Ok(dataset) });
    app
  }

  fn press(app: &mut App, code: KeyCode) {
    handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
  }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  #[test]
  fn typing_filters_live() {
    let mut app = loaded_app();
    type_str(&mut app, "cooking");
    assert_eq!(app.criteria.query, "cooking");
    assert_eq!(app.video_count(), 1);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.criteria.query, "");
    assert_eq!(app.video_count(), 2);
  }

  #[test]
  fn editing_respects_cursor() {
    let mut app = loaded_app();
    type_str(&mut app, "rst");
    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Char('u'));
    assert_eq!(app.criteria.query, "rust");
    press(&mut app, KeyCode::Home);
    press(&mut app, KeyCode::Delete);
    assert_eq!(app.criteria.query, "ust");
  }

  #[test]
  fn tab_cycles_range_and_backtab_cycles_region() {
    let mut app = loaded_app();
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.criteria.range, TimeRange::Week);
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.criteria.region, RegionFilter::from("JP"));
  }

  #[test]
  fn results_mode_navigation_and_back_to_search() {
    let mut app = loaded_app();
    press(&mut app, KeyCode::Down);
    assert_eq!(app.mode, AppMode::Results);
    let first = app.selected_video().unwrap().id.clone();
    press(&mut app, KeyCode::Char('j'));
    assert_ne!(app.selected_video().unwrap().id, first);
    press(&mut app, KeyCode::Char('/'));
    assert_eq!(app.mode, AppMode::Search);
  }

  #[test]
  fn quit_keys() {
    let mut app = loaded_app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);

    let mut app = loaded_app();
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);
  }
}
