use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, AppMode, Row};
use crate::filter::TimeRange;
use crate::graphics::{ThumbnailWidget, resize_for};
use crate::theme::{Theme, region_badge};

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, controls_area, status_area, main_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_controls(frame, app, controls_area);
  render_status(frame, app, status_area);
  render_main(frame, app, main_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let left = Line::from(vec![
    Span::styled(" ▶ trendboard ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled("YouTube trending", Style::default().fg(theme.muted)),
  ]);
  frame.render_widget(left, area);

  let updated = app.last_updated.map(|t| format!("updated {}  ", t.format("%H:%M"))).unwrap_or_default();
  let right_text = format!("{}v{} ", updated, env!("CARGO_PKG_VERSION"));
  let width = right_text.chars().count() as u16;
  let right = Line::from(Span::styled(right_text, Style::default().fg(theme.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width: width.min(area.width), ..area };
  frame.render_widget(right, right_area);
}

fn render_controls(frame: &mut Frame, app: &mut App, area: Rect) {
  let [search_area, range_area, region_area] =
    Layout::horizontal([Constraint::Min(20), Constraint::Length(19), Constraint::Length(16)]).areas(area);

  render_search(frame, app, search_area);

  let theme = app.theme();
  let range = Paragraph::new(Span::styled(app.criteria.range.label(), Style::default().fg(theme.fg)))
    .block(rounded(theme).title(" Range [Tab] ").title_style(Style::default().fg(theme.muted)))
    .alignment(Alignment::Center);
  frame.render_widget(range, range_area);

  let region = Paragraph::new(Span::styled(app.criteria.region.label(), Style::default().fg(theme.fg)))
    .block(rounded(theme).title(" Region ").title_style(Style::default().fg(theme.muted)))
    .alignment(Alignment::Center);
  frame.render_widget(region, region_area);
}

fn render_search(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.mode == AppMode::Search { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(" Search ")
    .title_style(Style::default().fg(border_color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let query = &app.criteria.query;
  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(query, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let paragraph = if query.is_empty() {
    Paragraph::new(Span::styled("Search by title, channel or region…", Style::default().fg(theme.muted)))
  } else {
    let visible: String = query
      .chars()
      .scan(0usize, |col, c| {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        let start = *col;
        *col += w;
        Some((start, *col, c))
      })
      .skip_while(|(_, end, _)| *end <= app.input_scroll)
      .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
      .map(|(_, _, c)| c)
      .collect();
    Paragraph::new(visible).style(Style::default().fg(theme.fg))
  };
  frame.render_widget(paragraph.block(input_block), area);

  if app.mode == AppMode::Search {
    let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else {
    let shown = app.video_count();
    let total = app.dataset.videos.len();
    let mut text = format!(" {} of {} videos", shown, total);
    if app.criteria.range != TimeRange::All {
      text.push_str(&format!(" · {}", app.criteria.range.label()));
    }
    (text, Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  if app.loading && app.dataset.videos.is_empty() {
    render_notice(frame, theme, area, "Loading trending videos…", theme.status);
  } else if app.dataset.videos.is_empty() && app.last_error.is_some() {
    render_notice(frame, theme, area, "Couldn't load videos. Press Ctrl+R to retry.", theme.error);
  } else if app.rows.is_empty() {
    render_notice(frame, theme, area, "No videos found.", theme.muted);
  } else {
    let [list_area, detail_area] =
      Layout::horizontal([Constraint::Percentage(58), Constraint::Percentage(42)]).areas(area);
    render_results(frame, app, list_area);
    render_detail(frame, app, detail_area);
  }
}

fn render_notice(frame: &mut Frame, theme: &Theme, area: Rect, text: &str, color: ratatui::style::Color) {
  let lines = vec![Line::from(""), Line::from(Span::styled(text.to_string(), Style::default().fg(color)))];
  frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center).block(rounded(theme)), area);
}

fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let mut card = 0usize;
  let items: Vec<ListItem> = app
    .rows
    .iter()
    .map(|row| match row {
      Row::Header { label, count } => {
        let noun = if *count == 1 { "video" } else { "videos" };
        ListItem::new(Line::from(vec![
          Span::styled(label.clone(), Style::default().fg(theme.heading).add_modifier(Modifier::BOLD)),
          Span::styled(format!("  {} {}", count, noun), Style::default().fg(theme.muted)),
        ]))
      }
      Row::Video(video) => {
        card += 1;
        let bg = if card % 2 == 0 { theme.stripe_bg } else { theme.bg };
        let rank = format!(" #{} ", video.best_rank);
        let title_max = inner_w.saturating_sub(rank.chars().count() + 1);
        let top = Line::from(vec![
          Span::styled(rank, Style::default().fg(theme.rank_fg).bg(theme.rank_bg).add_modifier(Modifier::BOLD)),
          Span::raw(" "),
          Span::styled(truncate_str(&video.title, title_max), Style::default().fg(theme.fg)),
        ]);

        let badge = format!(" {} ", video.best_region);
        let date = &video.published_display;
        let channel_max = inner_w.saturating_sub(badge.chars().count() + date.chars().count() + 4);
        let channel = truncate_str(&video.channel_name, channel_max);
        let gap = inner_w.saturating_sub(channel.chars().count() + badge.chars().count() + date.chars().count() + 2);
        let bottom = Line::from(vec![
          Span::styled(channel, Style::default().fg(theme.muted)),
          Span::raw(" ".repeat(gap)),
          Span::styled(badge, region_badge(theme, &video.best_region)),
          Span::raw("  "),
          Span::styled(date.clone(), Style::default().fg(theme.muted)),
        ]);
        ListItem::new(vec![top, bottom]).bg(bg)
      }
    })
    .collect();

  let list = List::new(items)
    .block(
      rounded(theme)
        .title(" Trending ")
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_detail(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let mut title = vec![Span::styled(" Details ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))];
  if app.display_mode.shows_thumbnails() {
    title.push(Span::styled(format!("[{}] ", app.display_mode.label().to_lowercase()), Style::default().fg(theme.muted)));
  }
  let block = rounded(theme).title(Line::from(title)).padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let Some(video) = app.selected_video().cloned() else { return };

  let info_area = if app.display_mode.shows_thumbnails() {
    let thumb_h = ((inner.width as f32 * 9.0 / 32.0).round() as u16).min(inner.height / 2);
    let [thumb_area, info_area] =
      Layout::vertical([Constraint::Length(thumb_h), Constraint::Min(1)]).areas(inner);
    render_thumbnail(frame, app, thumb_area, &video.id);
    info_area
  } else {
    inner
  };

  let width = info_area.width as usize;
  let label = |s: &'static str| Span::styled(s, Style::default().fg(theme.muted));
  let lines = vec![
    Line::from(""),
    Line::from(Span::styled(video.title.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(vec![label("Channel    "), Span::styled(video.channel_name.clone(), Style::default().fg(theme.fg))]),
    Line::from(vec![label("Published  "), Span::styled(video.published_display.clone(), Style::default().fg(theme.fg))]),
    Line::from(vec![label("Best rank  "), Span::styled(format!("#{}", video.best_rank), Style::default().fg(theme.fg))]),
    Line::from(vec![
      label("Region     "),
      Span::styled(format!(" {} ", video.best_region), region_badge(theme, &video.best_region)),
    ]),
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&video.video_url, width),
      Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
    )),
  ];
  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), info_area);
}

fn render_thumbnail(frame: &mut Frame, app: &mut App, area: Rect, video_id: &str) {
  let theme = app.theme();
  if area.is_empty() || app.thumb.video_id.as_deref() != Some(video_id) {
    return;
  }

  if let Some(image) = &app.thumb.image {
    let needs_resize = match &app.thumb.resized {
      Some((id, w, h, _)) => id != video_id || *w != area.width || *h != area.height,
      None => true,
    };
    if needs_resize {
      let resized = resize_for(image, app.display_mode, area);
      app.thumb.resized = Some((video_id.to_string(), area.width, area.height, resized));
    }
    if let Some((_, _, _, resized)) = &app.thumb.resized {
      frame.render_widget(ThumbnailWidget { image: resized, display_mode: app.display_mode }, area);
    }
  } else {
    let text = if app.thumb.failed { "Image Unavailable" } else { "Loading thumbnail…" };
    let lines = vec![Line::from(""), Line::from(Span::styled(text, Style::default().fg(theme.muted)))];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center).bg(theme.stripe_bg), area);
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let has_results = app.video_count() > 0;
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Search => {
      let mut k = vec![("Tab", "Range"), ("S-Tab", "Region"), ("^r", "Refresh"), ("^t", "Theme")];
      if has_results {
        k.push(("↓", "Results"));
      } else {
        k.push(("Esc", "Quit"));
      }
      k
    }
    AppMode::Results => vec![
      ("Enter", "Open"),
      ("j/k", "Navigate"),
      ("t", "Range"),
      ("r", "Region"),
      ("/", "Search"),
      ("^t", "Theme"),
      ("q", "Quit"),
    ],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("abc", 2), 2);
    assert_eq!(display_width("日本", 2), 4);
  }

  #[test]
  fn truncate_appends_ellipsis() {
    assert_eq!(truncate_str("short", 10), "short");
    assert_eq!(truncate_str("abcdefgh", 5), "abcd…");
  }
}
