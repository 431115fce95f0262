use ratatui::style::{
  Color, Style,
  palette::tailwind::{self, Palette},
};

pub struct Theme {
  pub name: &'static str,
  pub dark: bool,
  pub bg: Color,
  pub fg: Color,
  pub muted: Color,
  pub accent: Color,
  pub border: Color,
  pub heading: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
  pub rank_fg: Color,
  pub rank_bg: Color,
}

pub static THEMES: [Theme; 2] = [
  Theme {
    name: "Light",
    dark: false,
    bg: tailwind::GRAY.c100,
    fg: tailwind::GRAY.c900,
    muted: tailwind::GRAY.c500,
    accent: tailwind::RED.c600,
    border: tailwind::GRAY.c300,
    heading: tailwind::GRAY.c800,
    highlight_fg: tailwind::GRAY.c900,
    highlight_bg: tailwind::RED.c100,
    stripe_bg: tailwind::WHITE,
    status: tailwind::BLUE.c600,
    error: tailwind::RED.c500,
    key_fg: tailwind::WHITE,
    key_bg: tailwind::GRAY.c600,
    rank_fg: tailwind::WHITE,
    rank_bg: tailwind::GRAY.c800,
  },
  Theme {
    name: "Dark",
    dark: true,
    bg: tailwind::GRAY.c900,
    fg: tailwind::GRAY.c100,
    muted: tailwind::GRAY.c400,
    accent: tailwind::RED.c500,
    border: tailwind::GRAY.c700,
    heading: tailwind::GRAY.c200,
    highlight_fg: tailwind::WHITE,
    highlight_bg: tailwind::GRAY.c700,
    stripe_bg: tailwind::GRAY.c800,
    status: tailwind::SKY.c400,
    error: tailwind::RED.c400,
    key_fg: tailwind::GRAY.c900,
    key_bg: tailwind::GRAY.c400,
    rank_fg: tailwind::WHITE,
    rank_bg: tailwind::BLACK,
  },
];

/// Index of the theme called `name`, falling back to the first one.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}

fn region_palette(region: &str) -> Option<&'static Palette> {
  let palette = match region {
    "US" => &tailwind::BLUE,
    "GB" => &tailwind::RED,
    "JP" => &tailwind::YELLOW,
    "KR" => &tailwind::GREEN,
    "DE" => &tailwind::INDIGO,
    "FR" => &tailwind::PURPLE,
    "CA" => &tailwind::PINK,
    "HK" => &tailwind::ORANGE,
    _ => return None,
  };
  Some(palette)
}

/// Badge colours for a region code; unknown regions (and TW) are grey.
pub fn region_badge(theme: &Theme, region: &str) -> Style {
  match (region_palette(region), theme.dark) {
    (Some(p), false) => Style::default().fg(p.c800).bg(p.c100),
    (Some(p), true) => Style::default().fg(p.c300).bg(p.c900),
    (None, false) => Style::default().fg(tailwind::GRAY.c800).bg(tailwind::GRAY.c100),
    (None, true) => Style::default().fg(tailwind::GRAY.c300).bg(tailwind::GRAY.c700),
  }
}
