use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};

use crate::display::DisplayMode;

// --- Thumbnail Widget ---

pub struct ThumbnailWidget<'a> {
  pub image: &'a DynamicImage,
  pub display_mode: DisplayMode,
}

const ASCII_CHARS: [&str; 10] = [" ", ".", ":", "-", "=", "+", "*", "#", "%", "@"];

impl Widget for ThumbnailWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.display_mode {
      DisplayMode::Direct => render_direct(self.image, area, buf),
      DisplayMode::Ascii => render_ascii(self.image, area, buf),
      DisplayMode::Off => {}
    }
  }
}

/// Pixel size to resize a thumbnail to before drawing it into `area`.
/// Half blocks pack two pixel rows per cell; ASCII is one glyph per pixel
/// with cells roughly twice as tall as wide.
pub fn target_size(mode: DisplayMode, area: Rect) -> (u32, u32) {
  let w = u32::from(area.width).max(1);
  let h = match mode {
    DisplayMode::Direct => (w as f32 * 9.0 / 16.0) as u32,
    _ => (w as f32 * 9.0 / 32.0) as u32,
  };
  let max_h = match mode {
    DisplayMode::Direct => u32::from(area.height) * 2,
    _ => u32::from(area.height),
  };
  (w, h.clamp(1, max_h.max(1)))
}

pub fn resize_for(image: &DynamicImage, mode: DisplayMode, area: Rect) -> DynamicImage {
  let (w, h) = target_size(mode, area);
  image.resize_to_fill(w, h, FilterType::Triangle)
}

fn render_direct(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  // Image is already resized by the caller; just convert to RGB8.
  let resized = image.to_rgb8();
  let img_w = resized.width().min(area.width as u32);
  let img_h = resized.height();
  let cell_h = img_h.div_ceil(2);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(cell_h) / 2;

  for y in 0..cell_h.min(area.height as u32) {
    for x in 0..img_w {
      let upper = resized.get_pixel(x, y * 2);
      let lower_y = y * 2 + 1;
      let fg = Color::Rgb(upper[0], upper[1], upper[2]);
      let bg = if lower_y < img_h {
        let lower = resized.get_pixel(x, lower_y);
        Color::Rgb(lower[0], lower[1], lower[2])
      } else {
        Color::Reset
      };
      buf.set_string(cell_x(area, offset_x, x), cell_y(area, offset_y, y), "▀", Style::default().fg(fg).bg(bg));
    }
  }
}

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  // Image is already resized by the caller; just convert to grayscale.
  let resized = image.to_luma8();
  let img_w = resized.width().min(area.width as u32);
  let img_h = resized.height().min(area.height as u32);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(img_h) / 2;

  for y in 0..img_h {
    for x in 0..img_w {
      let pixel = resized.get_pixel(x, y)[0];
      let idx = ((pixel as f32 / 255.0) * (ASCII_CHARS.len() - 1) as f32).round() as usize;
      let idx = idx.min(ASCII_CHARS.len() - 1);
      buf.set_string(cell_x(area, offset_x, x), cell_y(area, offset_y, y), ASCII_CHARS[idx], Style::default());
    }
  }
}

fn cell_x(area: Rect, offset: u32, x: u32) -> u16 {
  area.x.saturating_add(u16::try_from(offset + x).unwrap_or(u16::MAX))
}

fn cell_y(area: Rect, offset: u32, y: u32) -> u16 {
  area.y.saturating_add(u16::try_from(offset + y).unwrap_or(u16::MAX))
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  #[test]
  fn direct_target_is_16_by_9_in_pixel_rows() {
    assert_eq!(target_size(DisplayMode::Direct, Rect::new(0, 0, 32, 20)), (32, 18));
  }

  #[test]
  fn target_height_is_clamped_to_area() {
    assert_eq!(target_size(DisplayMode::Ascii, Rect::new(0, 0, 64, 5)), (64, 5));
    assert_eq!(target_size(DisplayMode::Direct, Rect::new(0, 0, 64, 5)), (64, 10));
  }

  #[test]
  fn direct_render_fills_cells_with_half_blocks() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])));
    let area = Rect::new(0, 0, 4, 2);
    let mut buf = Buffer::empty(area);
    ThumbnailWidget { image: &image, display_mode: DisplayMode::Direct }.render(area, &mut buf);
    assert_eq!(buf[(0, 0)].symbol(), "▀");
    assert_eq!(buf[(3, 1)].fg, Color::Rgb(255, 0, 0));
  }

  #[test]
  fn ascii_render_maps_brightness() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 1, Rgb([255, 255, 255])));
    let area = Rect::new(0, 0, 2, 1);
    let mut buf = Buffer::empty(area);
    ThumbnailWidget { image: &image, display_mode: DisplayMode::Ascii }.render(area, &mut buf);
    assert_eq!(buf[(0, 0)].symbol(), "@");
  }
}
