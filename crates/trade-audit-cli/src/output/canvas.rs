//! Pixel-level drawing primitives on top of `image::RgbImage`.

use image::{Rgb, RgbImage};

/// Dashboard palette
pub mod colors {
    use image::Rgb;

    pub const GREEN: Rgb<u8> = Rgb([0, 200, 83]);
    pub const RED: Rgb<u8> = Rgb([255, 82, 82]);
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const LIGHT_GRAY: Rgb<u8> = Rgb([200, 200, 200]);
    pub const GRID_GRAY: Rgb<u8> = Rgb([225, 225, 225]);
}

/// A rectangular plotting area in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Panel {
    pub fn right(&self) -> u32 {
        self.x + self.width.saturating_sub(1)
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height.saturating_sub(1)
    }

    /// Map `frac` in [0, 1] to a column.
    pub fn x_at(&self, frac: f64) -> i64 {
        self.x as i64 + (frac.clamp(0.0, 1.0) * self.width.saturating_sub(1) as f64).round() as i64
    }

    /// Map `value` in [lo, hi] to a row, `hi` at the top.
    pub fn y_at(&self, value: f64, lo: f64, hi: f64) -> i64 {
        let span = if hi > lo { hi - lo } else { 1.0 };
        let frac = ((value - lo) / span).clamp(0.0, 1.0);
        self.bottom() as i64 - (frac * self.height.saturating_sub(1) as f64).round() as i64
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

pub fn draw_filled_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for py in y..y.saturating_add(height) {
        for px in x..x.saturating_add(width) {
            put(img, px as i64, py as i64, color);
        }
    }
}

pub fn draw_rect_outline(img: &mut RgbImage, panel: &Panel, color: Rgb<u8>) {
    draw_horizontal_line(img, panel.y as i64, panel.x as i64, panel.right() as i64, color);
    draw_horizontal_line(img, panel.bottom() as i64, panel.x as i64, panel.right() as i64, color);
    draw_vertical_line(img, panel.x as i64, panel.y as i64, panel.bottom() as i64, color);
    draw_vertical_line(img, panel.right() as i64, panel.y as i64, panel.bottom() as i64, color);
}

pub fn draw_vertical_line(img: &mut RgbImage, x: i64, y1: i64, y2: i64, color: Rgb<u8>) {
    let (start, end) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    for y in start..=end {
        put(img, x, y, color);
    }
}

pub fn draw_horizontal_line(img: &mut RgbImage, y: i64, x1: i64, x2: i64, color: Rgb<u8>) {
    let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    for x in start..=end {
        put(img, x, y, color);
    }
}

/// Horizontal line drawn as `dash` pixels on, `dash` pixels off.
pub fn draw_dashed_horizontal_line(
    img: &mut RgbImage,
    y: i64,
    x1: i64,
    x2: i64,
    dash: i64,
    color: Rgb<u8>,
) {
    let dash = dash.max(1);
    let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    for x in start..=end {
        if ((x - start) / dash) % 2 == 0 {
            put(img, x, y, color);
        }
    }
}

/// Bresenham line with a square pen of `thickness` pixels.
pub fn draw_line(
    img: &mut RgbImage,
    (x0, y0): (i64, i64),
    (x1, y1): (i64, i64),
    thickness: u32,
    color: Rgb<u8>,
) {
    let half = (thickness.max(1) as i64 - 1) / 2;
    let extra = (thickness.max(1) as i64 - 1) - half;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;

    loop {
        for ox in -half..=extra {
            for oy in -half..=extra {
                put(img, x + ox, y + oy, color);
            }
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Blend `c1` toward `c2` by `t` in [0, 1].
pub fn interpolate_color(c1: Rgb<u8>, c2: Rgb<u8>, t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    Rgb([
        ((1.0 - t) * c1.0[0] as f64 + t * c2.0[0] as f64).round() as u8,
        ((1.0 - t) * c1.0[1] as f64 + t * c2.0[1] as f64).round() as u8,
        ((1.0 - t) * c1.0[2] as f64 + t * c2.0[2] as f64).round() as u8,
    ])
}
