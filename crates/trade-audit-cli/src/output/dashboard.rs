//! Three-panel performance dashboard rendered to a PNG.
//!
//! Layout is a 2x2 grid with height ratios 1 : 0.8. The equity curve spans the
//! top row; drawdown sits bottom-left and hourly net cashflow bottom-right.

use image::{ImageFormat, Rgb, RgbImage};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io::Cursor;

use trade_audit_core::trading::aggregate::{DailyRow, HourlyRow};

use super::canvas::{self, colors, Panel};

const FILL_ALPHA: f64 = 0.1;
const GRID_LINES: u32 = 4;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub equity_color: Rgb<u8>,
    /// Drawdown warning color
    pub drawdown_color: Rgb<u8>,
    pub gain_color: Rgb<u8>,
    pub loss_color: Rgb<u8>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1200,
            background: colors::WHITE,
            equity_color: colors::GREEN,
            drawdown_color: colors::RED,
            gain_color: colors::GREEN,
            loss_color: colors::RED,
        }
    }
}

/// Panel rectangles for a canvas of the given size: (equity, drawdown, hourly).
pub fn layout(width: u32, height: u32) -> (Panel, Panel, Panel) {
    let margin = (width / 32).max(8);
    let title_band = height / 12;
    let gap = margin;

    let usable_h = height.saturating_sub(title_band + margin + gap);
    let top_h = (usable_h as f64 / 1.8).round() as u32;
    let bottom_h = usable_h.saturating_sub(top_h);
    let full_w = width.saturating_sub(2 * margin);
    let half_w = full_w.saturating_sub(gap) / 2;

    let equity = Panel {
        x: margin,
        y: title_band,
        width: full_w,
        height: top_h,
    };
    let bottom_y = title_band + top_h + gap;
    let drawdown = Panel {
        x: margin,
        y: bottom_y,
        width: half_w,
        height: bottom_h,
    };
    let hourly = Panel {
        x: margin + half_w + gap,
        y: bottom_y,
        width: half_w,
        height: bottom_h,
    };
    (equity, drawdown, hourly)
}

pub fn render_dashboard(daily: &[DailyRow], hourly: &[HourlyRow], config: &DashboardConfig) -> RgbImage {
    let mut img = RgbImage::from_pixel(config.width, config.height, config.background);
    let (equity_panel, drawdown_panel, hourly_panel) = layout(config.width, config.height);

    let xs = date_positions(daily);
    let equity: Vec<f64> = daily.iter().map(|d| to_f64(d.cumulative_profit)).collect();
    let drawdown: Vec<f64> = daily.iter().map(|d| to_f64(d.drawdown)).collect();

    draw_area_chart(&mut img, &equity_panel, &xs, &equity, config.equity_color, 2, config);
    draw_area_chart(&mut img, &drawdown_panel, &xs, &drawdown, config.drawdown_color, 1, config);
    draw_hourly_bars(&mut img, &hourly_panel, hourly, config);

    img
}

/// Encode in memory so that nothing reaches disk unless encoding succeeds.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

fn draw_area_chart(
    img: &mut RgbImage,
    panel: &Panel,
    xs: &[f64],
    ys: &[f64],
    color: Rgb<u8>,
    thickness: u32,
    config: &DashboardConfig,
) {
    canvas::draw_rect_outline(img, panel, colors::LIGHT_GRAY);
    let (lo, hi) = value_range(ys);
    draw_grid(img, panel);

    if ys.is_empty() {
        return;
    }

    let tint = canvas::interpolate_color(config.background, color, FILL_ALPHA);
    let baseline = panel.y_at(0.0, lo, hi);
    let points: Vec<(i64, i64)> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (panel.x_at(x), panel.y_at(y, lo, hi)))
        .collect();

    // Fill between the curve and zero, then stroke on top.
    if points.len() == 1 {
        let (px, py) = points[0];
        canvas::draw_vertical_line(img, px, baseline, py, tint);
    }
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        for px in x0..=x1 {
            let t = if x1 > x0 {
                (px - x0) as f64 / (x1 - x0) as f64
            } else {
                0.0
            };
            let py = (y0 as f64 + t * (y1 - y0) as f64).round() as i64;
            canvas::draw_vertical_line(img, px, baseline, py, tint);
        }
    }

    if points.len() == 1 {
        let (px, py) = points[0];
        canvas::draw_line(img, (px, py), (px, py), thickness + 2, color);
    }
    for pair in points.windows(2) {
        canvas::draw_line(img, pair[0], pair[1], thickness, color);
    }
}

fn draw_hourly_bars(img: &mut RgbImage, panel: &Panel, hourly: &[HourlyRow], config: &DashboardConfig) {
    canvas::draw_rect_outline(img, panel, colors::LIGHT_GRAY);
    let values: Vec<f64> = hourly.iter().map(|h| to_f64(h.hourly_cashflow)).collect();
    let (lo, hi) = value_range(&values);
    let zero_y = panel.y_at(0.0, lo, hi);

    if !values.is_empty() {
        let slot = panel.width as f64 / values.len() as f64;
        let bar_w = ((slot * 0.8).floor() as u32).max(1);
        for (i, (&value, row)) in values.iter().zip(hourly).enumerate() {
            let color = if row.hourly_cashflow > Decimal::ZERO {
                config.gain_color
            } else {
                config.loss_color
            };
            let left = panel.x as f64 + slot * i as f64 + (slot - bar_w as f64) / 2.0;
            let top_y = panel.y_at(value, lo, hi);
            let (y_start, y_end) = if top_y < zero_y {
                (top_y, zero_y)
            } else {
                (zero_y, top_y)
            };
            canvas::draw_filled_rect(
                img,
                left.round().max(0.0) as u32,
                y_start.max(0) as u32,
                bar_w,
                (y_end - y_start + 1).max(1) as u32,
                color,
            );
        }
    }

    // Zero reference line
    canvas::draw_horizontal_line(img, zero_y, panel.x as i64, panel.right() as i64, colors::BLACK);
}

fn draw_grid(img: &mut RgbImage, panel: &Panel) {
    for i in 1..=GRID_LINES {
        let y = panel.y as i64 + (panel.height as i64 * i as i64) / (GRID_LINES as i64 + 1);
        canvas::draw_dashed_horizontal_line(
            img,
            y,
            panel.x as i64 + 1,
            panel.right() as i64 - 1,
            6,
            colors::GRID_GRAY,
        );
    }
}

// ---------------------------------------------------------------------------
// Scaling helpers
// ---------------------------------------------------------------------------

/// Horizontal position of each day in [0, 1], proportional to calendar days
/// since the first date. Non-trading dates leave gaps rather than points.
pub fn date_positions(daily: &[DailyRow]) -> Vec<f64> {
    let (first, last) = match (daily.first(), daily.last()) {
        (Some(f), Some(l)) => (f.date, l.date),
        _ => return Vec::new(),
    };
    let span = (last - first).num_days();
    if span == 0 {
        return vec![0.5; daily.len()];
    }
    daily
        .iter()
        .map(|d| (d.date - first).num_days() as f64 / span as f64)
        .collect()
}

/// Value range always including zero, padded 5% on each side.
pub fn value_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(0.0_f64, f64::min);
    let hi = values.iter().copied().fold(0.0_f64, f64::max);
    let span = hi - lo;
    if span <= f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * 0.05, hi + span * 0.05)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn row(day: u32, daily: Decimal, cumulative: Decimal, peak: Decimal) -> DailyRow {
        DailyRow {
            date: NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
            daily_cashflow: daily,
            num_trades: 1,
            cumulative_profit: cumulative,
            running_peak: peak,
            drawdown: cumulative - peak,
        }
    }

    fn hour(hour: u32, cashflow: Decimal) -> HourlyRow {
        HourlyRow {
            hour,
            hourly_cashflow: cashflow,
            num_trades: 1,
        }
    }

    fn count_in(img: &RgbImage, panel: &Panel, color: Rgb<u8>) -> usize {
        img.enumerate_pixels()
            .filter(|(x, y, p)| {
                (panel.x..=panel.right()).contains(x)
                    && (panel.y..=panel.bottom()).contains(y)
                    && **p == color
            })
            .count()
    }

    fn sample() -> (Vec<DailyRow>, Vec<HourlyRow>) {
        (
            vec![
                row(1, dec!(1000), dec!(1000), dec!(1000)),
                row(2, dec!(-400), dec!(600), dec!(1000)),
                row(5, dec!(100), dec!(700), dec!(1000)),
            ],
            vec![hour(9, dec!(1200)), hour(14, dec!(-500))],
        )
    }

    #[test]
    fn test_canvas_dimensions() {
        let (daily, hourly) = sample();
        let config = DashboardConfig {
            width: 800,
            height: 600,
            ..Default::default()
        };
        let img = render_dashboard(&daily, &hourly, &config);
        assert_eq!(img.dimensions(), (800, 600));
    }

    #[test]
    fn test_panels_use_series_colors() {
        let (daily, hourly) = sample();
        let config = DashboardConfig::default();
        let img = render_dashboard(&daily, &hourly, &config);
        let (equity, drawdown, bars) = layout(config.width, config.height);

        assert!(count_in(&img, &equity, colors::GREEN) > 0);
        assert!(count_in(&img, &drawdown, colors::RED) > 0);
        assert!(count_in(&img, &bars, colors::GREEN) > 0);
        assert!(count_in(&img, &bars, colors::RED) > 0);
        assert!(count_in(&img, &bars, colors::BLACK) > 0);
        // Fill tint beneath the equity line
        let tint = canvas::interpolate_color(colors::WHITE, colors::GREEN, FILL_ALPHA);
        assert!(count_in(&img, &equity, tint) > 0);
    }

    #[test]
    fn test_layout_panels_do_not_overlap() {
        let (equity, drawdown, hourly) = layout(1600, 1200);
        assert!(equity.bottom() < drawdown.y);
        assert!(drawdown.right() < hourly.x);
        assert!(hourly.right() < 1600);
        assert!(drawdown.bottom() < 1200);
        assert_eq!(drawdown.width, hourly.width);
    }

    #[test]
    fn test_date_positions_preserve_gaps() {
        let (daily, _) = sample();
        let xs = date_positions(&daily);
        assert_eq!(xs, vec![0.0, 0.25, 1.0]);
        assert_eq!(date_positions(&daily[..1]), vec![0.5]);
        assert!(date_positions(&[]).is_empty());
    }

    #[test]
    fn test_value_range_includes_zero() {
        let (lo, hi) = value_range(&[100.0, 200.0]);
        assert!(lo < 0.0 && hi > 200.0);
        let (lo, hi) = value_range(&[]);
        assert_eq!((lo, hi), (-1.0, 1.0));
    }

    #[test]
    fn test_empty_series_render() {
        let img = render_dashboard(&[], &[], &DashboardConfig::default());
        assert_eq!(img.dimensions(), (1600, 1200));
    }

    #[test]
    fn test_encode_png_signature() {
        let img = RgbImage::from_pixel(4, 4, colors::WHITE);
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
