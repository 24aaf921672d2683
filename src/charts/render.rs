use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};

use crate::error::ChartError;
use crate::reports::{WeeklySeries, DAILY_PROTEIN_TARGET};

/// Turns a weekly series into image bytes.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, series: &WeeklySeries) -> Result<Bytes, ChartError>;
}

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BAR_FILL: Rgb<u8> = Rgb([0x4C, 0xAF, 0x50]);
const BAR_EDGE: Rgb<u8> = Rgb([0x2E, 0x7D, 0x32]);
const TARGET_LINE: Rgb<u8> = Rgb([0xF4, 0x43, 0x36]);
const AXIS: Rgb<u8> = Rgb([0x9E, 0x9E, 0x9E]);

/// PNG bar chart: one bar per weekday plus a dashed target line.
#[derive(Debug, Clone, Copy)]
pub struct BarChartRenderer {
    width: u32,
    height: u32,
}

impl Default for BarChartRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
        }
    }
}

struct Plot {
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
    y_max: f64,
}

impl Plot {
    fn y_for(&self, value: f64) -> u32 {
        let span = f64::from(self.bottom - self.top);
        let h = (value / self.y_max * span).round().clamp(0.0, span) as u32;
        self.bottom - h
    }
}

impl BarChartRenderer {
    pub fn draw(&self, series: &WeeklySeries) -> Result<Vec<u8>, ChartError> {
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        let max_protein = series.days.iter().map(|d| d.protein).fold(0.0, f64::max);
        let plot = Plot {
            left: 50,
            right: self.width.saturating_sub(20),
            top: 20,
            bottom: self.height.saturating_sub(40),
            y_max: (max_protein * 1.2).max(DAILY_PROTEIN_TARGET * 1.1),
        };
        if plot.right <= plot.left || plot.bottom <= plot.top || series.days.is_empty() {
            return Err(ChartError::Render(format!("canvas {}x{} too small", self.width, self.height)));
        }

        fill_rect(&mut img, plot.left, plot.bottom, plot.right, plot.bottom + 1, AXIS);
        fill_rect(&mut img, plot.left - 1, plot.top, plot.left, plot.bottom + 1, AXIS);

        let slot = (plot.right - plot.left) / series.days.len() as u32;
        let bar = slot * 3 / 5;
        for (i, day) in series.days.iter().enumerate() {
            if day.protein <= 0.0 {
                continue;
            }
            let x0 = plot.left + slot * i as u32 + (slot - bar) / 2;
            let x1 = x0 + bar;
            let y0 = plot.y_for(day.protein);
            fill_rect(&mut img, x0, y0, x1, plot.bottom, BAR_EDGE);
            if x1 - x0 > 4 && plot.bottom - y0 > 2 {
                fill_rect(&mut img, x0 + 2, y0 + 2, x1 - 2, plot.bottom, BAR_FILL);
            }
        }

        let target_y = plot.y_for(DAILY_PROTEIN_TARGET);
        let mut x = plot.left;
        while x < plot.right {
            fill_rect(&mut img, x, target_y.saturating_sub(1), (x + 8).min(plot.right), target_y + 1, TARGET_LINE);
            x += 14;
        }

        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(buf)
    }
}

#[async_trait]
impl ChartRenderer for BarChartRenderer {
    async fn render(&self, series: &WeeklySeries) -> Result<Bytes, ChartError> {
        let renderer = *self;
        let series = series.clone();
        let png = tokio::task::spawn_blocking(move || renderer.draw(&series))
            .await
            .map_err(|e| ChartError::Render(e.to_string()))??;
        Ok(Bytes::from(png))
    }
}

/// Fills `[x0, x1) × [y0, y1)`, clipped to the image.
fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    for y in y0.min(h)..y1.min(h) {
        for x in x0.min(w)..x1.min(w) {
            img.put_pixel(x, y, color);
        }
    }
}
