//! Raster → RGBA rendering and figure composition for export.

use ab_glyph::{FontRef, PxScale};
use anyhow::{anyhow, Result};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut, text_size};

use crate::color::Colormap;
use crate::data::model::RasterLayer;

/// Fully transparent; used for masked cells.
pub const MASKED: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Labelled positions on every colorbar, both ends included.
pub const COLORBAR_TICKS: usize = 5;

const FIGURE_MARGIN: u32 = 16;
const COLORBAR_GAP: u32 = 12;
const COLORBAR_MIN_WIDTH: u32 = 12;
const TICK_LENGTH: u32 = 4;
const LABEL_GAP: u32 = 4;
const TICK_FONT_PX: f32 = 13.0;
const CAPTION_FONT_PX: f32 = 15.0;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([40, 40, 40, 255]);

// ---------------------------------------------------------------------------
// ValueRange – normalisation bounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Min/max over the valid cells.
    ///
    /// An all-masked raster falls back to `[0, 1]` and a constant raster
    /// widens to `[v, v + 1]`.
    pub fn from_layer(layer: &RasterLayer) -> Self {
        let (min, max) = layer
            .valid_values()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        if !min.is_finite() || !max.is_finite() {
            Self { min: 0.0, max: 1.0 }
        } else if (max - min).abs() < f64::EPSILON {
            Self { min, max: min + 1.0 }
        } else {
            Self { min, max }
        }
    }

    pub fn normalize(&self, v: f64) -> f64 {
        (v - self.min) / (self.max - self.min)
    }

    /// Value at normalised position `t`.
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + (self.max - self.min) * t
    }
}

// ---------------------------------------------------------------------------
// Colorize
// ---------------------------------------------------------------------------

/// Render a layer as an RGBA image, one pixel per cell.
/// Masked cells are transparent.
pub fn colorize(layer: &RasterLayer, colormap: Colormap, range: ValueRange) -> RgbaImage {
    let mask = layer.valid_mask();
    let mut img = RgbaImage::new(layer.cols as u32, layer.rows as u32);

    for (i, (px, &value)) in img.pixels_mut().zip(layer.data.iter()).enumerate() {
        *px = if mask[i] {
            let [r, g, b] = colormap.evaluate(range.normalize(value));
            Rgba([r, g, b, 255])
        } else {
            MASKED
        };
    }
    img
}

/// Vertical gradient with the maximum at the top.
pub fn colorbar(colormap: Colormap, width: u32, height: u32) -> RgbaImage {
    let span = height.saturating_sub(1).max(1) as f64;
    RgbaImage::from_fn(width, height, |_, y| {
        let [r, g, b] = colormap.evaluate(1.0 - y as f64 / span);
        Rgba([r, g, b, 255])
    })
}

// ---------------------------------------------------------------------------
// Figure composition
// ---------------------------------------------------------------------------

fn figure_font() -> Result<FontRef<'static>> {
    FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)
        .map_err(|e| anyhow!("loading figure font: {e}"))
}

/// Tick text at normalised position `t` along the colorbar.
pub fn tick_label(range: ValueRange, t: f64) -> String {
    format!("{:.2}", range.lerp(t))
}

/// `text` on a white strip, rotated to read bottom-to-top.
fn vertical_caption(font: &FontRef<'_>, text: &str) -> RgbaImage {
    let scale = PxScale::from(CAPTION_FONT_PX);
    let (w, h) = text_size(scale, font, text);
    let mut strip = RgbaImage::from_pixel(w + 2, h.max(1) + 4, BACKGROUND);
    draw_text_mut(&mut strip, INK, 1, 2, scale, font, text);
    imageops::rotate270(&strip)
}

/// Map, colorbar, tick values and caption on a white canvas; the layout
/// used for PNG export.
pub fn compose_figure(
    map: &RgbaImage,
    colormap: Colormap,
    range: ValueRange,
    caption: &str,
) -> Result<RgbaImage> {
    let font = figure_font()?;
    let tick_scale = PxScale::from(TICK_FONT_PX);

    let (map_w, map_h) = map.dimensions();
    let map_h = map_h.max(1);
    let bar_w = (map_w / 20).max(COLORBAR_MIN_WIDTH);
    let bar = colorbar(colormap, bar_w, map_h);

    let ticks: Vec<(f64, String)> = (0..COLORBAR_TICKS)
        .map(|k| {
            let t = k as f64 / (COLORBAR_TICKS - 1) as f64;
            (t, tick_label(range, t))
        })
        .collect();
    let label_w = ticks
        .iter()
        .map(|(_, text)| text_size(tick_scale, &font, text).0)
        .max()
        .unwrap_or(0);
    let caption_img = vertical_caption(&font, caption);

    let bar_x = FIGURE_MARGIN + map_w + COLORBAR_GAP;
    let label_x = bar_x + bar_w + TICK_LENGTH + LABEL_GAP;
    let caption_x = label_x + label_w + COLORBAR_GAP;
    let width = caption_x + caption_img.width() + FIGURE_MARGIN;
    let height = FIGURE_MARGIN * 2 + map_h.max(caption_img.height());
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

    // Cells are either opaque or masked; masked cells keep the background.
    for (x, y, px) in map.enumerate_pixels() {
        if px[3] != 0 {
            canvas.put_pixel(FIGURE_MARGIN + x, FIGURE_MARGIN + y, *px);
        }
    }
    imageops::replace(&mut canvas, &bar, bar_x as i64, FIGURE_MARGIN as i64);

    let span = (map_h - 1) as f64;
    for (t, text) in &ticks {
        let y = FIGURE_MARGIN as f32 + ((1.0 - t) * span) as f32;
        let tick_start = (bar_x + bar_w) as f32;
        draw_line_segment_mut(
            &mut canvas,
            (tick_start, y),
            (tick_start + TICK_LENGTH as f32, y),
            INK,
        );
        let (_, text_h) = text_size(tick_scale, &font, text);
        let top = (y as i32 - text_h as i32 / 2).max(0);
        draw_text_mut(&mut canvas, INK, label_x as i32, top, tick_scale, &font, text);
    }

    let caption_y = FIGURE_MARGIN + map_h.saturating_sub(caption_img.height()) / 2;
    imageops::replace(&mut canvas, &caption_img, caption_x as i64, caption_y as i64);

    Ok(canvas)
}
