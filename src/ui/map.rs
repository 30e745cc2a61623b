use std::f32::consts::FRAC_PI_2;

use eframe::egui::epaint::TextShape;
use eframe::egui::{
    self, pos2, Align2, Color32, ColorImage, FontId, Rect, Sense, TextureHandle, TextureOptions,
    Ui, Vec2,
};
use image::RgbaImage;

use crate::color::Colormap;
use crate::data::model::RasterLayer;
use crate::render::{tick_label, ValueRange, COLORBAR_TICKS};
use crate::state::{AppState, PanelImage};

const COLORBAR_WIDTH: f32 = 18.0;
const COLORBAR_LABEL_SPACE: f32 = 72.0;
const COLORBAR_STEPS: usize = 64;

// ---------------------------------------------------------------------------
// Texture cache
// ---------------------------------------------------------------------------

/// GPU textures for the images in [`AppState`], re-uploaded only when
/// `AppState::generation` moves.
#[derive(Default)]
pub struct MapTextures {
    generation: Option<u64>,
    single: Option<TextureHandle>,
    left: Option<TextureHandle>,
    right: Option<TextureHandle>,
}

impl MapTextures {
    pub fn sync(&mut self, ctx: &egui::Context, state: &AppState) {
        if self.generation == Some(state.generation) {
            return;
        }
        self.single = state
            .single
            .as_ref()
            .map(|v| upload(ctx, "single_map", &v.image));
        self.left = state
            .comparison
            .as_ref()
            .map(|c| upload(ctx, "comparison_left", &c.left.image));
        self.right = state
            .comparison
            .as_ref()
            .map(|c| upload(ctx, "comparison_right", &c.right.image));
        self.generation = Some(state.generation);
    }
}

fn upload(ctx: &egui::Context, name: &str, img: &RgbaImage) -> TextureHandle {
    let size = [img.width() as usize, img.height() as usize];
    let color = ColorImage::from_rgba_unmultiplied(size, img.as_raw());
    ctx.load_texture(name, color, TextureOptions::NEAREST)
}

// ---------------------------------------------------------------------------
// Single-layer map with colorbar
// ---------------------------------------------------------------------------

pub fn single_map(ui: &mut Ui, state: &AppState, textures: &MapTextures) {
    let (Some(view), Some(tex)) = (&state.single, &textures.single) else {
        ui.label("No layer loaded.");
        return;
    };

    ui.heading(format!("{} Map", view.label));

    let max = Vec2::new(
        (ui.available_width() - COLORBAR_WIDTH - COLORBAR_LABEL_SPACE).max(64.0),
        560.0,
    );
    ui.horizontal(|ui: &mut Ui| {
        let size = raster_image(ui, tex, &view.layer, max);
        colorbar(ui, view.colormap, view.range, size.y, &view.label.to_string());
    });
}

// ---------------------------------------------------------------------------
// Side-by-side viewer
// ---------------------------------------------------------------------------

pub fn side_by_side(ui: &mut Ui, state: &AppState, textures: &MapTextures) {
    let (Some(view), Some(left), Some(right)) =
        (&state.comparison, &textures.left, &textures.right)
    else {
        ui.label("Comparison rasters not loaded.");
        return;
    };

    ui.columns(2, |cols: &mut [Ui]| {
        comparison_panel(&mut cols[0], &view.left, left);
        comparison_panel(&mut cols[1], &view.right, right);
    });
}

fn comparison_panel(ui: &mut Ui, panel: &PanelImage, tex: &TextureHandle) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(panel.label.to_string());
        let max = Vec2::new(ui.available_width(), 420.0);
        raster_image(ui, tex, &panel.layer, max);
    });
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// Draw `tex` scaled to fit `max` with the raster's aspect ratio; hovering
/// shows the cell value. Returns the drawn size.
fn raster_image(ui: &mut Ui, tex: &TextureHandle, layer: &RasterLayer, max: Vec2) -> Vec2 {
    let [w, h] = tex.size();
    if w == 0 || h == 0 {
        ui.label("Empty raster");
        return Vec2::ZERO;
    }
    let scale = (max.x / w as f32).min(max.y / h as f32);
    let size = Vec2::new(w as f32 * scale, h as f32 * scale);

    let response = ui.add(egui::Image::new((tex.id(), size)).sense(Sense::hover()));

    if let Some(pos) = response.hover_pos() {
        let local = pos - response.rect.min;
        let col = (local.x / scale) as usize;
        let row = (local.y / scale) as usize;
        if let Some(text) = describe_cell(layer, row, col) {
            response.on_hover_text_at_pointer(text);
        }
    }
    size
}

fn describe_cell(layer: &RasterLayer, row: usize, col: usize) -> Option<String> {
    let value = layer.get(row, col)?;
    let shown = if layer.mask_mode().is_valid(value) {
        format!("{value:.4}")
    } else {
        "nodata".to_string()
    };
    let mut text = format!("row {row}, col {col}: {shown}");
    if let Some(gt) = &layer.profile.transform {
        let (x, y) = gt.cell_center(row, col);
        text.push_str(&format!("\n({x:.1}, {y:.1})"));
    }
    Some(text)
}

/// Vertical legend: gradient strip with evenly spaced value ticks.
fn colorbar(ui: &mut Ui, colormap: Colormap, range: ValueRange, height: f32, caption: &str) {
    let height = height.max(40.0);
    let (rect, _) = ui.allocate_exact_size(
        Vec2::new(COLORBAR_WIDTH + COLORBAR_LABEL_SPACE, height),
        Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let strip = Rect::from_min_size(rect.min, Vec2::new(COLORBAR_WIDTH, height));

    let step_h = height / COLORBAR_STEPS as f32;
    for i in 0..COLORBAR_STEPS {
        let t = (i as f64 + 0.5) / COLORBAR_STEPS as f64;
        let bottom = strip.bottom() - i as f32 * step_h;
        let band = Rect::from_min_max(
            pos2(strip.left(), bottom - step_h - 0.5),
            pos2(strip.right(), bottom),
        );
        painter.rect_filled(band, 0.0, colormap.color32(t));
    }

    let text_color = ui.visuals().text_color();
    for k in 0..COLORBAR_TICKS {
        let t = k as f64 / (COLORBAR_TICKS - 1) as f64;
        let y = strip.bottom() - t as f32 * height;
        painter.line_segment(
            [pos2(strip.right(), y), pos2(strip.right() + 4.0, y)],
            (1.0, text_color),
        );
        painter.text(
            pos2(strip.right() + 6.0, y),
            Align2::LEFT_CENTER,
            tick_label(range, t),
            FontId::proportional(11.0),
            text_color,
        );
    }

    // Caption runs bottom-to-top along the right edge.
    let galley = painter.layout_no_wrap(
        caption.to_string(),
        FontId::proportional(12.0),
        Color32::GRAY,
    );
    let origin = pos2(
        rect.right() - galley.size().y,
        strip.center().y + galley.size().x / 2.0,
    );
    painter.add(TextShape::new(origin, galley, Color32::GRAY).with_angle(-FRAC_PI_2));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_layer;

    #[test]
    fn describe_valid_and_masked_cells() {
        let layer = test_layer(1, 2, vec![0.25, -9999.0], Some(-9999.0));
        assert_eq!(
            describe_cell(&layer, 0, 0).unwrap(),
            "row 0, col 0: 0.2500"
        );
        assert_eq!(
            describe_cell(&layer, 0, 1).unwrap(),
            "row 0, col 1: nodata"
        );
        assert!(describe_cell(&layer, 1, 0).is_none());
    }
}
