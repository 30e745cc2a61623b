use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::config::{ViewerConfig, TITLE};
use crate::state::AppState;
use crate::ui::map::{self, MapTextures};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LulcViewerApp {
    pub state: AppState,
    textures: MapTextures,
}

impl LulcViewerApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            state: AppState::new(config),
            textures: MapTextures::default(),
        }
    }
}

impl eframe::App for LulcViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: layer selector + statistics ----
        egui::SidePanel::left("layer_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Selections above may have replaced images.
        self.textures.sync(ctx, &self.state);

        // ---- Central panel: maps and chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    central_sections(ui, &mut self.state, &mut self.textures);
                });
        });
    }
}

fn central_sections(ui: &mut Ui, state: &mut AppState, textures: &mut MapTextures) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new(TITLE).size(24.0).strong());
    });
    ui.add_space(12.0);

    map::single_map(ui, state, textures);
    ui.separator();

    ui.heading("NDVI and NDBI Comparison (2018 vs 2025)");
    plot::means_chart(ui, state);
    ui.separator();

    ui.heading("Side-by-Side Comparison Viewer");
    panels::comparison_selector(ui, state);
    textures.sync(ui.ctx(), state);
    map::side_by_side(ui, state, textures);
    ui.separator();

    ui.heading("Download Current Map as PNG");
    match state.last_figure.as_ref().map(|fig| fig.label) {
        Some(label) => {
            if ui.button(format!("Download {label} as PNG")).clicked() {
                panels::save_figure_dialog(state);
            }
        }
        None => {
            ui.label("No map rendered yet.");
        }
    }
}
