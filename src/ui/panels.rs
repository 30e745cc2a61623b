use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::registry::{LayerLabel, SpectralIndex};
use crate::export::{download_file_name, save_png, write_means_csv};
use crate::state::{AppState, ComparisonView, SingleView};

// ---------------------------------------------------------------------------
// Left side panel – layer selector and statistics
// ---------------------------------------------------------------------------

/// Render the left panel: layer selector, mean metric, change insight.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Select Map Layer");
    ui.separator();

    let labels: Vec<LayerLabel> = state.config.registry.labels().collect();
    let current = state.selected;
    let mut picked = None;
    egui::ComboBox::from_id_salt("layer_select")
        .selected_text(current.map(|l| l.to_string()).unwrap_or_default())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for label in &labels {
                if ui
                    .selectable_label(current == Some(*label), label.to_string())
                    .clicked()
                {
                    picked = Some(*label);
                }
            }
        });

    if let Some(label) = picked.filter(|l| Some(*l) != current) {
        let result = state.select_layer(label);
        state.report("Failed to load layer", result);
    }

    ui.add_space(8.0);

    let Some(view) = &state.single else {
        ui.label("No layer loaded.");
        return;
    };

    mean_metric(ui, view);
    ui.add_space(8.0);

    if let Some(change) = &view.change {
        let (fill, text) = match change.percent {
            Ok(_) => (Color32::from_rgb(28, 62, 94), Color32::from_rgb(200, 225, 255)),
            Err(_) => (Color32::from_rgb(94, 74, 20), Color32::from_rgb(255, 235, 180)),
        };
        egui::Frame::group(ui.style())
            .fill(fill)
            .show(ui, |ui: &mut Ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(change.message()).strong().color(text));
                ui.label(
                    RichText::new(format!(
                        "Mean {:.3} → {:.3}",
                        change.base_mean, change.future_mean
                    ))
                    .small()
                    .color(text),
                );
            });
        ui.add_space(8.0);
    }

    egui::CollapsingHeader::new(RichText::new("Layer summary").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| summary_table(ui, view));
}

fn mean_metric(ui: &mut Ui, view: &SingleView) {
    ui.label(RichText::new(format!("Mean {}", view.label)).color(Color32::GRAY));
    let value = view
        .summary
        .mean
        .map(|m| format!("{m:.3}"))
        .unwrap_or_else(|| "—".to_string());
    ui.label(RichText::new(value).size(28.0).strong());
}

fn summary_table(ui: &mut Ui, view: &SingleView) {
    let s = &view.summary;
    let profile = &view.layer.profile;
    let fmt = |v: Option<f64>| v.map(|v| format!("{v:.4}")).unwrap_or_else(|| "—".into());

    let rows: Vec<(&str, String)> = vec![
        ("Size", format!("{} × {}", profile.width, profile.height)),
        ("Type", profile.sample_format.to_string()),
        (
            "Nodata",
            profile
                .nodata
                .map(|v| v.to_string())
                .unwrap_or_else(|| "none".into()),
        ),
        ("Valid cells", format!("{} / {}", s.valid, s.total)),
        ("Min", fmt(s.min)),
        ("Max", fmt(s.max)),
        ("Colormap", view.colormap.name().to_string()),
    ];

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::remainder())
        .body(|mut body| {
            for (name, value) in &rows {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(*name);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.monospace(value);
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Comparison selector
// ---------------------------------------------------------------------------

pub fn comparison_selector(ui: &mut Ui, state: &mut AppState) {
    let current = state.comparison_index;
    let mut picked = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Select Comparison Type");
        egui::ComboBox::from_id_salt("comparison_select")
            .selected_text(ComparisonView::title(current))
            .show_ui(ui, |ui: &mut Ui| {
                for index in SpectralIndex::ALL {
                    if ui
                        .selectable_label(current == index, ComparisonView::title(index))
                        .clicked()
                    {
                        picked = Some(index);
                    }
                }
            });
    });

    if let Some(index) = picked.filter(|i| *i != current) {
        let result = state.select_comparison(index);
        state.report("Failed to load comparison rasters", result);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Download map as PNG…").clicked() {
                save_figure_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export means as CSV…").clicked() {
                save_means_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload data").clicked() {
                state.reload();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();
        ui.label(format!("Data: {}", state.config.data_dir.display()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Save dialogs
// ---------------------------------------------------------------------------

/// Save the last single-layer figure as PNG.
pub fn save_figure_dialog(state: &mut AppState) {
    let Some(figure) = &state.last_figure else {
        state.status_message = Some("No map has been rendered yet".to_string());
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Download map as PNG")
        .set_file_name(download_file_name(&figure.label.to_string()))
        .add_filter("PNG", &["png"])
        .save_file();

    if let Some(path) = file {
        let result = save_png(&path, &figure.image);
        state.report("Failed to save PNG", result);
    }
}

pub fn save_means_dialog(state: &mut AppState) {
    let Some(means) = &state.means else {
        state.status_message = Some("Means are not loaded".to_string());
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export means as CSV")
        .set_file_name("lulc_means.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        let result = write_means_csv(&path, means);
        state.report("Failed to export means", result);
    }
}
