use eframe::egui::{Align2, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot, PlotPoint, Text};

use crate::color::bar_color;
use crate::data::stats::IndexMeans;
use crate::state::AppState;

const BAR_WIDTH: f64 = 0.6;

// ---------------------------------------------------------------------------
// Means comparison chart
// ---------------------------------------------------------------------------

/// Bar chart of the four dated means with a value label above each bar.
pub fn means_chart(ui: &mut Ui, state: &AppState) {
    let Some(means) = &state.means else {
        ui.label("Means not available.");
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong("Mean NDVI and NDBI Values");
    });

    let names: Vec<String> = means.entries.iter().map(|(l, _)| l.to_string()).collect();

    Plot::new("means_chart")
        .height(300.0)
        .y_axis_label("Mean Value")
        .include_y(0.0)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_grid([false, true])
        .x_axis_formatter(move |mark, _range| category_name(&names, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars(means)).name("Mean"));

            for (i, (_, value)) in means.entries.iter().enumerate() {
                if !value.is_finite() {
                    continue;
                }
                let label = RichText::new(format!("{value:.2}"));
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, *value), label)
                        .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}

fn bars(means: &IndexMeans) -> Vec<Bar> {
    means
        .entries
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::new(i as f64, if value.is_finite() { *value } else { 0.0 })
                .name(label.to_string())
                .fill(bar_color(*label))
                .width(BAR_WIDTH)
        })
        .collect()
}

/// Axis tick text: the layer name at integer positions, nothing in between.
fn category_name(names: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    names.get(i as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_on_categories() {
        let names = vec!["NDVI 2018".to_string(), "NDVI 2025".to_string()];
        assert_eq!(category_name(&names, 0.0), "NDVI 2018");
        assert_eq!(category_name(&names, 1.0), "NDVI 2025");
        assert_eq!(category_name(&names, 0.5), "");
        assert_eq!(category_name(&names, 2.0), "");
        assert_eq!(category_name(&names, -1.0), "");
    }

    #[test]
    fn one_bar_per_mean() {
        let means = IndexMeans {
            entries: IndexMeans::chart_labels()
                .into_iter()
                .zip([0.4, f64::NAN, 0.1, 0.2])
                .collect(),
        };
        let bars = bars(&means);
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].value, 0.4);
        assert_eq!(bars[1].value, 0.0);
        assert_eq!(bars[3].argument, 3.0);
    }
}
