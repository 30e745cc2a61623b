use anyhow::Result;
use image::RgbaImage;

use crate::color::Colormap;
use crate::config::ViewerConfig;
use crate::data::loader::read_raster;
use crate::data::model::RasterLayer;
use crate::data::registry::{LayerLabel, Period, SpectralIndex};
use crate::data::stats::{mean, percent_change, summarize, IndexMeans, StatsError, Summary};
use crate::render::{colorize, compose_figure, ValueRange};

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Percent change between the base and future means of one index.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeInsight {
    pub index: SpectralIndex,
    pub base_mean: f64,
    pub future_mean: f64,
    pub percent: Result<f64, StatsError>,
}

impl ChangeInsight {
    pub fn message(&self) -> String {
        match &self.percent {
            Ok(pct) => format!(
                "{} changed by {:.2}% between {} and {}",
                self.index.theme(),
                pct,
                Period::BASE_YEAR,
                Period::FUTURE_YEAR
            ),
            Err(e) => format!("{} change unavailable: {e}", self.index.theme()),
        }
    }
}

/// Everything shown for the selected layer.
pub struct SingleView {
    pub label: LayerLabel,
    pub layer: RasterLayer,
    pub summary: Summary,
    pub change: Option<ChangeInsight>,
    pub colormap: Colormap,
    pub range: ValueRange,
    pub image: RgbaImage,
}

/// One half of the side-by-side viewer.
pub struct PanelImage {
    pub label: LayerLabel,
    pub layer: RasterLayer,
    pub image: RgbaImage,
}

pub struct ComparisonView {
    pub left: PanelImage,
    pub right: PanelImage,
}

impl ComparisonView {
    pub fn title(index: SpectralIndex) -> String {
        format!(
            "{} {} vs {}",
            index.name(),
            Period::BASE_YEAR,
            Period::FUTURE_YEAR
        )
    }
}

/// The exportable figure of the last single-layer map.
pub struct RenderedFigure {
    pub label: LayerLabel,
    pub image: RgbaImage,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Label chosen in the layer selector.
    pub selected: Option<LayerLabel>,
    pub single: Option<SingleView>,

    /// Cached means for the comparison chart.
    pub means: Option<IndexMeans>,

    pub comparison_index: SpectralIndex,
    pub comparison: Option<ComparisonView>,

    /// Overwritten each time a single-layer map is rendered; cleared when
    /// a selection fails so the download never offers a stale layer.
    pub last_figure: Option<RenderedFigure>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Bumped whenever any image changes so textures get re-uploaded.
    pub generation: u64,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        let mut state = Self {
            config,
            selected: None,
            single: None,
            means: None,
            comparison_index: SpectralIndex::Ndvi,
            comparison: None,
            last_figure: None,
            status_message: None,
            generation: 0,
        };
        state.reload();
        state
    }

    /// Re-read every raster shown on screen.
    pub fn reload(&mut self) {
        self.status_message = None;

        let first = self.config.registry.labels().next();
        if let Some(label) = self.selected.or(first) {
            let result = self.select_layer(label);
            self.report("Failed to load layer", result);
        }

        let result = self.refresh_means();
        self.report("Failed to load comparison means", result);

        let result = self.select_comparison(self.comparison_index);
        self.report("Failed to load comparison rasters", result);
    }

    /// Load `label`, compute its statistics, and render its map.
    pub fn select_layer(&mut self, label: LayerLabel) -> Result<()> {
        self.selected = Some(label);
        self.single = None;
        self.last_figure = None;
        self.generation += 1;

        let layer = self.read(label)?;
        let summary = summarize(&layer);
        let change = match label.change_pair() {
            Some((base, future)) => Some(self.change_insight(label.index, base, future)?),
            None => None,
        };

        let colormap = Colormap::for_index(label.index);
        let range = ValueRange::from_layer(&layer);
        let image = colorize(&layer, colormap, range);

        self.last_figure = Some(RenderedFigure {
            label,
            image: compose_figure(&image, colormap, range, &label.to_string())?,
        });

        log::info!(
            "Selected {label}: {}/{} valid cells, mean {:?}",
            summary.valid,
            summary.total,
            summary.mean
        );

        self.single = Some(SingleView {
            label,
            layer,
            summary,
            change,
            colormap,
            range,
            image,
        });
        Ok(())
    }

    /// Load both dated rasters of `index` for the side-by-side viewer.
    /// The last single-layer figure is left untouched.
    pub fn select_comparison(&mut self, index: SpectralIndex) -> Result<()> {
        self.comparison_index = index;
        self.comparison = None;
        self.generation += 1;

        let colormap = Colormap::for_index(index);
        let panel = |state: &Self, period| -> Result<PanelImage> {
            let label = LayerLabel::new(index, period);
            let layer = state.read(label)?;
            let image = colorize(&layer, colormap, ValueRange::from_layer(&layer));
            Ok(PanelImage {
                label,
                layer,
                image,
            })
        };

        let left = panel(self, Period::Base)?;
        let right = panel(self, Period::Future)?;
        self.comparison = Some(ComparisonView { left, right });
        Ok(())
    }

    pub fn refresh_means(&mut self) -> Result<()> {
        self.means = None;
        self.means = Some(IndexMeans::load(&self.config.registry, &self.config.data_dir)?);
        Ok(())
    }

    /// Log a failed action and surface it in the status line.
    pub fn report(&mut self, what: &str, result: Result<()>) {
        if let Err(e) = result {
            log::error!("{what}: {e:#}");
            self.status_message = Some(format!("{what}: {e:#}"));
        }
    }

    fn read(&self, label: LayerLabel) -> Result<RasterLayer> {
        let path = self.config.registry.path_for(&self.config.data_dir, label)?;
        read_raster(&path)
    }

    /// Base and future rasters are re-read on every Change selection.
    fn change_insight(
        &self,
        index: SpectralIndex,
        base: LayerLabel,
        future: LayerLabel,
    ) -> Result<ChangeInsight> {
        let base_mean = mean(&self.read(base)?).unwrap_or(f64::NAN);
        let future_mean = mean(&self.read(future)?).unwrap_or(f64::NAN);
        let percent = percent_change(base_mean, future_mean);
        if let Err(e) = &percent {
            log::warn!("{index:?} percent change: {e}");
        }
        Ok(ChangeInsight {
            index,
            base_mean,
            future_mean,
            percent,
        })
    }
}
