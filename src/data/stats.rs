use std::path::Path;

use anyhow::Result;
use thiserror::Error;

use super::loader::read_raster;
use super::model::RasterLayer;
use super::registry::{LayerLabel, LayerRegistry, Period, SpectralIndex};

// ---------------------------------------------------------------------------
// Per-layer summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub valid: usize,
    pub total: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Single pass over the valid cells of `layer`.
pub fn summarize(layer: &RasterLayer) -> Summary {
    let mut valid = 0usize;
    let mut sum = 0.0f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for v in layer.valid_values() {
        valid += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }

    let any = valid > 0;
    Summary {
        valid,
        total: layer.data.len(),
        min: any.then_some(min),
        max: any.then_some(max),
        mean: any.then(|| sum / valid as f64),
    }
}

/// Mean of the valid cells; `None` when every cell is masked.
pub fn mean(layer: &RasterLayer) -> Option<f64> {
    summarize(layer).mean
}

// ---------------------------------------------------------------------------
// Percent change between two means
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StatsError {
    #[error("base mean is zero, percent change is undefined")]
    ZeroBaseMean,

    #[error("mean is not finite (base {base}, future {future})")]
    NonFinite { base: f64, future: f64 },
}

/// `(future - base) / |base| * 100`.
pub fn percent_change(base: f64, future: f64) -> Result<f64, StatsError> {
    if !base.is_finite() || !future.is_finite() {
        return Err(StatsError::NonFinite { base, future });
    }
    if base == 0.0 {
        return Err(StatsError::ZeroBaseMean);
    }
    Ok((future - base) / base.abs() * 100.0)
}

// ---------------------------------------------------------------------------
// IndexMeans – the four dated means for the comparison chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct IndexMeans {
    /// In chart order: NDVI 2018, NDVI 2025, NDBI 2018, NDBI 2025.
    pub entries: Vec<(LayerLabel, f64)>,
}

impl IndexMeans {
    /// Chart order of the dated layers.
    pub fn chart_labels() -> [LayerLabel; 4] {
        [
            LayerLabel::new(SpectralIndex::Ndvi, Period::Base),
            LayerLabel::new(SpectralIndex::Ndvi, Period::Future),
            LayerLabel::new(SpectralIndex::Ndbi, Period::Base),
            LayerLabel::new(SpectralIndex::Ndbi, Period::Future),
        ]
    }

    /// Read the four dated rasters and average each one.
    /// A fully masked raster contributes NaN.
    pub fn load(registry: &LayerRegistry, data_dir: &Path) -> Result<Self> {
        let entries = Self::chart_labels()
            .into_iter()
            .map(|label| {
                let path = registry.path_for(data_dir, label)?;
                let layer = read_raster(&path)?;
                Ok((label, mean(&layer).unwrap_or(f64::NAN)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::encode_f32;
    use crate::data::model::test_layer;
    use approx::assert_relative_eq;

    #[test]
    fn mean_ignores_nodata_cells() {
        let layer = test_layer(2, 2, vec![0.2, -9999.0, 0.4, -9999.0], Some(-9999.0));
        assert_relative_eq!(mean(&layer).unwrap(), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn mean_ignores_invalid_cells() {
        let layer = test_layer(
            1,
            5,
            vec![1.0, f64::NAN, 3.0, f64::INFINITY, f64::NEG_INFINITY],
            None,
        );
        assert_relative_eq!(mean(&layer).unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn mean_ignores_nan_even_with_sentinel() {
        let layer = test_layer(1, 3, vec![1.0, f64::NAN, 0.0], Some(0.0));
        assert_relative_eq!(mean(&layer).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn mean_ignores_inexact_float32_sentinel() {
        let bytes = encode_f32(1, 3, &[0.5, 0.1, 0.7], Some("0.1"), false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inexact.tif");
        std::fs::write(&path, bytes).unwrap();

        let layer = read_raster(&path).unwrap();
        let s = summarize(&layer);
        assert_eq!(s.valid, 2);
        assert_relative_eq!(s.mean.unwrap(), 0.6, epsilon = 1e-6);
    }

    #[test]
    fn mean_of_fully_masked_layer_is_none() {
        let layer = test_layer(1, 2, vec![f64::NAN, f64::NAN], None);
        assert_eq!(mean(&layer), None);
        let summary = summarize(&layer);
        assert_eq!(summary.valid, 0);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.min, None);
    }

    #[test]
    fn summary_min_max() {
        let layer = test_layer(1, 4, vec![-0.5, 0.25, -9999.0, 0.75], Some(-9999.0));
        let s = summarize(&layer);
        assert_eq!(s.valid, 3);
        assert_eq!(s.total, 4);
        assert_eq!(s.min, Some(-0.5));
        assert_eq!(s.max, Some(0.75));
        assert_relative_eq!(s.mean.unwrap(), 0.5 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn percent_change_formula() {
        assert_relative_eq!(percent_change(0.4, 0.3).unwrap(), -25.0, epsilon = 1e-9);
        assert_relative_eq!(percent_change(0.2, 0.5).unwrap(), 150.0, epsilon = 1e-9);
        // Negative base uses its magnitude
        assert_relative_eq!(percent_change(-0.2, -0.1).unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(percent_change(-0.2, -0.3).unwrap(), -50.0, epsilon = 1e-9);
    }

    #[test]
    fn percent_change_zero_base_is_an_error() {
        assert_eq!(percent_change(0.0, 0.3), Err(StatsError::ZeroBaseMean));
        assert_eq!(percent_change(-0.0, 0.3), Err(StatsError::ZeroBaseMean));
    }

    #[test]
    fn percent_change_non_finite_is_an_error() {
        assert!(matches!(
            percent_change(f64::NAN, 0.3),
            Err(StatsError::NonFinite { .. })
        ));
    }

    #[test]
    fn index_means_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LayerRegistry::default();
        let values = [0.4f32, 0.3, 0.1, 0.2];
        for (label, v) in IndexMeans::chart_labels().into_iter().zip(values) {
            let bytes = encode_f32(1, 3, &[v, v, -9999.0], Some("-9999"), false);
            let path = registry.path_for(dir.path(), label).unwrap();
            std::fs::write(path, bytes).unwrap();
        }

        let means = IndexMeans::load(&registry, dir.path()).unwrap();
        assert_eq!(means.entries.len(), 4);
        for ((label, mean), (expected_label, v)) in means
            .entries
            .iter()
            .zip(IndexMeans::chart_labels().into_iter().zip(values))
        {
            assert_eq!(*label, expected_label);
            assert_relative_eq!(*mean, v as f64, epsilon = 1e-6);
        }
    }

    #[test]
    fn index_means_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(IndexMeans::load(&LayerRegistry::default(), dir.path()).is_err());
    }
}
