use std::fmt;

// ---------------------------------------------------------------------------
// GeoTransform – pixel → map coordinates
// ---------------------------------------------------------------------------

/// Affine transform for north-up rasters (no rotation terms).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    /// Negative for north-up images.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Map coordinates of the centre of cell (`row`, `col`).
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y + (row as f64 + 0.5) * self.pixel_height,
        )
    }
}

// ---------------------------------------------------------------------------
// RasterProfile – metadata read alongside the pixels
// ---------------------------------------------------------------------------

/// Sample type of the source file, kept for display only.
/// Pixels are always widened to `f64` on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleFormat::U8 => "uint8",
            SampleFormat::U16 => "uint16",
            SampleFormat::U32 => "uint32",
            SampleFormat::U64 => "uint64",
            SampleFormat::I8 => "int8",
            SampleFormat::I16 => "int16",
            SampleFormat::I32 => "int32",
            SampleFormat::I64 => "int64",
            SampleFormat::F32 => "float32",
            SampleFormat::F64 => "float64",
        };
        f.write_str(name)
    }
}

impl SampleFormat {
    /// `value` as a cell of this type would hold it, widened back to `f64`.
    ///
    /// A float32 cell written with sentinel `0.1` reads back as
    /// `0.10000000149011612`, so the sentinel is narrowed the same way.
    pub fn stored(&self, value: f64) -> f64 {
        match self {
            SampleFormat::F32 => value as f32 as f64,
            _ => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterProfile {
    pub width: usize,
    pub height: usize,
    pub sample_format: SampleFormat,
    /// Sentinel marking non-valid pixels (GDAL_NODATA), if the file carries one.
    pub nodata: Option<f64>,
    pub transform: Option<GeoTransform>,
}

// ---------------------------------------------------------------------------
// MaskMode – which cells are excluded from stats and rendering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskMode {
    /// Mask cells equal to the sentinel.
    Nodata(f64),
    /// Mask NaN and ±inf.
    Invalid,
}

impl MaskMode {
    /// Nodata masking when the profile carries a usable sentinel,
    /// invalid-value masking otherwise. A NaN sentinel never compares
    /// equal, so it falls back to `Invalid`.
    ///
    /// The sentinel is compared at the precision of the sample type.
    pub fn for_profile(profile: &RasterProfile) -> Self {
        match profile.nodata {
            Some(v) if !v.is_nan() => MaskMode::Nodata(profile.sample_format.stored(v)),
            _ => MaskMode::Invalid,
        }
    }

    pub fn is_masked(&self, value: f64) -> bool {
        match *self {
            MaskMode::Nodata(nodata) => value == nodata,
            MaskMode::Invalid => !value.is_finite(),
        }
    }

    /// A cell that can be both averaged and colorized.
    ///
    /// Non-finite values are never usable, even under `Nodata` mode.
    pub fn is_valid(&self, value: f64) -> bool {
        value.is_finite() && !self.is_masked(value)
    }
}

// ---------------------------------------------------------------------------
// RasterLayer – one loaded band
// ---------------------------------------------------------------------------

/// A single-band grid in row-major order.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
    pub profile: RasterProfile,
}

impl RasterLayer {
    /// Value at (`row`, `col`), or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    pub fn mask_mode(&self) -> MaskMode {
        MaskMode::for_profile(&self.profile)
    }

    /// Iterator over the usable cell values.
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        let mode = self.mask_mode();
        self.data.iter().copied().filter(move |&v| mode.is_valid(v))
    }

    /// Per-cell validity, same layout as `data`.
    pub fn valid_mask(&self) -> Vec<bool> {
        let mode = self.mask_mode();
        self.data.iter().map(|&v| mode.is_valid(v)).collect()
    }
}

#[cfg(test)]
pub(crate) fn test_layer(rows: usize, cols: usize, data: Vec<f64>, nodata: Option<f64>) -> RasterLayer {
    RasterLayer {
        rows,
        cols,
        data,
        profile: RasterProfile {
            width: cols,
            height: rows,
            sample_format: SampleFormat::F32,
            nodata,
            transform: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_mode_prefers_nodata_when_present() {
        let layer = test_layer(1, 2, vec![1.0, -9999.0], Some(-9999.0));
        assert_eq!(layer.mask_mode(), MaskMode::Nodata(-9999.0));
    }

    #[test]
    fn mask_mode_falls_back_to_invalid() {
        let layer = test_layer(1, 2, vec![1.0, f64::NAN], None);
        assert_eq!(layer.mask_mode(), MaskMode::Invalid);

        let nan_sentinel = test_layer(1, 2, vec![1.0, f64::NAN], Some(f64::NAN));
        assert_eq!(nan_sentinel.mask_mode(), MaskMode::Invalid);
    }

    #[test]
    fn nodata_mode_masks_only_the_sentinel() {
        let mode = MaskMode::Nodata(0.0);
        assert!(mode.is_masked(0.0));
        assert!(!mode.is_masked(0.25));
        assert!(!mode.is_masked(f64::NAN));
        // NaN is still unusable downstream
        assert!(!mode.is_valid(f64::NAN));
    }

    #[test]
    fn float32_sentinel_compares_at_stored_precision() {
        let stored = 0.1f32 as f64;
        let layer = test_layer(1, 3, vec![0.5, stored, 0.7], Some(0.1));
        assert_eq!(layer.mask_mode(), MaskMode::Nodata(stored));
        assert_eq!(layer.valid_mask(), vec![true, false, true]);
    }

    #[test]
    fn float64_sentinel_is_kept_exact() {
        let mut layer = test_layer(1, 2, vec![0.1, 0.1f32 as f64], Some(0.1));
        layer.profile.sample_format = SampleFormat::F64;
        assert_eq!(layer.mask_mode(), MaskMode::Nodata(0.1));
        assert_eq!(layer.valid_mask(), vec![false, true]);
    }

    #[test]
    fn invalid_mode_masks_non_finite() {
        let mode = MaskMode::Invalid;
        assert!(mode.is_masked(f64::NAN));
        assert!(mode.is_masked(f64::INFINITY));
        assert!(mode.is_masked(f64::NEG_INFINITY));
        assert!(!mode.is_masked(-9999.0));
    }

    #[test]
    fn valid_mask_matches_layout() {
        let layer = test_layer(2, 2, vec![0.1, -9999.0, f64::NAN, 0.4], Some(-9999.0));
        assert_eq!(layer.valid_mask(), vec![true, false, false, true]);
        assert_eq!(layer.valid_values().collect::<Vec<_>>(), vec![0.1, 0.4]);
    }

    #[test]
    fn get_is_bounds_checked() {
        let layer = test_layer(2, 3, (0..6).map(f64::from).collect(), None);
        assert_eq!(layer.get(1, 2), Some(5.0));
        assert_eq!(layer.get(2, 0), None);
        assert_eq!(layer.get(0, 3), None);
    }

    #[test]
    fn cell_center_is_north_up() {
        let gt = GeoTransform {
            origin_x: 100.0,
            origin_y: 200.0,
            pixel_width: 10.0,
            pixel_height: -10.0,
        };
        assert_eq!(gt.cell_center(0, 0), (105.0, 195.0));
        assert_eq!(gt.cell_center(2, 1), (115.0, 175.0));
    }
}
