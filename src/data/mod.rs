/// Data layer: raster loading, layer registry, and statistics.
///
/// Architecture:
/// ```text
///   data/<file>.tif
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode band 1 → RasterLayer (+ nodata, geotransform)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RasterLayer  │  f64 grid, MaskMode from profile
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  mean / summary of valid cells, percent change
///   └──────────┘
/// ```
///
/// `registry` maps the six layer labels to their file names.

pub mod loader;
pub mod model;
pub mod registry;
pub mod stats;
