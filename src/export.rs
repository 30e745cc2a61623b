use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};

use crate::data::stats::IndexMeans;

// ---------------------------------------------------------------------------
// PNG export of the last single-layer figure
// ---------------------------------------------------------------------------

/// Encode a figure as an in-memory PNG.
pub fn encode_png(figure: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    figure
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("encoding PNG")?;
    Ok(buf)
}

/// Suggested file name for a layer label, e.g. `NDVI 2018` → `NDVI_2018.png`.
pub fn download_file_name(label: &str) -> String {
    format!("{}.png", label.replace(' ', "_"))
}

pub fn save_png(path: &Path, figure: &RgbaImage) -> Result<()> {
    let bytes = encode_png(figure)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved figure to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV export of the comparison chart
// ---------------------------------------------------------------------------

/// Write the dated means as `layer,mean` rows.
pub fn write_means_csv(path: &Path, means: &IndexMeans) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["layer", "mean"])?;
    for (label, value) in &means.entries {
        writer.write_record([label.to_string(), format!("{value:.6}")])?;
    }
    writer.flush().context("flushing CSV")?;
    log::info!("Saved means to {}", path.display());
    Ok(())
}
