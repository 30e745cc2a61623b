//! Write six synthetic NDVI/NDBI GeoTIFFs so the viewer can run without real data.
//!
//! Usage: `generate_sample [OUTPUT_DIR]` (default `data`).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

const ROWS: usize = 240;
const COLS: usize = 320;
const NODATA: f32 = -9999.0;
const PIXEL_SIZE: f64 = 30.0;
// UTM 44N, near Chennai
const ORIGIN: (f64, f64) = (400_000.0, 1_470_000.0);

fn gaussian(d2: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-d2 / (2.0 * sigma.powi(2))).exp()
}

/// Uniform value in (0, 1] from a SplitMix64 hash of `(seed, cell)`.
fn hash_unit(seed: u64, cell: u64) -> f64 {
    let mut z = seed
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(cell);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    ((z >> 11) + 1) as f64 / (1u64 << 53) as f64
}

/// Deterministic Gaussian noise per cell (Box-Muller on two hashes).
fn cell_noise(seed: u64, cell: usize, std_dev: f64) -> f64 {
    let u1 = hash_unit(seed, 2 * cell as u64);
    let u2 = hash_unit(seed, 2 * cell as u64 + 1);
    std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// (row, col, sigma, amplitude) blobs summed over the grid.
fn field(blobs: &[(f64, f64, f64, f64)], base: f64, noise: f64, seed: u64) -> Vec<f64> {
    (0..ROWS * COLS)
        .map(|cell| {
            let (r, c) = ((cell / COLS) as f64, (cell % COLS) as f64);
            let signal: f64 = blobs
                .iter()
                .map(|&(br, bc, sigma, amp)| {
                    gaussian((r - br).powi(2) + (c - bc).powi(2), sigma, amp)
                })
                .sum();
            (base + signal + cell_noise(seed, cell, noise)).clamp(-1.0, 1.0)
        })
        .collect()
}

/// The sea along the eastern edge is nodata in every layer.
fn is_sea(col: usize, row: usize) -> bool {
    col as f64 > COLS as f64 * 0.88 - (row as f64 * 0.05)
}

fn write_layer(dir: &Path, file: &str, values: &[f64]) {
    let data: Vec<f32> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| if is_sea(i % COLS, i / COLS) { NODATA } else { v as f32 })
        .collect();

    let path = dir.join(file);
    let out = BufWriter::new(File::create(&path).expect("Failed to create output file"));
    let mut encoder = TiffEncoder::new(out).expect("Failed to create TIFF encoder");
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(COLS as u32, ROWS as u32)
        .expect("Failed to create TIFF image");

    let nodata = NODATA.to_string();
    let scale = [PIXEL_SIZE, PIXEL_SIZE, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, ORIGIN.0, ORIGIN.1, 0.0];
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(42113), nodata.as_str())
        .expect("Failed to write nodata tag");
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(33550), &scale[..])
        .expect("Failed to write pixel scale tag");
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(33922), &tiepoint[..])
        .expect("Failed to write tiepoint tag");
    image.write_data(&data).expect("Failed to write pixels");

    println!("Wrote {}", path.display());
}

fn main() {
    let out_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let dir = Path::new(&out_dir);
    std::fs::create_dir_all(dir).expect("Failed to create output directory");

    // Green belts in the west and south; dense core in the north-east.
    let green = [
        (60.0, 50.0, 40.0, 0.45),
        (190.0, 90.0, 55.0, 0.40),
        (150.0, 230.0, 25.0, 0.30),
    ];
    let urban_core = (50.0, 220.0, 45.0);
    // Sprawl eats into the south-western green belt by 2025.
    let sprawl = (170.0, 110.0, 35.0);

    let ndvi_2018 = field(&green, 0.05, 0.03, 1);
    let ndvi_2025 = field(
        &[
            green[0],
            (green[1].0, green[1].1, green[1].2, 0.28),
            green[2],
            (sprawl.0, sprawl.1, sprawl.2, -0.15),
        ],
        0.04,
        0.03,
        2,
    );
    let ndbi_2018 = field(
        &[(urban_core.0, urban_core.1, urban_core.2, 0.35)],
        -0.10,
        0.03,
        3,
    );
    let ndbi_2025 = field(
        &[
            (urban_core.0, urban_core.1, urban_core.2 * 1.2, 0.38),
            (sprawl.0, sprawl.1, sprawl.2, 0.22),
        ],
        -0.08,
        0.03,
        4,
    );

    let diff = |a: &[f64], b: &[f64]| -> Vec<f64> {
        b.iter().zip(a).map(|(b, a)| b - a).collect()
    };

    write_layer(dir, "NDVI_2018_Chennai.tif", &ndvi_2018);
    write_layer(dir, "NDVI_2025_Chennai.tif", &ndvi_2025);
    write_layer(dir, "NDVI_Change_2018_2025.tif", &diff(&ndvi_2018, &ndvi_2025));
    write_layer(dir, "NDBI_2018_Chennai.tif", &ndbi_2018);
    write_layer(dir, "NDBI_2025_Chennai.tif", &ndbi_2025);
    write_layer(dir, "NDBI_Change_2018_2025.tif", &diff(&ndbi_2018, &ndbi_2025));

    println!("Wrote 6 layers ({COLS}x{ROWS}, nodata {NODATA}) to {}", dir.display());
}
