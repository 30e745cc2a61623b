use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;

use super::model::{GeoTransform, RasterLayer, RasterProfile, SampleFormat};

// ---------------------------------------------------------------------------
// GeoTIFF tag numbers
// ---------------------------------------------------------------------------

pub(crate) const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub(crate) const TAG_MODEL_TIEPOINT: u16 = 33922;
pub(crate) const TAG_GDAL_NODATA: u16 = 42113;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("TIFF decode error: {0}")]
    Decode(#[from] tiff::TiffError),

    #[error("expected a single-band raster, got {0:?}")]
    NotSingleBand(ColorType),

    #[error("unsupported sample format")]
    UnsupportedSampleFormat,

    #[error("pixel count {actual} does not match {width}x{height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read band 1 of a GeoTIFF on disk.
///
/// The file handle is closed before returning.
pub fn read_raster(path: &Path) -> Result<RasterLayer> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let layer = decode_raster(BufReader::new(file))
        .with_context(|| format!("reading raster {}", path.display()))?;
    log::debug!(
        "Read {} ({}x{}, {}, nodata={:?})",
        path.display(),
        layer.cols,
        layer.rows,
        layer.profile.sample_format,
        layer.profile.nodata
    );
    Ok(layer)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn decode_raster<R: Read + Seek>(reader: R) -> Result<RasterLayer, RasterError> {
    let mut decoder = Decoder::new(reader)?;

    let color = decoder.colortype()?;
    if !matches!(color, ColorType::Gray(_)) {
        return Err(RasterError::NotSingleBand(color));
    }

    let (width, height) = decoder.dimensions()?;
    let (cols, rows) = (width as usize, height as usize);

    let (data, sample_format) = widen(decoder.read_image()?)?;
    if data.len() != rows * cols {
        return Err(RasterError::SizeMismatch {
            width: cols,
            height: rows,
            actual: data.len(),
        });
    }

    let profile = RasterProfile {
        width: cols,
        height: rows,
        sample_format,
        nodata: read_nodata(&mut decoder),
        transform: read_geotransform(&mut decoder),
    };

    Ok(RasterLayer {
        rows,
        cols,
        data,
        profile,
    })
}

/// Convert any decoded sample buffer to `f64`.
fn widen(result: DecodingResult) -> Result<(Vec<f64>, SampleFormat), RasterError> {
    let widened = match result {
        DecodingResult::U8(buf) => (buf.into_iter().map(f64::from).collect(), SampleFormat::U8),
        DecodingResult::U16(buf) => (buf.into_iter().map(f64::from).collect(), SampleFormat::U16),
        DecodingResult::U32(buf) => (buf.into_iter().map(f64::from).collect(), SampleFormat::U32),
        DecodingResult::U64(buf) => (buf.into_iter().map(|v| v as f64).collect(), SampleFormat::U64),
        DecodingResult::I8(buf) => (buf.into_iter().map(f64::from).collect(), SampleFormat::I8),
        DecodingResult::I16(buf) => (buf.into_iter().map(f64::from).collect(), SampleFormat::I16),
        DecodingResult::I32(buf) => (buf.into_iter().map(f64::from).collect(), SampleFormat::I32),
        DecodingResult::I64(buf) => (buf.into_iter().map(|v| v as f64).collect(), SampleFormat::I64),
        DecodingResult::F32(buf) => (buf.into_iter().map(f64::from).collect(), SampleFormat::F32),
        DecodingResult::F64(buf) => (buf, SampleFormat::F64),
        #[allow(unreachable_patterns)]
        _ => return Err(RasterError::UnsupportedSampleFormat),
    };
    Ok(widened)
}

/// GDAL stores the sentinel as an ASCII string, e.g. `"-9999\0"`.
fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let raw = decoder
        .get_tag_ascii_string(Tag::from_u16_exhaustive(TAG_GDAL_NODATA))
        .ok()?;
    parse_nodata(&raw)
}

fn parse_nodata(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_end_matches('\0').trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}

/// ModelTiepointTag + ModelPixelScaleTag; rotated rasters are not supported.
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::from_u16_exhaustive(TAG_MODEL_PIXEL_SCALE))
        .ok()?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::from_u16_exhaustive(TAG_MODEL_TIEPOINT))
        .ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z]
    Some(GeoTransform {
        origin_x: tiepoint[3] - tiepoint[0] * scale[0],
        origin_y: tiepoint[4] + tiepoint[1] * scale[1],
        pixel_width: scale[0],
        pixel_height: -scale[1],
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::model::MaskMode;
    use crate::data::stats::mean;
    use approx::assert_relative_eq;
    use std::io::{Cursor, Write};
    use tiff::encoder::{colortype, TiffEncoder, TiffValue};

    /// Encode a single-band GeoTIFF with optional nodata and georeferencing tags.
    pub(crate) fn encode<C>(
        rows: u32,
        cols: u32,
        data: &[C::Inner],
        nodata: Option<&str>,
        georef: bool,
    ) -> Vec<u8>
    where
        C: colortype::ColorType,
        [C::Inner]: TiffValue,
    {
        let mut buf = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            let mut image = encoder.new_image::<C>(cols, rows).unwrap();
            if let Some(nd) = nodata {
                image
                    .encoder()
                    .write_tag(Tag::from_u16_exhaustive(TAG_GDAL_NODATA), nd)
                    .unwrap();
            }
            if georef {
                let scale = [30.0f64, 30.0, 0.0];
                let tiepoint = [0.0f64, 0.0, 0.0, 410_000.0, 1_460_000.0, 0.0];
                image
                    .encoder()
                    .write_tag(Tag::from_u16_exhaustive(TAG_MODEL_PIXEL_SCALE), &scale[..])
                    .unwrap();
                image
                    .encoder()
                    .write_tag(Tag::from_u16_exhaustive(TAG_MODEL_TIEPOINT), &tiepoint[..])
                    .unwrap();
            }
            image.write_data(data).unwrap();
        }
        buf
    }

    pub(crate) fn encode_f32(
        rows: u32,
        cols: u32,
        data: &[f32],
        nodata: Option<&str>,
        georef: bool,
    ) -> Vec<u8> {
        encode::<colortype::Gray32Float>(rows, cols, data, nodata, georef)
    }

    fn decode(bytes: &[u8]) -> RasterLayer {
        decode_raster(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn reads_float_raster_with_nodata() {
        let layer = decode(&encode_f32(2, 2, &[0.1, -9999.0, 0.3, 0.4], Some("-9999"), false));

        assert_eq!((layer.rows, layer.cols), (2, 2));
        assert_eq!(layer.profile.sample_format, SampleFormat::F32);
        assert_eq!(layer.profile.nodata, Some(-9999.0));
        assert_eq!(layer.get(0, 1), Some(-9999.0));
        assert!(layer.profile.transform.is_none());
    }

    #[test]
    fn fractional_float32_sentinel_masks_its_cells() {
        let layer = decode(&encode_f32(1, 3, &[0.5, 0.1, 0.7], Some("0.1"), false));

        // The tag keeps the written text; the cell holds the f32 rounding.
        assert_eq!(layer.profile.nodata, Some(0.1));
        assert_eq!(layer.data[1], 0.1f32 as f64);
        assert_eq!(layer.mask_mode(), MaskMode::Nodata(0.1f32 as f64));
        assert_eq!(layer.valid_mask(), vec![true, false, true]);
        assert_relative_eq!(mean(&layer).unwrap(), 0.6, epsilon = 1e-6);
    }

    #[test]
    fn widens_unsigned_16_bit_samples() {
        let bytes = encode::<colortype::Gray16>(1, 3, &[0u16, 100, 65535], Some("65535"), false);
        let layer = decode(&bytes);

        assert_eq!(layer.profile.sample_format, SampleFormat::U16);
        assert_eq!(layer.data, vec![0.0, 100.0, 65535.0]);
        assert_eq!(layer.valid_mask(), vec![true, true, false]);
        assert_relative_eq!(mean(&layer).unwrap(), 50.0, epsilon = 1e-12);
    }

    #[test]
    fn widens_signed_16_bit_samples() {
        let bytes =
            encode::<colortype::GrayI16>(2, 2, &[-32768i16, -5, 7, -32768], Some("-32768"), false);
        let layer = decode(&bytes);

        assert_eq!(layer.profile.sample_format, SampleFormat::I16);
        assert_eq!(layer.data, vec![-32768.0, -5.0, 7.0, -32768.0]);
        assert_eq!(layer.mask_mode(), MaskMode::Nodata(-32768.0));
        assert_relative_eq!(mean(&layer).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_nodata_tag_yields_none() {
        let layer = decode(&encode_f32(1, 3, &[0.1, f32::NAN, 0.3], None, false));
        assert_eq!(layer.profile.nodata, None);
        assert!(layer.data[1].is_nan());
    }

    #[test]
    fn reads_geotransform() {
        let layer = decode(&encode_f32(1, 1, &[0.5], None, true));
        let gt = layer.profile.transform.unwrap();
        assert_eq!(gt.origin_x, 410_000.0);
        assert_eq!(gt.origin_y, 1_460_000.0);
        assert_eq!(gt.pixel_width, 30.0);
        assert_eq!(gt.pixel_height, -30.0);
    }

    #[test]
    fn reads_from_disk() {
        let bytes = encode_f32(1, 2, &[1.0, 2.0], Some("0"), false);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();

        let layer = read_raster(file.path()).unwrap();
        assert_eq!(layer.data, vec![1.0, 2.0]);
        assert_eq!(layer.profile.nodata, Some(0.0));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_raster(&dir.path().join("absent.tif")).unwrap_err();
        assert!(format!("{err:#}").contains("absent.tif"));
    }

    #[test]
    fn garbage_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a tiff at all").unwrap();
        assert!(read_raster(file.path()).is_err());
    }

    #[test]
    fn parse_nodata_variants() {
        assert_eq!(parse_nodata("-9999\0"), Some(-9999.0));
        assert_eq!(parse_nodata(" 0 "), Some(0.0));
        assert!(parse_nodata("nan").unwrap().is_nan());
        assert_eq!(parse_nodata("none"), None);
    }
}
