use eframe::egui::Color32;
use palette::{Mix, Srgb};

use crate::data::registry::{LayerLabel, Period, SpectralIndex};

// ---------------------------------------------------------------------------
// Sequential colour ramps
// ---------------------------------------------------------------------------

/// Single-hue ramps, light for low values and dark for high values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Greens,
    Oranges,
}

// Nine evenly spaced stops per ramp.
const GREENS: [[u8; 3]; 9] = [
    [0xf7, 0xfc, 0xf5],
    [0xe5, 0xf5, 0xe0],
    [0xc7, 0xe9, 0xc0],
    [0xa1, 0xd9, 0x9b],
    [0x74, 0xc4, 0x76],
    [0x41, 0xab, 0x5d],
    [0x23, 0x8b, 0x45],
    [0x00, 0x6d, 0x2c],
    [0x00, 0x44, 0x1b],
];

const ORANGES: [[u8; 3]; 9] = [
    [0xff, 0xf5, 0xeb],
    [0xfe, 0xe6, 0xce],
    [0xfd, 0xd0, 0xa2],
    [0xfd, 0xae, 0x6b],
    [0xfd, 0x8d, 0x3c],
    [0xf1, 0x69, 0x13],
    [0xd9, 0x48, 0x01],
    [0xa6, 0x36, 0x03],
    [0x7f, 0x27, 0x04],
];

impl Colormap {
    /// NDVI layers render green, NDBI layers orange.
    pub fn for_index(index: SpectralIndex) -> Self {
        match index {
            SpectralIndex::Ndvi => Colormap::Greens,
            SpectralIndex::Ndbi => Colormap::Oranges,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Greens => "Greens",
            Colormap::Oranges => "Oranges",
        }
    }

    fn stops(&self) -> &'static [[u8; 3]; 9] {
        match self {
            Colormap::Greens => &GREENS,
            Colormap::Oranges => &ORANGES,
        }
    }

    /// Colour at normalised position `t`; out-of-range input is clamped.
    pub fn evaluate(&self, t: f64) -> [u8; 3] {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let scaled = t * (stops.len() - 1) as f64;
        let lo = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = (scaled - lo as f64) as f32;

        let a = Srgb::<u8>::from(stops[lo]).into_format::<f32>();
        let b = Srgb::<u8>::from(stops[lo + 1]).into_format::<f32>();
        let c: Srgb<u8> = a.mix(b, frac).into_format();
        [c.red, c.green, c.blue]
    }

    pub fn color32(&self, t: f64) -> Color32 {
        let [r, g, b] = self.evaluate(t);
        Color32::from_rgb(r, g, b)
    }
}

// ---------------------------------------------------------------------------
// Bar chart palette
// ---------------------------------------------------------------------------

/// Fill colour of a dated layer's bar in the means chart.
pub fn bar_color(label: LayerLabel) -> Color32 {
    match (label.index, label.period) {
        (SpectralIndex::Ndvi, Period::Base) => Color32::from_rgb(0, 128, 0), // green
        (SpectralIndex::Ndvi, _) => Color32::from_rgb(144, 238, 144),        // lightgreen
        (SpectralIndex::Ndbi, Period::Base) => Color32::from_rgb(255, 165, 0), // orange
        (SpectralIndex::Ndbi, _) => Color32::from_rgb(255, 69, 0),           // orangered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_stops() {
        assert_eq!(Colormap::Greens.evaluate(0.0), GREENS[0]);
        assert_eq!(Colormap::Greens.evaluate(1.0), GREENS[8]);
        assert_eq!(Colormap::Oranges.evaluate(0.0), ORANGES[0]);
        assert_eq!(Colormap::Oranges.evaluate(1.0), ORANGES[8]);
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(Colormap::Greens.evaluate(-3.0), GREENS[0]);
        assert_eq!(Colormap::Greens.evaluate(7.5), GREENS[8]);
        assert_eq!(Colormap::Greens.evaluate(f64::NAN), GREENS[0]);
    }

    #[test]
    fn interior_stop_is_exact() {
        // t = 4/8 lands exactly on the middle stop
        assert_eq!(Colormap::Oranges.evaluate(0.5), ORANGES[4]);
    }

    #[test]
    fn ramps_darken_monotonically() {
        for cmap in [Colormap::Greens, Colormap::Oranges] {
            let lum = |t: f64| {
                let [r, g, b] = cmap.evaluate(t);
                r as u32 + g as u32 + b as u32
            };
            let mut prev = lum(0.0);
            for i in 1..=20 {
                let cur = lum(i as f64 / 20.0);
                assert!(cur <= prev, "{} not monotone at step {i}", cmap.name());
                prev = cur;
            }
        }
    }

    #[test]
    fn index_selects_ramp() {
        assert_eq!(Colormap::for_index(SpectralIndex::Ndvi), Colormap::Greens);
        assert_eq!(Colormap::for_index(SpectralIndex::Ndbi), Colormap::Oranges);
    }
}
