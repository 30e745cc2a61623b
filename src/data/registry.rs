use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Layer labels: (index, period)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpectralIndex {
    Ndvi,
    Ndbi,
}

impl SpectralIndex {
    pub const ALL: [SpectralIndex; 2] = [SpectralIndex::Ndvi, SpectralIndex::Ndbi];

    pub fn name(&self) -> &'static str {
        match self {
            SpectralIndex::Ndvi => "NDVI",
            SpectralIndex::Ndbi => "NDBI",
        }
    }

    /// What the index measures, as shown in the change summary.
    pub fn theme(&self) -> &'static str {
        match self {
            SpectralIndex::Ndvi => "Vegetation",
            SpectralIndex::Ndbi => "Built-up Area",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Base,
    Future,
    Change,
}

impl Period {
    pub const BASE_YEAR: u16 = 2018;
    pub const FUTURE_YEAR: u16 = 2025;

    pub fn name(&self) -> String {
        match self {
            Period::Base => Self::BASE_YEAR.to_string(),
            Period::Future => Self::FUTURE_YEAR.to_string(),
            Period::Change => "Change".to_string(),
        }
    }
}

/// A registry key such as `NDVI 2018` or `NDBI Change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerLabel {
    pub index: SpectralIndex,
    pub period: Period,
}

impl LayerLabel {
    pub const fn new(index: SpectralIndex, period: Period) -> Self {
        Self { index, period }
    }

    pub fn is_change(&self) -> bool {
        self.period == Period::Change
    }

    /// Base and future labels of the same index, for a Change label.
    pub fn change_pair(&self) -> Option<(LayerLabel, LayerLabel)> {
        self.is_change().then(|| {
            (
                LayerLabel::new(self.index, Period::Base),
                LayerLabel::new(self.index, Period::Future),
            )
        })
    }
}

impl fmt::Display for LayerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.index.name(), self.period.name())
    }
}

impl FromStr for LayerLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(index), Some(period), None) = (parts.next(), parts.next(), parts.next()) else {
            bail!("layer label '{s}' must look like '<INDEX> <YEAR|Change>'");
        };

        let index = match index.to_ascii_uppercase().as_str() {
            "NDVI" => SpectralIndex::Ndvi,
            "NDBI" => SpectralIndex::Ndbi,
            other => bail!("unknown index '{other}' in label '{s}'"),
        };
        let period = match period {
            p if p.eq_ignore_ascii_case("change") => Period::Change,
            p if p == Period::BASE_YEAR.to_string() => Period::Base,
            p if p == Period::FUTURE_YEAR.to_string() => Period::Future,
            other => bail!("unknown period '{other}' in label '{s}'"),
        };
        Ok(LayerLabel::new(index, period))
    }
}

// ---------------------------------------------------------------------------
// LayerRegistry – label → file name
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEntry {
    pub label: LayerLabel,
    pub file: String,
}

/// The fixed, ordered set of layers the viewer offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRegistry {
    entries: Vec<LayerEntry>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        use Period::*;
        use SpectralIndex::*;

        let entry = |index, period, file: &str| LayerEntry {
            label: LayerLabel::new(index, period),
            file: file.to_string(),
        };
        Self {
            entries: vec![
                entry(Ndvi, Base, "NDVI_2018_Chennai.tif"),
                entry(Ndvi, Future, "NDVI_2025_Chennai.tif"),
                entry(Ndvi, Change, "NDVI_Change_2018_2025.tif"),
                entry(Ndbi, Base, "NDBI_2018_Chennai.tif"),
                entry(Ndbi, Future, "NDBI_2025_Chennai.tif"),
                entry(Ndbi, Change, "NDBI_Change_2018_2025.tif"),
            ],
        }
    }
}

/// On-disk override format (`layers.json`):
///
/// ```json
/// [ { "label": "NDVI 2018", "file": "ndvi_2018.tif" }, ... ]
/// ```
#[derive(Debug, Deserialize)]
struct RawEntry {
    label: String,
    file: String,
}

impl LayerRegistry {
    /// Load a registry override. Every label must parse, and labels must be unique.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: Vec<RawEntry> = serde_json::from_str(text).context("parsing JSON")?;

        let mut entries: Vec<LayerEntry> = Vec::with_capacity(raw.len());
        for r in raw {
            let label: LayerLabel = r.label.parse()?;
            if entries.iter().any(|e| e.label == label) {
                bail!("duplicate layer label '{label}'");
            }
            entries.push(LayerEntry { label, file: r.file });
        }
        if entries.is_empty() {
            bail!("registry has no layers");
        }
        Ok(Self { entries })
    }

    pub fn labels(&self) -> impl Iterator<Item = LayerLabel> + '_ {
        self.entries.iter().map(|e| e.label)
    }

    pub fn file_for(&self, label: LayerLabel) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.file.as_str())
    }

    pub fn path_for(&self, data_dir: &Path, label: LayerLabel) -> Result<PathBuf> {
        let file = self
            .file_for(label)
            .with_context(|| format!("no file registered for layer '{label}'"))?;
        Ok(data_dir.join(file))
    }
}
