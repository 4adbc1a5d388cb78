use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::Hour;

// ---------------------------------------------------------------------------
// Input layout
// ---------------------------------------------------------------------------

/// How the measurement files in the data directory are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Wide layout when the directory holds exactly one CSV, otherwise multi-file.
    #[default]
    Auto,
    /// One `..._<hour>h.csv` file per time point.
    MultiFile,
    /// A single file with every time point as a block of columns.
    Wide,
}

/// Row/column positions inside a single wide file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WideLayout {
    /// Row holding hour labels such as `"3 h"`.
    pub hour_row: usize,
    /// Row holding the wavelength of every column.
    pub wavelength_row: usize,
    /// First sample row.
    pub first_data_row: usize,
    /// Leading columns that carry metadata rather than magnitudes.
    pub metadata_columns: usize,
    /// Metadata column with the sample name.
    pub name_column: usize,
}

impl Default for WideLayout {
    fn default() -> Self {
        Self {
            hour_row: 0,
            wavelength_row: 1,
            first_data_row: 2,
            metadata_columns: 3,
            name_column: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// The only image format the renderer is built to encode.
pub const IMAGE_EXTENSION: &str = "png";

/// Run-wide settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata rows at the top of each hour file, skipped unread.
    pub header_rows: usize,
    /// Hour whose wavelength axis is copied into every sample record.
    pub reference_hour: Hour,
    /// Regex whose first capture group is the sample number used for grouping.
    pub group_pattern: String,
    pub layout: Layout,
    pub wide: WideLayout,
    pub samples_dir: String,
    pub normalised_dir: String,
    pub graphs_dir: String,
    /// Extension of chart images. Only `png` is encoded.
    pub image_extension: String,
    /// Chart size in pixels, `(width, height)`.
    pub figure_size: (u32, u32),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_rows: 7,
            reference_hour: Hour(0),
            group_pattern: r"(\d+)\s*$".to_string(),
            layout: Layout::Auto,
            wide: WideLayout::default(),
            samples_dir: "samples".to_string(),
            normalised_dir: "normalised".to_string(),
            graphs_dir: "graphs".to_string(),
            image_extension: IMAGE_EXTENSION.to_string(),
            figure_size: (1024, 768),
        }
    }
}

impl Config {
    /// Read a JSON config file.
    pub fn read_config_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("checking config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject settings that would only fail once the first chart is saved.
    pub fn validate(&self) -> Result<()> {
        let extension = self.image_extension.trim_start_matches('.');
        if !extension.eq_ignore_ascii_case(IMAGE_EXTENSION) {
            bail!("image_extension '{extension}' is not supported, only '{IMAGE_EXTENSION}' charts can be written");
        }
        let (width, height) = self.figure_size;
        if width == 0 || height == 0 {
            bail!("figure_size must be non-zero, got {width}x{height}");
        }
        Ok(())
    }
}
