//! Chart output: one 3D line stack per sample, either saved as an image or
//! shown in a window.

pub mod chart;
pub mod viewer;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::export::file_stem_for;
use crate::data::model::{GroupMaxima, SampleDataset, SampleRecord};
use crate::data::reshape::Grouping;

pub use viewer::InteractiveRenderer;

/// Whether [`render_samples`] should go on to the next sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFlow {
    Continue,
    Stop,
}

/// Consumer of finished sample records.
pub trait ChartRenderer {
    /// Render one sample. `z_max` is the shared top of the magnitude axis
    /// when samples are grouped.
    fn render(&mut self, name: &str, record: &SampleRecord, z_max: Option<i64>) -> Result<RenderFlow>;
}

/// Render every sample in name order until the renderer asks to stop.
///
/// With `scales`, each sample's axis tops out at its group's maximum.
/// Returns the number of charts rendered.
pub fn render_samples(
    samples: &SampleDataset,
    scales: Option<(&Grouping, &GroupMaxima)>,
    renderer: &mut dyn ChartRenderer,
) -> Result<usize> {
    let mut rendered = 0;
    for (name, record) in samples.iter() {
        let z_max = scales.and_then(|(grouping, maxima)| {
            // Unmatched names were already reported while reshaping.
            let group = grouping.group_of(name).unwrap_or(0);
            maxima.get(&group).copied()
        });

        let flow = renderer
            .render(name, record, z_max)
            .with_context(|| format!("rendering chart for '{name}'"))?;
        rendered += 1;
        if flow == RenderFlow::Stop {
            break;
        }
    }
    Ok(rendered)
}

// ---------------------------------------------------------------------------
// Image files
// ---------------------------------------------------------------------------

/// Saves `<dir>/<sample>.<extension>` for every sample. The directory is
/// created on the first chart.
pub struct ImageRenderer {
    dir: PathBuf,
    extension: String,
    size: (u32, u32),
}

impl ImageRenderer {
    pub fn new(dir: impl Into<PathBuf>, extension: &str, size: (u32, u32)) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
            size,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", file_stem_for(name), self.extension))
    }
}

impl ChartRenderer for ImageRenderer {
    fn render(&mut self, name: &str, record: &SampleRecord, z_max: Option<i64>) -> Result<RenderFlow> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let chart = chart::draw_line_stack(name, record, z_max, self.size)?;
        let path = self.path_for(name);
        chart
            .save(&path)
            .with_context(|| format!("saving {}", path.display()))?;

        log::debug!("Wrote {}", path.display());
        Ok(RenderFlow::Continue)
    }
}
