use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::data::export::{write_normalised, write_samples};
use crate::data::loader::load_directory;
use crate::data::normalize::normalise;
use crate::data::reshape::{to_sample_oriented, Grouping};
use crate::render::{render_samples, ChartRenderer};

/// What to process, as given on the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub data_dir: PathBuf,
    pub control: String,
    pub group_size: Option<u32>,
    /// Keep results in memory; only the charts are produced.
    pub graph_test: bool,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub hours: usize,
    pub samples: usize,
    pub charts: usize,
}

/// Ingest, normalise, reshape, export and render.
///
/// Nothing is written before the data has been read and reshaped
/// successfully. With `graph_test` no CSV output is written at all.
pub fn run(
    options: &RunOptions,
    config: &Config,
    renderer: &mut dyn ChartRenderer,
) -> Result<RunSummary> {
    let grouping = options
        .group_size
        .map(|size| Grouping::new(size, &config.group_pattern))
        .transpose()
        .context("invalid sample grouping")?;

    let raw = load_directory(&options.data_dir, config)?;
    let hours = raw.len();

    let normalised = normalise(raw, &options.control)?;
    let (samples, maxima) = to_sample_oriented(
        &normalised,
        &options.control,
        config.reference_hour,
        grouping.as_ref(),
    )?;

    if !options.graph_test {
        write_samples(&samples, &options.data_dir.join(&config.samples_dir))
            .context("writing sample files")?;
        write_normalised(&normalised, &options.data_dir.join(&config.normalised_dir))
            .context("writing normalised files")?;
    }

    let scales = grouping.as_ref().zip(maxima.as_ref());
    let charts = render_samples(&samples, scales, renderer)?;

    Ok(RunSummary {
        hours,
        samples: samples.len(),
        charts,
    })
}
