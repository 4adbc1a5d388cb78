use std::path::{Path, PathBuf};

use csv::Writer;

use super::model::{RawDataset, SampleDataset};
use crate::error::DataResult;

/// Write one `normalised_<hour>h.csv` per hour into `dir`: a
/// `Sample/Wavelength` header, then one row per sample.
pub fn write_normalised(dataset: &RawDataset, dir: &Path) -> DataResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(dataset.len());
    for (hour, record) in dataset.iter() {
        let path = dir.join(format!("normalised_{hour}h.csv"));
        let mut writer = Writer::from_path(&path)?;

        writer.write_record(header("Sample/Wavelength", &record.wavelengths))?;
        for (name, magnitudes) in &record.samples {
            writer.write_record(row(name, magnitudes))?;
        }
        writer.flush()?;

        log::debug!("Wrote {}", path.display());
        written.push(path);
    }

    log::info!("Wrote {} normalised file(s) to {}", written.len(), dir.display());
    Ok(written)
}

/// Write one `<sample>.csv` per sample into `dir`: an `Hour/Wavelength`
/// header, then one row per hour in ascending order.
pub fn write_samples(dataset: &SampleDataset, dir: &Path) -> DataResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(dataset.len());
    for (name, record) in dataset.iter() {
        let path = dir.join(format!("{}.csv", file_stem_for(name)));
        let mut writer = Writer::from_path(&path)?;

        writer.write_record(header("Hour/Wavelength", &record.wavelengths))?;
        // BTreeMap keeps hours in numeric order.
        for (hour, magnitudes) in &record.hours {
            writer.write_record(row(&hour.to_string(), magnitudes))?;
        }
        writer.flush()?;

        log::debug!("Wrote {}", path.display());
        written.push(path);
    }

    log::info!("Wrote {} sample file(s) to {}", written.len(), dir.display());
    Ok(written)
}

/// Sample names become file names; path separators would escape `dir`.
pub fn file_stem_for(sample: &str) -> String {
    sample.replace(['/', '\\'], "_")
}

fn header(corner: &str, wavelengths: &[i64]) -> Vec<String> {
    std::iter::once(corner.to_string())
        .chain(wavelengths.iter().map(i64::to_string))
        .collect()
}

fn row(label: &str, magnitudes: &[i64]) -> Vec<String> {
    std::iter::once(label.to_string())
        .chain(magnitudes.iter().map(i64::to_string))
        .collect()
}
