use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use regex::Regex;

use super::model::{
    Hour, HourRecord, HourRecordBuilder, RawDataset, RawDatasetBuilder, SampleDataset, SampleRecord,
};
use crate::config::{Config, Layout, WideLayout};
use crate::error::{DataError, DataResult};

/// File names of the multi-file layout: `<anything>_<hour>h.csv`.
const HOUR_FILE_PATTERN: &str = r"(?i)_(\d+)h\.csv$";

/// Magnitudes start in this column of an hour file (0-based).
const FIRST_VALUE_COLUMN: usize = 2;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every measurement file in `dir` into a time-oriented dataset.
///
/// The layout is taken from `config.layout`; with [`Layout::Auto`] a
/// directory holding exactly one CSV file is read as a wide file.
pub fn load_directory(dir: &Path, config: &Config) -> DataResult<RawDataset> {
    if !dir.is_dir() {
        return Err(DataError::MissingDirectory(dir.to_path_buf()));
    }

    log::info!("Reading data from: {}", dir.display());

    let files = discover_csv_files(dir)?;
    if files.is_empty() {
        return Err(DataError::NoCsvFiles(dir.to_path_buf()));
    }

    let layout = match config.layout {
        Layout::Auto if files.len() == 1 => Layout::Wide,
        Layout::Auto => Layout::MultiFile,
        other => other,
    };

    let dataset = match layout {
        Layout::Wide => {
            if files.len() > 1 {
                log::warn!(
                    "Wide layout requested but {} CSV files found, reading only {}",
                    files.len(),
                    files[0].display()
                );
            }
            load_wide_file(&files[0], &config.wide)?
        }
        _ => load_hour_files(&files, config.header_rows)?,
    };

    log::info!("Loaded {} hour(s)", dataset.len());
    Ok(dataset)
}

/// All `*.csv` files (extension case-insensitive) directly inside `dir`, sorted.
pub fn discover_csv_files(dir: &Path) -> DataResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Hour encoded in a multi-file layout file name, e.g. `plate_12h.csv` → 12.
pub fn hour_from_file_name(pattern: &Regex, path: &Path) -> Option<Hour> {
    let name = path.file_name()?.to_str()?;
    pattern.captures(name)?.get(1)?.as_str().parse().ok()
}

// ---------------------------------------------------------------------------
// Multi-file layout
// ---------------------------------------------------------------------------

fn load_hour_files(files: &[PathBuf], header_rows: usize) -> DataResult<RawDataset> {
    let pattern = Regex::new(HOUR_FILE_PATTERN)?;
    let mut dataset = RawDatasetBuilder::new();

    for path in files {
        let Some(hour) = hour_from_file_name(&pattern, path) else {
            log::warn!("Found unexpected CSV file: {}", path.display());
            continue;
        };

        log::debug!("Reading hour {hour} from {}", path.display());
        let record = load_hour_file(path, header_rows)?;
        dataset.insert(hour, record)?;
    }

    Ok(dataset.build())
}

/// Parse one hour file.
///
/// The first `header_rows` lines are instrument metadata and skipped. After
/// that, the row with an empty first cell and `Wavelength...` in the second is
/// the wavelength axis; every other row is `<ignored>,<sample>,<values...>`.
pub fn load_hour_file(path: &Path, header_rows: usize) -> DataResult<HourRecord> {
    let source = path.display().to_string();
    let bytes = std::fs::read(path)?;

    // Header lines may hold any encoding; only the body has to be UTF-8.
    let body = skip_lines(&bytes, header_rows);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let mut hour = HourRecordBuilder::new(source.clone());

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = header_rows + line_of(&record, i + 1);

        if record.len() < FIRST_VALUE_COLUMN {
            return Err(DataError::ShortRow {
                source_file: source,
                row,
                expected: FIRST_VALUE_COLUMN,
                found: record.len(),
            });
        }

        let values = parse_ints(&record, FIRST_VALUE_COLUMN, &source, row)?;
        if is_wavelength_row(&record) {
            hour.wavelengths(values)?;
        } else {
            hour.sample(&record[1], values);
        }
    }

    hour.build()
}

/// Drop the first `count` raw lines, blank ones included.
fn skip_lines(bytes: &[u8], count: usize) -> &[u8] {
    let mut rest = bytes;
    for _ in 0..count {
        match rest.iter().position(|b| *b == b'\n') {
            Some(end) => rest = &rest[end + 1..],
            None => return &[],
        }
    }
    rest
}

fn is_wavelength_row(record: &StringRecord) -> bool {
    record[0].is_empty()
        && record[1]
            .get(..10)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("wavelength"))
}

// ---------------------------------------------------------------------------
// Single wide-file layout
// ---------------------------------------------------------------------------

/// Parse a wide file holding every hour as a block of columns.
///
/// Each value column is addressed by the hour label and wavelength in the two
/// header rows above it. Every hour gets the sorted set of all wavelengths as
/// its axis and each column lands at its wavelength's position, so the result
/// has the same shape as the multi-file layout.
pub fn load_wide_file(path: &Path, layout: &WideLayout) -> DataResult<RawDataset> {
    let source = path.display().to_string();
    log::debug!("Reading wide file {source}");

    let records = {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        reader.records().collect::<Result<Vec<_>, _>>()?
    };

    let hour_row = header_row(&records, layout.hour_row, &source)?;
    let wavelength_row = header_row(&records, layout.wavelength_row, &source)?;

    let first = layout.metadata_columns;
    let last = hour_row.len().max(wavelength_row.len());

    // Hour and wavelength of every value column.
    let mut columns = Vec::with_capacity(last.saturating_sub(first));
    for column in first..last {
        let label = hour_row.get(column).unwrap_or("");
        let hour = parse_hour_label(label).ok_or_else(|| DataError::InvalidHourLabel {
            source_file: source.clone(),
            column: column + 1,
            value: label.to_string(),
        })?;
        let wavelength = parse_cell(
            wavelength_row.get(column).unwrap_or(""),
            &source,
            layout.wavelength_row + 1,
            column + 1,
        )?;
        columns.push((hour, wavelength));
    }

    let wavelengths: Vec<i64> = columns
        .iter()
        .map(|(_, w)| *w)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let position: BTreeMap<i64, usize> = wavelengths
        .iter()
        .enumerate()
        .map(|(i, w)| (*w, i))
        .collect();

    check_column_coverage(&columns, &wavelengths, &source)?;

    let mut hours: BTreeMap<Hour, HourRecordBuilder> = BTreeMap::new();
    for (hour, _) in &columns {
        if !hours.contains_key(hour) {
            let mut builder = HourRecordBuilder::new(source.clone());
            builder.wavelengths(wavelengths.clone())?;
            hours.insert(*hour, builder);
        }
    }

    for (i, record) in records.iter().enumerate().skip(layout.first_data_row) {
        let row = line_of(record, i + 1);
        let needed = last.max(layout.name_column + 1);
        if record.len() < needed {
            return Err(DataError::ShortRow {
                source_file: source,
                row,
                expected: needed,
                found: record.len(),
            });
        }

        let name = &record[layout.name_column];
        let mut series: BTreeMap<Hour, Vec<i64>> = hours
            .keys()
            .map(|h| (*h, vec![0; wavelengths.len()]))
            .collect();

        for (offset, (hour, wavelength)) in columns.iter().enumerate() {
            let column = first + offset;
            let value = parse_cell(&record[column], &source, row, column + 1)?;
            if let Some(values) = series.get_mut(hour) {
                values[position[wavelength]] = value;
            }
        }

        for (hour, values) in series {
            if let Some(builder) = hours.get_mut(&hour) {
                builder.sample(name, values);
            }
        }
    }

    let mut dataset = RawDatasetBuilder::new();
    for (hour, builder) in hours {
        dataset.insert(hour, builder.build()?)?;
    }
    Ok(dataset.build())
}

fn header_row<'a>(records: &'a [StringRecord], row: usize, source: &str) -> DataResult<&'a StringRecord> {
    records.get(row).ok_or_else(|| DataError::MissingHeaderRow {
        source_file: source.to_string(),
        row: row + 1,
    })
}

/// `"3 h"` → hour 3: the token before the first space.
fn parse_hour_label(label: &str) -> Option<Hour> {
    label.trim().split(' ').next()?.parse().ok()
}

/// Every hour must carry each wavelength exactly once.
fn check_column_coverage(
    columns: &[(Hour, i64)],
    wavelengths: &[i64],
    source: &str,
) -> DataResult<()> {
    let mut seen = HashSet::new();
    for (hour, wavelength) in columns {
        if !seen.insert((*hour, *wavelength)) {
            return Err(DataError::DuplicateColumn {
                source_file: source.to_string(),
                hour: *hour,
                wavelength: *wavelength,
            });
        }
    }

    let hours: BTreeSet<Hour> = columns.iter().map(|(h, _)| *h).collect();
    for hour in hours {
        if let Some(wavelength) = wavelengths.iter().find(|w| !seen.contains(&(hour, **w))) {
            return Err(DataError::MissingColumn {
                source_file: source.to_string(),
                hour,
                wavelength: *wavelength,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Exported sample files
// ---------------------------------------------------------------------------

/// Read back a directory written by [`super::export::write_samples`].
///
/// Each `<sample>.csv` holds a `Hour/Wavelength,<wavelengths...>` header
/// followed by one `<hour>,<values...>` row per hour.
pub fn load_sample_directory(dir: &Path) -> DataResult<SampleDataset> {
    if !dir.is_dir() {
        return Err(DataError::MissingDirectory(dir.to_path_buf()));
    }

    let files = discover_csv_files(dir)?;
    if files.is_empty() {
        return Err(DataError::NoCsvFiles(dir.to_path_buf()));
    }

    let mut dataset = SampleDataset::default();
    for path in files {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("Skipping file with unreadable name: {}", path.display());
            continue;
        };
        let record = load_sample_file(&path)?;
        dataset.samples.insert(name.to_string(), record);
    }
    Ok(dataset)
}

fn load_sample_file(path: &Path) -> DataResult<SampleRecord> {
    let source = path.display().to_string();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records();
    let header = match records.next() {
        Some(header) => header?,
        None => {
            return Err(DataError::MissingHeaderRow {
                source_file: source,
                row: 1,
            })
        }
    };

    let mut sample = SampleRecord::new(parse_ints(&header, 1, &source, 1)?);

    for (i, result) in records.enumerate() {
        let record = result?;
        let row = line_of(&record, i + 2);
        let label = record.get(0).unwrap_or("");
        let hour: Hour = label.parse().map_err(|_| DataError::InvalidHourLabel {
            source_file: source.clone(),
            column: 1,
            value: label.to_string(),
        })?;

        let values = parse_ints(&record, 1, &source, row)?;
        if values.len() != sample.wavelengths.len() {
            return Err(DataError::LengthMismatch {
                source_file: source,
                sample: format!("hour {hour}"),
                expected: sample.wavelengths.len(),
                found: values.len(),
            });
        }
        sample.hours.insert(hour, values);
    }

    Ok(sample)
}

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

fn line_of(record: &StringRecord, fallback: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback)
}

fn parse_ints(record: &StringRecord, from: usize, source: &str, row: usize) -> DataResult<Vec<i64>> {
    record
        .iter()
        .enumerate()
        .skip(from)
        .map(|(column, cell)| parse_cell(cell, source, row, column + 1))
        .collect()
}

fn parse_cell(cell: &str, source: &str, row: usize, column: usize) -> DataResult<i64> {
    cell.trim()
        .parse::<i64>()
        .map_err(|_| DataError::InvalidInteger {
            source_file: source.to_string(),
            row,
            column,
            value: cell.to_string(),
        })
}
