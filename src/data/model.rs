use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// Hour – time-point label
// ---------------------------------------------------------------------------

/// Elapsed-time label of one measurement batch.
///
/// Despite the name this is an opaque ordinal: it orders numerically and is
/// written back out as its plain decimal digits (`"0"`, `"12"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hour(pub u32);

impl Hour {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Hour {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Hour)
    }
}

// ---------------------------------------------------------------------------
// HourRecord – everything measured at one time point
// ---------------------------------------------------------------------------

/// One time point: a shared wavelength axis plus one magnitude series per sample.
///
/// Every series has exactly `wavelengths.len()` entries; [`HourRecordBuilder`]
/// refuses to build a record that breaks this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourRecord {
    pub wavelengths: Vec<i64>,
    pub samples: BTreeMap<String, Vec<i64>>,
}

impl HourRecord {
    pub fn sample(&self, name: &str) -> Option<&[i64]> {
        self.samples.get(name).map(Vec::as_slice)
    }
}

/// Accumulates the rows of one hour file before they are checked and frozen.
#[derive(Debug, Default)]
pub struct HourRecordBuilder {
    source: String,
    wavelengths: Option<Vec<i64>>,
    samples: BTreeMap<String, Vec<i64>>,
}

impl HourRecordBuilder {
    /// `source` names the file the rows come from and is only used in errors.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Set the wavelength axis. A second call is an error: the file defines
    /// its axis twice.
    pub fn wavelengths(&mut self, wavelengths: Vec<i64>) -> DataResult<()> {
        if self.wavelengths.is_some() {
            return Err(DataError::DuplicateWavelengthRow {
                source_file: self.source.clone(),
            });
        }
        self.wavelengths = Some(wavelengths);
        Ok(())
    }

    /// Store a sample series. A repeated name replaces the earlier row.
    pub fn sample(&mut self, name: impl Into<String>, magnitudes: Vec<i64>) {
        let name = name.into();
        if self.samples.insert(name.clone(), magnitudes).is_some() {
            log::warn!("Sample '{name}' appears twice in {}, keeping the last row", self.source);
        }
    }

    pub fn build(self) -> DataResult<HourRecord> {
        let wavelengths = self.wavelengths.ok_or_else(|| DataError::MissingWavelengthRow {
            source_file: self.source.clone(),
        })?;

        for (name, magnitudes) in &self.samples {
            if magnitudes.len() != wavelengths.len() {
                return Err(DataError::LengthMismatch {
                    source_file: self.source.clone(),
                    sample: name.clone(),
                    expected: wavelengths.len(),
                    found: magnitudes.len(),
                });
            }
        }

        Ok(HourRecord {
            wavelengths,
            samples: self.samples,
        })
    }
}

// ---------------------------------------------------------------------------
// RawDataset – time-oriented data as read from disk
// ---------------------------------------------------------------------------

/// Time-oriented dataset: hour → record, ordered by hour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDataset {
    pub hours: BTreeMap<Hour, HourRecord>,
}

impl RawDataset {
    pub fn get(&self, hour: Hour) -> Option<&HourRecord> {
        self.hours.get(&hour)
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// Iterate `(hour, record)` in ascending hour order.
    pub fn iter(&self) -> impl Iterator<Item = (Hour, &HourRecord)> {
        self.hours.iter().map(|(h, r)| (*h, r))
    }
}

/// Collects finished hour records, rejecting a second record for the same hour.
#[derive(Debug, Default)]
pub struct RawDatasetBuilder {
    hours: BTreeMap<Hour, HourRecord>,
}

impl RawDatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hour: Hour, record: HourRecord) -> DataResult<()> {
        if self.hours.contains_key(&hour) {
            return Err(DataError::DuplicateHour(hour));
        }
        self.hours.insert(hour, record);
        Ok(())
    }

    pub fn build(self) -> RawDataset {
        RawDataset { hours: self.hours }
    }
}

// ---------------------------------------------------------------------------
// SampleRecord / SampleDataset – sample-oriented data after reshaping
// ---------------------------------------------------------------------------

/// All time points recorded for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub wavelengths: Vec<i64>,
    pub hours: BTreeMap<Hour, Vec<i64>>,
}

impl SampleRecord {
    pub fn new(wavelengths: Vec<i64>) -> Self {
        Self {
            wavelengths,
            hours: BTreeMap::new(),
        }
    }

    /// Largest magnitude over every hour, `None` when there are no values.
    pub fn max_magnitude(&self) -> Option<i64> {
        self.hours.values().flatten().copied().max()
    }

    /// Smallest magnitude over every hour, `None` when there are no values.
    pub fn min_magnitude(&self) -> Option<i64> {
        self.hours.values().flatten().copied().min()
    }
}

/// Sample-oriented dataset: sample name → record, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleDataset {
    pub samples: BTreeMap<String, SampleRecord>,
}

impl SampleDataset {
    pub fn get(&self, name: &str) -> Option<&SampleRecord> {
        self.samples.get(name)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SampleRecord)> {
        self.samples.iter().map(|(n, r)| (n.as_str(), r))
    }
}

/// Builds a [`SampleDataset`] one `(sample, hour)` series at a time.
#[derive(Debug, Default)]
pub struct SampleDatasetBuilder {
    samples: BTreeMap<String, SampleRecord>,
}

impl SampleDatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `magnitudes` for `sample` at `hour`. The first series seen for a
    /// sample creates its record with the given wavelength axis.
    pub fn push(&mut self, sample: &str, hour: Hour, wavelengths: &[i64], magnitudes: Vec<i64>) {
        self.samples
            .entry(sample.to_string())
            .or_insert_with(|| SampleRecord::new(wavelengths.to_vec()))
            .hours
            .insert(hour, magnitudes);
    }

    pub fn build(self) -> SampleDataset {
        SampleDataset {
            samples: self.samples,
        }
    }
}

/// Group id → largest magnitude seen in that group.
pub type GroupMaxima = BTreeMap<i64, i64>;
