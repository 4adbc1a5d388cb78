use regex::Regex;

use super::model::{GroupMaxima, Hour, RawDataset, SampleDataset, SampleDatasetBuilder};
use crate::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// Sample grouping
// ---------------------------------------------------------------------------

/// Buckets samples by the number in their name so that a bucket can share one
/// chart scale: sample N falls in group `(N - 1) / size`.
#[derive(Debug, Clone)]
pub struct Grouping {
    size: i64,
    pattern: Regex,
}

impl Grouping {
    /// `pattern`'s first capture group must match the sample number.
    pub fn new(size: u32, pattern: &str) -> DataResult<Self> {
        if size == 0 {
            return Err(DataError::InvalidGroupSize);
        }
        Ok(Self {
            size: i64::from(size),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Group of `sample`, or `None` when its name carries no number.
    pub fn group_of(&self, sample: &str) -> Option<i64> {
        let number: i64 = self.pattern.captures(sample)?.get(1)?.as_str().parse().ok()?;
        Some((number - 1).div_euclid(self.size))
    }

    /// Like [`Grouping::group_of`], but unmatched names warn and land in group 0.
    pub fn group_or_default(&self, sample: &str) -> i64 {
        self.group_of(sample).unwrap_or_else(|| {
            log::warn!("Could not find a sample number in '{sample}', putting it in group 0");
            0
        })
    }
}

// ---------------------------------------------------------------------------
// Time-oriented → sample-oriented
// ---------------------------------------------------------------------------

/// Regroup a normalised dataset by sample, leaving out the control.
///
/// Every sample takes its wavelength axis from `reference_hour`, which must be
/// present; the other hours are assumed to share it. With a `grouping`, the
/// largest magnitude of each group is returned as well.
pub fn to_sample_oriented(
    dataset: &RawDataset,
    control: &str,
    reference_hour: Hour,
    grouping: Option<&Grouping>,
) -> DataResult<(SampleDataset, Option<GroupMaxima>)> {
    let reference = dataset
        .get(reference_hour)
        .ok_or(DataError::MissingReferenceHour(reference_hour))?;
    let wavelengths = reference.wavelengths.as_slice();

    let mut samples = SampleDatasetBuilder::new();
    let mut maxima = grouping.map(|_| GroupMaxima::new());

    for (hour, record) in dataset.iter() {
        for (name, magnitudes) in &record.samples {
            if name == control {
                continue;
            }

            if let (Some(grouping), Some(maxima)) = (grouping, maxima.as_mut()) {
                if let Some(peak) = magnitudes.iter().copied().max() {
                    let group = grouping.group_or_default(name);
                    let entry = maxima.entry(group).or_insert(peak);
                    *entry = (*entry).max(peak);
                }
            }

            samples.push(name, hour, wavelengths, magnitudes.clone());
        }
    }

    let samples = samples.build();
    log::info!("Reshaped data into {} sample(s)", samples.len());
    Ok((samples, maxima))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::HourRecord;

    const PATTERN: &str = r"(\d+)\s*$";

    fn dataset(hours: &[(u32, Vec<(&str, Vec<i64>)>)]) -> RawDataset {
        let mut raw = RawDataset::default();
        for (hour, samples) in hours {
            raw.hours.insert(
                Hour(*hour),
                HourRecord {
                    wavelengths: vec![400, 410],
                    samples: samples
                        .iter()
                        .map(|(n, v)| (n.to_string(), v.clone()))
                        .collect::<BTreeMap<_, _>>(),
                },
            );
        }
        raw
    }

    #[test]
    fn regroups_by_sample_without_control() {
        let raw = dataset(&[
            (0, vec![("Blank", vec![0, 0]), ("A", vec![1, 2]), ("B", vec![3, 4])]),
            (1, vec![("Blank", vec![0, 0]), ("A", vec![5, 6])]),
        ]);

        let (samples, maxima) = to_sample_oriented(&raw, "Blank", Hour(0), None).unwrap();
        assert!(maxima.is_none());
        assert!(samples.get("Blank").is_none());
        assert_eq!(samples.len(), 2);

        let a = samples.get("A").unwrap();
        assert_eq!(a.wavelengths, vec![400, 410]);
        assert_eq!(a.hours.get(&Hour(0)), Some(&vec![1, 2]));
        assert_eq!(a.hours.get(&Hour(1)), Some(&vec![5, 6]));

        let b = samples.get("B").unwrap();
        assert_eq!(b.hours.len(), 1);
    }

    #[test]
    fn reference_hour_must_exist() {
        let raw = dataset(&[(3, vec![("Blank", vec![0, 0])])]);
        assert!(matches!(
            to_sample_oriented(&raw, "Blank", Hour(0), None).unwrap_err(),
            DataError::MissingReferenceHour(Hour(0))
        ));
    }

    #[test]
    fn groups_by_trailing_number() {
        let grouping = Grouping::new(5, PATTERN).unwrap();
        let groups: Vec<i64> = (1..=10)
            .map(|n| grouping.group_of(&format!("Sample X{n}")).unwrap())
            .collect();
        assert_eq!(groups, vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
        assert_eq!(grouping.group_of("Sample X"), None);
        assert_eq!(grouping.group_or_default("Sample X"), 0);
    }

    #[test]
    fn zero_group_size_is_rejected() {
        assert!(matches!(
            Grouping::new(0, PATTERN).unwrap_err(),
            DataError::InvalidGroupSize
        ));
    }

    #[test]
    fn group_maxima_span_hours_and_samples() {
        let raw = dataset(&[
            (
                0,
                vec![
                    ("Blank", vec![0, 0]),
                    ("Sample X1", vec![3, 9]),
                    ("Sample X6", vec![1, 2]),
                    ("Mystery", vec![40, 1]),
                ],
            ),
            (
                1,
                vec![
                    ("Blank", vec![0, 0]),
                    ("Sample X5", vec![12, -4]),
                    ("Sample X10", vec![7, 8]),
                ],
            ),
        ]);
        let grouping = Grouping::new(5, PATTERN).unwrap();

        let (_, maxima) = to_sample_oriented(&raw, "Blank", Hour(0), Some(&grouping)).unwrap();
        let maxima = maxima.unwrap();
        // "Mystery" has no number and is counted in group 0.
        assert_eq!(maxima.get(&0), Some(&40));
        assert_eq!(maxima.get(&1), Some(&8));
        assert_eq!(maxima.len(), 2);
    }
}
