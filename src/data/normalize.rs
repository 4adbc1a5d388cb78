use super::model::RawDataset;
use crate::error::{DataError, DataResult};

/// Subtract the `control` series from every series of the same hour.
///
/// The control itself ends up all zero. Every hour is checked for the control
/// before anything is changed. A difference outside the `i64` range is an
/// error rather than a wrapped value.
pub fn normalise(mut dataset: RawDataset, control: &str) -> DataResult<RawDataset> {
    if let Some((hour, _)) = dataset.iter().find(|(_, r)| !r.samples.contains_key(control)) {
        return Err(DataError::MissingControl {
            control: control.to_string(),
            hour,
        });
    }

    for (hour, record) in dataset.hours.iter_mut() {
        let Some(baseline) = record.samples.get(control).cloned() else {
            return Err(DataError::MissingControl {
                control: control.to_string(),
                hour: *hour,
            });
        };

        for (name, magnitudes) in record.samples.iter_mut() {
            for ((value, base), wavelength) in
                magnitudes.iter_mut().zip(&baseline).zip(&record.wavelengths)
            {
                *value = value
                    .checked_sub(*base)
                    .ok_or_else(|| DataError::NormaliseOverflow {
                        hour: *hour,
                        sample: name.clone(),
                        wavelength: *wavelength,
                    })?;
            }
        }
    }

    log::info!("Subtracted control '{control}' from {} hour(s)", dataset.len());
    Ok(dataset)
}
