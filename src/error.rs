use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::Hour;

/// Everything that can stop the ingest → normalise → reshape → export chain.
#[derive(Debug, Error)]
pub enum DataError {
    // -- configuration --
    #[error("Directory {0:?} does not exist")]
    MissingDirectory(PathBuf),
    #[error("No CSV files found in {0:?}")]
    NoCsvFiles(PathBuf),
    #[error("Group size must be at least 1")]
    InvalidGroupSize,
    #[error("Invalid sample grouping pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // -- structural parse errors --
    #[error("File {source_file} contains multiple wavelength rows")]
    DuplicateWavelengthRow { source_file: String },
    #[error("File {source_file} has no wavelength row")]
    MissingWavelengthRow { source_file: String },
    #[error("{source_file}, row {row}, column {column}: '{value}' is not an integer")]
    InvalidInteger {
        source_file: String,
        row: usize,
        column: usize,
        value: String,
    },
    #[error("{source_file}, row {row}: expected at least {expected} columns, found {found}")]
    ShortRow {
        source_file: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{source_file}: sample '{sample}' has {found} values for {expected} wavelengths")]
    LengthMismatch {
        source_file: String,
        sample: String,
        expected: usize,
        found: usize,
    },
    #[error("{source_file}, column {column}: '{value}' is not an hour label")]
    InvalidHourLabel {
        source_file: String,
        column: usize,
        value: String,
    },
    #[error("More than one file provides data for hour {0}")]
    DuplicateHour(Hour),
    #[error("{source_file}: hour {hour} has wavelength {wavelength} in more than one column")]
    DuplicateColumn {
        source_file: String,
        hour: Hour,
        wavelength: i64,
    },
    #[error("{source_file}: hour {hour} has no column for wavelength {wavelength}")]
    MissingColumn {
        source_file: String,
        hour: Hour,
        wavelength: i64,
    },
    #[error("{source_file}: file is missing header row {row}")]
    MissingHeaderRow { source_file: String, row: usize },

    // -- missing keys --
    #[error("Control sample '{control}' is missing from hour {hour}")]
    MissingControl { control: String, hour: Hour },
    #[error("Reference hour {0} is missing, its wavelengths are needed for every sample")]
    MissingReferenceHour(Hour),

    // -- value range --
    #[error("Hour {hour}, sample '{sample}': subtracting control at wavelength {wavelength} overflows")]
    NormaliseOverflow {
        hour: Hour,
        sample: String,
        wavelength: i64,
    },

    // -- I/O --
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DataResult<T> = Result<T, DataError>;
