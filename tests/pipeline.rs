use std::fs;
use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

use spectral_stack::config::Config;
use spectral_stack::data::loader::load_sample_directory;
use spectral_stack::data::model::{Hour, SampleRecord};
use spectral_stack::error::DataError;
use spectral_stack::pipeline::{run, RunOptions};
use spectral_stack::render::{ChartRenderer, RenderFlow};

const PREAMBLE: &str = "User: lab\nPath: C:\\data\nTest ID: 7\nTest Name: growth\nDate: 01/01/2019\nTime: 09:00\nAbsorbance\n";

/// Keeps what it was asked to draw instead of drawing it.
#[derive(Default)]
struct Recorder {
    charts: Vec<(String, Option<i64>, Vec<Hour>)>,
}

impl ChartRenderer for Recorder {
    fn render(&mut self, name: &str, record: &SampleRecord, z_max: Option<i64>) -> Result<RenderFlow> {
        let hours = record.hours.keys().copied().collect();
        self.charts.push((name.to_string(), z_max, hours));
        Ok(RenderFlow::Continue)
    }
}

fn options(dir: &Path, group_size: Option<u32>) -> RunOptions {
    RunOptions {
        data_dir: dir.to_path_buf(),
        control: "Blank".to_string(),
        group_size,
        graph_test: false,
    }
}

fn write_hour(dir: &Path, name: &str, rows: &str) {
    fs::write(dir.join(name), format!("{PREAMBLE},Wavelength [nm],400,410,420\n{rows}")).unwrap();
}

fn subdirs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn multi_file_run_normalises_and_writes_samples() {
    let dir = TempDir::new().unwrap();
    write_hour(
        dir.path(),
        "data_0h.csv",
        "A1,Blank,10,10,10\nB1,Sample X1,15,20,25\nB2,Sample X2,9,10,11\n",
    );
    write_hour(
        dir.path(),
        "data_1h.csv",
        "A1,Blank,12,12,12\nB1,Sample X1,30,40,50\nB2,Sample X2,12,12,12\n",
    );

    let mut recorder = Recorder::default();
    let summary = run(&options(dir.path(), None), &Config::default(), &mut recorder).unwrap();
    assert_eq!(summary.hours, 2);
    assert_eq!(summary.samples, 2);
    assert_eq!(summary.charts, 2);

    assert_eq!(
        fs::read_to_string(dir.path().join("samples/Sample X1.csv")).unwrap(),
        "Hour/Wavelength,400,410,420\n0,5,10,15\n1,18,28,38\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("samples/Sample X2.csv")).unwrap(),
        "Hour/Wavelength,400,410,420\n0,-1,0,1\n1,0,0,0\n"
    );
    assert!(!dir.path().join("samples/Blank.csv").exists());

    assert_eq!(
        fs::read_to_string(dir.path().join("normalised/normalised_1h.csv")).unwrap(),
        "Sample/Wavelength,400,410,420\nBlank,0,0,0\nSample X1,18,28,38\nSample X2,0,0,0\n"
    );

    let names: Vec<&str> = recorder.charts.iter().map(|(n, _, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Sample X1", "Sample X2"]);
    assert_eq!(recorder.charts[0].2, vec![Hour(0), Hour(1)]);

    // The exported files read back into the same sample-oriented data.
    let reloaded = load_sample_directory(&dir.path().join("samples")).unwrap();
    assert_eq!(
        reloaded.get("Sample X1").unwrap().hours.get(&Hour(1)),
        Some(&vec![18, 28, 38])
    );
    assert_eq!(reloaded.len(), 2);
}

#[test]
fn wide_file_run_matches_multi_file_shape() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("plate.csv"),
        ",,,0 h,0 h,1 h,1 h\n\
         ,,,400,410,400,410\n\
         A,1,Blank,1,1,2,2\n\
         B,1,Sample X1,5,6,7,9\n",
    )
    .unwrap();

    let mut recorder = Recorder::default();
    run(&options(dir.path(), None), &Config::default(), &mut recorder).unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("samples/Sample X1.csv")).unwrap(),
        "Hour/Wavelength,400,410\n0,4,5\n1,5,7\n"
    );
    assert!(dir.path().join("normalised/normalised_0h.csv").exists());
    assert!(dir.path().join("normalised/normalised_1h.csv").exists());
}

#[test]
fn empty_directory_fails_without_creating_output() {
    let dir = TempDir::new().unwrap();

    let mut recorder = Recorder::default();
    let err = run(&options(dir.path(), None), &Config::default(), &mut recorder).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DataError>(),
        Some(DataError::NoCsvFiles(_))
    ));
    assert!(subdirs(dir.path()).is_empty());
    assert!(recorder.charts.is_empty());
}

#[test]
fn unexpected_csv_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_hour(dir.path(), "data_0h.csv", "A1,Blank,1,1,1\nB1,Sample X1,2,2,2\n");
    write_hour(dir.path(), "data_2h.csv", "A1,Blank,1,1,1\nB1,Sample X1,3,3,3\n");
    fs::write(dir.path().join("summary.csv"), "not,an,hour,file\n").unwrap();

    let mut recorder = Recorder::default();
    let summary = run(&options(dir.path(), None), &Config::default(), &mut recorder).unwrap();

    assert_eq!(summary.hours, 2);
    assert_eq!(recorder.charts[0].2, vec![Hour(0), Hour(2)]);
}

#[test]
fn grouped_samples_share_a_scale() {
    let dir = TempDir::new().unwrap();
    let mut rows = String::from("A1,Blank,0,0,0\n");
    for n in 1..=10 {
        rows.push_str(&format!("B{n},Sample X{n},{n},{},0\n", n * 10));
    }
    write_hour(dir.path(), "data_0h.csv", &rows);
    write_hour(dir.path(), "data_1h.csv", &rows);

    let mut recorder = Recorder::default();
    run(&options(dir.path(), Some(5)), &Config::default(), &mut recorder).unwrap();

    assert_eq!(recorder.charts.len(), 10);
    for (name, z_max, _) in &recorder.charts {
        let n: i64 = name.trim_start_matches("Sample X").parse().unwrap();
        let expected = if n <= 5 { 50 } else { 100 };
        assert_eq!(*z_max, Some(expected), "{name}");
    }
}

#[test]
fn graph_test_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_hour(dir.path(), "data_0h.csv", "A1,Blank,1,1,1\nB1,Sample X1,2,2,2\n");
    write_hour(dir.path(), "data_1h.csv", "A1,Blank,1,1,1\nB1,Sample X1,3,3,3\n");

    let mut recorder = Recorder::default();
    let mut opts = options(dir.path(), None);
    opts.graph_test = true;
    let summary = run(&opts, &Config::default(), &mut recorder).unwrap();

    assert_eq!(summary.hours, 2);
    assert!(subdirs(dir.path()).is_empty());
    assert_eq!(recorder.charts.len(), 1);
    assert_eq!(recorder.charts[0].0, "Sample X1");
    assert_eq!(recorder.charts[0].2, vec![Hour(0), Hour(1)]);
}

#[test]
fn missing_control_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_hour(dir.path(), "data_0h.csv", "A1,Blank,1,1,1\nB1,Sample X1,2,2,2\n");
    write_hour(dir.path(), "data_1h.csv", "B1,Sample X1,2,2,2\n");

    let mut recorder = Recorder::default();
    let err = run(&options(dir.path(), None), &Config::default(), &mut recorder).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DataError>(),
        Some(DataError::MissingControl { hour: Hour(1), .. })
    ));
    assert!(subdirs(dir.path()).is_empty());
}

#[test]
fn duplicate_wavelength_row_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_hour(
        dir.path(),
        "data_0h.csv",
        "A1,Blank,1,1,1\n,Wavelength [nm],400,410,420\n",
    );
    write_hour(dir.path(), "data_1h.csv", "A1,Blank,1,1,1\n");

    let mut recorder = Recorder::default();
    let err = run(&options(dir.path(), None), &Config::default(), &mut recorder).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DataError>(),
        Some(DataError::DuplicateWavelengthRow { .. })
    ));
}

#[test]
fn missing_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut recorder = Recorder::default();
    let err = run(
        &options(&dir.path().join("absent"), None),
        &Config::default(),
        &mut recorder,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DataError>(),
        Some(DataError::MissingDirectory(_))
    ));
}
