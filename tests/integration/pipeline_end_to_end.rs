#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use bufreport::{
    ConfigOverrides, InvalidMeasurementError, LogicalIoCheck, ReportConfig, ReportError,
    ReportGenerator, SummaryError,
};
use tempfile::TempDir;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn config_in(dir: &TempDir, input: PathBuf) -> ReportConfig {
    let mut config = ReportConfig::default();
    config
        .apply(ConfigOverrides {
            input_path: Some(input),
            output_path: Some(dir.path().join("charts").join("report.png")),
            dpi: Some(50),
            ..ConfigOverrides::default()
        })
        .expect("valid overrides");
    config
}

fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    assert_eq!(&bytes[12..16], b"IHDR");
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    (width, height)
}

#[test]
fn renders_png_of_configured_size() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_in(&dir, fixture("pf_stats_results.csv"));
    let expected_size = config.figure.pixel_size();

    let outcome = ReportGenerator::new(config.clone())
        .run()
        .expect("report run");

    assert_eq!(outcome.image, config.output_path);
    let bytes = fs::read(&outcome.image).expect("read chart");
    assert_eq!(png_dimensions(&bytes), expected_size);
    assert_eq!(expected_size, (800, 500));

    let leftovers: Vec<_> = fs::read_dir(dir.path().join("charts"))
        .expect("list output dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name != "report.png")
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}

#[test]
fn fixture_summary_matches_hand_computed_values() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_in(&dir, fixture("pf_stats_results.csv"));
    let report = ReportGenerator::new(config).prepare().expect("prepare");

    assert_eq!(report.table.len(), 11);
    assert_eq!(report.derived.labels.first().map(String::as_str), Some("0/100"));
    assert_eq!(report.derived.labels.last().map(String::as_str), Some("100/0"));
    assert_eq!(report.figure.panels.len(), 5);
    assert_eq!(report.figure.categories, report.derived.labels);

    let expected = "\
Average Buffer Hit Rate: 23.18%
Best Hit Rate: 27.00% (at 80/20)
Worst Hit Rate: 20.00% (at 0/100)
Physical Reads Range: 0 - 740
Physical Writes Range: 0 - 750
Total Logical I/O: 1000 (constant across all workloads)
Physical I/O Range: 734 - 766
Avg. I/O Saved: 248 operations
";
    assert_eq!(report.summary.to_string(), expected);
}

#[test]
fn two_workload_example_summary() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_in(&dir, fixture("two_workloads.csv"));
    let summary = ReportGenerator::new(config).summarize().expect("summary");

    let lines: Vec<String> = summary.to_string().lines().map(str::to_owned).collect();
    assert_eq!(
        lines,
        vec![
            "Average Buffer Hit Rate: 60.00%",
            "Best Hit Rate: 65.00% (at 50/50)",
            "Worst Hit Rate: 55.00% (at 90/10)",
            "Physical Reads Range: 200 - 300",
            "Physical Writes Range: 50 - 150",
            "Total Logical I/O: 1000 (constant across all workloads)",
            "Physical I/O Range: 350 - 350",
            "Avg. I/O Saved: 650 operations",
        ]
    );
}

#[test]
fn repeated_runs_are_identical() {
    let dir = TempDir::new().expect("tempdir");
    let generator = ReportGenerator::new(config_in(&dir, fixture("pf_stats_results.csv")));

    let first = generator.run().expect("first run");
    let first_bytes = fs::read(&first.image).expect("read first chart");
    let second = generator.run().expect("second run");
    let second_bytes = fs::read(&second.image).expect("read second chart");

    assert_eq!(first.report, second.report);
    assert_eq!(first.report.summary.to_string(), second.report.summary.to_string());
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn failed_run_leaves_previous_chart_untouched() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("stats.csv");
    fs::write(
        &input,
        "ReadPercent,WritePercent,LogicalReads,PhysicalReads,LogicalWrites,PhysicalWrites,HitRate,TotalLogicalIO,TotalPhysicalIO\n\
         70,30,700,210,300,90,70.0,1000,300\n\
         80,20,0,0,0,0,0.0,0,0\n",
    )
    .expect("write csv");
    let config = config_in(&dir, input);
    fs::create_dir_all(dir.path().join("charts")).expect("mkdir");
    fs::write(&config.output_path, b"previous chart").expect("seed output");

    let err = ReportGenerator::new(config.clone()).run().unwrap_err();
    match err {
        ReportError::InvalidMeasurement(InvalidMeasurementError::ZeroLogicalIo { row, label }) => {
            assert_eq!(row, 2);
            assert_eq!(label, "80/20");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        fs::read(&config.output_path).expect("read output"),
        b"previous chart"
    );
}

#[test]
fn varying_logical_io_respects_check_policy() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("stats.csv");
    fs::write(
        &input,
        "ReadPercent,WritePercent,LogicalReads,PhysicalReads,LogicalWrites,PhysicalWrites,HitRate,TotalLogicalIO,TotalPhysicalIO\n\
         50,50,500,100,500,100,80.0,1000,200\n\
         90,10,1080,200,120,20,81.7,1200,220\n",
    )
    .expect("write csv");

    let mut strict = config_in(&dir, input.clone());
    strict.logical_io_check = LogicalIoCheck::Strict;
    let err = ReportGenerator::new(strict).summarize().unwrap_err();
    assert!(matches!(
        err,
        ReportError::Summary(SummaryError::InconsistentLogicalIo {
            row: 2,
            expected: 1000,
            found: 1200,
            ..
        })
    ));

    let mut lenient = config_in(&dir, input);
    lenient.logical_io_check = LogicalIoCheck::Warn;
    let summary = ReportGenerator::new(lenient).summarize().expect("summary");
    assert!(!summary.logical_io_is_constant());
    assert!(summary
        .to_string()
        .contains("Total Logical I/O: 1000 (varies across workloads: 1000 - 1200)"));
}
