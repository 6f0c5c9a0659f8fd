#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Working directory holding the measurements under their default name.
fn workdir(fixture_name: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::copy(fixture(fixture_name), dir.path().join("pf_stats_results.csv")).expect("copy fixture");
    dir
}

fn bufreport(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("bufreport");
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("BUFREPORT_CONFIG")
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .args(["--theme", "plain"]);
    cmd
}

fn stdout_of(cmd: &mut assert_cmd::Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf-8 stdout")
}

#[test]
fn default_command_renders_chart_and_prints_summary() {
    let dir = workdir("two_workloads.csv");
    let stdout = stdout_of(bufreport(&dir).args(["--dpi", "50"]));

    assert!(dir.path().join("pf_layer_performance_graph.png").is_file());
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines.first().copied(),
        Some("✔ Graph saved as: pf_layer_performance_graph.png")
    );
    assert!(lines.contains(&"▸ Summary Statistics"));
    let stats: Vec<&str> = lines
        .iter()
        .skip_while(|line| !line.contains("Summary Statistics"))
        .skip(1)
        .map(|line| line.trim())
        .collect();
    assert_eq!(stats.len(), 8);
    assert_eq!(stats[0], "Average Buffer Hit Rate: 60.00%");
    assert_eq!(stats[7], "Avg. I/O Saved: 650 operations");
}

#[test]
fn render_output_is_stable_across_runs() {
    let dir = workdir("pf_stats_results.csv");
    let args = ["render", "--dpi", "50", "--output", "out/chart.png"];

    let first = stdout_of(bufreport(&dir).args(args));
    let first_png = fs::read(dir.path().join("out/chart.png")).expect("first chart");
    let second = stdout_of(bufreport(&dir).args(args));
    let second_png = fs::read(dir.path().join("out/chart.png")).expect("second chart");

    assert_eq!(first, second);
    assert_eq!(first_png, second_png);
    assert!(first.contains("Best Hit Rate: 27.00% (at 80/20)"));
}

#[test]
fn summary_subcommand_writes_no_image() {
    let dir = workdir("pf_stats_results.csv");
    let stdout = stdout_of(bufreport(&dir).args(["summary", "--quiet"]));

    assert!(!dir.path().join("pf_layer_performance_graph.png").exists());
    let expected = "\
Summary Statistics
  Average Buffer Hit Rate: 23.18%
            Best Hit Rate: 27.00% (at 80/20)
           Worst Hit Rate: 20.00% (at 0/100)
     Physical Reads Range: 0 - 740
    Physical Writes Range: 0 - 750
        Total Logical I/O: 1000 (constant across all workloads)
       Physical I/O Range: 734 - 766
           Avg. I/O Saved: 248 operations
";
    assert_eq!(stdout, expected);
}

#[test]
fn subtitle_flags_flow_into_config() {
    let dir = workdir("two_workloads.csv");
    let stdout = stdout_of(bufreport(&dir).args([
        "config",
        "--buffer-size",
        "32",
        "--strategy",
        "mru",
        "--logical-io",
        "warn",
    ]));

    assert!(stdout.contains("buffer_size = 32"), "{stdout}");
    assert!(stdout.contains("strategy = \"MRU\""), "{stdout}");
    assert!(stdout.contains("logical_io_check = \"warn\""), "{stdout}");
    assert!(stdout.contains("request_count = 1000"), "{stdout}");
}

#[test]
fn config_file_is_honoured() {
    let dir = workdir("two_workloads.csv");
    let config = dir.path().join("report.toml");
    fs::write(
        &config,
        "output_path = \"from-file.png\"\n\n[experiment]\nrequest_count = 2000\n",
    )
    .expect("write config");

    let stdout = stdout_of(
        bufreport(&dir)
            .env("BUFREPORT_CONFIG", &config)
            .args(["summary"]),
    );
    assert!(stdout.contains("Avg. I/O Saved: 1650 operations"), "{stdout}");

    let stdout = stdout_of(bufreport(&dir).args(["config", "--config"]).arg(&config));
    assert!(stdout.contains("output_path = \"from-file.png\""), "{stdout}");
}

#[test]
fn empty_table_fails_without_output() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("pf_stats_results.csv"),
        "ReadPercent,WritePercent,LogicalReads,PhysicalReads,LogicalWrites,PhysicalWrites,HitRate,TotalLogicalIO,TotalPhysicalIO\n",
    )
    .expect("write csv");

    let assert = bufreport(&dir).assert().failure().code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("error: cannot render an empty measurement table"), "{stderr}");
    assert!(!dir.path().join("pf_layer_performance_graph.png").exists());
}

#[test]
fn missing_columns_are_named() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("pf_stats_results.csv"),
        "ReadPercent,WritePercent,LogicalReads,PhysicalReads,LogicalWrites,PhysicalWrites,TotalLogicalIO\n50,50,1,1,1,1,2\n",
    )
    .expect("write csv");

    let assert = bufreport(&dir).arg("summary").assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("HitRate, TotalPhysicalIO"), "{stderr}");
}

#[test]
fn missing_input_file_fails() {
    let dir = TempDir::new().expect("tempdir");
    let assert = bufreport(&dir)
        .args(["render", "--input", "absent.csv"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("error: failed to open measurements absent.csv"), "{stderr}");
}

#[test]
fn varying_logical_io_is_flagged_on_stderr() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("pf_stats_results.csv"),
        "ReadPercent,WritePercent,LogicalReads,PhysicalReads,LogicalWrites,PhysicalWrites,HitRate,TotalLogicalIO,TotalPhysicalIO\n\
         50,50,500,100,500,100,80.0,1000,200\n\
         90,10,1080,200,120,20,81.7,1200,220\n",
    )
    .expect("write csv");

    let assert = bufreport(&dir)
        .args(["summary", "--logical-io", "warn"])
        .assert()
        .success();
    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("⚠ TotalLogicalIO is not constant across workloads (1000 - 1200)"),
        "{stderr}"
    );
    assert!(
        stdout.contains("Total Logical I/O: 1000 (varies across workloads: 1000 - 1200)"),
        "{stdout}"
    );
    assert!(!stdout.contains('⚠'));

    bufreport(&dir).arg("summary").assert().failure().code(1);
}
