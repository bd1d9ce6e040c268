use std::path::{Path, PathBuf};
use std::process::Command;

use dispatch_sim::config::ScenarioConfig;
use dispatch_sim::reporting::Summary;
use dispatch_sim::sim::SimResults;

fn run_preset(name: &str) -> SimResults {
    let mut ctx = ScenarioConfig::from_preset(name)
        .and_then(|cfg| cfg.build())
        .expect("preset should build");
    ctx.run(None, None).expect("preset should run").clone()
}

fn scenario_path(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file)
}

fn dispatch_sim(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_dispatch-sim"))
        .args(args)
        .output()
        .expect("dispatch-sim process should run")
}

#[test]
fn presets_run_a_full_week() {
    for name in ScenarioConfig::PRESETS {
        let results = run_preset(name);
        assert_eq!(results.timesteps(), 168, "preset {name}");
        assert!(results.total_demand() > 0.0, "preset {name}");
        assert!(results.unserved_percent().is_some(), "preset {name}");
    }
}

#[test]
fn high_renewables_spills_more_than_baseline() {
    let baseline = run_preset("baseline");
    let high = run_preset("high_renewables");
    assert!(
        high.surplus_energy() > baseline.surplus_energy(),
        "expected more surplus: baseline={:.1}, high_renewables={:.1}",
        baseline.surplus_energy(),
        high.surplus_energy()
    );
}

#[test]
fn tighter_penetration_limit_curbs_renewables() {
    let baseline = run_preset("baseline");
    let constrained = run_preset("constrained_nsp");
    // Wind and solar lead the merit order in both presets.
    let renewables = |r: &SimResults| (0..3).map(|c| r.generator_energy(c)).sum::<f64>();
    assert!(renewables(&constrained) <= renewables(&baseline) + 1e-6);
}

#[test]
fn scenario_file_with_relative_demand_csv() {
    let cfg = ScenarioConfig::from_toml_file(&scenario_path("two_region.toml"))
        .expect("scenario should parse");
    assert!(cfg.validate().is_empty());

    let mut ctx = cfg.build().expect("scenario should build");
    assert_eq!(ctx.demand.hours(), 48);
    let results = ctx.run(None, None).expect("scenario should run");
    assert_eq!(results.timesteps(), 48);
    assert_eq!(results.generator_names().len(), 6);
}

#[test]
fn cli_prints_summary_for_preset() {
    let output = dispatch_sim(&["--preset", "baseline"]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert!(stdout.contains("Generators:"));
    assert!(stdout.contains("Timesteps: 168 h"));
    assert!(stdout.contains("Demand energy:"));
    assert!(stdout.contains("Unstored surplus energy:"));
}

#[test]
fn cli_window_and_exports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let csv_path = dir.path().join("results.csv");
    let json_path = dir.path().join("summary.json");
    let scenario = scenario_path("two_region.toml");

    let output = dispatch_sim(&[
        "--scenario",
        scenario.to_str().expect("utf-8 path"),
        "--start",
        "2021-07-01 06:00:00",
        "--end",
        "2021-07-02T05:00:00",
        "--results-out",
        csv_path.to_str().expect("utf-8 path"),
        "--summary-json",
        json_path.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Timesteps: 24 h"));

    let csv = std::fs::read_to_string(&csv_path).expect("results csv written");
    let mut lines = csv.lines();
    let header = lines.next().expect("header row");
    assert!(header.starts_with("timestamp,demand,unserved,gen:South wind"));
    assert_eq!(lines.count(), 24);
    assert!(csv.contains("2021-07-01 06:00:00,"));

    let json = std::fs::read_to_string(&json_path).expect("summary json written");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["timesteps"], 24);
    assert_eq!(
        value["generators"].as_array().map(Vec::len),
        Some(6)
    );
}

#[test]
fn cli_rejects_bad_input() {
    let unknown = dispatch_sim(&["--preset", "nonexistent"]);
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("unknown preset"));

    let outside = dispatch_sim(&["--preset", "baseline", "--start", "2030-01-01 00:00:00"]);
    assert!(!outside.status.success());

    let bad_flag = dispatch_sim(&["--bogus"]);
    assert!(!bad_flag.status.success());
}

#[test]
fn cli_scenario_from_temp_toml() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tiny.toml");
    std::fs::write(
        &path,
        r#"
[demand]
start = "2020-03-01T00:00:00"
hours = 12
base_mw = 100.0
amp_mw = 0.0
noise_std = 0.0

[[regions]]
id = "Only"
polygons = [1]

[[generators]]
kind = "fossil"
name = "Coal"
polygon = 1
capacity = 60.0
"#,
    )
    .expect("write toml");

    let output = dispatch_sim(&["--scenario", path.to_str().expect("utf-8 path")]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("WARNING: reliability standard exceeded"));
    assert!(stdout.contains("Unserved total hours: 12"));
    assert!(stdout.contains("Number of unserved energy events: 1"));
    assert!(stdout.contains("Shortfalls (min, max): (40.00 MW, 40.00 MW)"));
}

#[test]
fn summary_matches_results() {
    let results = run_preset("constrained_nsp");
    let cfg = ScenarioConfig::constrained_nsp();
    let ctx = cfg.build().expect("preset should build");
    let summary = Summary::new(&results, &ctx.generators);
    assert_eq!(summary.timesteps, 168);
    assert_eq!(summary.unserved_hours, results.unserved().len());
    assert_eq!(summary.generators.len(), cfg.generators.len());
    assert_eq!(summary.generators[0].name, "SA wind");
}
