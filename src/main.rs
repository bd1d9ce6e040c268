//! Dispatch simulator entry point: CLI wiring and config-driven context construction.

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use chrono::NaiveDateTime;
use tracing::info;

use dispatch_sim::config::ScenarioConfig;
use dispatch_sim::demand::parse_timestamp;
use dispatch_sim::io::export::{export_csv, export_summary_json};
use dispatch_sim::reporting::Summary;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    demand_csv: Option<String>,
    seed_override: Option<u64>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    verbose: bool,
    results_out: Option<String>,
    summary_json: Option<String>,
}

fn print_help() {
    eprintln!("dispatch-sim: hourly merit-order electricity dispatch simulator");
    eprintln!();
    eprintln!("Usage: dispatch-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --demand <path>          Read hourly demand from CSV");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --start <timestamp>      First simulated hour (YYYY-MM-DD HH:MM:SS)");
    eprintln!("  --end <timestamp>        Last simulated hour (inclusive)");
    eprintln!("  --verbose                Log per-hour dispatch diagnostics");
    eprintln!("  --results-out <path>     Export hourly results to CSV");
    eprintln!("  --summary-json <path>    Export the run summary to JSON");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

/// Returns the value following a flag, exiting if it is missing.
fn flag_value(args: &[String], i: &mut usize, flag: &str, what: &str) -> String {
    *i += 1;
    match args.get(*i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {flag} requires a {what} argument");
            process::exit(1);
        }
    }
}

fn timestamp_arg(flag: &str, value: &str) -> NaiveDateTime {
    parse_timestamp(value).unwrap_or_else(|| {
        eprintln!("error: {flag} value \"{value}\" is not a valid timestamp");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        demand_csv: None,
        seed_override: None,
        start: None,
        end: None,
        verbose: false,
        results_out: None,
        summary_json: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                cli.scenario_path = Some(flag_value(&args, &mut i, "--scenario", "path"));
            }
            "--preset" => {
                cli.preset = Some(flag_value(&args, &mut i, "--preset", "name"));
            }
            "--demand" => {
                cli.demand_csv = Some(flag_value(&args, &mut i, "--demand", "path"));
            }
            "--seed" => {
                let v = flag_value(&args, &mut i, "--seed", "u64");
                if let Ok(s) = v.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{v}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--start" => {
                let v = flag_value(&args, &mut i, "--start", "timestamp");
                cli.start = Some(timestamp_arg("--start", &v));
            }
            "--end" => {
                let v = flag_value(&args, &mut i, "--end", "timestamp");
                cli.end = Some(timestamp_arg("--end", &v));
            }
            "--verbose" | "-v" => {
                cli.verbose = true;
            }
            "--results-out" => {
                cli.results_out = Some(flag_value(&args, &mut i, "--results-out", "path"));
            }
            "--summary-json" => {
                cli.summary_json = Some(flag_value(&args, &mut i, "--summary-json", "path"));
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = parse_args();

    // --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(ref path) = cli.demand_csv {
        scenario.demand.csv = Some(PathBuf::from(path));
    }
    if cli.start.is_some() {
        scenario.simulation.start = cli.start;
    }
    if cli.end.is_some() {
        scenario.simulation.end = cli.end;
    }
    scenario.simulation.verbose |= cli.verbose;

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let mut ctx = match scenario.build() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    info!(
        generators = ctx.generators.len(),
        hours = ctx.demand.hours(),
        "Scenario loaded"
    );

    if let Err(e) = ctx.run(scenario.simulation.start, scenario.simulation.end) {
        eprintln!("error: {e}");
        process::exit(1);
    }

    let Some(summary) = Summary::from_context(&ctx) else {
        eprintln!("error: run completed without results");
        process::exit(1);
    };
    println!("{summary}");

    if let (Some(path), Some(results)) = (cli.results_out.as_ref(), ctx.results()) {
        if let Err(e) = export_csv(results, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Results written to {path}");
    }

    if let Some(ref path) = cli.summary_json {
        if let Err(e) = export_summary_json(&summary, Path::new(path)) {
            eprintln!("error: failed to write JSON: {e}");
            process::exit(1);
        }
        eprintln!("Summary written to {path}");
    }
}
