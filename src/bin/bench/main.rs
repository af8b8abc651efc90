// Tanker Fleet Benchmark Runner
// Monte Carlo over seeds, seedable ChaCha8 PRNG, table or JSON report
//
// Usage:
//   cargo run --release --bin bench                     # Run all scenarios (10 runs each)
//   cargo run --release --bin bench -- --runs 3         # Quick mode
//   cargo run --release --bin bench -- LOW_FUEL         # Filter by name
//   cargo run --release --bin bench -- --seed 42        # Custom base seed
//   cargo run --release --bin bench -- --config f.json  # Base config from file
//   cargo run --release --bin bench -- --json           # JSON report on stdout
//
// Log verbosity follows RUST_LOG (default: warn).

mod monte_carlo;
mod report;
mod scenarios;

use report::*;
use scenarios::*;
use std::time::Instant;
use tanker_engine::SimConfig;
use tracing_subscriber::EnvFilter;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    config: Option<String>,
    json: bool,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 10,
        seed: 0,
        config: None,
        json: false,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(10);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--config" => {
                i += 1;
                cli.config = args.get(i).cloned();
            }
            "--json" => {
                cli.json = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

fn load_config(path: Option<&str>) -> SimConfig {
    let Some(path) = path else {
        return SimConfig::default();
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Cannot read {}: {}", path, e);
            std::process::exit(2);
        }
    };
    match SimConfig::from_json_str(&text) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid config {}: {}", path, e);
            std::process::exit(2);
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let base = load_config(cli.config.as_deref());
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    if !cli.json {
        println!("\n  Tanker Fleet Benchmark Runner");
        println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
        println!("  Running {} scenario(s)...\n", to_run.len());
        println!("  {:<36} {:>5} {:>12} {:>7} {:>8} {:>6} {:>9} {:>8}",
            "Scenario", "Pass%", "Cost", "Visits", "Returns", "Skips", "Depleted", "Time");
        println!("  {}", "-".repeat(100));
    }

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = match monte_carlo::run_monte_carlo(scenario, &base, cli.runs, cli.seed) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Scenario {} rejected its config: {}", scenario.name, e);
                std::process::exit(2);
            }
        };

        if !cli.json {
            let pass_pct = report.pass_rate * 100.0;
            let status = if report.pass_rate >= 1.0 { "PASS" } else { "FAIL" };
            println!("  {:<36} {:>4}% {:>12.1} {:>7.1} {:>8.1} {:>6.1} {:>9.2} {:>6.0}ms  {}",
                report.label,
                pass_pct as u32,
                report.plan_cost.mean,
                report.visits.mean,
                report.forced_returns.mean,
                report.skipped_stops.mean,
                report.depleted_vehicles.mean,
                report.elapsed_ms.mean,
                status,
            );
        }

        mc_reports.push(report);
    }

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= 1.0).count();
    let failed = total - passed;

    if cli.json {
        let report = BenchReport {
            version: env!("CARGO_PKG_VERSION"),
            prng: "ChaCha8Rng",
            base_seed: cli.seed,
            n_runs_per_scenario: cli.runs,
            summary: Summary {
                total,
                passed,
                failed,
                pass_rate: passed as f64 / total as f64,
            },
            scenarios: mc_reports,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                std::process::exit(2);
            }
        }
    } else {
        println!("  {}", "-".repeat(100));
        println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
            total, passed, failed, suite_start.elapsed().as_secs_f64());
        for report in mc_reports.iter().filter(|r| r.pass_rate < 1.0) {
            for run in report.individual_runs.iter().filter(|r| !r.pass) {
                println!("    {} seed {}: {}", run.scenario, run.seed, run.failures.join("; "));
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
