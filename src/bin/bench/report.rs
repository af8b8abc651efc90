// Benchmark Report Types
// Structured output for Monte Carlo runs over seeds

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            (samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        let half_width = 1.96 * std_dev / (n as f64).sqrt(); // 95% CI
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(*x), hi.max(*x)));
        Self {
            mean,
            std_dev,
            ci_lower: mean - half_width,
            ci_upper: mean + half_width,
            min,
            max,
            n,
        }
    }

    pub fn of<T, F: Fn(&T) -> f64>(items: &[T], metric: F) -> Self {
        let samples: Vec<f64> = items.iter().map(metric).collect();
        Self::from_samples(&samples)
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub seed: u64,
    pub pass: bool,
    pub failures: Vec<String>,
    pub ticks: u64,
    pub sim_time: f64,
    pub plan_cost: f64,
    pub search_iterations: usize,
    pub accepted_moves: usize,
    pub visits: u32,
    pub transfers: u32,
    pub fuel_delivered: f64,
    pub forced_returns: u32,
    pub refuels: u32,
    pub skipped_stops: u32,
    pub depleted_vehicles: u32,
    pub routes_finished: bool,
    pub elapsed_ms: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub plan_cost: Stats,
    pub visits: Stats,
    pub fuel_delivered: Stats,
    pub forced_returns: Stats,
    pub skipped_stops: Stats,
    pub depleted_vehicles: Stats,
    pub elapsed_ms: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub version: &'static str,
    pub prng: &'static str,
    pub base_seed: u64,
    pub n_runs_per_scenario: usize,
    pub summary: Summary,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
