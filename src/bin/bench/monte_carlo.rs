// Monte Carlo Runner: N seeded runs per scenario, aggregated per metric
// Run k uses seed base_seed + k for both the target spawn and the optimizer

use tanker_engine::*;

use crate::report::*;
use crate::scenarios::Scenario;

use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(scenario: &Scenario, base: &SimConfig, seed: u64) -> Result<BenchResult, ConfigError> {
    let start = Instant::now();
    let mut sim = (scenario.build)(base, seed)?;
    let plan = sim.optimize_core();

    let mut ticks_run = 0;
    for _ in 0..scenario.ticks {
        sim.tick_core(scenario.dt);
        ticks_run += 1;
        if sim.all_routes_finished() {
            break;
        }
    }

    let stats = sim.stats().clone();
    let routes_finished = sim.all_routes_finished();
    let plan_cost = plan.total_cost();

    let criteria = &scenario.criteria;
    let mut failures = Vec::new();
    if stats.depleted_vehicles > criteria.max_depleted {
        failures.push(format!("{} vehicle(s) depleted", stats.depleted_vehicles));
    }
    if let Some(min) = criteria.min_visits {
        if stats.visits < min {
            failures.push(format!("only {} visit(s), wanted {}", stats.visits, min));
        }
    }
    if let Some(max) = criteria.max_plan_cost {
        if plan_cost > max {
            failures.push(format!("plan cost {:.3} above {:.3}", plan_cost, max));
        }
    }
    if criteria.require_routes_finished && !routes_finished {
        failures.push(format!("routes unfinished after {} ticks", ticks_run));
    }

    for fault in sim.faults() {
        tracing::warn!(scenario = scenario.name, seed, "{}", fault);
    }

    Ok(BenchResult {
        scenario: scenario.name.to_string(),
        seed,
        pass: failures.is_empty(),
        failures,
        ticks: stats.ticks,
        sim_time: stats.time,
        plan_cost,
        search_iterations: plan.stats.iterations,
        accepted_moves: plan.stats.accepted_moves,
        visits: stats.visits,
        transfers: stats.transfers,
        fuel_delivered: stats.fuel_delivered,
        forced_returns: stats.forced_returns,
        refuels: stats.refuels,
        skipped_stops: stats.skipped_stops,
        depleted_vehicles: stats.depleted_vehicles,
        routes_finished,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Run a scenario N times with seeds base_seed..base_seed+N.
pub fn run_monte_carlo(
    scenario: &Scenario,
    base: &SimConfig,
    runs: usize,
    base_seed: u64,
) -> Result<MonteCarloReport, ConfigError> {
    let results = (0..runs as u64)
        .map(|k| run_single(scenario, base, base_seed.wrapping_add(k)))
        .collect::<Result<Vec<_>, _>>()?;

    let passed = results.iter().filter(|r| r.pass).count();

    Ok(MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        n_runs: runs,
        pass_rate: if runs > 0 { passed as f64 / runs as f64 } else { 0.0 },
        plan_cost: Stats::of(&results, |r| r.plan_cost),
        visits: Stats::of(&results, |r| r.visits as f64),
        fuel_delivered: Stats::of(&results, |r| r.fuel_delivered),
        forced_returns: Stats::of(&results, |r| r.forced_returns as f64),
        skipped_stops: Stats::of(&results, |r| r.skipped_stops as f64),
        depleted_vehicles: Stats::of(&results, |r| r.depleted_vehicles as f64),
        elapsed_ms: Stats::of(&results, |r| r.elapsed_ms),
        individual_runs: results,
    })
}
