// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Tabu Search Route Optimizer
//
// Pairwise-swap local search with a bounded tabu memory. One iteration draws
// a single random neighbor and accepts it only if it strictly improves the
// current cost and has not been accepted recently.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{AssignmentMode, OptimizerConfig};
use crate::cost::CostEvaluator;
use crate::geometry::Point3;
use crate::tabu::TabuList;
use crate::target::Target;
use crate::types::{TargetId, VehicleId};
use crate::vehicle::Vehicle;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Counters from one optimization run, summed over all sub-searches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStats {
    pub iterations: usize,
    pub accepted_moves: usize,
    pub tabu_rejections: usize,
    /// At least one sub-search stopped early on the stagnation limit.
    pub stagnated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimizationResult {
    /// Vehicles that received a route, parallel to `routes` and `cost`.
    pub vehicles: Vec<VehicleId>,
    pub routes: Vec<Vec<TargetId>>,
    pub cost: Vec<f64>,
    pub stats: SearchStats,
}

impl OptimizationResult {
    /// Result for a run with no vehicles or no eligible targets.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.cost.iter().sum()
    }

    pub fn route_for(&self, vehicle: VehicleId) -> Option<&[TargetId]> {
        self.vehicles
            .iter()
            .position(|v| *v == vehicle)
            .map(|i| self.routes[i].as_slice())
    }
}

// ---------------------------------------------------------------------------
// TabuOptimizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TabuOptimizer {
    config: OptimizerConfig,
}

impl TabuOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Search for low-cost visitation orders.
    ///
    /// Expired targets and depleted vehicles take no part. With a seed the
    /// result is a pure function of the inputs.
    #[tracing::instrument(
        level = "debug",
        name = "Tabu Search",
        skip_all,
        fields(targets = targets.len(), vehicles = vehicles.len())
    )]
    pub fn optimize(
        &self,
        targets: &[Target],
        vehicles: &[Vehicle],
        evaluator: &CostEvaluator,
    ) -> OptimizationResult {
        let eligible: Vec<&Target> = targets.iter().filter(|t| !t.is_expired()).collect();
        let fleet: Vec<(usize, VehicleId)> = vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_depleted())
            .map(|(i, v)| (i, v.id()))
            .collect();

        if eligible.is_empty() || fleet.is_empty() {
            tracing::warn!(
                targets = eligible.len(),
                vehicles = fleet.len(),
                "nothing to optimize: empty fleet or target set"
            );
            return OptimizationResult::empty();
        }

        let stops: Vec<Point3> = eligible.iter().map(|t| t.position()).collect();
        let ids: Vec<TargetId> = eligible.iter().map(|t| t.id()).collect();
        let mut stats = SearchStats::default();

        let (orders, cost) = match self.config.assignment {
            AssignmentMode::Independent => {
                let mut orders = Vec::with_capacity(fleet.len());
                let mut cost = Vec::with_capacity(fleet.len());
                for (slot, _) in &fleet {
                    let mut rng = self.rng_for(*slot as u64);
                    let (order, c) = self.search_route(&stops, &mut rng, evaluator, &mut stats);
                    orders.push(order);
                    cost.push(c);
                }
                (orders, cost)
            }
            AssignmentMode::Exclusive => {
                let mut rng = self.rng_for(0);
                self.search_partition(&stops, fleet.len(), &mut rng, evaluator, &mut stats)
            }
        };

        let routes: Vec<Vec<TargetId>> = orders
            .into_iter()
            .map(|order| order.into_iter().map(|i| ids[i]).collect())
            .collect();

        tracing::info!(
            routes = routes.len(),
            total_cost = cost.iter().sum::<f64>(),
            iterations = stats.iterations,
            accepted = stats.accepted_moves,
            "optimization finished"
        );

        OptimizationResult {
            vehicles: fleet.into_iter().map(|(_, id)| id).collect(),
            routes,
            cost,
            stats,
        }
    }

    /// One ChaCha stream per sub-search so vehicles never share draws.
    fn rng_for(&self, stream: u64) -> ChaCha8Rng {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        rng.set_stream(stream);
        rng
    }

    // ── Independent ─────────────────────────────────────────────────────────

    fn search_route(
        &self,
        stops: &[Point3],
        rng: &mut ChaCha8Rng,
        evaluator: &CostEvaluator,
        stats: &mut SearchStats,
    ) -> (Vec<usize>, f64) {
        let cost_of = |order: &[usize]| evaluator.tour_cost(order.iter().map(|&i| stops[i]));

        let mut current: Vec<usize> = (0..stops.len()).collect();
        current.shuffle(rng);
        let mut current_cost = cost_of(&current);
        let mut best = current.clone();
        let mut best_cost = current_cost;

        if current.len() < 2 {
            return (best, best_cost);
        }

        let mut tabu = TabuList::new(self.config.tabu_list_size);
        let mut stale = 0usize;

        for _ in 0..self.config.iterations {
            stats.iterations += 1;
            let (i, j) = swap_pair(rng, current.len());
            let mut candidate = current.clone();
            candidate.swap(i, j);
            let candidate_cost = cost_of(&candidate);

            let improving = candidate_cost < current_cost;
            if improving && tabu.contains(&candidate) {
                stats.tabu_rejections += 1;
            }
            if improving && !tabu.contains(&candidate) {
                tabu.push(candidate.clone());
                current = candidate;
                current_cost = candidate_cost;
                stats.accepted_moves += 1;
                stale = 0;
                if current_cost < best_cost {
                    best.clone_from(&current);
                    best_cost = current_cost;
                }
                continue;
            }

            stale += 1;
            if self.config.stagnation_limit.map_or(false, |limit| stale >= limit) {
                stats.stagnated = true;
                break;
            }
        }

        tracing::debug!(stops = stops.len(), best_cost, "route search done");
        (best, best_cost)
    }

    // ── Exclusive ───────────────────────────────────────────────────────────

    /// Deal shuffled stops round-robin, then swap across the concatenated
    /// slots of all routes. Route lengths stay fixed.
    fn search_partition(
        &self,
        stops: &[Point3],
        vehicle_count: usize,
        rng: &mut ChaCha8Rng,
        evaluator: &CostEvaluator,
        stats: &mut SearchStats,
    ) -> (Vec<Vec<usize>>, Vec<f64>) {
        let cost_of = |order: &[usize]| evaluator.tour_cost(order.iter().map(|&i| stops[i]));

        let mut deck: Vec<usize> = (0..stops.len()).collect();
        deck.shuffle(rng);
        let mut current: Vec<Vec<usize>> = vec![Vec::new(); vehicle_count];
        for (k, stop) in deck.into_iter().enumerate() {
            current[k % vehicle_count].push(stop);
        }
        let mut current_cost: Vec<f64> = current.iter().map(|r| cost_of(r)).collect();
        let mut best = current.clone();
        let mut best_total: f64 = current_cost.iter().sum();
        let mut best_cost = current_cost.clone();

        let slots = stops.len();
        if slots < 2 {
            return (best, best_cost);
        }

        let mut tabu = TabuList::new(self.config.tabu_list_size);
        let mut stale = 0usize;

        for _ in 0..self.config.iterations {
            stats.iterations += 1;
            let (a, b) = swap_pair(rng, slots);
            let (ra, pa) = locate(&current, a);
            let (rb, pb) = locate(&current, b);

            let mut candidate = current.clone();
            let stop_a = candidate[ra][pa];
            candidate[ra][pa] = candidate[rb][pb];
            candidate[rb][pb] = stop_a;

            let mut candidate_cost = current_cost.clone();
            candidate_cost[ra] = cost_of(&candidate[ra]);
            candidate_cost[rb] = cost_of(&candidate[rb]);

            let total: f64 = candidate_cost.iter().sum();
            let current_total: f64 = current_cost.iter().sum();
            let improving = total < current_total;
            if improving && tabu.contains(&candidate) {
                stats.tabu_rejections += 1;
            }
            if improving && !tabu.contains(&candidate) {
                tabu.push(candidate.clone());
                current = candidate;
                current_cost = candidate_cost;
                stats.accepted_moves += 1;
                stale = 0;
                if total < best_total {
                    best.clone_from(&current);
                    best_cost.clone_from(&current_cost);
                    best_total = total;
                }
                continue;
            }

            stale += 1;
            if self.config.stagnation_limit.map_or(false, |limit| stale >= limit) {
                stats.stagnated = true;
                break;
            }
        }

        tracing::debug!(stops = slots, vehicles = vehicle_count, best_total, "partition search done");
        (best, best_cost)
    }
}

/// Two distinct indices in `0..n`, `n >= 2`.
fn swap_pair<R: Rng>(rng: &mut R, n: usize) -> (usize, usize) {
    let i = rng.gen_range(0..n);
    let mut j = rng.gen_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    (i, j)
}

/// Map a flat slot index onto (route, position).
fn locate(routes: &[Vec<usize>], mut slot: usize) -> (usize, usize) {
    for (r, route) in routes.iter().enumerate() {
        if slot < route.len() {
            return (r, slot);
        }
        slot -= route.len();
    }
    (routes.len().saturating_sub(1), slot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VehicleState;
    use std::collections::HashSet;

    fn line() -> Vec<Target> {
        [10.0, 20.0, 30.0]
            .iter()
            .enumerate()
            .map(|(i, x)| Target::stationary(TargetId(i as u32), Point3::new(*x, 0.0, 0.0), 50.0))
            .collect()
    }

    fn scatter(count: u32) -> Vec<Target> {
        (0..count)
            .map(|i| {
                let a = i as f64 * 2.399;
                let r = 50.0 + 7.0 * i as f64;
                Target::stationary(TargetId(i), Point3::new(r * a.cos(), 3.0 * i as f64, r * a.sin()), 40.0)
            })
            .collect()
    }

    fn fleet(count: u32) -> Vec<Vehicle> {
        (0..count).map(|i| Vehicle::new(VehicleId(i), 1000.0, Point3::ORIGIN)).collect()
    }

    fn seeded(seed: u64, assignment: AssignmentMode) -> TabuOptimizer {
        TabuOptimizer::new(OptimizerConfig {
            iterations: 200,
            tabu_list_size: 20,
            seed: Some(seed),
            assignment,
            ..OptimizerConfig::default()
        })
    }

    #[test]
    fn empty_inputs_give_empty_result() {
        let opt = seeded(1, AssignmentMode::Independent);
        let eval = CostEvaluator::new(Point3::ORIGIN, 1.0, 1.0, 0.0);
        assert!(opt.optimize(&[], &fleet(2), &eval).is_empty());
        assert!(opt.optimize(&line(), &[], &eval).is_empty());
    }

    #[test]
    fn line_reaches_optimal_tour() {
        let opt = seeded(7, AssignmentMode::Independent);
        let eval = CostEvaluator::new(Point3::ORIGIN, 1.0, 1.0, 0.0);
        let result = opt.optimize(&line(), &fleet(1), &eval);
        assert_eq!(result.routes.len(), 1);
        assert_eq!(result.routes[0].len(), 3);
        assert!((result.cost[0] - 60.0).abs() < 1e-9);
    }

    #[test]
    fn seeded_runs_are_identical() {
        let targets = scatter(12);
        let eval = CostEvaluator::new(Point3::ORIGIN, 0.01, 1.0, 0.5);
        for mode in [AssignmentMode::Independent, AssignmentMode::Exclusive] {
            let opt = seeded(42, mode);
            let a = opt.optimize(&targets, &fleet(3), &eval);
            let b = opt.optimize(&targets, &fleet(3), &eval);
            assert_eq!(a.routes, b.routes);
            assert_eq!(a.cost, b.cost);
        }
    }

    #[test]
    fn result_never_worse_than_its_start() {
        let targets = scatter(10);
        let eval = CostEvaluator::new(Point3::ORIGIN, 1.0, 1.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        rng.set_stream(0);
        let mut start: Vec<TargetId> = targets.iter().map(|t| t.id()).collect();
        start.shuffle(&mut rng);

        let result = seeded(5, AssignmentMode::Independent).optimize(&targets, &fleet(1), &eval);
        assert!(result.cost[0] <= eval.cost(&start, &targets) + 1e-9);
        assert!(result.stats.accepted_moves > 0);
    }

    #[test]
    fn skips_expired_targets_and_depleted_vehicles() {
        let mut targets = line();
        targets[1].expired = true;
        let mut vehicles = fleet(3);
        vehicles[1].state = VehicleState::Depleted;

        let eval = CostEvaluator::new(Point3::ORIGIN, 1.0, 1.0, 0.0);
        let result = seeded(3, AssignmentMode::Independent).optimize(&targets, &vehicles, &eval);

        assert_eq!(result.vehicles, vec![VehicleId(0), VehicleId(2)]);
        for route in &result.routes {
            assert_eq!(route.len(), 2);
            assert!(!route.contains(&TargetId(1)));
        }
        assert!(result.route_for(VehicleId(1)).is_none());
    }

    #[test]
    fn exclusive_mode_partitions_targets() {
        let targets = scatter(11);
        let eval = CostEvaluator::new(Point3::ORIGIN, 1.0, 1.0, 0.0);
        let result = seeded(9, AssignmentMode::Exclusive).optimize(&targets, &fleet(3), &eval);

        assert_eq!(result.routes.len(), 3);
        let mut seen = HashSet::new();
        for route in &result.routes {
            for id in route {
                assert!(seen.insert(*id), "{id} assigned twice");
            }
        }
        assert_eq!(seen.len(), 11);
        for (route, cost) in result.routes.iter().zip(&result.cost) {
            assert!((eval.cost(route, &targets) - cost).abs() < 1e-9);
        }
    }

    #[test]
    fn stagnation_limit_stops_early() {
        let opt = TabuOptimizer::new(OptimizerConfig {
            iterations: 10_000,
            seed: Some(11),
            stagnation_limit: Some(25),
            ..OptimizerConfig::default()
        });
        let eval = CostEvaluator::new(Point3::ORIGIN, 1.0, 1.0, 0.0);
        let result = opt.optimize(&line(), &fleet(1), &eval);
        assert!(result.stats.stagnated);
        assert!(result.stats.iterations < 10_000);
    }

    #[test]
    fn swap_pair_is_always_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for n in 2..8 {
            for _ in 0..200 {
                let (i, j) = swap_pair(&mut rng, n);
                assert_ne!(i, j);
                assert!(i < n && j < n);
            }
        }
    }
}
