// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Route Cost Evaluator
//
// Scores a route as a closed tour depot -> stops -> depot using the same
// straight-line distance and consumption rate the fuel model burns against.

use serde::Serialize;

use crate::config::SimConfig;
use crate::geometry::{distance, Point3};
use crate::target::Target;
use crate::types::TargetId;
use crate::vehicle::find_target;

/// Distance, fuel and blended cost of one route.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RouteCost {
    pub distance: f64,
    pub fuel: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostEvaluator {
    depot: Point3,
    consumption_rate: f64,
    w_distance: f64,
    w_fuel: f64,
}

impl CostEvaluator {
    pub fn new(depot: Point3, consumption_rate: f64, w_distance: f64, w_fuel: f64) -> Self {
        Self { depot, consumption_rate, w_distance, w_fuel }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.fleet.depot,
            config.fuel.consumption_rate,
            config.optimizer.w_distance,
            config.optimizer.w_fuel,
        )
    }

    pub fn depot(&self) -> Point3 { self.depot }
    pub fn consumption_rate(&self) -> f64 { self.consumption_rate }

    /// Length of the closed tour through `stops`, starting and ending at the depot.
    pub fn tour_distance<I>(&self, stops: I) -> f64
    where
        I: IntoIterator<Item = Point3>,
    {
        let mut total = 0.0;
        let mut at = self.depot;
        for stop in stops {
            total += distance(at, stop);
            at = stop;
        }
        total + distance(at, self.depot)
    }

    /// `w_distance × distance + w_fuel × distance × consumption_rate`.
    pub fn score(&self, tour_distance: f64) -> RouteCost {
        let fuel = tour_distance * self.consumption_rate;
        RouteCost {
            distance: tour_distance,
            fuel,
            cost: self.w_distance * tour_distance + self.w_fuel * fuel,
        }
    }

    pub fn tour_cost<I>(&self, stops: I) -> f64
    where
        I: IntoIterator<Item = Point3>,
    {
        self.score(self.tour_distance(stops)).cost
    }

    /// Breakdown for a route of target ids. Unknown ids are ignored.
    pub fn breakdown(&self, route: &[TargetId], targets: &[Target]) -> RouteCost {
        let stops = route
            .iter()
            .filter_map(|id| find_target(targets, *id))
            .map(Target::position);
        self.score(self.tour_distance(stops))
    }

    pub fn route_distance(&self, route: &[TargetId], targets: &[Target]) -> f64 {
        self.breakdown(route, targets).distance
    }

    pub fn cost(&self, route: &[TargetId], targets: &[Target]) -> f64 {
        self.breakdown(route, targets).cost
    }

    /// One cost per route, in route order.
    pub fn fleet_cost(&self, routes: &[Vec<TargetId>], targets: &[Target]) -> Vec<f64> {
        routes.iter().map(|r| self.cost(r, targets)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Vec<Target> {
        [10.0, 20.0, 30.0]
            .iter()
            .enumerate()
            .map(|(i, x)| Target::stationary(TargetId(i as u32), Point3::new(*x, 0.0, 0.0), 50.0))
            .collect()
    }

    #[test]
    fn empty_route_costs_nothing() {
        let eval = CostEvaluator::new(Point3::new(5.0, 5.0, 5.0), 1.0, 1.0, 1.0);
        assert_eq!(eval.cost(&[], &line()), 0.0);
    }

    #[test]
    fn closed_tour_includes_both_depot_legs() {
        let eval = CostEvaluator::new(Point3::ORIGIN, 1.0, 1.0, 0.0);
        let targets = line();
        let ordered = [TargetId(0), TargetId(1), TargetId(2)];
        let zigzag = [TargetId(1), TargetId(0), TargetId(2)];
        assert!((eval.route_distance(&ordered, &targets) - 60.0).abs() < 1e-9);
        assert!((eval.route_distance(&zigzag, &targets) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn weights_blend_distance_and_fuel() {
        let eval = CostEvaluator::new(Point3::ORIGIN, 0.1, 0.7, 0.3);
        let b = eval.breakdown(&[TargetId(0), TargetId(1), TargetId(2)], &line());
        assert!((b.distance - 60.0).abs() < 1e-9);
        assert!((b.fuel - 6.0).abs() < 1e-9);
        assert!((b.cost - 43.8).abs() < 1e-9);
    }

    #[test]
    fn fleet_cost_is_per_route() {
        let eval = CostEvaluator::new(Point3::ORIGIN, 1.0, 1.0, 0.0);
        let routes = vec![vec![TargetId(0)], vec![TargetId(2)], vec![]];
        let costs = eval.fleet_cost(&routes, &line());
        assert_eq!(costs.len(), 3);
        assert!((costs[0] - 20.0).abs() < 1e-9);
        assert!((costs[1] - 60.0).abs() < 1e-9);
        assert_eq!(costs[2], 0.0);
    }
}
