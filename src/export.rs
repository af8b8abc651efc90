// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Route Export

use serde::Serialize;
use std::fmt;

use crate::cost::CostEvaluator;
use crate::optimizer::OptimizationResult;
use crate::target::Target;
use crate::types::{SimStats, TargetId, VehicleId};
use crate::vehicle::{find_target, Vehicle};

/// One vehicle's stops with their scored cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLine {
    pub vehicle: VehicleId,
    pub stops: Vec<String>,
    pub distance: f64,
    pub fuel: f64,
    pub cost: f64,
    /// Cost the optimizer charged for this exact route, if it planned it.
    pub planned_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    pub time: f64,
    pub routes: Vec<RouteLine>,
    pub total_cost: f64,
    pub planned_total: Option<f64>,
    pub stats: SimStats,
}

impl RouteReport {
    /// Build a report from the routes currently assigned to `vehicles`.
    ///
    /// `distance`, `fuel` and `cost` are re-scored at export time against
    /// the targets' current positions, so they drift from the plan once
    /// orbiting targets move. `planned_cost` keeps the optimizer's figure for
    /// every route that still matches `plan`.
    pub fn build(
        vehicles: &[Vehicle],
        targets: &[Target],
        evaluator: &CostEvaluator,
        plan: Option<&OptimizationResult>,
        time: f64,
        stats: &SimStats,
    ) -> Self {
        let routes: Vec<RouteLine> = vehicles
            .iter()
            .map(|v| {
                let breakdown = evaluator.breakdown(v.route(), targets);
                RouteLine {
                    vehicle: v.id(),
                    stops: v.route().iter().map(|id| stop_name(targets, *id)).collect(),
                    distance: breakdown.distance,
                    fuel: breakdown.fuel,
                    cost: breakdown.cost,
                    planned_cost: plan.and_then(|p| planned_cost(p, v)),
                }
            })
            .collect();
        let total_cost = routes.iter().map(|r| r.cost).sum();
        let planned_total = routes
            .iter()
            .any(|r| r.planned_cost.is_some())
            .then(|| routes.iter().filter_map(|r| r.planned_cost).sum::<f64>());
        Self { time, routes, total_cost, planned_total, stats: stats.clone() }
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn planned_cost(plan: &OptimizationResult, vehicle: &Vehicle) -> Option<f64> {
    let i = plan.vehicles.iter().position(|id| *id == vehicle.id())?;
    (plan.routes[i] == vehicle.route()).then(|| plan.cost[i])
}

fn stop_name(targets: &[Target], id: TargetId) -> String {
    find_target(targets, id)
        .map(|t| t.name().to_string())
        .unwrap_or_else(|| format!("{id} (unknown)"))
}

impl fmt::Display for RouteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.routes {
            let stops = if line.stops.is_empty() {
                "(no stops)".to_string()
            } else {
                line.stops.join(" → ")
            };
            writeln!(
                f,
                "{}: {} | distance {:.2}, fuel {:.2}, cost {:.2}",
                line.vehicle, stops, line.distance, line.fuel, line.cost
            )?;
        }
        if let Some(planned) = self.planned_total {
            writeln!(f, "Planned cost: {:.2}", planned)?;
        }
        write!(f, "Total cost: {:.2}", self.total_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    #[test]
    fn text_lists_stops_in_order_with_total() {
        let targets: Vec<Target> = [10.0, 20.0, 30.0]
            .iter()
            .enumerate()
            .map(|(i, x)| Target::stationary(TargetId(i as u32), Point3::new(*x, 0.0, 0.0), 50.0))
            .collect();
        let mut a = Vehicle::new(VehicleId(0), 100.0, Point3::ORIGIN);
        a.assign_route(vec![TargetId(2), TargetId(1), TargetId(0)]).expect("test: healthy vehicle");
        let b = Vehicle::new(VehicleId(1), 100.0, Point3::ORIGIN);
        let eval = CostEvaluator::new(Point3::ORIGIN, 0.1, 0.7, 0.3);

        let report = RouteReport::build(&[a, b], &targets, &eval, None, 0.0, &SimStats::default());
        let text = report.to_text();

        assert!(text.contains("Vehicle 0: Target 2 → Target 1 → Target 0"));
        assert!(text.contains("Vehicle 1: (no stops)"));
        assert!(text.ends_with("Total cost: 43.80"));

        let json = report.to_json().expect("test: serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("test: valid json");
        assert_eq!(value["routes"][0]["stops"][0], "Target 2");
        assert!(value["planned_total"].is_null());
    }

    #[test]
    fn planned_cost_is_kept_only_for_unchanged_routes() {
        let targets: Vec<Target> = [10.0, 20.0]
            .iter()
            .enumerate()
            .map(|(i, x)| Target::stationary(TargetId(i as u32), Point3::new(*x, 0.0, 0.0), 50.0))
            .collect();
        let mut a = Vehicle::new(VehicleId(0), 100.0, Point3::ORIGIN);
        a.assign_route(vec![TargetId(0), TargetId(1)]).expect("test: healthy vehicle");
        let mut b = Vehicle::new(VehicleId(1), 100.0, Point3::ORIGIN);
        b.assign_route(vec![TargetId(1)]).expect("test: healthy vehicle");
        let eval = CostEvaluator::new(Point3::ORIGIN, 1.0, 1.0, 0.0);

        // Scored when targets sat elsewhere; vehicle 1 was re-routed since.
        let plan = OptimizationResult {
            vehicles: vec![VehicleId(0), VehicleId(1)],
            routes: vec![vec![TargetId(0), TargetId(1)], vec![TargetId(0)]],
            cost: vec![55.0, 20.0],
            ..OptimizationResult::default()
        };
        let report = RouteReport::build(&[a, b], &targets, &eval, Some(&plan), 0.0, &SimStats::default());

        assert_eq!(report.routes[0].planned_cost, Some(55.0));
        assert!((report.routes[0].cost - 40.0).abs() < 1e-9);
        assert_eq!(report.routes[1].planned_cost, None);
        assert_eq!(report.planned_total, Some(55.0));
        assert!((report.total_cost - 80.0).abs() < 1e-9);

        let text = report.to_text();
        assert!(text.contains("Planned cost: 55.00\n"));
        assert!(text.ends_with("Total cost: 80.00"));
    }
}
