// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Simulation Core

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

use crate::config::{ConfigError, SimConfig};
use crate::cost::CostEvaluator;
use crate::export::RouteReport;
use crate::optimizer::{OptimizationResult, TabuOptimizer};
use crate::target::Target;
use crate::types::*;
use crate::vehicle::{FleetContext, Vehicle, VehicleFault};

/// Stream reserved for target spawning, kept apart from the per-vehicle
/// optimizer streams.
const SPAWN_STREAM: u64 = u64::MAX;

// ─── FleetSimulation struct ──────────────────────────────────────────────────

#[wasm_bindgen]
pub struct FleetSimulation {
    pub(crate) config: SimConfig,
    pub(crate) context: FleetContext,
    pub(crate) evaluator: CostEvaluator,
    pub(crate) optimizer: TabuOptimizer,

    pub(crate) targets: Vec<Target>,
    pub(crate) vehicles: Vec<Vehicle>,

    pub(crate) time: f64,
    pub(crate) stats: SimStats,
    pub(crate) last_plan: Option<OptimizationResult>,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl FleetSimulation {
    /// Spawn the target ring and the fleet described by `config`.
    pub fn from_config(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.optimizer.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        rng.set_stream(SPAWN_STREAM);
        let targets = Target::spawn_ring(&config.targets, &mut rng);
        let vehicles = Vehicle::spawn_fleet(&config);
        Ok(Self::assemble(config, targets, vehicles))
    }

    /// Build around caller-supplied entities. Vehicles keep their own
    /// tanks; the config supplies motion, fuel rules and optimizer settings.
    pub fn with_entities(
        config: SimConfig,
        targets: Vec<Target>,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, targets, vehicles))
    }

    fn assemble(config: SimConfig, targets: Vec<Target>, vehicles: Vec<Vehicle>) -> Self {
        tracing::info!(
            targets = targets.len(),
            vehicles = vehicles.len(),
            "fleet simulation created"
        );
        Self {
            context: FleetContext::new(&config),
            evaluator: CostEvaluator::from_config(&config),
            optimizer: TabuOptimizer::new(config.optimizer.clone()),
            config,
            targets,
            vehicles,
            time: 0.0,
            stats: SimStats::default(),
            last_plan: None,
        }
    }

    pub fn config(&self) -> &SimConfig { &self.config }
    pub fn targets(&self) -> &[Target] { &self.targets }
    pub fn vehicles(&self) -> &[Vehicle] { &self.vehicles }
    pub fn evaluator(&self) -> &CostEvaluator { &self.evaluator }
    pub fn stats(&self) -> &SimStats { &self.stats }
    pub fn last_plan(&self) -> Option<&OptimizationResult> { self.last_plan.as_ref() }
    pub fn elapsed(&self) -> f64 { self.time }

    /// Vehicles that ran dry, with where it happened.
    pub fn faults(&self) -> Vec<VehicleFault> {
        self.vehicles.iter().filter_map(|v| v.fault().cloned()).collect()
    }

    /// Run the tabu search over the live targets and hand each healthy
    /// vehicle its route.
    pub fn optimize_core(&mut self) -> OptimizationResult {
        let result = self.optimizer.optimize(&self.targets, &self.vehicles, &self.evaluator);
        for (id, route) in result.vehicles.iter().zip(&result.routes) {
            if let Err(fault) = self.assign_route(*id, route.clone()) {
                tracing::warn!("route for {} not assigned: {}", id, fault);
            }
        }
        self.last_plan = Some(result.clone());
        result
    }

    /// Give one vehicle an explicit route. Unknown vehicle ids are ignored.
    pub fn assign_route(&mut self, vehicle: VehicleId, route: Vec<TargetId>) -> Result<(), VehicleFault> {
        match self.vehicles.iter_mut().find(|v| v.id() == vehicle) {
            Some(v) => v.assign_route(route),
            None => {
                tracing::warn!("no such vehicle: {}", vehicle);
                Ok(())
            }
        }
    }

    /// Advance every entity by `dt` seconds.
    ///
    /// Targets decay first so any transfer this tick reads the decayed level.
    /// Vehicles then update one after another, which serializes transfers
    /// into the same target.
    pub fn tick_core(&mut self, dt: f64) -> TickResult {
        if !(dt.is_finite() && dt > 0.0) {
            tracing::warn!(dt, "ignoring tick with non-positive or non-finite step");
            return self.snapshot(Vec::new());
        }

        for target in &mut self.targets {
            target.update(dt);
        }

        let mut events = Vec::new();
        for vehicle in &mut self.vehicles {
            vehicle.update(dt, &mut self.targets, &self.context, &mut events);
        }
        for event in &events {
            self.stats.record(event);
        }

        self.time += dt;
        self.stats.ticks += 1;
        self.stats.time = self.time;
        self.snapshot(events)
    }

    /// Run `ticks` steps of `dt` without building per-tick results.
    pub fn run_core(&mut self, ticks: u32, dt: f64) {
        for _ in 0..ticks {
            self.tick_core(dt);
        }
    }

    /// Back to the creation state: time zero, targets restored, vehicles
    /// docked and full with no route.
    pub fn reset_core(&mut self) {
        for target in &mut self.targets {
            target.reset();
        }
        for vehicle in &mut self.vehicles {
            vehicle.reset();
        }
        self.time = 0.0;
        self.stats = SimStats::default();
        self.last_plan = None;
    }

    pub fn report(&self) -> RouteReport {
        RouteReport::build(
            &self.vehicles,
            &self.targets,
            &self.evaluator,
            self.last_plan.as_ref(),
            self.time,
            &self.stats,
        )
    }

    pub fn all_routes_finished(&self) -> bool {
        self.vehicles.iter().all(|v| {
            v.is_depleted()
                || (v.cursor() >= v.route().len()
                    && v.state() == VehicleState::Idle
                    && v.is_docked(self.context.depot))
        })
    }

    fn snapshot(&self, events: Vec<VehicleEvent>) -> TickResult {
        TickResult {
            time: self.time,
            vehicles: self.vehicles.iter().map(Vehicle::snapshot).collect(),
            targets: self.targets.iter().map(Target::snapshot).collect(),
            events,
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssignmentMode;
    use crate::geometry::Point3;
    use crate::target::PeriodicOrbitParams;

    fn small_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.targets.count = 6;
        config.fleet.vehicle_count = 2;
        config.optimizer.seed = Some(17);
        config
    }

    #[test]
    fn from_config_spawns_ring_and_docked_fleet() {
        let sim = FleetSimulation::from_config(small_config()).expect("test: valid config");
        assert_eq!(sim.targets().len(), 6);
        assert_eq!(sim.vehicles().len(), 2);
        assert!(sim.vehicles().iter().all(|v| v.position() == sim.config().fleet.depot));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = small_config();
        config.fuel.safety_factor = 1.0;
        assert!(matches!(
            FleetSimulation::from_config(config),
            Err(ConfigError::Invalid { field: "fuel.safety_factor", .. })
        ));
    }

    #[test]
    fn bad_dt_changes_nothing() {
        let mut sim = FleetSimulation::from_config(small_config()).expect("test: valid config");
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = sim.tick_core(dt);
            assert!(result.events.is_empty());
            assert_eq!(result.time, 0.0);
        }
        assert_eq!(sim.stats().ticks, 0);
        assert!(sim.targets().iter().all(|t| t.age() == 0.0));
    }

    #[test]
    fn optimize_assigns_routes_and_reset_clears_them() {
        let mut sim = FleetSimulation::from_config(small_config()).expect("test: valid config");
        let plan = sim.optimize_core();
        assert_eq!(plan.routes.len(), 2);
        assert!(sim.vehicles().iter().all(|v| v.route().len() == 6));

        sim.run_core(50, 60.0);
        assert!(sim.elapsed() > 0.0);
        assert_eq!(sim.stats().ticks, 50);

        sim.reset_core();
        assert_eq!(sim.elapsed(), 0.0);
        assert_eq!(sim.stats(), &SimStats::default());
        assert!(sim.last_plan().is_none());
        assert!(sim.vehicles().iter().all(|v| v.route().is_empty() && v.state() == VehicleState::Idle));
        assert!(sim.targets().iter().all(|t| t.age() == 0.0 && !t.is_visited()));
    }

    #[test]
    fn shared_target_transfers_are_serialized() {
        // Two vehicles reach the same nearly full target in the same tick.
        let mut config = SimConfig::default();
        config.fleet.depot = Point3::ORIGIN;
        config.motion.speed = 10.0;
        config.optimizer.assignment = AssignmentMode::Independent;
        let targets = vec![Target::stationary(TargetId(0), Point3::new(10.0, 0.0, 0.0), 95.0)];
        let vehicles = vec![
            Vehicle::new(VehicleId(0), 1000.0, Point3::ORIGIN),
            Vehicle::new(VehicleId(1), 1000.0, Point3::ORIGIN),
        ];
        let mut sim = FleetSimulation::with_entities(config, targets, vehicles).expect("test: valid config");
        sim.assign_route(VehicleId(0), vec![TargetId(0)]).expect("test: healthy");
        sim.assign_route(VehicleId(1), vec![TargetId(0)]).expect("test: healthy");

        let mut delivered = 0.0;
        for _ in 0..5 {
            for event in sim.tick_core(1.0).events {
                if let VehicleEvent::Transferred { amount, .. } = event {
                    delivered += amount;
                }
            }
        }
        assert!((delivered - 5.0).abs() < 1e-9);
        assert!(sim.targets()[0].resource_level() <= 100.0);
        assert_eq!(sim.stats().transfers_skipped, 1);
    }

    #[test]
    fn transfer_reads_level_after_this_ticks_decay() {
        let mut config = SimConfig::default();
        config.fleet.depot = Point3::ORIGIN;
        config.motion.speed = 1.0;
        config.motion.waypoint_lift_fraction = 0.0;
        // Parked at (1, 0, 0), losing one unit per second.
        let orbit = PeriodicOrbitParams {
            radius: 1.0,
            inclination: 0.0,
            ascending_node: std::f64::consts::FRAC_PI_2,
            phase: std::f64::consts::FRAC_PI_2,
            angular_rate: 0.0,
        };
        let targets = vec![Target::new(TargetId(0), orbit, f64::INFINITY, 99.0, 1.0)];
        let vehicles = vec![Vehicle::new(VehicleId(0), 1000.0, Point3::ORIGIN)];
        let mut sim = FleetSimulation::with_entities(config, targets, vehicles).expect("test: valid config");
        sim.assign_route(VehicleId(0), vec![TargetId(0)]).expect("test: healthy");

        let result = sim.tick_core(1.0);

        let delivered: f64 = result
            .events
            .iter()
            .filter_map(|e| match e {
                VehicleEvent::Transferred { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum();
        // 99 decays to 98 first, so the top-up is 2 rather than 1.
        assert!((delivered - 2.0).abs() < 1e-9, "delivered {}", delivered);
        assert!((result.targets[0].resource_level - 100.0).abs() < 1e-9);
    }
}
