// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite

pub mod geometry;
pub mod config;
pub mod types;
pub mod target;
pub mod trajectory;
pub mod fuel;
pub mod vehicle;
pub mod cost;
pub mod tabu;
pub mod optimizer;
pub mod simulation;
pub mod export;

pub use config::{AssignmentMode, ConfigError, OptimizerConfig, SimConfig};
pub use cost::{CostEvaluator, RouteCost};
pub use export::RouteReport;
pub use fuel::{FuelModel, Tank, TransferOutcome};
pub use geometry::Point3;
pub use optimizer::{OptimizationResult, TabuOptimizer};
pub use simulation::FleetSimulation;
pub use target::{PeriodicOrbitParams, Target};
pub use trajectory::{Path, PlanningError, Trajectory};
pub use types::*;
pub use vehicle::{FleetContext, Vehicle, VehicleFault};

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl FleetSimulation {
    /// Default configuration with the given fleet size. `seed` pins both the
    /// target spawn and the optimizer.
    #[wasm_bindgen(constructor)]
    pub fn new(target_count: u32, vehicle_count: u32, seed: Option<u32>) -> Result<FleetSimulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let mut config = SimConfig::default();
        config.targets.count = target_count;
        config.fleet.vehicle_count = vehicle_count;
        config.optimizer.seed = seed.map(u64::from);
        FleetSimulation::from_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Build from a JSON configuration document.
    pub fn from_json(json: &str) -> Result<FleetSimulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        SimConfig::from_json_str(json)
            .and_then(FleetSimulation::from_config)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn tick(&mut self, dt: f64) -> JsValue {
        let result = self.tick_core(dt);
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    /// Run N ticks without returning results (fast batch mode for benchmarking)
    pub fn run_batch(&mut self, ticks: u32, dt: f64) {
        self.run_core(ticks, dt);
    }

    pub fn optimize(&mut self) -> JsValue {
        let result = self.optimize_core();
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    pub fn get_vehicles(&self) -> JsValue {
        let rows: Vec<VehicleUpdate> = self.vehicles.iter().map(Vehicle::snapshot).collect();
        serde_wasm_bindgen::to_value(&rows).unwrap_or(JsValue::NULL)
    }

    pub fn get_targets(&self) -> JsValue {
        let rows: Vec<TargetUpdate> = self.targets.iter().map(Target::snapshot).collect();
        serde_wasm_bindgen::to_value(&rows).unwrap_or(JsValue::NULL)
    }

    pub fn get_stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats).unwrap_or(JsValue::NULL)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Human-readable route listing with costs.
    pub fn export_report(&self) -> String {
        self.report().to_text()
    }

    pub fn export_json(&self) -> String {
        self.report().to_json().unwrap_or_default()
    }

    /// Reset simulation to initial state
    pub fn reset(&mut self) {
        self.reset_core();
    }
}
