// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Configuration
//
// Every tunable lives here and is passed into component constructors.
// There are no process-wide constants beyond the unit conversions below.

use serde::{Deserialize, Serialize};

use crate::geometry::Point3;

/// Simulation time is measured in seconds.
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const SECONDS_PER_YEAR: f64 = 31_536_000.0;

/// Upper bound of a target's resource level.
pub const MAX_RESOURCE_LEVEL: f64 = 100.0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite and > 0, got {value}")))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite and >= 0, got {value}")))
    }
}

// ---------------------------------------------------------------------------
// FuelConfig
// ---------------------------------------------------------------------------

/// Vehicle tank and resource-transfer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelConfig {
    /// Tank capacity; vehicles start and refuel to this level.
    pub capacity: f64,
    /// Fuel burned per unit of straight-line distance.
    pub consumption_rate: f64,
    /// Maximum amount handed to a target per visit.
    pub transfer_rate: f64,
    /// Multiplier (> 1) on the fuel needed to reach the depot.
    pub safety_factor: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            capacity: 1000.0,
            consumption_rate: 0.0009,
            transfer_rate: 10.0,
            safety_factor: 1.5,
        }
    }
}

// ---------------------------------------------------------------------------
// MotionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Distance units per second.
    pub speed: f64,
    /// Radius used to size the transfer arc's waypoint lift.
    pub reference_orbit_radius: f64,
    /// Fraction of `reference_orbit_radius` the waypoint is lifted by.
    pub waypoint_lift_fraction: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 1000.0,
            reference_orbit_radius: 6371.0 + 35_786.0,
            waypoint_lift_fraction: 0.5,
        }
    }
}

impl MotionConfig {
    /// Absolute waypoint lift in distance units.
    pub fn waypoint_lift(&self) -> f64 {
        self.reference_orbit_radius * self.waypoint_lift_fraction
    }
}

// ---------------------------------------------------------------------------
// TargetConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub count: u32,
    pub orbit_radius: f64,
    /// Seconds per revolution.
    pub orbit_period: f64,
    /// Orbit plane tilt in radians.
    pub inclination: f64,
    /// Longitude of the ascending node in radians.
    pub ascending_node: f64,
    /// Bounds of the uniform lifetime draw, in seconds.
    pub lifetime_min: f64,
    pub lifetime_max: f64,
    /// Resource units lost per second.
    pub decay_rate: f64,
    /// Bounds of the uniform initial resource-level draw.
    pub initial_level_min: f64,
    pub initial_level_max: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            count: 30,
            orbit_radius: 6371.0 + 35_786.0,
            orbit_period: SECONDS_PER_DAY,
            inclination: 0.0,
            ascending_node: 0.0,
            lifetime_min: 3.0 * SECONDS_PER_YEAR,
            lifetime_max: 10.0 * SECONDS_PER_YEAR,
            decay_rate: 0.05 / SECONDS_PER_DAY,
            initial_level_min: 40.0,
            initial_level_max: MAX_RESOURCE_LEVEL,
        }
    }
}

// ---------------------------------------------------------------------------
// FleetConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub vehicle_count: u32,
    /// Fixed refuel point; every vehicle starts here.
    pub depot: Point3,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            vehicle_count: 5,
            depot: Point3::new(384_400.0, 0.0, 0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// OptimizerConfig
// ---------------------------------------------------------------------------

/// How targets are distributed across vehicles in one candidate solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssignmentMode {
    /// Each vehicle is optimized over the full target set on its own.
    /// Two vehicles may plan to visit the same target.
    #[default]
    Independent,
    /// Each target appears in exactly one vehicle's route.
    Exclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub iterations: usize,
    pub tabu_list_size: usize,
    pub w_distance: f64,
    pub w_fuel: f64,
    /// Fixed seed for reproducible runs; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Stop after this many consecutive non-improving iterations.
    pub stagnation_limit: Option<usize>,
    pub assignment: AssignmentMode,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            tabu_list_size: 50,
            w_distance: 1.0,
            w_fuel: 0.0,
            seed: None,
            stagnation_limit: None,
            assignment: AssignmentMode::Independent,
        }
    }
}

impl OptimizerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tabu_list_size == 0 {
            return Err(invalid("optimizer.tabu_list_size", "must be at least 1"));
        }
        require_non_negative("optimizer.w_distance", self.w_distance)?;
        require_non_negative("optimizer.w_fuel", self.w_fuel)?;
        if let Some(0) = self.stagnation_limit {
            return Err(invalid("optimizer.stagnation_limit", "must be at least 1 when set"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Complete configuration for a fleet simulation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub fuel: FuelConfig,
    pub motion: MotionConfig,
    pub targets: TargetConfig,
    pub fleet: FleetConfig,
    pub optimizer: OptimizerConfig,
}

impl SimConfig {
    /// Parse a JSON document; missing sections and fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("fuel.capacity", self.fuel.capacity)?;
        require_positive("fuel.consumption_rate", self.fuel.consumption_rate)?;
        require_non_negative("fuel.transfer_rate", self.fuel.transfer_rate)?;
        if !(self.fuel.safety_factor.is_finite() && self.fuel.safety_factor > 1.0) {
            return Err(invalid(
                "fuel.safety_factor",
                format!("must be finite and > 1, got {}", self.fuel.safety_factor),
            ));
        }

        require_positive("motion.speed", self.motion.speed)?;
        require_non_negative("motion.reference_orbit_radius", self.motion.reference_orbit_radius)?;
        require_non_negative("motion.waypoint_lift_fraction", self.motion.waypoint_lift_fraction)?;

        let t = &self.targets;
        require_non_negative("targets.orbit_radius", t.orbit_radius)?;
        require_positive("targets.orbit_period", t.orbit_period)?;
        require_non_negative("targets.lifetime_min", t.lifetime_min)?;
        if !(t.lifetime_max.is_finite() && t.lifetime_max >= t.lifetime_min) {
            return Err(invalid("targets.lifetime_max", "must be >= lifetime_min"));
        }
        require_non_negative("targets.decay_rate", t.decay_rate)?;
        require_non_negative("targets.initial_level_min", t.initial_level_min)?;
        if !(t.initial_level_max >= t.initial_level_min && t.initial_level_max <= MAX_RESOURCE_LEVEL) {
            return Err(invalid(
                "targets.initial_level_max",
                format!("must lie in [initial_level_min, {MAX_RESOURCE_LEVEL}]"),
            ));
        }

        if !self.fleet.depot.is_finite() {
            return Err(invalid("fleet.depot", "coordinates must be finite"));
        }

        self.optimizer.validate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
