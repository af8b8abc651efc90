// Scenario Definitions
// Each scenario derives its simulation from the base config and a run seed

use tanker_engine::*;

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub ticks: u32,
    pub dt: f64,
    pub build: fn(&SimConfig, u64) -> Result<FleetSimulation, ConfigError>,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    pub max_depleted: u32,
    pub min_visits: Option<u32>,
    pub max_plan_cost: Option<f64>,
    pub require_routes_finished: bool,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            max_depleted: 0,
            min_visits: None,
            max_plan_cost: None,
            require_routes_finished: false,
        }
    }
}

// ─── Builders ───────────────────────────────────────────────────────────────

/// Three parked targets on a line from the depot; the best tour is 60.
fn build_line(base: &SimConfig, seed: u64) -> Result<FleetSimulation, ConfigError> {
    let mut config = base.clone();
    config.fleet.depot = Point3::ORIGIN;
    config.fleet.vehicle_count = 1;
    config.fuel.capacity = 1000.0;
    config.fuel.consumption_rate = 1.0;
    config.motion.speed = 1.0;
    config.motion.waypoint_lift_fraction = 0.0;
    config.optimizer.seed = Some(seed);

    let targets = [10.0, 20.0, 30.0]
        .iter()
        .enumerate()
        .map(|(i, x)| Target::stationary(TargetId(i as u32), Point3::new(*x, 0.0, 0.0), 50.0))
        .collect();
    let vehicles = Vehicle::spawn_fleet(&config);
    FleetSimulation::with_entities(config, targets, vehicles)
}

fn build_ring(base: &SimConfig, seed: u64) -> Result<FleetSimulation, ConfigError> {
    let mut config = base.clone();
    config.targets.count = 12;
    config.fleet.vehicle_count = 3;
    config.optimizer.seed = Some(seed);
    FleetSimulation::from_config(config)
}

/// Tanks too small for the far side of the ring, so vehicles shuttle home
/// often and some stops are out of reach.
fn build_low_fuel(base: &SimConfig, seed: u64) -> Result<FleetSimulation, ConfigError> {
    let mut config = base.clone();
    config.targets.count = 12;
    config.fleet.vehicle_count = 2;
    config.fuel.capacity = 900.0;
    config.optimizer.seed = Some(seed);
    FleetSimulation::from_config(config)
}

fn build_fleet(base: &SimConfig, seed: u64) -> Result<FleetSimulation, ConfigError> {
    let mut config = base.clone();
    config.targets.count = 30;
    config.fleet.vehicle_count = 5;
    config.optimizer.assignment = AssignmentMode::Exclusive;
    config.optimizer.iterations = 500;
    config.optimizer.seed = Some(seed);
    FleetSimulation::from_config(config)
}

// ─── Registry ───────────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "LINE",
            label: "Line of three, single vehicle",
            ticks: 400,
            dt: 1.0,
            build: build_line,
            criteria: PassCriteria {
                min_visits: Some(3),
                max_plan_cost: Some(60.0 + 1e-6),
                require_routes_finished: true,
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "RING",
            label: "Ring of 12, three vehicles",
            ticks: 20_000,
            dt: 10.0,
            build: build_ring,
            criteria: PassCriteria {
                min_visits: Some(1),
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "LOW_FUEL",
            label: "Ring of 12, tight tanks",
            ticks: 20_000,
            dt: 10.0,
            build: build_low_fuel,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "FLEET",
            label: "Ring of 30, five vehicles, exclusive",
            ticks: 20_000,
            dt: 10.0,
            build: build_fleet,
            criteria: PassCriteria {
                min_visits: Some(5),
                ..PassCriteria::default()
            },
        },
    ]
}
