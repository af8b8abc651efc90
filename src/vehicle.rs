// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Vehicles
//
// Per-tick lifecycle of a fuel-limited service vehicle:
//
//   Idle -> Planning -> Transit -> Arrived -> Idle
//                          |
//                          +-> Returning -> Refueling -> Idle
//
// Any transit step that would leave less fuel than the reserve needed to
// reach the depot from the projected position preempts the leg and sends
// the vehicle home. Depleted is terminal until an explicit reset.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::fuel::{FuelModel, Tank, TransferOutcome, FUEL_EPSILON};
use crate::geometry::{distance, Point3};
use crate::target::Target;
use crate::trajectory::{plan, PlanningError, Trajectory};
use crate::types::{SkipReason, TargetId, VehicleEvent, VehicleId, VehicleState, VehicleUpdate};

/// Distance under which a vehicle counts as docked at the depot.
pub const DEPOT_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VehicleFault {
    #[error("{vehicle} ran out of fuel at {position}")]
    FuelDepleted { vehicle: VehicleId, position: Point3 },
}

// ---------------------------------------------------------------------------
// FleetContext
// ---------------------------------------------------------------------------

/// Shared physical rules every vehicle is updated against.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetContext {
    pub fuel: FuelModel,
    pub speed: f64,
    pub waypoint_lift: f64,
    pub depot: Point3,
}

impl FleetContext {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            fuel: FuelModel::new(&config.fuel),
            speed: config.motion.speed,
            waypoint_lift: config.motion.waypoint_lift(),
            depot: config.fleet.depot,
        }
    }
}

// ---------------------------------------------------------------------------
// Vehicle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub(crate) id: VehicleId,
    pub(crate) tank: Tank,
    pub(crate) position: Point3,
    pub(crate) home: Point3,
    pub(crate) route: Vec<TargetId>,
    pub(crate) cursor: usize,
    pub(crate) state: VehicleState,
    pub(crate) trajectory: Trajectory,
    pub(crate) destination: Option<TargetId>,
    /// Current leg began docked with a full tank.
    pub(crate) leg_from_full_dock: bool,
    #[serde(skip)]
    pub(crate) fault: Option<VehicleFault>,
}

impl Vehicle {
    pub fn new(id: VehicleId, capacity: f64, home: Point3) -> Self {
        Self {
            id,
            tank: Tank::full(capacity),
            position: home,
            home,
            route: Vec::new(),
            cursor: 0,
            state: VehicleState::Idle,
            trajectory: Trajectory::default(),
            destination: None,
            leg_from_full_dock: false,
            fault: None,
        }
    }

    /// Build `config.fleet.vehicle_count` vehicles docked at the depot.
    pub fn spawn_fleet(config: &SimConfig) -> Vec<Vehicle> {
        (0..config.fleet.vehicle_count)
            .map(|i| Vehicle::new(VehicleId(i), config.fuel.capacity, config.fleet.depot))
            .collect()
    }

    pub fn id(&self) -> VehicleId { self.id }
    pub fn position(&self) -> Point3 { self.position }
    pub fn fuel(&self) -> f64 { self.tank.level() }
    pub fn capacity(&self) -> f64 { self.tank.capacity() }
    pub fn state(&self) -> VehicleState { self.state }
    pub fn route(&self) -> &[TargetId] { &self.route }
    pub fn cursor(&self) -> usize { self.cursor }
    pub fn destination(&self) -> Option<TargetId> { self.destination }
    pub fn trajectory(&self) -> &Trajectory { &self.trajectory }
    pub fn fault(&self) -> Option<&VehicleFault> { self.fault.as_ref() }

    pub fn is_depleted(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_docked(&self, depot: Point3) -> bool {
        distance(self.position, depot) <= DEPOT_TOLERANCE
    }

    /// Replace the visitation plan. Refused while depleted.
    ///
    /// A leg already in flight is finished; the cursor only advances past a
    /// stop when the arrival matches it.
    pub fn assign_route(&mut self, route: Vec<TargetId>) -> Result<(), VehicleFault> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        self.route = route;
        self.cursor = 0;
        if self.state == VehicleState::Planning {
            self.state = VehicleState::Idle;
            self.destination = None;
        }
        Ok(())
    }

    /// Restore the creation state: docked, full, no route, no fault.
    pub fn reset(&mut self) {
        self.tank.refill();
        self.position = self.home;
        self.route.clear();
        self.cursor = 0;
        self.state = VehicleState::Idle;
        self.trajectory.clear();
        self.destination = None;
        self.leg_from_full_dock = false;
        self.fault = None;
    }

    pub fn snapshot(&self) -> VehicleUpdate {
        VehicleUpdate {
            id: self.id,
            state: self.state,
            position: self.position,
            fuel: self.tank.level(),
            cursor: self.cursor,
            route_len: self.route.len(),
        }
    }

    /// Advance this vehicle by `dt` seconds.
    ///
    /// `targets` must already reflect this tick's decay; any transfer reads
    /// and writes the live level.
    pub fn update(
        &mut self,
        dt: f64,
        targets: &mut [Target],
        ctx: &FleetContext,
        events: &mut Vec<VehicleEvent>,
    ) {
        match self.state {
            VehicleState::Depleted => return,
            VehicleState::Arrived | VehicleState::Refueling => self.state = VehicleState::Idle,
            _ => {}
        }

        if self.state == VehicleState::Idle {
            self.select_next(targets, ctx, events);
        }
        if self.state == VehicleState::Planning {
            self.begin_leg(targets, ctx, events);
        }
        if self.state.is_moving() {
            self.fly(dt, targets, ctx, events);
        }
    }

    // ── Idle ────────────────────────────────────────────────────────────────

    fn select_next(&mut self, targets: &[Target], ctx: &FleetContext, events: &mut Vec<VehicleEvent>) {
        loop {
            let Some(&id) = self.route.get(self.cursor) else {
                if self.cursor == self.route.len() && !self.is_docked(ctx.depot) {
                    self.cursor = self.route.len() + 1;
                    events.push(VehicleEvent::HeadingHome { vehicle: self.id });
                    self.head_home(ctx, events);
                }
                return;
            };

            let Some(target) = find_target(targets, id) else {
                self.planning_failed(PlanningError::UnknownTarget(id), events);
                self.cursor += 1;
                return;
            };

            if target.is_expired() {
                self.skip_stop(id, SkipReason::Expired, events);
                continue;
            }

            let to = target.position();
            let leg_fuel = ctx.fuel.fuel_for(distance(self.position, to));
            let reserve = ctx.fuel.required_reserve(to, ctx.depot);
            if self.tank.level() - leg_fuel + FUEL_EPSILON >= reserve {
                self.destination = Some(id);
                self.state = VehicleState::Planning;
                return;
            }

            if self.is_docked(ctx.depot) && self.tank.level() + FUEL_EPSILON >= self.tank.capacity() {
                self.skip_stop(id, SkipReason::Unreachable, events);
                continue;
            }

            tracing::debug!(vehicle = self.id.0, fuel = self.tank.level(), "refuelling before {}", id);
            self.head_home(ctx, events);
            return;
        }
    }

    // ── Planning ────────────────────────────────────────────────────────────

    fn begin_leg(&mut self, targets: &[Target], ctx: &FleetContext, events: &mut Vec<VehicleEvent>) {
        let Some(id) = self.destination else {
            self.state = VehicleState::Idle;
            return;
        };

        let planned = match find_target(targets, id) {
            Some(target) if target.is_expired() => {
                self.destination = None;
                self.state = VehicleState::Idle;
                self.skip_stop(id, SkipReason::Expired, events);
                return;
            }
            Some(target) => plan(self.position, target.position(), ctx.waypoint_lift),
            None => Err(PlanningError::UnknownTarget(id)),
        };

        match planned {
            Ok(path) => {
                self.leg_from_full_dock = self.is_docked(ctx.depot)
                    && self.tank.level() + FUEL_EPSILON >= self.tank.capacity();
                events.push(VehicleEvent::Departed {
                    vehicle: self.id,
                    target: id,
                    distance: path.distance,
                });
                self.trajectory = Trajectory::new(path);
                self.state = VehicleState::Transit;
            }
            Err(err) => {
                self.destination = None;
                self.state = VehicleState::Idle;
                self.planning_failed(err, events);
                if self.route.get(self.cursor) == Some(&id) {
                    self.cursor += 1;
                }
            }
        }
    }

    // ── Transit / Returning ─────────────────────────────────────────────────

    fn fly(&mut self, dt: f64, targets: &mut [Target], ctx: &FleetContext, events: &mut Vec<VehicleEvent>) {
        let Some(step) = self.trajectory.peek(ctx.speed, dt) else {
            self.state = VehicleState::Idle;
            return;
        };
        let burn = ctx.fuel.fuel_for(step.travelled);

        if self.state == VehicleState::Transit {
            let reserve = ctx.fuel.required_reserve(step.position, ctx.depot);
            if self.tank.level() - burn + FUEL_EPSILON < reserve {
                self.force_return(reserve, ctx, events);
                return;
            }
        }

        let available = self.tank.level();
        if burn > available + FUEL_EPSILON {
            let from = self.trajectory.progress();
            let reached = from + (step.progress - from) * (available / burn);
            if let Some(path) = self.trajectory.path() {
                self.position = path.sample(reached);
            }
            ctx.fuel.consume(&mut self.tank, step.travelled);
            self.deplete(events);
            return;
        }

        self.trajectory.commit(&step);
        ctx.fuel.consume(&mut self.tank, step.travelled);
        self.position = step.position;

        if step.arrived {
            match self.state {
                VehicleState::Transit => self.arrive(targets, ctx, events),
                VehicleState::Returning => self.dock(events),
                _ => {}
            }
        } else if self.tank.is_empty() && !self.is_docked(ctx.depot) {
            self.deplete(events);
        }
    }

    fn force_return(&mut self, reserve: f64, ctx: &FleetContext, events: &mut Vec<VehicleEvent>) {
        let fuel = self.tank.level();
        tracing::debug!(vehicle = self.id.0, fuel, reserve, "reserve breached, returning to depot");
        events.push(VehicleEvent::ForcedReturn { vehicle: self.id, fuel, reserve });

        // A leg that cannot be flown even from a full dock never will be.
        if let Some(id) = self.destination.take() {
            if self.leg_from_full_dock && self.route.get(self.cursor) == Some(&id) {
                self.skip_stop(id, SkipReason::Unreachable, events);
            }
        }
        self.head_home(ctx, events);
    }

    fn arrive(&mut self, targets: &mut [Target], ctx: &FleetContext, events: &mut Vec<VehicleEvent>) {
        self.state = VehicleState::Arrived;
        let Some(id) = self.destination.take() else {
            return;
        };

        // A target that expired mid-flight is a skipped stop, not a visit.
        match find_target_mut(targets, id) {
            Some(target) if target.is_expired() => {
                tracing::warn!(vehicle = self.id.0, "{} expired before arrival", id);
                events.push(VehicleEvent::StopSkipped {
                    vehicle: self.id,
                    target: id,
                    reason: SkipReason::Expired,
                });
            }
            Some(target) => {
                events.push(VehicleEvent::Arrived { vehicle: self.id, target: id });
                let reserve = ctx.fuel.required_reserve(self.position, ctx.depot);
                match ctx.fuel.transfer(&mut self.tank, target, reserve) {
                    TransferOutcome::Transferred(amount) => {
                        tracing::debug!(vehicle = self.id.0, amount, "transferred to {}", id);
                        events.push(VehicleEvent::Transferred { vehicle: self.id, target: id, amount });
                    }
                    TransferOutcome::Skipped => {
                        events.push(VehicleEvent::TransferSkipped { vehicle: self.id, target: id });
                    }
                }
            }
            None => {}
        }

        if self.route.get(self.cursor) == Some(&id) {
            self.cursor += 1;
        }
    }

    fn dock(&mut self, events: &mut Vec<VehicleEvent>) {
        let amount = self.tank.refill();
        self.state = VehicleState::Refueling;
        if self.cursor > self.route.len() {
            self.cursor = self.route.len();
        }
        tracing::info!(vehicle = self.id.0, amount, "refuelled at depot");
        events.push(VehicleEvent::Refueled { vehicle: self.id, amount });
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    fn head_home(&mut self, ctx: &FleetContext, events: &mut Vec<VehicleEvent>) {
        match plan(self.position, ctx.depot, ctx.waypoint_lift) {
            Ok(path) => {
                self.trajectory = Trajectory::new(path);
                self.state = VehicleState::Returning;
            }
            Err(err) => {
                self.trajectory.clear();
                self.state = VehicleState::Idle;
                self.planning_failed(err, events);
            }
        }
    }

    fn skip_stop(&mut self, id: TargetId, reason: SkipReason, events: &mut Vec<VehicleEvent>) {
        tracing::warn!(vehicle = self.id.0, ?reason, "skipping {}", id);
        events.push(VehicleEvent::StopSkipped { vehicle: self.id, target: id, reason });
        self.cursor += 1;
    }

    fn planning_failed(&mut self, err: PlanningError, events: &mut Vec<VehicleEvent>) {
        tracing::warn!(vehicle = self.id.0, "planning failed: {}", err);
        events.push(VehicleEvent::PlanningFailed { vehicle: self.id, reason: err.to_string() });
    }

    fn deplete(&mut self, events: &mut Vec<VehicleEvent>) {
        let fault = VehicleFault::FuelDepleted { vehicle: self.id, position: self.position };
        tracing::error!(vehicle = self.id.0, "{}", fault);
        self.state = VehicleState::Depleted;
        self.trajectory.clear();
        self.destination = None;
        self.fault = Some(fault);
        events.push(VehicleEvent::Depleted { vehicle: self.id, position: self.position });
    }
}

/// Targets are stored by index; fall back to a scan if ids and slots diverge.
pub(crate) fn find_target(targets: &[Target], id: TargetId) -> Option<&Target> {
    match targets.get(id.0 as usize) {
        Some(t) if t.id == id => Some(t),
        _ => targets.iter().find(|t| t.id == id),
    }
}

fn find_target_mut(targets: &mut [Target], id: TargetId) -> Option<&mut Target> {
    let slot = id.0 as usize;
    if targets.get(slot).map_or(false, |t| t.id == id) {
        return targets.get_mut(slot);
    }
    targets.iter_mut().find(|t| t.id == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
