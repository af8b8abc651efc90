// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Point3;

// ─── Identities ──────────────────────────────────────────────────────────────

/// Index of a target within the simulation's target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vehicle {}", self.0)
    }
}

// ─── Vehicle State ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VehicleState {
    #[default]
    Idle = 0,       // no plan, no current target
    Planning = 1,   // next target selected, path requested
    Transit = 2,    // advancing along a path to a target
    Arrived = 3,    // reached target, transfer applied this tick
    Returning = 4,  // advancing along a path to the depot
    Refueling = 5,  // at depot, tank refilled this tick
    Depleted = 6,   // TERMINAL: out of fuel away from the depot
}

impl VehicleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Depleted)
    }

    /// Whether the vehicle is currently following a path.
    pub fn is_moving(&self) -> bool {
        matches!(self, Self::Transit | Self::Returning)
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Why a route stop was passed over without a visit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkipReason {
    /// Target outlived its lifetime.
    Expired,
    /// Not reachable with a full tank while keeping the return reserve.
    Unreachable,
    /// Route referenced a target id the simulation does not know.
    UnknownTarget,
}

/// Observable per-vehicle transitions, emitted in tick order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum VehicleEvent {
    Departed { vehicle: VehicleId, target: TargetId, distance: f64 },
    Arrived { vehicle: VehicleId, target: TargetId },
    Transferred { vehicle: VehicleId, target: TargetId, amount: f64 },
    TransferSkipped { vehicle: VehicleId, target: TargetId },
    ForcedReturn { vehicle: VehicleId, fuel: f64, reserve: f64 },
    HeadingHome { vehicle: VehicleId },
    Refueled { vehicle: VehicleId, amount: f64 },
    StopSkipped { vehicle: VehicleId, target: TargetId, reason: SkipReason },
    PlanningFailed { vehicle: VehicleId, reason: String },
    Depleted { vehicle: VehicleId, position: Point3 },
}

impl VehicleEvent {
    pub fn vehicle(&self) -> VehicleId {
        match self {
            Self::Departed { vehicle, .. }
            | Self::Arrived { vehicle, .. }
            | Self::Transferred { vehicle, .. }
            | Self::TransferSkipped { vehicle, .. }
            | Self::ForcedReturn { vehicle, .. }
            | Self::HeadingHome { vehicle }
            | Self::Refueled { vehicle, .. }
            | Self::StopSkipped { vehicle, .. }
            | Self::PlanningFailed { vehicle, .. }
            | Self::Depleted { vehicle, .. } => *vehicle,
        }
    }
}

// ─── Per-tick rows ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct VehicleUpdate {
    pub id: VehicleId,
    pub state: VehicleState,
    pub position: Point3,
    pub fuel: f64,
    pub cursor: usize,
    pub route_len: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetUpdate {
    pub id: TargetId,
    pub position: Point3,
    pub resource_level: f64,
    pub remaining_lifetime: f64,
    pub expired: bool,
}

// ─── SimStats ────────────────────────────────────────────────────────────────

/// Running totals since the last reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimStats {
    pub ticks: u64,
    pub time: f64,
    pub visits: u32,
    pub transfers: u32,
    pub fuel_delivered: f64,
    pub transfers_skipped: u32,
    pub forced_returns: u32,
    pub refuels: u32,
    pub skipped_stops: u32,
    pub planning_failures: u32,
    pub depleted_vehicles: u32,
}

impl SimStats {
    pub(crate) fn record(&mut self, event: &VehicleEvent) {
        match event {
            VehicleEvent::Arrived { .. } => self.visits += 1,
            VehicleEvent::Transferred { amount, .. } => {
                self.transfers += 1;
                self.fuel_delivered += amount;
            }
            VehicleEvent::TransferSkipped { .. } => self.transfers_skipped += 1,
            VehicleEvent::ForcedReturn { .. } => self.forced_returns += 1,
            VehicleEvent::Refueled { .. } => self.refuels += 1,
            VehicleEvent::StopSkipped { .. } => self.skipped_stops += 1,
            VehicleEvent::PlanningFailed { .. } => self.planning_failures += 1,
            VehicleEvent::Depleted { .. } => self.depleted_vehicles += 1,
            VehicleEvent::Departed { .. } | VehicleEvent::HeadingHome { .. } => {}
        }
    }
}

// ─── TickResult ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TickResult {
    pub time: f64,
    pub vehicles: Vec<VehicleUpdate>,
    pub targets: Vec<TargetUpdate>,
    pub events: Vec<VehicleEvent>,
    pub stats: SimStats,
}
