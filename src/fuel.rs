// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Fuel Model
//
// Fuel is burned per unit of straight-line distance. The same rate feeds the
// cost evaluator, so a planned route costs exactly what flying it burns.

use serde::{Deserialize, Serialize};

use crate::config::FuelConfig;
use crate::geometry::{distance, Point3};
use crate::target::Target;

/// Slack for comparisons against the reserve, absorbing float accumulation.
pub const FUEL_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Tank
// ---------------------------------------------------------------------------

/// Fuel level bounded to `[0, capacity]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    level: f64,
    capacity: f64,
}

impl Tank {
    pub fn full(capacity: f64) -> Self {
        Self { level: capacity, capacity }
    }

    pub fn with_level(capacity: f64, level: f64) -> Self {
        Self { level: level.clamp(0.0, capacity), capacity }
    }

    pub fn level(&self) -> f64 { self.level }
    pub fn capacity(&self) -> f64 { self.capacity }

    pub fn is_empty(&self) -> bool {
        self.level <= 0.0
    }

    /// Remove up to `amount`; clamps at zero. Returns the amount removed.
    pub(crate) fn draw(&mut self, amount: f64) -> f64 {
        let drawn = amount.max(0.0).min(self.level);
        self.level -= drawn;
        drawn
    }

    /// Fill to capacity. Returns the amount added.
    pub(crate) fn refill(&mut self) -> f64 {
        let added = self.capacity - self.level;
        self.level = self.capacity;
        added
    }
}

// ---------------------------------------------------------------------------
// TransferOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferOutcome {
    Transferred(f64),
    /// Computed amount was not positive; nothing moved.
    Skipped,
}

// ---------------------------------------------------------------------------
// FuelModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FuelModel {
    consumption_rate: f64,
    safety_factor: f64,
    transfer_rate: f64,
}

impl FuelModel {
    pub fn new(config: &FuelConfig) -> Self {
        Self {
            consumption_rate: config.consumption_rate,
            safety_factor: config.safety_factor,
            transfer_rate: config.transfer_rate,
        }
    }

    pub fn consumption_rate(&self) -> f64 { self.consumption_rate }
    pub fn safety_factor(&self) -> f64 { self.safety_factor }
    pub fn transfer_rate(&self) -> f64 { self.transfer_rate }

    /// Fuel needed to cover `distance`.
    pub fn fuel_for(&self, distance: f64) -> f64 {
        distance * self.consumption_rate
    }

    /// Burn fuel for `distance_travelled`, clamping at zero.
    /// Returns the amount actually burned.
    pub fn consume(&self, tank: &mut Tank, distance_travelled: f64) -> f64 {
        tank.draw(self.fuel_for(distance_travelled))
    }

    /// Fuel that must stay in the tank to reach the depot from `from`.
    pub fn required_reserve(&self, from: Point3, depot: Point3) -> f64 {
        self.fuel_for(distance(from, depot)) * self.safety_factor
    }

    /// `min(headroom, transfer_rate, fuel above reserve)`, may be negative.
    pub fn transfer_amount(&self, fuel: f64, reserve: f64, headroom: f64) -> f64 {
        headroom.min(self.transfer_rate).min(fuel - reserve)
    }

    /// Move resource from the tank into `target`, keeping `reserve` in the tank.
    ///
    /// Only what the target actually accepts is drawn from the tank.
    pub fn transfer(&self, tank: &mut Tank, target: &mut Target, reserve: f64) -> TransferOutcome {
        let amount = self.transfer_amount(tank.level(), reserve, target.headroom());
        if amount <= 0.0 {
            return TransferOutcome::Skipped;
        }
        let accepted = target.receive(amount);
        tank.draw(accepted);
        TransferOutcome::Transferred(accepted)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
