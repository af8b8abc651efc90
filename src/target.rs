// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Targets
//
// A target is a serviceable body on a simplified periodic orbit. Its position
// is derived from its age, so nothing but the orbit parameters is stored.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::config::{TargetConfig, MAX_RESOURCE_LEVEL};
use crate::geometry::Point3;
use crate::types::{TargetId, TargetUpdate};

// ---------------------------------------------------------------------------
// PeriodicOrbitParams
// ---------------------------------------------------------------------------

/// Circular orbit around the origin, tilted by `inclination` about the X axis
/// and then rotated by `ascending_node` about the Y (up) axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicOrbitParams {
    pub radius: f64,
    pub inclination: f64,
    pub ascending_node: f64,
    /// Angle at age zero, in radians.
    pub phase: f64,
    /// Radians per second.
    pub angular_rate: f64,
}

impl PeriodicOrbitParams {
    pub fn position_at(&self, age: f64) -> Point3 {
        let angle = self.phase + self.angular_rate * age;
        let (sin_a, cos_a) = angle.sin_cos();
        let (sin_i, cos_i) = self.inclination.sin_cos();
        let (sin_n, cos_n) = self.ascending_node.sin_cos();

        let x = self.radius * cos_a;
        let y = -self.radius * sin_a * sin_i;
        let z = self.radius * sin_a * cos_i;

        Point3::new(x * cos_n + z * sin_n, y, -x * sin_n + z * cos_n)
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub(crate) id: TargetId,
    pub(crate) name: String,
    pub(crate) orbit: PeriodicOrbitParams,
    pub(crate) resource_level: f64,
    pub(crate) initial_level: f64,
    pub(crate) age: f64,
    pub(crate) lifetime: f64,
    pub(crate) decay_rate: f64,
    pub(crate) visited: bool,
    pub(crate) expired: bool,
}

impl Target {
    pub fn new(
        id: TargetId,
        orbit: PeriodicOrbitParams,
        lifetime: f64,
        initial_level: f64,
        decay_rate: f64,
    ) -> Self {
        let level = initial_level.clamp(0.0, MAX_RESOURCE_LEVEL);
        Self {
            id,
            name: id.to_string(),
            orbit,
            resource_level: level,
            initial_level: level,
            age: 0.0,
            lifetime,
            decay_rate,
            visited: false,
            expired: false,
        }
    }

    /// A target that never moves and never expires, parked at `at`.
    pub fn stationary(id: TargetId, at: Point3, initial_level: f64) -> Self {
        let planar = (at.x * at.x + at.z * at.z).sqrt();
        let orbit = PeriodicOrbitParams {
            radius: at.length(),
            inclination: (-at.y).atan2(planar),
            ascending_node: at.x.atan2(at.z),
            phase: FRAC_PI_2,
            angular_rate: 0.0,
        };
        Self::new(id, orbit, f64::INFINITY, initial_level, 0.0)
    }

    /// Spawn `config.count` targets evenly phased around one shared ring.
    pub fn spawn_ring<R: Rng>(config: &TargetConfig, rng: &mut R) -> Vec<Target> {
        let count = config.count.max(1) as f64;
        let angular_rate = TAU / config.orbit_period;
        (0..config.count)
            .map(|i| {
                let orbit = PeriodicOrbitParams {
                    radius: config.orbit_radius,
                    inclination: config.inclination,
                    ascending_node: config.ascending_node,
                    phase: TAU * i as f64 / count,
                    angular_rate,
                };
                let lifetime = uniform(rng, config.lifetime_min, config.lifetime_max);
                let level = uniform(rng, config.initial_level_min, config.initial_level_max);
                Target::new(TargetId(i), orbit, lifetime, level, config.decay_rate)
            })
            .collect()
    }

    pub fn id(&self) -> TargetId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn orbit(&self) -> &PeriodicOrbitParams { &self.orbit }
    pub fn age(&self) -> f64 { self.age }
    pub fn lifetime(&self) -> f64 { self.lifetime }
    pub fn resource_level(&self) -> f64 { self.resource_level }
    pub fn is_visited(&self) -> bool { self.visited }
    pub fn is_expired(&self) -> bool { self.expired }

    pub fn position(&self) -> Point3 {
        self.orbit.position_at(self.age)
    }

    pub fn remaining_lifetime(&self) -> f64 {
        (self.lifetime - self.age).max(0.0)
    }

    /// Remaining headroom before the level reaches its cap.
    pub fn headroom(&self) -> f64 {
        (MAX_RESOURCE_LEVEL - self.resource_level).max(0.0)
    }

    /// Age the target by `dt` seconds, decaying its resource level.
    pub fn update(&mut self, dt: f64) {
        self.age += dt;
        if self.expired {
            return;
        }
        self.resource_level = (self.resource_level - self.decay_rate * dt).max(0.0);
        if self.age >= self.lifetime {
            self.expired = true;
            tracing::warn!(target_id = self.id.0, age = self.age, "{} reached end of life", self.name);
        }
    }

    /// Add up to `amount` resource, capped at the maximum level.
    /// Returns the amount actually accepted.
    pub fn receive(&mut self, amount: f64) -> f64 {
        let accepted = amount.min(self.headroom()).max(0.0);
        self.resource_level += accepted;
        self.visited = true;
        accepted
    }

    pub fn reset(&mut self) {
        self.age = 0.0;
        self.resource_level = self.initial_level;
        self.visited = false;
        self.expired = false;
    }

    pub fn snapshot(&self) -> TargetUpdate {
        TargetUpdate {
            id: self.id,
            position: self.position(),
            resource_level: self.resource_level,
            remaining_lifetime: self.remaining_lifetime(),
            expired: self.expired,
        }
    }
}

fn uniform<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ring_target(level: f64, lifetime: f64, decay: f64) -> Target {
        Target::new(
            TargetId(0),
            PeriodicOrbitParams {
                radius: 100.0,
                inclination: 0.0,
                ascending_node: 0.0,
                phase: 0.0,
                angular_rate: TAU / 400.0,
            },
            lifetime,
            level,
            decay,
        )
    }

    #[test]
    fn position_follows_age() {
        let mut t = ring_target(50.0, 1e9, 0.0);
        assert!(distance(t.position(), Point3::new(100.0, 0.0, 0.0)) < 1e-9);
        t.update(100.0); // quarter period
        assert!(distance(t.position(), Point3::new(0.0, 0.0, 100.0)) < 1e-9);
    }

    #[test]
    fn inclined_orbit_keeps_radius() {
        let orbit = PeriodicOrbitParams {
            radius: 42.0,
            inclination: 0.7,
            ascending_node: 1.3,
            phase: 0.4,
            angular_rate: 0.01,
        };
        for age in [0.0, 10.0, 123.0, 999.0] {
            assert!((orbit.position_at(age).length() - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn stationary_target_sits_at_point() {
        for at in [
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(-3.0, 0.0, 4.0),
            Point3::new(5.0, 2.0, -1.0),
            Point3::new(0.0, 7.0, 0.0),
        ] {
            let t = Target::stationary(TargetId(1), at, 30.0);
            assert!(distance(t.position(), at) < 1e-9, "{at} vs {}", t.position());
        }
    }

    #[test]
    fn decay_never_goes_negative() {
        let mut t = ring_target(1.0, 1e9, 0.5);
        t.update(10.0);
        assert_eq!(t.resource_level(), 0.0);
    }

    #[test]
    fn receive_caps_at_maximum() {
        let mut t = ring_target(95.0, 1e9, 0.0);
        let accepted = t.receive(10.0);
        assert!((accepted - 5.0).abs() < 1e-12);
        assert_eq!(t.resource_level(), MAX_RESOURCE_LEVEL);
        assert!(t.is_visited());
        assert_eq!(t.receive(10.0), 0.0);
    }

    #[test]
    fn expires_after_lifetime_and_resets() {
        let mut t = ring_target(80.0, 5.0, 1.0);
        t.update(3.0);
        assert!(!t.is_expired());
        assert!((t.remaining_lifetime() - 2.0).abs() < 1e-12);
        t.update(3.0);
        assert!(t.is_expired());
        assert_eq!(t.remaining_lifetime(), 0.0);
        t.reset();
        assert!(!t.is_expired());
        assert_eq!(t.resource_level(), 80.0);
        assert_eq!(t.age(), 0.0);
    }

    #[test]
    fn spawn_ring_draws_within_bounds() {
        let config = TargetConfig { count: 12, ..TargetConfig::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let targets = Target::spawn_ring(&config, &mut rng);
        assert_eq!(targets.len(), 12);
        for (i, t) in targets.iter().enumerate() {
            assert_eq!(t.id(), TargetId(i as u32));
            assert!(t.lifetime() >= config.lifetime_min && t.lifetime() < config.lifetime_max);
            assert!(t.resource_level() >= config.initial_level_min);
            assert!(t.resource_level() <= config.initial_level_max);
            assert!((t.position().length() - config.orbit_radius).abs() < 1e-6);
        }
    }
}
