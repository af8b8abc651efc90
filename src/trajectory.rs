// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Trajectory Planner
//
// Transfers follow a quadratic Bézier arc from start to target through a
// waypoint lifted off the chord midpoint, so the path bends away from the
// central body. Fuel is charged against the straight-line chord length.

use serde::{Deserialize, Serialize};

use crate::geometry::{distance, lerp, quadratic_bezier, Point3};
use crate::types::TargetId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanningError {
    #[error("start position is not finite: {0}")]
    NonFiniteStart(Point3),
    #[error("target position is not finite: {0}")]
    NonFiniteTarget(Point3),
    #[error("route references unknown {0}")]
    UnknownTarget(TargetId),
}

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub start: Point3,
    pub waypoint: Point3,
    pub target: Point3,
    /// Straight-line start → target distance; the fuel proxy for the leg.
    pub distance: f64,
}

/// Outcome of one [`Path::advance`] step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    pub progress: f64,
    pub position: Point3,
    pub arrived: bool,
    /// Chord distance covered by this step, `distance × Δprogress`.
    pub travelled: f64,
}

const UP: Point3 = Point3::new(0.0, 1.0, 0.0);
const SIDE: Point3 = Point3::new(1.0, 0.0, 0.0);

/// Plan a lifted arc from `start` to `target`.
///
/// The waypoint sits at the chord midpoint, displaced by `lift` along the
/// component of the up axis orthogonal to the chord.
pub fn plan(start: Point3, target: Point3, lift: f64) -> Result<Path, PlanningError> {
    if !start.is_finite() {
        return Err(PlanningError::NonFiniteStart(start));
    }
    if !target.is_finite() {
        return Err(PlanningError::NonFiniteTarget(target));
    }

    let chord = target - start;
    let up = match chord.normalized() {
        Some(dir) => orthogonal_up(dir),
        None => UP,
    };

    Ok(Path {
        start,
        waypoint: lerp(start, target, 0.5) + up * lift,
        target,
        distance: distance(start, target),
    })
}

fn orthogonal_up(dir: Point3) -> Point3 {
    let projected = UP - dir * UP.dot(&dir);
    match projected.normalized() {
        Some(up) => up,
        // Chord runs along the up axis; bend sideways instead.
        None => (SIDE - dir * SIDE.dot(&dir)).normalized().unwrap_or(SIDE),
    }
}

impl Path {
    /// Position on the arc at `progress`, clamped to `[0, 1]`.
    pub fn sample(&self, progress: f64) -> Point3 {
        quadratic_bezier(self.start, self.waypoint, self.target, progress.clamp(0.0, 1.0))
    }

    /// Move `speed × dt` along the chord-length parameterisation.
    ///
    /// Reaching `progress >= 1` snaps to the exact target and reports arrival.
    /// A zero-length path arrives immediately.
    pub fn advance(&self, progress: f64, speed: f64, dt: f64) -> Advance {
        if self.distance <= f64::EPSILON {
            return Advance {
                progress: 1.0,
                position: self.target,
                arrived: true,
                travelled: 0.0,
            };
        }

        let next = progress + speed * dt / self.distance;
        if next >= 1.0 {
            Advance {
                progress: 1.0,
                position: self.target,
                arrived: true,
                travelled: self.distance * (1.0 - progress).max(0.0),
            }
        } else {
            Advance {
                progress: next,
                position: self.sample(next),
                arrived: false,
                travelled: self.distance * (next - progress).max(0.0),
            }
        }
    }
}

/// Free-function form of [`Path::advance`].
pub fn advance(path: &Path, progress: f64, speed: f64, dt: f64) -> Advance {
    path.advance(progress, speed, dt)
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// A path in progress. The path is dropped on arrival so it can only
/// report arrival once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trajectory {
    path: Option<Path>,
    progress: f64,
}

impl Trajectory {
    pub fn new(path: Path) -> Self {
        Self { path: Some(path), progress: 0.0 }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_active(&self) -> bool {
        self.path.is_some()
    }

    /// Preview the next step without committing it.
    pub fn peek(&self, speed: f64, dt: f64) -> Option<Advance> {
        self.path.as_ref().map(|p| p.advance(self.progress, speed, dt))
    }

    /// Commit a step previously returned by [`Trajectory::peek`].
    pub fn commit(&mut self, step: &Advance) {
        if step.arrived {
            self.clear();
        } else {
            self.progress = step.progress;
        }
    }

    pub fn step(&mut self, speed: f64, dt: f64) -> Option<Advance> {
        let step = self.peek(speed, dt)?;
        self.commit(&step);
        Some(step)
    }

    pub fn clear(&mut self) {
        self.path = None;
        self.progress = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
