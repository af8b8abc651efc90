// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbital Tanker Simulation Suite - Geometry

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A point (or displacement) in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    pub fn normalized(&self) -> Option<Point3> {
        let len = self.length();
        if len < f64::EPSILON {
            None
        } else {
            Some(*self * (1.0 / len))
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Point3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point3, b: Point3) -> f64 {
    (a - b).length()
}

/// Linear interpolation; `t = 0` yields `a`, `t = 1` yields `b`.
pub fn lerp(a: Point3, b: Point3, t: f64) -> Point3 {
    a + (b - a) * t
}

/// Quadratic Bézier `(1-t)²p0 + 2(1-t)t·p1 + t²p2`, component-wise.
pub fn quadratic_bezier(p0: Point3, p1: Point3, p2: Point3, t: f64) -> Point3 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let d = distance(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 6.0, 3.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn bezier_hits_endpoints() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(5.0, 10.0, 0.0);
        let p2 = Point3::new(10.0, 0.0, 0.0);
        assert_eq!(quadratic_bezier(p0, p1, p2, 0.0), p0);
        assert_eq!(quadratic_bezier(p0, p1, p2, 1.0), p2);
        let mid = quadratic_bezier(p0, p1, p2, 0.5);
        assert!((mid.x - 5.0).abs() < 1e-12);
        assert!((mid.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn bezier_with_midpoint_control_is_linear() {
        let a = Point3::new(-3.0, 1.0, 2.0);
        let b = Point3::new(7.0, -4.0, 8.0);
        let mid = lerp(a, b, 0.5);
        for &t in &[0.1, 0.25, 0.6, 0.9] {
            let on_curve = quadratic_bezier(a, mid, b, t);
            let on_line = lerp(a, b, t);
            assert!(distance(on_curve, on_line) < 1e-9);
        }
    }

    #[test]
    fn normalized_zero_vector_is_none() {
        assert!(Point3::ORIGIN.normalized().is_none());
        let n = Point3::new(0.0, 3.0, 4.0).normalized().expect("test: non-zero");
        assert!((n.length() - 1.0).abs() < 1e-12);
    }
}
