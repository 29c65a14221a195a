//! Pendulum state representation.
//!
//! Implements the dynamical state with:
//! - Angles and angular velocities (the source of truth)
//! - 2D points for pivot, bobs and pointer positions
//! - Cartesian pose, projected from the state every frame

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::domains::physics::OdeState;

/// 2D point in screen/world space (y axis pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Point2 {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin.
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Check if both components are finite.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // is_finite not const
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point2> for (f64, f64) {
    fn from(p: Point2) -> Self {
        (p.x, p.y)
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// The four scalars describing the pendulum: two angles and their rates.
///
/// Angles are in radians measured from the downward vertical, angular
/// velocities in radians per second. After every completed step both
/// angles lie in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StateVector {
    /// Angle of the first link.
    pub theta1: f64,
    /// Angle of the second link.
    pub theta2: f64,
    /// Angular velocity of the first link.
    pub omega1: f64,
    /// Angular velocity of the second link.
    pub omega2: f64,
}

impl StateVector {
    /// Component names, in storage order.
    pub const LABELS: [&'static str; 4] = ["theta1", "theta2", "omega1", "omega2"];

    /// Create a new state vector.
    #[must_use]
    pub const fn new(theta1: f64, theta2: f64, omega1: f64, omega2: f64) -> Self {
        Self {
            theta1,
            theta2,
            omega1,
            omega2,
        }
    }

    /// State at rest with the given angles (radians).
    #[must_use]
    pub const fn at_rest(theta1: f64, theta2: f64) -> Self {
        Self::new(theta1, theta2, 0.0, 0.0)
    }

    /// Components as an array, in `LABELS` order.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 4] {
        [self.theta1, self.theta2, self.omega1, self.omega2]
    }

    /// Reduce both angles into `[0, 2π)`. Velocities are untouched.
    #[must_use]
    pub fn wrapped(self) -> Self {
        Self {
            theta1: wrap_angle(self.theta1),
            theta2: wrap_angle(self.theta2),
            ..self
        }
    }

    /// Zero both angular velocities.
    #[allow(clippy::missing_const_for_fn)] // Mutable const not stable
    pub fn halt(&mut self) {
        self.omega1 = 0.0;
        self.omega2 = 0.0;
    }
}

impl std::ops::Add for StateVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            theta1: self.theta1 + rhs.theta1,
            theta2: self.theta2 + rhs.theta2,
            omega1: self.omega1 + rhs.omega1,
            omega2: self.omega2 + rhs.omega2,
        }
    }
}

impl std::ops::Mul<f64> for StateVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            theta1: self.theta1 * rhs,
            theta2: self.theta2 * rhs,
            omega1: self.omega1 * rhs,
            omega2: self.omega2 * rhs,
        }
    }
}

impl OdeState for StateVector {
    fn first_non_finite(&self) -> Option<&'static str> {
        self.to_array()
            .iter()
            .zip(Self::LABELS)
            .find(|(v, _)| !v.is_finite())
            .map(|(_, label)| label)
    }
}

/// Reduce an angle into `[0, 2π)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly `2π`; that
/// case folds back to `0`. Non-finite input is returned unchanged so the
/// guard can still see it.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Positions of the two bobs, projected from state and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CartesianPose {
    /// Fixed anchor of the first link.
    pub pivot: Point2,
    /// First bob.
    pub pos1: Point2,
    /// Second bob.
    pub pos2: Point2,
}

impl CartesianPose {
    /// Project a state onto screen space.
    ///
    /// ```text
    /// pos1 = pivot + l1 * (sin θ1, cos θ1)
    /// pos2 = pos1  + l2 * (sin θ2, cos θ2)
    /// ```
    #[must_use]
    pub fn project(state: &StateVector, l1: f64, l2: f64, pivot: Point2) -> Self {
        let (s1, c1) = state.theta1.sin_cos();
        let (s2, c2) = state.theta2.sin_cos();
        let pos1 = Point2::new(pivot.x + l1 * s1, pivot.y + l1 * c1);
        let pos2 = Point2::new(pos1.x + l2 * s2, pos1.y + l2 * c2);
        Self { pivot, pos1, pos2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_point_distance_squared() {
        let a = Point2::new(1.0, 2.0);
        let b = Point2::new(4.0, 6.0);
        assert!((a.distance_squared(&b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_point_conversions() {
        let p: Point2 = (3.0, -1.0).into();
        assert_eq!(p, Point2::new(3.0, -1.0));
        let t: (f64, f64) = p.into();
        assert_eq!(t, (3.0, -1.0));
        assert_eq!(Point2::from([5.0, 6.0]), Point2::new(5.0, 6.0));
    }

    #[test]
    fn test_state_arithmetic() {
        let a = StateVector::new(1.0, 2.0, 3.0, 4.0);
        let b = StateVector::new(0.5, 0.5, 0.5, 0.5);
        let sum = a + b * 2.0;
        assert_eq!(sum, StateVector::new(2.0, 3.0, 4.0, 5.0));
    }

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!(wrap_angle(TAU).abs() < f64::EPSILON);
        assert!(wrap_angle(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wrap_angle_tiny_negative() {
        let w = wrap_angle(-1e-20);
        assert!((0.0..TAU).contains(&w), "w={w}");
    }

    #[test]
    fn test_wrap_angle_keeps_nan() {
        assert!(wrap_angle(f64::NAN).is_nan());
    }

    #[test]
    fn test_wrapped_leaves_velocity() {
        let s = StateVector::new(7.0, -1.0, 12.0, -30.0).wrapped();
        assert!((s.omega1 - 12.0).abs() < f64::EPSILON);
        assert!((s.omega2 + 30.0).abs() < f64::EPSILON);
        assert!((0.0..TAU).contains(&s.theta1));
        assert!((0.0..TAU).contains(&s.theta2));
    }

    #[test]
    fn test_halt() {
        let mut s = StateVector::new(1.0, 2.0, 3.0, 4.0);
        s.halt();
        assert_eq!(s, StateVector::at_rest(1.0, 2.0));
    }

    #[test]
    fn test_first_non_finite() {
        assert_eq!(StateVector::default().first_non_finite(), None);
        let s = StateVector::new(0.0, 0.0, f64::INFINITY, f64::NAN);
        assert_eq!(s.first_non_finite(), Some("omega1"));
    }

    #[test]
    fn test_project_hanging() {
        let pose = CartesianPose::project(&StateVector::default(), 100.0, 50.0, Point2::new(10.0, 20.0));
        assert_eq!(pose.pivot, Point2::new(10.0, 20.0));
        assert!((pose.pos1.x - 10.0).abs() < 1e-12);
        assert!((pose.pos1.y - 120.0).abs() < 1e-12);
        assert!((pose.pos2.y - 170.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_horizontal() {
        let state = StateVector::at_rest(FRAC_PI_2, PI);
        let pose = CartesianPose::project(&state, 100.0, 50.0, Point2::zero());
        assert!((pose.pos1.x - 100.0).abs() < 1e-9);
        assert!(pose.pos1.y.abs() < 1e-9);
        // Second link points straight up from bob 1.
        assert!((pose.pos2.x - 100.0).abs() < 1e-9);
        assert!((pose.pos2.y + 50.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Wrapped angles always land in [0, 2π).
        #[test]
        fn prop_wrap_in_range(angle in -1e6f64..1e6) {
            let w = wrap_angle(angle);
            prop_assert!((0.0..TAU).contains(&w));
        }

        /// Link lengths are preserved by the projection.
        #[test]
        fn prop_projection_preserves_lengths(
            theta1 in -10.0f64..10.0,
            theta2 in -10.0f64..10.0,
            l1 in 10.0f64..500.0,
            l2 in 10.0f64..500.0,
        ) {
            let pivot = Point2::new(400.0, 300.0);
            let pose = CartesianPose::project(&StateVector::at_rest(theta1, theta2), l1, l2, pivot);
            prop_assert!((pose.pos1.distance_squared(&pivot).sqrt() - l1).abs() < 1e-9);
            prop_assert!((pose.pos2.distance_squared(&pose.pos1).sqrt() - l2).abs() < 1e-9);
        }
    }
}
