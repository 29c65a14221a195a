//! Pointer interaction: grab a bob, drag it, release it.
//!
//! A small state machine over [`InteractionMode`]:
//!
//! ```text
//!            down on bob 1            up
//!   Free ─────────────────▶ Holding(First) ─────▶ Free
//!     │      down on bob 2            up
//!     └───────────────────▶ Holding(Second) ────▶ Free
//! ```
//!
//! Hit tests compare squared distances against the bob radii; bob 1 wins
//! when both hit regions contain the pointer. While holding, the engine
//! recomputes the held angle from the latest pointer position each frame.
//! Release imparts no velocity.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::engine::state::{wrap_angle, CartesianPose, Point2};

/// Substitute for a zero horizontal offset in [`held_angle`].
pub const POINTER_EPSILON: f64 = 1e-9;

/// Which bob the pointer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeldBob {
    /// The bob on the first link.
    First,
    /// The bob on the second link.
    Second,
}

/// Interaction state: free motion or one bob held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    /// Integrating freely.
    #[default]
    Free,
    /// A bob follows the pointer and integration is suspended.
    Holding(HeldBob),
}

impl InteractionMode {
    /// The held bob, if any.
    #[must_use]
    pub const fn held(self) -> Option<HeldBob> {
        match self {
            Self::Free => None,
            Self::Holding(bob) => Some(bob),
        }
    }

    /// Whether a bob is held.
    #[must_use]
    pub const fn is_holding(self) -> bool {
        matches!(self, Self::Holding(_))
    }
}

/// Which bob, if any, lies under the pointer. Bob 1 takes priority.
#[must_use]
pub fn hit_test(pointer: Point2, pose: &CartesianPose, radius1: f64, radius2: f64) -> Option<HeldBob> {
    if pointer.distance_squared(&pose.pos1) < radius1 * radius1 {
        Some(HeldBob::First)
    } else if pointer.distance_squared(&pose.pos2) < radius2 * radius2 {
        Some(HeldBob::Second)
    } else {
        None
    }
}

/// Link angle that points from `origin` toward `pointer`.
///
/// Measured from the downward vertical like the state angles, in
/// `[0, 2π)`. Screen y points down, so the vertical offset is flipped
/// before taking the arctangent.
#[must_use]
#[allow(clippy::float_cmp)] // exact zero is the only degenerate input
pub fn held_angle(pointer: Point2, origin: Point2) -> f64 {
    let mut dx = pointer.x - origin.x;
    let dy = origin.y - pointer.y;
    if dx == 0.0 {
        dx = POINTER_EPSILON;
    }

    let mut theta = (dy / dx).atan();
    if dx < 0.0 {
        theta += PI;
    }
    wrap_angle(theta + FRAC_PI_2)
}

/// Translates pointer events into an [`InteractionMode`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionController {
    mode: InteractionMode,
    pointer: Option<Point2>,
}

impl InteractionController {
    /// Create a controller in `Free` mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Last pointer position seen while holding.
    #[must_use]
    pub const fn pointer(&self) -> Option<Point2> {
        self.pointer
    }

    /// Handle a pointer press (or a drag with the button down).
    ///
    /// In `Free`, hit-tests the bobs and starts a hold on a hit. While
    /// holding, only the pointer position is updated. Returns the mode
    /// after the event.
    pub fn pointer_down(
        &mut self,
        pointer: Point2,
        pose: &CartesianPose,
        radius1: f64,
        radius2: f64,
    ) -> InteractionMode {
        if self.mode == InteractionMode::Free {
            if let Some(bob) = hit_test(pointer, pose, radius1, radius2) {
                self.mode = InteractionMode::Holding(bob);
            }
        }
        if self.mode.is_holding() {
            self.pointer = Some(pointer);
        }
        self.mode
    }

    /// Track pointer motion. Ignored unless holding.
    pub fn pointer_move(&mut self, pointer: Point2) {
        if self.mode.is_holding() {
            self.pointer = Some(pointer);
        }
    }

    /// Handle a pointer release. Returns the bob that was let go, if any.
    pub fn pointer_up(&mut self) -> Option<HeldBob> {
        let released = self.mode.held();
        self.mode = InteractionMode::Free;
        self.pointer = None;
        released
    }

    /// Angle override for the held bob: which angle, and its new value.
    ///
    /// Bob 1 is measured from the pivot, bob 2 from bob 1's position in
    /// `pose`.
    #[must_use]
    pub fn held_override(&self, pose: &CartesianPose) -> Option<(HeldBob, f64)> {
        let bob = self.mode.held()?;
        let pointer = self.pointer?;
        let origin = match bob {
            HeldBob::First => pose.pivot,
            HeldBob::Second => pose.pos1,
        };
        Some((bob, held_angle(pointer, origin)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::state::StateVector;
    use std::f64::consts::TAU;

    fn pose() -> CartesianPose {
        CartesianPose::project(&StateVector::default(), 100.0, 100.0, Point2::new(0.0, 0.0))
    }

    #[test]
    fn test_held_angle_cardinal_directions() {
        let o = Point2::zero();
        // Straight down (screen y grows downward).
        assert!(held_angle(Point2::new(0.0, 10.0), o) < 1e-6);
        // Right.
        assert!((held_angle(Point2::new(10.0, 0.0), o) - FRAC_PI_2).abs() < 1e-12);
        // Straight up.
        assert!((held_angle(Point2::new(0.0, -10.0), o) - PI).abs() < 1e-6);
        // Left.
        assert!((held_angle(Point2::new(-10.0, 0.0), o) - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_held_angle_inverts_projection() {
        let pivot = Point2::new(300.0, 200.0);
        for theta in [0.3, 1.2, 2.5, 3.9, 5.5] {
            let pose = CartesianPose::project(&StateVector::at_rest(theta, 0.0), 120.0, 80.0, pivot);
            let recovered = held_angle(pose.pos1, pivot);
            assert!((recovered - theta).abs() < 1e-9, "theta={theta} recovered={recovered}");
        }
    }

    #[test]
    fn test_held_angle_in_range() {
        let a = held_angle(Point2::new(-1e-12, 5.0), Point2::zero());
        assert!((0.0..TAU).contains(&a));
    }

    #[test]
    fn test_hit_test_priority() {
        // Both bobs at the same spot: bob 1 wins.
        let p = CartesianPose {
            pivot: Point2::zero(),
            pos1: Point2::new(0.0, 10.0),
            pos2: Point2::new(0.0, 10.0),
        };
        assert_eq!(hit_test(Point2::new(0.0, 10.0), &p, 5.0, 5.0), Some(HeldBob::First));
    }

    #[test]
    fn test_hit_test_second_and_miss() {
        let p = pose();
        assert_eq!(hit_test(Point2::new(2.0, 199.0), &p, 10.0, 10.0), Some(HeldBob::Second));
        assert_eq!(hit_test(Point2::new(50.0, 50.0), &p, 10.0, 10.0), None);
        // Boundary is exclusive.
        assert_eq!(hit_test(Point2::new(10.0, 100.0), &p, 10.0, 0.0), None);
    }

    #[test]
    fn test_pointer_down_starts_hold() {
        let mut ctl = InteractionController::new();
        let p = pose();
        let mode = ctl.pointer_down(p.pos1, &p, 10.0, 10.0);
        assert_eq!(mode, InteractionMode::Holding(HeldBob::First));
        assert_eq!(ctl.pointer(), Some(p.pos1));
    }

    #[test]
    fn test_pointer_down_miss_stays_free() {
        let mut ctl = InteractionController::new();
        let p = pose();
        assert_eq!(ctl.pointer_down(Point2::new(500.0, 500.0), &p, 10.0, 10.0), InteractionMode::Free);
        assert_eq!(ctl.pointer(), None);
        assert!(ctl.held_override(&p).is_none());
    }

    #[test]
    fn test_hold_persists_off_target() {
        let mut ctl = InteractionController::new();
        let p = pose();
        ctl.pointer_down(p.pos2, &p, 10.0, 10.0);
        // Dragging far away keeps the same bob.
        let far = Point2::new(-400.0, 0.0);
        assert_eq!(ctl.pointer_down(far, &p, 10.0, 10.0), InteractionMode::Holding(HeldBob::Second));
        assert_eq!(ctl.pointer(), Some(far));
    }

    #[test]
    fn test_pointer_move_only_while_holding() {
        let mut ctl = InteractionController::new();
        ctl.pointer_move(Point2::new(1.0, 1.0));
        assert_eq!(ctl.pointer(), None);

        let p = pose();
        ctl.pointer_down(p.pos1, &p, 10.0, 10.0);
        ctl.pointer_move(Point2::new(100.0, 0.0));
        let (bob, angle) = ctl.held_override(&p).unwrap();
        assert_eq!(bob, HeldBob::First);
        assert!((angle - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_second_bob_measured_from_first() {
        let mut ctl = InteractionController::new();
        let p = pose();
        ctl.pointer_down(p.pos2, &p, 10.0, 10.0);
        // Directly to the right of bob 1.
        ctl.pointer_move(Point2::new(p.pos1.x + 50.0, p.pos1.y));
        let (bob, angle) = ctl.held_override(&p).unwrap();
        assert_eq!(bob, HeldBob::Second);
        assert!((angle - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_pointer_up_releases() {
        let mut ctl = InteractionController::new();
        let p = pose();
        ctl.pointer_down(p.pos1, &p, 10.0, 10.0);
        assert_eq!(ctl.pointer_up(), Some(HeldBob::First));
        assert_eq!(ctl.mode(), InteractionMode::Free);
        assert_eq!(ctl.pointer_up(), None);
    }

    #[test]
    fn test_mode_helpers() {
        assert!(!InteractionMode::Free.is_holding());
        assert_eq!(InteractionMode::Holding(HeldBob::Second).held(), Some(HeldBob::Second));
        assert_eq!(InteractionMode::default(), InteractionMode::Free);
    }
}
