//! Axes, quarter turns and rigid transforms.
//!
//! Slots are addressed two ways. Grid indices `(i, j, k)` run over `0..DIM`.
//! Doubled centred coordinates `c = 2 * i - (DIM - 1)` put the cube centre at
//! the origin without half-integers, so both even cube sizes stay exact:
//! a 2x2x2 uses `{-1, 1}` and a 4x4x4 uses `{-3, -1, 1, 3}`. World
//! positions are the doubled coordinates scaled by `spacing / 2`.

use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

use glam::{Quat, Vec3};

/// Integer position in doubled centred coordinates.
pub type Coord = (i32, i32, i32);

/// One of the three cube axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// The component of `v` along this axis.
    #[inline]
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// Rotates a doubled coordinate a quarter turn about `axis`.
///
/// `positive` is a +90 degree turn by the right-hand rule, matching
/// `Quat::from_axis_angle(axis.unit(), FRAC_PI_2)`.
pub const fn quarter_turn(axis: Axis, positive: bool, (x, y, z): Coord) -> Coord {
    match (axis, positive) {
        (Axis::X, true) => (x, -z, y),
        (Axis::X, false) => (x, z, -y),
        (Axis::Y, true) => (z, y, -x),
        (Axis::Y, false) => (-z, y, x),
        (Axis::Z, true) => (-y, x, z),
        (Axis::Z, false) => (y, -x, z),
    }
}

/// Signed quarter-turn angle in radians for a base direction of +1 or -1.
#[inline]
pub fn quarter_angle(sign: i32) -> f32 {
    FRAC_PI_2 * sign as f32
}

/// Position and orientation of a cubelet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Transform {
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Rotates this transform rigidly about `center` by `rotation`.
    ///
    /// The result depends only on `self` and the arguments, so a rotation
    /// animation can recompute every frame from one snapshot.
    #[inline]
    pub fn rotated_about(&self, center: Vec3, rotation: Quat) -> Self {
        Self {
            position: center + rotation * (self.position - center),
            orientation: (rotation * self.orientation).normalize(),
        }
    }
}

/// Component values of the 24 unit quaternions in the cube rotation group.
const GROUP_COMPONENTS: [f32; 7] = [-1.0, -FRAC_1_SQRT_2, -0.5, 0.0, 0.5, FRAC_1_SQRT_2, 1.0];

fn snap_component(value: f32) -> f32 {
    GROUP_COMPONENTS
        .iter()
        .copied()
        .min_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
        .unwrap_or(value)
}

/// Snaps a near-cube-rotation quaternion onto the exact rotation group.
///
/// Every product of axis-aligned quarter turns has components drawn from
/// `{0, ±1/2, ±1/√2, ±1}`, so snapping componentwise removes float creep
/// without changing which rotation it is.
pub fn snap_orientation(q: Quat) -> Quat {
    Quat::from_xyzw(
        snap_component(q.x),
        snap_component(q.y),
        snap_component(q.z),
        snap_component(q.w),
    )
    .normalize()
}

/// True when two orientations describe the same rotation (`q` and `-q` are equal).
pub fn same_rotation(a: Quat, b: Quat, tolerance: f32) -> bool {
    a.abs_diff_eq(b, tolerance) || a.abs_diff_eq(-b, tolerance)
}
