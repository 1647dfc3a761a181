//! Easing curves for turn animations.

use serde::{Deserialize, Serialize};

/// Easing function variants for the turn angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant angular speed.
    Linear,
    /// Quadratic ease-in-out: accelerate for the first half, decelerate after.
    #[default]
    QuadraticInOut,
    /// Hermite smoothstep `3t² - 2t³`.
    SmoothStep,
}

impl Easing {
    /// Evaluates the curve at `t`.
    ///
    /// Input is clamped to [0.0, 1.0]; every variant maps 0 to 0 and 1 to 1.
    #[inline]
    pub fn evaluate(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let from_end = -2.0 * t + 2.0;
                    1.0 - from_end * from_end / 2.0
                }
            }
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}
