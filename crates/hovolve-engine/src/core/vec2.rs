use serde::{Deserialize, Serialize};

/// A 2D vector of `f64` components.
///
/// Supports component-wise `+`, `-`, `+=` and multiplication by a scalar.
///
/// ```
/// use hovolve_engine::Vec2;
///
/// let v = Vec2::new(3.0, 4.0);
/// assert_eq!(v.length(), 5.0);
/// assert_eq!(v * 2.0, Vec2::new(6.0, 8.0));
/// assert_eq!(v - Vec2::new(1.0, 1.0), Vec2::new(2.0, 3.0));
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
    derive_more::Mul,
)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle`, measured clockwise from straight up.
    ///
    /// A heading of zero thrusts along `+y`.
    #[must_use]
    pub fn from_heading(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(sin, cos)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
