use serde::{Deserialize, Serialize};

use crate::Vec2;

/// Axis-aligned world box. Leaving it ends a vehicle's flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Returns `false` for points outside the box and for non-finite points.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Vec2::new(-5000.0, -5000.0), Vec2::new(5000.0, 5000.0))
    }
}

/// Physical constants of a vehicle.
///
/// Forces are in newtons and velocities in meters per second; positions are
/// in world pixels, converted through `pixels_per_meter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// kg
    pub mass: f64,
    /// kg·m²
    pub moment_of_inertia: f64,
    /// Maximum thrust of one motor, N
    pub motor_thrust: f64,
    /// Lever arm of each motor around the center of mass
    pub half_width: f64,
    /// m/s²
    pub gravity: Vec2,
    pub pixels_per_meter: f64,
    pub bounds: Bounds,
    pub start_position: Vec2,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            mass: 0.4,
            moment_of_inertia: 10.0,
            motor_thrust: 9.81 / 2.0,
            half_width: 50.0,
            gravity: Vec2::new(0.0, -9.81),
            pixels_per_meter: 50.0,
            bounds: Bounds::default(),
            start_position: Vec2::new(250.0, 250.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = Bounds::default();
        assert!(bounds.contains(Vec2::new(5000.0, -5000.0)));
        assert!(!bounds.contains(Vec2::new(5000.1, 0.0)));
        assert!(!bounds.contains(Vec2::new(0.0, -5000.1)));
    }

    #[test]
    fn test_bounds_reject_nan() {
        assert!(!Bounds::default().contains(Vec2::new(f64::NAN, 0.0)));
    }

    #[test]
    fn test_partial_params_fill_defaults() {
        let params: VehicleParams = serde_json::from_str(r#"{ "mass": 1.5 }"#).unwrap();
        assert_eq!(params.mass, 1.5);
        assert_eq!(params.moment_of_inertia, 10.0);
        assert_eq!(params.bounds, Bounds::default());
    }
}
