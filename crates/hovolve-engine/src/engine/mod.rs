//! Flight dynamics and waypoint tracking for a single vehicle.
//!
//! - [`Vehicle`] - Two-motor drone flown by a [`Controller`]
//! - [`RigidBody`] - Position, velocity, heading and angular velocity with explicit Euler integration
//! - [`VehicleParams`] - Physical constants and the world box
//! - [`Course`] / [`Target`] - Shared cyclic waypoint sequence
//! - [`WaypointProgress`] - Per-vehicle capture and dwell state
//! - [`FlightMetrics`] - Fitness accumulators
//! - [`Spring`] - Optional tether used as a test rig
//!
//! # Step Order
//!
//! Each [`Vehicle::step`] runs:
//!
//! 1. Read sensors relative to the current target and ask the controller for a [`MotorCommand`]
//! 2. Resolve gravity, motor thrust and tether force plus the motor torque
//! 3. Integrate velocity, position, angular velocity and heading
//! 4. Retire the vehicle if it left the world box
//! 5. Accumulate metrics (counted steps only) and update waypoint progress

pub use self::{body::*, control::*, metrics::*, params::*, spring::*, vehicle::*, waypoint::*};

mod body;
mod control;
mod metrics;
mod params;
mod spring;
mod vehicle;
mod waypoint;
