use serde::{Deserialize, Serialize};

use crate::{MotorCommand, Vec2, VehicleParams};

/// Translational and rotational state of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    /// px
    pub position: Vec2,
    /// m/s
    pub velocity: Vec2,
    /// rad, clockwise from straight up
    pub heading: f64,
    /// rad/s
    pub angular_velocity: f64,
}

impl RigidBody {
    #[must_use]
    pub const fn at_rest(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            heading: 0.0,
            angular_velocity: 0.0,
        }
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.heading.is_finite()
            && self.angular_velocity.is_finite()
    }

    /// Stops all motion while keeping position and heading.
    pub fn freeze(&mut self) {
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
    }

    /// Advances the body by `dt` seconds with explicit Euler steps.
    ///
    /// Velocity is updated before position and angular velocity before
    /// heading, so each uses the freshly updated rate.
    pub fn integrate(&mut self, load: Load, params: &VehicleParams, dt: f64) {
        self.velocity += load.force * (dt / params.mass);
        self.position += self.velocity * (dt * params.pixels_per_meter);
        self.angular_velocity += load.torque / params.moment_of_inertia * dt;
        self.heading += self.angular_velocity * dt;
    }
}

/// Net force and torque acting on a body during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Load {
    /// N
    pub force: Vec2,
    /// N·m, positive turns clockwise
    pub torque: f64,
}

impl Load {
    /// Resolves gravity and both motors' thrust.
    ///
    /// Each motor pushes along the body heading plus its own deflection. The
    /// left motor turns the body clockwise and the right motor counter-clockwise.
    #[must_use]
    pub fn resolve(heading: f64, command: &MotorCommand, params: &VehicleParams) -> Self {
        let thrust = command
            .throttle
            .iter()
            .zip(&command.motor_angle)
            .map(|(throttle, angle)| {
                Vec2::from_heading(heading + angle) * (params.motor_thrust * throttle)
            })
            .fold(Vec2::ZERO, |acc, f| acc + f);
        let [left, right] = command.throttle;
        let lever = params.half_width * params.motor_thrust;
        Self {
            force: params.gravity * params.mass + thrust,
            torque: lever * left - lever * right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.016;

    #[test]
    fn test_gravity_only_load() {
        let params = VehicleParams::default();
        let load = Load::resolve(0.0, &MotorCommand::IDLE, &params);
        assert_eq!(load.force, Vec2::new(0.0, -9.81 * 0.4));
        assert_eq!(load.torque, 0.0);
    }

    #[test]
    fn test_full_throttle_upright_lifts_without_torque() {
        let params = VehicleParams::default();
        let command = MotorCommand {
            throttle: [1.0, 1.0],
            motor_angle: [0.0, 0.0],
        };
        let load = Load::resolve(0.0, &command, &params);
        assert_eq!(load.force.x, 0.0);
        assert!((load.force.y - (9.81 - 9.81 * 0.4)).abs() < 1e-12);
        assert_eq!(load.torque, 0.0);
    }

    #[test]
    fn test_left_motor_turns_clockwise() {
        let params = VehicleParams::default();
        let command = MotorCommand {
            throttle: [1.0, 0.0],
            motor_angle: [0.0, 0.0],
        };
        let load = Load::resolve(0.0, &command, &params);
        assert_eq!(load.torque, 50.0 * 9.81 / 2.0);

        let mut body = RigidBody::at_rest(Vec2::ZERO);
        body.integrate(load, &params, DT);
        assert!(body.angular_velocity > 0.0);
        assert!(body.heading > 0.0);
    }

    #[test]
    fn test_deflected_thrust_pushes_sideways() {
        let params = VehicleParams::default();
        let command = MotorCommand {
            throttle: [1.0, 1.0],
            motor_angle: [std::f64::consts::FRAC_PI_4; 2],
        };
        let load = Load::resolve(0.0, &command, &params);
        assert!(load.force.x > 0.0);
    }

    #[test]
    fn test_euler_step_units() {
        let params = VehicleParams::default();
        let mut body = RigidBody::at_rest(Vec2::new(250.0, 250.0));
        let load = Load {
            force: Vec2::new(0.4, 0.0),
            torque: 10.0,
        };
        body.integrate(load, &params, 0.5);
        // a = 1 m/s², v = 0.5 m/s, dx = 0.5 * 0.5 * 50 px
        assert_eq!(body.velocity, Vec2::new(0.5, 0.0));
        assert_eq!(body.position, Vec2::new(262.5, 250.0));
        assert_eq!(body.angular_velocity, 0.5);
        assert_eq!(body.heading, 0.25);
    }

    #[test]
    fn test_freeze_keeps_pose() {
        let mut body = RigidBody {
            position: Vec2::new(1.0, 2.0),
            velocity: Vec2::new(3.0, 4.0),
            heading: 0.3,
            angular_velocity: 0.7,
        };
        body.freeze();
        assert_eq!(body.position, Vec2::new(1.0, 2.0));
        assert_eq!(body.heading, 0.3);
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.angular_velocity, 0.0);
    }
}
