use std::f64::consts::FRAC_PI_4;

use crate::{ControlError, Network, Topology, Vec2};

/// Number of sensor readings fed to a controller.
pub const SENSOR_COUNT: usize = 6;

/// Scale applied to relative target position and velocity before they reach a controller.
pub const SENSOR_SCALE: f64 = 1000.0;

/// Layer sizes of a freshly trained pilot: 6 sensors, two hidden layers, 4 motor outputs.
#[must_use]
pub fn default_pilot_topology() -> Topology {
    Topology::new([SENSOR_COUNT, 12, 6, 4]).expect("pilot topology has no empty layer")
}

/// Sensor readings of one vehicle at one instant.
///
/// Layout: `[dx/1000, dy/1000, vx/1000, vy/1000, heading, angular_velocity]`
/// where `dx, dy` point from the vehicle to its current target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensors(pub [f64; SENSOR_COUNT]);

impl Sensors {
    #[must_use]
    pub fn read(
        position: Vec2,
        velocity: Vec2,
        heading: f64,
        angular_velocity: f64,
        target: Vec2,
    ) -> Self {
        let to_target = target - position;
        Self([
            to_target.x / SENSOR_SCALE,
            to_target.y / SENSOR_SCALE,
            velocity.x / SENSOR_SCALE,
            velocity.y / SENSOR_SCALE,
            heading,
            angular_velocity,
        ])
    }
}

/// Throttle and thrust-vector angle of the left (`[0]`) and right (`[1]`) motor.
///
/// Throttle is conceptually in `[0, 1]` but never clamped by the dynamics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotorCommand {
    pub throttle: [f64; 2],
    pub motor_angle: [f64; 2],
}

impl MotorCommand {
    pub const IDLE: Self = Self {
        throttle: [0.0; 2],
        motor_angle: [0.0; 2],
    };

    /// Maps `tanh` outputs to motor commands.
    ///
    /// Outputs 0 and 1 become throttle through `(o + 1) / 2`; if present,
    /// outputs 2 and 3 become deflection through `o * π/4`.
    pub fn from_outputs(outputs: &[f64]) -> Result<Self, ControlError> {
        let [left, right, rest @ ..] = outputs else {
            return Err(ControlError::TooFewOutputs {
                actual: outputs.len(),
            });
        };
        let motor_angle = match rest {
            [left_angle, right_angle, ..] => [left_angle * FRAC_PI_4, right_angle * FRAC_PI_4],
            _ => [0.0; 2],
        };
        Ok(Self {
            throttle: [(left + 1.0) / 2.0, (right + 1.0) / 2.0],
            motor_angle,
        })
    }
}

/// Something that turns sensor readings into motor commands.
pub trait Controller {
    fn command(&mut self, sensors: &Sensors) -> Result<MotorCommand, ControlError>;
}

impl Controller for Network {
    fn command(&mut self, sensors: &Sensors) -> Result<MotorCommand, ControlError> {
        let outputs = self.evaluate(&sensors.0)?;
        MotorCommand::from_outputs(outputs)
    }
}

/// Two on/off motor switches, as driven from a keyboard.
///
/// A pressed side runs its motor at full throttle; thrust is never deflected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualThrottle {
    pub left: bool,
    pub right: bool,
}

impl Controller for ManualThrottle {
    fn command(&mut self, _sensors: &Sensors) -> Result<MotorCommand, ControlError> {
        Ok(MotorCommand {
            throttle: [f64::from(u8::from(self.left)), f64::from(u8::from(self.right))],
            motor_angle: [0.0; 2],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkParams;

    #[test]
    fn test_sensor_layout() {
        let sensors = Sensors::read(
            Vec2::new(250.0, 250.0),
            Vec2::new(2.0, -4.0),
            0.5,
            -0.25,
            Vec2::new(775.0, 752.0),
        );
        assert_eq!(sensors.0, [0.525, 0.502, 0.002, -0.004, 0.5, -0.25]);
    }

    #[test]
    fn test_two_outputs_map_to_throttle_only() {
        let command = MotorCommand::from_outputs(&[-1.0, 0.5]).unwrap();
        assert_eq!(command.throttle, [0.0, 0.75]);
        assert_eq!(command.motor_angle, [0.0, 0.0]);
    }

    #[test]
    fn test_four_outputs_map_to_deflection() {
        let command = MotorCommand::from_outputs(&[1.0, 0.0, 1.0, -0.5]).unwrap();
        assert_eq!(command.throttle, [1.0, 0.5]);
        assert_eq!(command.motor_angle, [FRAC_PI_4, -0.5 * FRAC_PI_4]);
    }

    #[test]
    fn test_too_few_outputs() {
        assert_eq!(
            MotorCommand::from_outputs(&[0.3]),
            Err(ControlError::TooFewOutputs { actual: 1 })
        );
    }

    #[test]
    fn test_zero_network_commands_half_throttle() {
        let mut network = Network::zeroed(default_pilot_topology());
        let command = network.command(&Sensors([0.1; SENSOR_COUNT])).unwrap();
        assert_eq!(command.throttle, [0.5, 0.5]);
        assert_eq!(command.motor_angle, [0.0, 0.0]);
    }

    #[test]
    fn test_network_with_wrong_inputs_is_a_shape_error() {
        let params = NetworkParams {
            topology: Topology::new([5, 2]).unwrap(),
            weights: vec![vec![vec![0.0; 5]; 2]],
            biases: vec![vec![0.0; 2]],
        };
        let mut network = Network::from_params(params).unwrap();
        let err = network.command(&Sensors([0.0; SENSOR_COUNT])).unwrap_err();
        assert!(matches!(err, ControlError::InputShape(_)));
    }

    #[test]
    fn test_manual_throttle() {
        let mut manual = ManualThrottle {
            left: true,
            right: false,
        };
        let command = manual.command(&Sensors([0.0; SENSOR_COUNT])).unwrap();
        assert_eq!(command.throttle, [1.0, 0.0]);
    }
}
