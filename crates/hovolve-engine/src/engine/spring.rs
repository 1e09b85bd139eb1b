use serde::{Deserialize, Serialize};

use crate::{RigidBody, Vec2};

/// Vertical damped spring holding a vehicle above a fixed anchor.
///
/// Used as a test rig for controllers: the vehicle can rotate and thrust
/// freely while the spring pulls it back toward `anchor.y + rest_length`.
/// The spring only acts along `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub anchor: Vec2,
    pub rest_length: f64,
    /// N per px of extension
    pub stiffness: f64,
    /// N per m/s
    pub damping: f64,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            anchor: Vec2::new(250.0, 0.0),
            rest_length: 200.0,
            stiffness: 1.0,
            damping: 3.0,
        }
    }
}

impl Spring {
    /// Position of a body sitting on the unstretched spring.
    #[must_use]
    pub fn rest_position(&self) -> Vec2 {
        Vec2::new(self.anchor.x, self.anchor.y + self.rest_length)
    }

    #[must_use]
    pub fn force(&self, body: &RigidBody) -> Vec2 {
        let extension = body.position.y - self.rest_position().y;
        Vec2::new(
            0.0,
            -self.stiffness * extension - self.damping * body.velocity.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_force_at_rest() {
        let spring = Spring::default();
        let body = RigidBody::at_rest(spring.rest_position());
        assert_eq!(spring.force(&body), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_pulls_back_toward_rest() {
        let spring = Spring::default();
        let stretched = RigidBody::at_rest(Vec2::new(250.0, 210.0));
        let compressed = RigidBody::at_rest(Vec2::new(250.0, 190.0));
        assert_eq!(spring.force(&stretched).y, -10.0);
        assert_eq!(spring.force(&compressed).y, 10.0);
    }

    #[test]
    fn test_damping_opposes_velocity() {
        let spring = Spring::default();
        let mut body = RigidBody::at_rest(spring.rest_position());
        body.velocity = Vec2::new(5.0, 2.0);
        assert_eq!(spring.force(&body), Vec2::new(0.0, -6.0));
    }
}
