//! Value types shared by the flight engine and the training system.
//!
//! - [`Vec2`] - 2D vector used for positions, velocities and forces
//! - [`Topology`] - Validated layer sizes of a feedforward network
//! - [`Network`] - Fixed-topology feedforward controller with its genetic operators

pub use self::{network::*, topology::*, vec2::*};

mod network;
mod topology;
mod vec2;
