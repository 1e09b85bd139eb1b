//! Flight engine for evolved drone pilots.
//!
//! This crate holds everything a single pilot needs to fly, independent of any
//! training loop:
//!
//! - [`core`] - Plain value types: [`Vec2`], the validated network [`Topology`]
//!   and the feedforward [`Network`] with its genetic operators
//! - [`engine`] - The two-motor [`Vehicle`], its rigid-body integration,
//!   controllers, waypoint tracking and the optional spring tether
//!
//! # Example
//!
//! ```
//! use hovolve_engine::{Course, ManualThrottle, StepMode, TrackingParams, Vehicle, VehicleParams};
//!
//! let course = Course::default();
//! let tracking = TrackingParams::default();
//! let mut vehicle = Vehicle::new(ManualThrottle { left: true, right: true }, VehicleParams::default());
//!
//! for _ in 0..60 {
//!     vehicle.step(&course, &tracking, 0.016, StepMode::Counted);
//! }
//! assert!(vehicle.is_active());
//! assert!(vehicle.metrics().active_time > 0.9);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("network expects {expected} inputs but received {actual}")]
pub struct InputShapeError {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TopologyError {
    #[display("topology needs an input and an output layer, got {layers} layer(s)")]
    TooFewLayers { layers: usize },
    #[display("layer {index} has no nodes")]
    EmptyLayer { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkParamsError {
    #[display("expected parameters for {expected} layers, got {actual}")]
    LayerCount { expected: usize, actual: usize },
    #[display("layer {layer}: expected {expected} weight rows, got {actual}")]
    RowCount {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[display("layer {layer}, node {node}: expected {expected} weights, got {actual}")]
    RowWidth {
        layer: usize,
        node: usize,
        expected: usize,
        actual: usize,
    },
    #[display("layer {layer}: expected {expected} biases, got {actual}")]
    BiasCount {
        layer: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum ControlError {
    #[display("{_0}")]
    #[from]
    InputShape(InputShapeError),
    #[display("controller produced {actual} outputs, at least 2 are required")]
    TooFewOutputs { actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("a course needs at least one target")]
pub struct EmptyCourseError;
