use chrono::{DateTime, Utc};
use hovolve_engine::{Course, FlightMetrics, RigidBody, Vehicle};
use serde::{Deserialize, Serialize};

/// Whether a recorded flight was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    Counted,
    Display,
}

/// Recorded trajectories of one or more vehicles flying the same course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightTrace {
    /// Timestamp when the trace was recorded (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    pub mode: TraceMode,
    /// Seconds per tick
    pub time_step: f64,
    pub course: Course,
    pub vehicles: Vec<VehicleTrace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleTrace {
    pub id: u64,
    pub samples: Vec<TraceSample>,
    pub metrics: FlightMetrics,
    pub reached: u32,
}

/// State of a vehicle at the end of one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSample {
    pub tick: usize,
    pub body: RigidBody,
    pub throttle: [f64; 2],
    pub motor_angle: [f64; 2],
    pub target_index: usize,
    pub active: bool,
}

impl TraceSample {
    pub fn new<C>(tick: usize, vehicle: &Vehicle<C>) -> Self {
        let command = vehicle.command();
        Self {
            tick,
            body: *vehicle.body(),
            throttle: command.throttle,
            motor_angle: command.motor_angle,
            target_index: vehicle.progress().target_index(),
            active: vehicle.is_active(),
        }
    }
}

/// Collects every `every`-th tick of a vehicle's flight.
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    every: usize,
    trace: VehicleTrace,
}

impl TraceRecorder {
    /// Starts a trace with the vehicle's state before its first tick.
    pub fn start<C>(vehicle: &Vehicle<C>, every: usize) -> Self {
        assert!(every > 0, "trace interval must be at least one tick");
        Self {
            every,
            trace: VehicleTrace {
                id: vehicle.id(),
                samples: vec![TraceSample::new(0, vehicle)],
                metrics: *vehicle.metrics(),
                reached: vehicle.progress().reached(),
            },
        }
    }

    /// Records the state after `tick` ticks if it falls on the interval or the vehicle just stopped.
    pub fn record<C>(&mut self, tick: usize, vehicle: &Vehicle<C>) {
        let just_stopped = !vehicle.is_active()
            && self.trace.samples.last().is_some_and(|sample| sample.active);
        if tick % self.every == 0 || just_stopped {
            self.trace.samples.push(TraceSample::new(tick, vehicle));
        }
    }

    pub fn finish<C>(mut self, tick: usize, vehicle: &Vehicle<C>) -> VehicleTrace {
        if self.trace.samples.last().is_none_or(|sample| sample.tick != tick) {
            self.trace.samples.push(TraceSample::new(tick, vehicle));
        }
        self.trace.metrics = *vehicle.metrics();
        self.trace.reached = vehicle.progress().reached();
        self.trace
    }
}
