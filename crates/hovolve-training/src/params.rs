use std::{num::NonZero, thread};

use serde::{Deserialize, Serialize};

use hovolve_engine::{
    Course, SENSOR_COUNT, Topology, TrackingParams, VehicleParams, default_pilot_topology,
};

/// Everything a training run needs to know, loadable from a partial JSON file.
///
/// Every field has a default, so a file only has to name what it overrides:
///
/// ```
/// use hovolve_training::params::TrainingParams;
///
/// let params: TrainingParams = serde_json::from_str(r#"{ "generation_size": 50 }"#).unwrap();
/// assert_eq!(params.generation_size, 50);
/// assert_eq!(params.time_step, 0.016);
/// params.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Number of vehicles in every generation
    pub generation_size: usize,
    /// Fixed simulation step in seconds
    pub time_step: f64,
    /// Upper bound on the length of one generation's rollout in seconds
    pub max_generation_duration: f64,
    /// Share of the ranked generation carried over unchanged
    pub elite_fraction: f64,
    /// Share of the ranked generation eligible as parents
    pub breeding_fraction: f64,
    /// Half-width of the uniform noise added to every gene of a child
    pub mutation_rate: f64,
    /// Half-width of the uniform range of initial genes
    pub init_range: f64,
    /// Layer sizes of every pilot network
    pub topology: Topology,
    /// Rollout worker threads; 0 uses the available parallelism
    pub threads: usize,
    pub vehicle: VehicleParams,
    pub tracking: TrackingParams,
    pub course: Course,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            generation_size: 1000,
            time_step: 0.016,
            max_generation_duration: 120.0,
            elite_fraction: 0.1,
            breeding_fraction: 0.5,
            mutation_rate: 0.1,
            init_range: 2.0,
            topology: default_pilot_topology(),
            threads: 0,
            vehicle: VehicleParams::default(),
            tracking: TrackingParams::default(),
            course: Course::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("generation size must be at least 1")]
    EmptyGeneration,
    #[display("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[display("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[display("{name} must be within [0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },
    #[display("pilot network must take {expected} inputs, topology has {actual}")]
    TopologyInputs { expected: usize, actual: usize },
    #[display("pilot network must produce at least 2 outputs, topology has {actual}")]
    TopologyOutputs { actual: usize },
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { name, value })
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation_size == 0 {
            return Err(ConfigError::EmptyGeneration);
        }
        check_positive("time_step", self.time_step)?;
        check_non_negative("max_generation_duration", self.max_generation_duration)?;
        check_fraction("elite_fraction", self.elite_fraction)?;
        check_fraction("breeding_fraction", self.breeding_fraction)?;
        check_non_negative("mutation_rate", self.mutation_rate)?;
        check_non_negative("init_range", self.init_range)?;
        check_positive("vehicle.mass", self.vehicle.mass)?;
        check_positive("vehicle.moment_of_inertia", self.vehicle.moment_of_inertia)?;
        check_positive("vehicle.pixels_per_meter", self.vehicle.pixels_per_meter)?;
        check_non_negative("tracking.capture_radius", self.tracking.capture_radius)?;
        check_non_negative("tracking.dwell_time", self.tracking.dwell_time)?;

        if self.topology.input_count() != SENSOR_COUNT {
            return Err(ConfigError::TopologyInputs {
                expected: SENSOR_COUNT,
                actual: self.topology.input_count(),
            });
        }
        if self.topology.output_count() < 2 {
            return Err(ConfigError::TopologyOutputs {
                actual: self.topology.output_count(),
            });
        }
        Ok(())
    }

    /// Number of vehicles carried over unchanged: `round(elite_fraction × N)`.
    #[must_use]
    pub fn elite_count(&self) -> usize {
        fraction_of(self.elite_fraction, self.generation_size).min(self.generation_size)
    }

    /// Number of top vehicles parents are drawn from: `round(breeding_fraction × N)`, at least 1.
    #[must_use]
    pub fn breeding_pool_size(&self) -> usize {
        fraction_of(self.breeding_fraction, self.generation_size).clamp(1, self.generation_size.max(1))
    }

    /// Number of rollout threads to use.
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        thread::available_parallelism().map_or(1, NonZero::get)
    }

    /// Number of fixed steps in a full-length rollout.
    ///
    /// A ratio within floating-point noise of a whole number is rounded, so
    /// 120 s at 0.016 s gives exactly 7500 ticks.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn rollout_ticks(&self) -> usize {
        let ratio = self.max_generation_duration / self.time_step;
        if !ratio.is_finite() || ratio <= 0.0 {
            return 0;
        }
        let nearest = ratio.round();
        if (ratio - nearest).abs() < 1e-9 {
            nearest as usize
        } else {
            ratio.ceil() as usize
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn fraction_of(fraction: f64, count: usize) -> usize {
    (fraction * count as f64).round().max(0.0) as usize
}
