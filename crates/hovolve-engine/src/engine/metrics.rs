use serde::{Deserialize, Serialize};

/// Penalty assigned to a vehicle that left the world box or faulted.
///
/// Larger than any penalty a flying vehicle can accumulate, so retired
/// vehicles always rank below vehicles that kept flying.
pub const PENALTY_SENTINEL: f64 = f64::MAX;

/// Fitness accumulators of one flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightMetrics {
    /// Seconds spent flying.
    pub active_time: f64,
    /// Integral of speed over time.
    pub distance_traveled: f64,
    /// Integral of distance-to-target over time.
    pub target_penalty: f64,
}

impl FlightMetrics {
    pub fn accumulate(&mut self, speed: f64, distance_to_target: f64, dt: f64) {
        self.active_time += dt;
        self.distance_traveled += speed * dt;
        self.target_penalty += distance_to_target * dt;
    }

    pub fn apply_sentinel(&mut self) {
        self.target_penalty = PENALTY_SENTINEL;
    }

    #[must_use]
    pub fn has_sentinel(&self) -> bool {
        self.target_penalty == PENALTY_SENTINEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_integrates_over_time() {
        let mut metrics = FlightMetrics::default();
        metrics.accumulate(2.0, 100.0, 0.5);
        metrics.accumulate(4.0, 50.0, 0.5);
        assert_eq!(metrics.active_time, 1.0);
        assert_eq!(metrics.distance_traveled, 3.0);
        assert_eq!(metrics.target_penalty, 75.0);
        assert!(!metrics.has_sentinel());
    }

    #[test]
    fn test_sentinel_survives_serialization() {
        let mut metrics = FlightMetrics::default();
        metrics.apply_sentinel();
        let json = serde_json::to_string(&metrics).unwrap();
        let back: FlightMetrics = serde_json::from_str(&json).unwrap();
        assert!(back.has_sentinel());
    }
}
