use hovolve_engine::{Course, StepMode, TrackingParams, Vehicle, VehicleParams};

use crate::{genetic::Population, snapshot::PopulationSnapshot};

/// Display-only replay of the best pilots.
///
/// Vehicles start from their start position with fitness counters preserved
/// and are stepped in [`StepMode::Display`], so replaying never changes how a
/// pilot ranks.
#[derive(Debug, Clone)]
pub struct Showcase {
    course: Course,
    tracking: TrackingParams,
    time_step: f64,
    vehicles: Vec<Vehicle>,
    tick: usize,
}

impl Showcase {
    /// Replays the top `count` vehicles of a ranked population.
    ///
    /// # Panics
    ///
    /// Panics if the population has not been ranked.
    #[must_use]
    pub fn from_population(population: &Population, count: usize) -> Self {
        assert!(population.is_ranked(), "showcase requires a ranked population");
        let vehicles = population
            .vehicles()
            .iter()
            .take(count)
            .map(|vehicle| {
                let mut vehicle = vehicle.clone();
                vehicle.reset_flight();
                vehicle
            })
            .collect();
        Self::new(
            population.course().clone(),
            *population.tracking(),
            population.params().time_step,
            vehicles,
        )
    }

    /// Replays the top `count` vehicles of a saved generation.
    #[must_use]
    pub fn from_snapshot(
        snapshot: &PopulationSnapshot,
        count: usize,
        vehicle_params: &VehicleParams,
        tracking: TrackingParams,
        time_step: f64,
    ) -> Self {
        let vehicles = snapshot
            .top(count)
            .into_iter()
            .map(|record| record.clone().into_vehicle(vehicle_params.clone()))
            .collect();
        Self::new(snapshot.course.clone(), tracking, time_step, vehicles)
    }

    fn new(course: Course, tracking: TrackingParams, time_step: f64, vehicles: Vec<Vehicle>) -> Self {
        Self {
            course,
            tracking,
            time_step,
            vehicles,
            tick: 0,
        }
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    #[must_use]
    pub fn tick(&self) -> usize {
        self.tick
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.is_active()).count()
    }

    /// Advances every vehicle by one display step and returns how many are still flying.
    pub fn step(&mut self) -> usize {
        for vehicle in &mut self.vehicles {
            vehicle.step(
                &self.course,
                &self.tracking,
                self.time_step,
                StepMode::Display,
            );
        }
        self.tick += 1;
        self.active_count()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::params::TrainingParams;

    fn ranked_population() -> Population {
        let params = TrainingParams {
            generation_size: 8,
            max_generation_duration: 1.0,
            threads: 1,
            ..TrainingParams::default()
        };
        let mut rng = Pcg64Mcg::seed_from_u64(31);
        let mut population = Population::random(params, &mut rng).unwrap();
        population.rollout();
        population.rank();
        population
    }

    #[test]
    fn test_showcase_preserves_counters() {
        let population = ranked_population();
        let mut showcase = Showcase::from_population(&population, 3);
        assert_eq!(showcase.vehicles().len(), 3);
        assert_eq!(showcase.active_count(), 3);
        for (shown, ranked) in showcase.vehicles().iter().zip(population.vehicles()) {
            assert_eq!(shown.id(), ranked.id());
            assert_eq!(shown.position(), shown.params().start_position);
        }

        for _ in 0..500 {
            showcase.step();
        }
        assert_eq!(showcase.tick(), 500);
        for (shown, ranked) in showcase.vehicles().iter().zip(population.vehicles()) {
            assert_eq!(shown.metrics(), ranked.metrics());
        }
    }

    #[test]
    fn test_showcase_from_snapshot_matches_population() {
        let population = ranked_population();
        let snapshot = population.snapshot();
        let params = population.params();
        let mut from_snapshot = Showcase::from_snapshot(
            &snapshot,
            2,
            &params.vehicle,
            params.tracking,
            params.time_step,
        );
        let mut from_population = Showcase::from_population(&population, 2);
        for _ in 0..100 {
            from_snapshot.step();
            from_population.step();
        }
        for (a, b) in from_snapshot.vehicles().iter().zip(from_population.vehicles()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.body(), b.body());
        }
    }
}
