//! Genetic algorithm evolving pilot networks.
//!
//! A [`Population`] is a fixed-size set of vehicles that all fly the same
//! [`Course`] at the same time. Each generation goes through one cycle:
//!
//! # Algorithm Overview
//!
//! 1. **Rollout** - Every active vehicle is stepped with the fixed time step
//!    until all vehicles have stopped or the maximum generation duration
//!    elapsed
//! 2. **Ranking** - The whole generation is stably sorted with
//!    [`compare_fitness`]: waypoints reached (descending), then target penalty
//!    (ascending), then active time (descending)
//! 3. **Elitism** - The top `elite_count` vehicles are carried over with the
//!    same identifier and network and a full state reset
//! 4. **Breeding** - Every remaining slot is filled by a child of two parents
//!    drawn independently and uniformly from the top `breeding_pool` vehicles.
//!    The child's network is a gene-wise uniform crossover followed by uniform
//!    mutation
//!
//! # Key Components
//!
//! - [`Population`] - The vehicles of one generation and their rollout state
//! - [`PopulationEvolver`] - Elitism, selection and mutation parameters
//! - [`GenerationStats`] - Summary of a ranked generation
//!
//! # Parallelization
//!
//! Vehicles never interact, so [`Population::rollout`] splits the vehicles
//! into contiguous chunks and flies every chunk on its own scoped thread. The
//! end of the scope is the barrier before ranking. Results do not depend on the
//! number of threads.
//!
//! # Example
//!
//! ```
//! use hovolve_training::{genetic::{Population, PopulationEvolver}, params::TrainingParams};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64Mcg;
//!
//! let params = TrainingParams {
//!     generation_size: 20,
//!     max_generation_duration: 1.0,
//!     ..TrainingParams::default()
//! };
//! let mut rng = Pcg64Mcg::seed_from_u64(0);
//! let evolver = PopulationEvolver::from_params(&params);
//! let mut population = Population::random(params, &mut rng).unwrap();
//!
//! for _ in 0..3 {
//!     population.rollout();
//!     population.rank();
//!     population = evolver.evolve(&population, &mut rng);
//! }
//! assert_eq!(population.generation(), 3);
//! assert_eq!(population.vehicles().len(), 20);
//! ```
//!
//! # Design Decisions
//!
//! ## Counted Penalty Sentinel
//!
//! A vehicle that leaves the world box or faults is given the penalty
//! [`PENALTY_SENTINEL`](hovolve_engine::PENALTY_SENTINEL). Among vehicles that
//! reached the same number of waypoints it therefore ranks below every vehicle
//! that kept flying, and retired vehicles fall through to active time.
//!
//! ## Explicit Active Subset
//!
//! The population keeps the indices of its active vehicles, recomputed with a
//! stable filter after every tick, so stepping cost follows the number of
//! vehicles still flying.

use std::{cmp::Ordering, thread};

use rand::{Rng, seq::IndexedRandom as _};

use hovolve_engine::{
    Course, FlightMetrics, Network, StepMode, TrackingParams, Vehicle, WaypointProgress,
};
use hovolve_stats::descriptive::DescriptiveStats;

use crate::{
    params::{ConfigError, TrainingParams},
    snapshot::PopulationSnapshot,
};

/// Ranking order of two vehicles, best first.
///
/// More waypoints reached ranks higher; ties are broken by the lower target
/// penalty, then by the longer active time. This is a strict weak order, so a
/// stable sort keeps equally fit vehicles in their original order.
pub fn compare_fitness<C>(a: &Vehicle<C>, b: &Vehicle<C>) -> Ordering {
    compare_records((a.progress(), a.metrics()), (b.progress(), b.metrics()))
}

pub(crate) fn compare_records(
    (a_progress, a_metrics): (&WaypointProgress, &FlightMetrics),
    (b_progress, b_metrics): (&WaypointProgress, &FlightMetrics),
) -> Ordering {
    b_progress
        .reached()
        .cmp(&a_progress.reached())
        .then_with(|| a_metrics.target_penalty.total_cmp(&b_metrics.target_penalty))
        .then_with(|| b_metrics.active_time.total_cmp(&a_metrics.active_time))
}

/// The vehicles of one generation.
#[derive(Debug, Clone)]
pub struct Population {
    params: TrainingParams,
    vehicles: Vec<Vehicle>,
    generation: usize,
    tick: usize,
    active: Vec<usize>,
    ranked: bool,
    next_id: u64,
}

impl Population {
    /// Creates generation 0 with random networks.
    ///
    /// Vehicles get identifiers `0..generation_size` and every gene is uniform
    /// in `[-init_range, init_range]`.
    pub fn random<R>(params: TrainingParams, rng: &mut R) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        params.validate()?;
        let vehicles = (0..params.generation_size as u64)
            .map(|id| {
                let network = Network::random(params.topology.clone(), params.init_range, rng);
                Vehicle::new(network, params.vehicle.clone()).with_id(id)
            })
            .collect();
        Ok(Self::from_vehicles(params, vehicles, 0))
    }

    fn from_vehicles(params: TrainingParams, vehicles: Vec<Vehicle>, generation: usize) -> Self {
        let next_id = vehicles.iter().map(|v| v.id() + 1).max().unwrap_or(0);
        let mut population = Self {
            params,
            vehicles,
            generation,
            tick: 0,
            active: vec![],
            ranked: false,
            next_id,
        };
        population.refresh_active();
        population
    }

    #[must_use]
    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.params.course
    }

    #[must_use]
    pub fn tracking(&self) -> &TrackingParams {
        &self.params.tracking
    }

    #[must_use]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Number of ticks flown so far in this generation.
    #[must_use]
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Indices of the vehicles still flying, in population order.
    #[must_use]
    pub fn active_indices(&self) -> &[usize] {
        &self.active
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.ranked
    }

    /// Whether the rollout of this generation is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.active.is_empty() || self.tick >= self.params.rollout_ticks()
    }

    fn refresh_active(&mut self) {
        self.active.clear();
        self.active.extend(
            self.vehicles
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_active())
                .map(|(index, _)| index),
        );
    }

    /// Advances every active vehicle by one tick on the calling thread.
    ///
    /// Returns the number of vehicles still active. Does nothing once the
    /// rollout is finished.
    pub fn step(&mut self) -> usize {
        if self.is_finished() {
            return self.active.len();
        }
        let Self {
            params,
            vehicles,
            active,
            ..
        } = self;
        for &index in active.iter() {
            vehicles[index].step(
                &params.course,
                &params.tracking,
                params.time_step,
                StepMode::Counted,
            );
        }
        active.retain(|&index| vehicles[index].is_active());
        self.tick += 1;
        self.ranked = false;
        self.active.len()
    }

    /// Flies the rest of this generation's rollout across worker threads.
    ///
    /// Returns the number of ticks flown by the longest-lived vehicle.
    pub fn rollout(&mut self) -> usize {
        let remaining = self.params.rollout_ticks().saturating_sub(self.tick);
        let chunk_size = self
            .vehicles
            .len()
            .div_ceil(self.params.worker_threads())
            .max(1);

        let course = &self.params.course;
        let tracking = &self.params.tracking;
        let dt = self.params.time_step;
        let flown = thread::scope(|s| {
            let workers = self
                .vehicles
                .chunks_mut(chunk_size)
                .map(|chunk| s.spawn(move || fly_chunk(chunk, course, tracking, dt, remaining)))
                .collect::<Vec<_>>();
            workers
                .into_iter()
                .map(|worker| worker.join().expect("rollout worker panicked"))
                .max()
                .unwrap_or(0)
        });

        self.tick += flown;
        self.ranked = false;
        self.refresh_active();
        log::debug!(
            "generation {} rollout ended after {} ticks with {} vehicle(s) still active",
            self.generation,
            self.tick,
            self.active.len()
        );
        flown
    }

    /// Stably sorts the generation best first.
    pub fn rank(&mut self) {
        self.vehicles.sort_by(compare_fitness);
        self.ranked = true;
        self.refresh_active();
    }

    /// Returns the fittest vehicle, ranked or not.
    #[must_use]
    pub fn best(&self) -> Option<&Vehicle> {
        if self.ranked {
            self.vehicles.first()
        } else {
            self.vehicles.iter().min_by(|a, b| compare_fitness(a, b))
        }
    }

    /// Summarizes a ranked generation.
    ///
    /// # Panics
    ///
    /// Panics if the population has not been ranked.
    #[must_use]
    pub fn compute_generation_stats(&self) -> GenerationStats {
        assert!(self.ranked, "generation stats require a ranked population");
        let summary = |index: usize| VehicleSummary::new(&self.vehicles[index]);
        let len = self.vehicles.len();
        GenerationStats {
            generation: self.generation,
            population: len,
            survivors: self.active.len(),
            ticks: self.tick,
            best: summary(0),
            runner_up: (len > 1).then(|| summary(1)),
            worst: summary(len - 1),
            active_time: DescriptiveStats::new(self.vehicles.iter().map(|v| v.metrics().active_time))
                .expect("population is never empty"),
            reached: DescriptiveStats::new(
                self.vehicles
                    .iter()
                    .map(|v| f64::from(v.progress().reached())),
            )
            .expect("population is never empty"),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot::from_population(self)
    }
}

fn fly_chunk(
    vehicles: &mut [Vehicle],
    course: &Course,
    tracking: &TrackingParams,
    dt: f64,
    ticks: usize,
) -> usize {
    let mut active = (0..vehicles.len())
        .filter(|&index| vehicles[index].is_active())
        .collect::<Vec<_>>();
    let mut flown = 0;
    while flown < ticks && !active.is_empty() {
        for &index in &active {
            vehicles[index].step(course, tracking, dt, StepMode::Counted);
        }
        active.retain(|&index| vehicles[index].is_active());
        flown += 1;
    }
    flown
}

/// Fitness record of one vehicle, as reported per generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSummary {
    pub id: u64,
    pub active: bool,
    pub reached: u32,
    pub target_penalty: f64,
    pub active_time: f64,
}

impl VehicleSummary {
    #[must_use]
    pub fn new<C>(vehicle: &Vehicle<C>) -> Self {
        Self {
            id: vehicle.id(),
            active: vehicle.is_active(),
            reached: vehicle.progress().reached(),
            target_penalty: vehicle.metrics().target_penalty,
            active_time: vehicle.metrics().active_time,
        }
    }
}

/// Summary of a ranked generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub population: usize,
    /// Vehicles still active when the rollout ended
    pub survivors: usize,
    /// Ticks flown before the rollout ended
    pub ticks: usize,
    pub best: VehicleSummary,
    pub runner_up: Option<VehicleSummary>,
    pub worst: VehicleSummary,
    pub active_time: DescriptiveStats,
    pub reached: DescriptiveStats,
}

/// Controls how a ranked generation becomes the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationEvolver {
    /// Number of top vehicles carried over unchanged (elitism)
    pub elite_count: usize,
    /// Number of top vehicles parents are drawn from
    pub breeding_pool: usize,
    /// Half-width of the uniform noise added to every child gene
    pub mutation_rate: f64,
}

impl PopulationEvolver {
    #[must_use]
    pub fn from_params(params: &TrainingParams) -> Self {
        Self {
            elite_count: params.elite_count(),
            breeding_pool: params.breeding_pool_size(),
            mutation_rate: params.mutation_rate,
        }
    }

    /// Breeds the next generation from a ranked one.
    ///
    /// 1. Copies the top `elite_count` vehicles and resets them
    /// 2. Fills the remaining slots with mutated children of parents drawn
    ///    from the top `breeding_pool` vehicles, each with a new identifier
    ///
    /// The returned population has the same size and course, an incremented
    /// generation counter and every vehicle active.
    ///
    /// # Panics
    ///
    /// Panics if `population` is not ranked.
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        assert!(population.ranked, "only a ranked population can evolve");
        assert!(
            population
                .vehicles
                .is_sorted_by(|a, b| compare_fitness(a, b).is_le())
        );

        let size = population.vehicles.len();
        let mut next_vehicles = Vec::with_capacity(size);

        // elite selection
        next_vehicles.extend(
            population.vehicles[..self.elite_count.min(size)]
                .iter()
                .map(|vehicle| {
                    let mut elite = vehicle.clone();
                    elite.reset();
                    elite
                }),
        );

        // breed the rest
        let pool = &population.vehicles[..self.breeding_pool.clamp(1, size.max(1))];
        let mut next_id = population.next_id;
        while next_vehicles.len() < size {
            let p1 = pool.choose(rng).expect("breeding pool is never empty");
            let p2 = pool.choose(rng).expect("breeding pool is never empty");
            let mut child = p1.mate(p2, rng);
            child.controller_mut().mutate(self.mutation_rate, rng);
            next_vehicles.push(child.with_id(next_id));
            next_id += 1;
        }

        let mut next = Population::from_vehicles(
            population.params.clone(),
            next_vehicles,
            population.generation + 1,
        );
        next.next_id = next_id;
        next
    }
}
