use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use rand::Rng;

use crate::{
    genetic::{GenerationStats, Population, PopulationEvolver, VehicleSummary},
    params::{ConfigError, TrainingParams},
    snapshot::PopulationSnapshot,
};

/// Where a [`Trainer`] is in its generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum TrainerState {
    #[display("idle")]
    Idle,
    #[display("running generation")]
    RunningGeneration,
    #[display("ranking")]
    Ranking,
    #[display("breeding")]
    Breeding,
}

/// Shared flag asking a trainer to stop at the next generation boundary.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Drives a [`Population`] through rollout, ranking and breeding.
///
/// The trainer owns its random number generator, so a seeded generator makes
/// a whole training run reproducible.
#[derive(Debug)]
pub struct Trainer<R> {
    population: Population,
    evolver: PopulationEvolver,
    state: TrainerState,
    stop: StopSignal,
    rng: R,
}

impl<R> Trainer<R>
where
    R: Rng,
{
    pub fn new(params: TrainingParams, mut rng: R) -> Result<Self, ConfigError> {
        let evolver = PopulationEvolver::from_params(&params);
        let population = Population::random(params, &mut rng)?;
        Ok(Self {
            population,
            evolver,
            state: TrainerState::Idle,
            stop: StopSignal::default(),
            rng,
        })
    }

    #[must_use]
    pub fn state(&self) -> TrainerState {
        self.state
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> PopulationSnapshot {
        self.population.snapshot()
    }

    fn set_state(&mut self, state: TrainerState) {
        if self.state != state {
            log::debug!("trainer: {} -> {state}", self.state);
            self.state = state;
        }
    }

    /// Runs one full generation and returns its summary.
    ///
    /// A ranked population is bred first, so consecutive calls walk through
    /// `Breeding`, `RunningGeneration` and `Ranking` in turn. The population
    /// is left ranked.
    pub fn run_generation(&mut self) -> GenerationStats {
        if self.population.is_ranked() {
            self.set_state(TrainerState::Breeding);
            self.population = self.evolver.evolve(&self.population, &mut self.rng);
        }

        self.set_state(TrainerState::RunningGeneration);
        self.population.rollout();

        self.set_state(TrainerState::Ranking);
        self.population.rank();

        let stats = self.population.compute_generation_stats();
        log_generation(&stats);
        stats
    }

    /// Runs generations until a stop is requested, then returns to `Idle`.
    ///
    /// `on_generation_complete` is called once per finished generation. The
    /// stop signal is checked after each callback, so a stop requested from
    /// inside the callback ends the run right there. The returned snapshot is
    /// the last ranked generation.
    pub fn train<F>(&mut self, mut on_generation_complete: F) -> PopulationSnapshot
    where
        F: FnMut(&GenerationStats),
    {
        log::info!(
            "training started at generation {}",
            self.population.generation()
        );
        loop {
            let stats = self.run_generation();
            on_generation_complete(&stats);
            if self.stop.take() {
                break;
            }
        }
        self.set_state(TrainerState::Idle);
        log::info!(
            "training stopped after generation {}",
            self.population.generation()
        );
        if let Some(best) = self.population.best() {
            log::info!(
                "best pilot: id {} reached {} waypoint(s)",
                best.id(),
                best.progress().reached()
            );
        }
        self.snapshot()
    }
}

fn log_generation(stats: &GenerationStats) {
    log::info!(
        "generation {}: best reached {} waypoint(s), penalty {:.1}, active {:.2}s; {}/{} still flying after {} ticks",
        stats.generation,
        stats.best.reached,
        stats.best.target_penalty,
        stats.best.active_time,
        stats.survivors,
        stats.population,
        stats.ticks,
    );
    let log_vehicle = |rank: &str, v: &VehicleSummary| {
        log::debug!(
            "  {rank}: id {} active {} reached {} penalty {:.1} active {:.2}s",
            v.id,
            v.active,
            v.reached,
            v.target_penalty,
            v.active_time
        );
    };
    log_vehicle("best", &stats.best);
    if let Some(runner_up) = &stats.runner_up {
        log_vehicle("second", runner_up);
    }
    log_vehicle("worst", &stats.worst);
}
