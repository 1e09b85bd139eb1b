use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use hovolve_training::{
    genetic::GenerationStats,
    host::{TrainerEvent, TrainingHandle},
    trainer::Trainer,
};
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;

use crate::{
    schema::pilot_model::PilotModel,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training parameters JSON file; missing fields use the defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations to run
    #[arg(long, default_value_t = 50)]
    generations: usize,
    /// Vehicles per generation (overrides the config)
    #[arg(long)]
    population: Option<usize>,
    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Rollout worker threads, 0 for all cores (overrides the config)
    #[arg(long)]
    threads: Option<usize>,
    /// Name stored in the saved model
    #[arg(long, default_value = "pilot")]
    name: String,
    /// Output file path for the best pilot
    #[arg(long)]
    output: Option<PathBuf>,
    /// Also save the final ranked population to this file
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.generations > 0, "--generations must be at least 1");

    let mut params = util::read_params(arg.config.as_deref())?;
    if let Some(population) = arg.population {
        params.generation_size = population;
    }
    if let Some(threads) = arg.threads {
        params.threads = threads;
    }

    let rng = match arg.seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(seed),
        None => Pcg64Mcg::from_rng(&mut rand::rng()),
    };
    eprintln!(
        "Training {} generation(s) of {} vehicles on {} thread(s)",
        arg.generations,
        params.generation_size,
        params.worker_threads()
    );
    let trainer = Trainer::new(params, rng).context("Invalid training parameters")?;

    let mut handle = TrainingHandle::spawn(trainer);
    handle.start_training_for(arg.generations);
    let snapshot = loop {
        match handle.recv_event() {
            Some(TrainerEvent::GenerationComplete(stats)) => print_generation(&stats),
            Some(TrainerEvent::Stopped(snapshot)) => break snapshot,
            None => anyhow::bail!("Training thread exited unexpectedly"),
        }
    };
    handle.shutdown();

    let best = snapshot
        .best()
        .context("Final population has no vehicles")?;
    let model = PilotModel {
        name: arg.name.clone(),
        trained_at: Utc::now(),
        generation: snapshot.generation,
        vehicle_id: best.id,
        reached: best.progress.reached(),
        target_penalty: best.metrics.target_penalty,
        active_time: best.metrics.active_time,
        pilot: best.network.clone(),
    };
    Output::save_json(&model, arg.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Generation: {}", model.generation);
    eprintln!("  Waypoints reached: {}", model.reached);
    eprintln!("  Target penalty: {:.1}", model.target_penalty);
    eprintln!("  Active time: {:.2}s", model.active_time);

    if let Some(path) = &arg.snapshot {
        Output::save_json(&snapshot, Some(path.clone()))?;
        eprintln!("Population saved to {}", path.display());
    }

    Ok(())
}

fn print_generation(stats: &GenerationStats) {
    eprintln!("Generation #{}:", stats.generation);
    eprintln!(
        "  Survivors:  {}/{} after {} ticks",
        stats.survivors, stats.population, stats.ticks
    );
    eprintln!(
        "  Reached:    min {:.0}  mean {:.2}  max {:.0}",
        stats.reached.min, stats.reached.mean, stats.reached.max
    );
    eprintln!(
        "  Active (s): min {:.2}  mean {:.2}  max {:.2}",
        stats.active_time.min, stats.active_time.mean, stats.active_time.max
    );
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use crate::command::{CommandArgs, Mode};

    #[test]
    fn test_train_defaults() {
        let args = CommandArgs::try_parse_from(["hovolve", "train", "--seed", "3"]).unwrap();
        let Mode::Train(arg) = args.mode else {
            panic!("expected train mode");
        };
        assert_eq!(arg.generations, 50);
        assert_eq!(arg.seed, Some(3));
        assert_eq!(arg.population, None);
        assert_eq!(arg.name, "pilot");
    }
}
