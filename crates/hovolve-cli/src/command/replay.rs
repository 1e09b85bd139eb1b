use std::path::PathBuf;

use chrono::Utc;
use hovolve_training::{showcase::Showcase, snapshot::PopulationSnapshot};

use crate::{
    schema::trace::{FlightTrace, TraceMode, TraceRecorder},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Population snapshot JSON file written by `train --snapshot`
    snapshot: PathBuf,
    /// Training parameters JSON file for the physics and time step
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of top pilots to replay
    #[arg(long, default_value_t = 3)]
    top: usize,
    /// Replay length in seconds (defaults to one generation)
    #[arg(long)]
    duration: Option<f64>,
    /// Ticks between trace samples
    #[arg(long, default_value_t = 10)]
    trace_every: usize,
    /// Output file path for the trace
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.top > 0, "--top must be at least 1");
    anyhow::ensure!(arg.trace_every > 0, "--trace-every must be at least 1");
    let params = util::read_params(arg.config.as_deref())?;
    let snapshot: PopulationSnapshot = util::read_json_file("population snapshot", &arg.snapshot)?;
    let ticks = util::flight_ticks(&params, arg.duration)?;

    let mut showcase = Showcase::from_snapshot(
        &snapshot,
        arg.top,
        &params.vehicle,
        params.tracking,
        params.time_step,
    );
    eprintln!(
        "Replaying {} pilot(s) of generation {}",
        showcase.vehicles().len(),
        snapshot.generation
    );
    let reached_before = showcase
        .vehicles()
        .iter()
        .map(|v| v.progress().reached())
        .collect::<Vec<_>>();
    let mut recorders = showcase
        .vehicles()
        .iter()
        .map(|v| TraceRecorder::start(v, arg.trace_every))
        .collect::<Vec<_>>();

    while showcase.tick() < ticks && showcase.active_count() > 0 {
        showcase.step();
        for (recorder, vehicle) in recorders.iter_mut().zip(showcase.vehicles()) {
            recorder.record(showcase.tick(), vehicle);
        }
    }

    for (vehicle, before) in showcase.vehicles().iter().zip(&reached_before) {
        eprintln!(
            "  #{:<6} reached {} more waypoint(s), {}",
            vehicle.id(),
            vehicle.progress().reached() - before,
            if vehicle.is_active() {
                "still flying"
            } else {
                "stopped"
            }
        );
    }

    let trace = FlightTrace {
        recorded_at: Utc::now(),
        mode: TraceMode::Display,
        time_step: params.time_step,
        course: showcase.course().clone(),
        vehicles: recorders
            .into_iter()
            .zip(showcase.vehicles())
            .map(|(recorder, vehicle)| recorder.finish(showcase.tick(), vehicle))
            .collect(),
    };
    Output::save_json(&trace, arg.output.clone())?;

    Ok(())
}
