use std::path::PathBuf;

use chrono::Utc;
use hovolve_engine::{SENSOR_COUNT, StepMode, Vehicle};

use crate::{
    schema::trace::{FlightTrace, TraceMode, TraceRecorder},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FlyArg {
    /// Pilot model JSON file written by `train`
    model: PathBuf,
    /// Training parameters JSON file for the course and physics
    #[arg(long)]
    config: Option<PathBuf>,
    /// Flight length in seconds (defaults to one generation)
    #[arg(long)]
    duration: Option<f64>,
    /// Write a JSON trajectory trace to this file
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Ticks between trace samples
    #[arg(long, default_value_t = 10)]
    trace_every: usize,
}

pub(crate) fn run(arg: &FlyArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.trace_every > 0, "--trace-every must be at least 1");
    let params = util::read_params(arg.config.as_deref())?;
    let model = util::read_pilot_model_file(&arg.model)?;
    let inputs = model.pilot.topology().input_count();
    anyhow::ensure!(
        inputs == SENSOR_COUNT,
        "Pilot {} takes {inputs} inputs, but vehicles provide {SENSOR_COUNT}",
        model.name
    );
    let ticks = util::flight_ticks(&params, arg.duration)?;

    let mut vehicle = Vehicle::new(model.pilot, params.vehicle.clone()).with_id(model.vehicle_id);
    let mut recorder = TraceRecorder::start(&vehicle, arg.trace_every);
    let mut tick = 0;
    while tick < ticks && vehicle.is_active() {
        let outcome = vehicle.step(
            &params.course,
            &params.tracking,
            params.time_step,
            StepMode::Counted,
        );
        tick += 1;
        recorder.record(tick, &vehicle);
        if !outcome.is_flying() {
            log::info!("flight ended at tick {tick}: {outcome:?}");
        }
    }

    let metrics = vehicle.metrics();
    eprintln!("Flight of {}:", model.name);
    eprintln!("  Ticks flown: {tick}/{ticks}");
    eprintln!("  Still flying: {}", vehicle.is_active());
    eprintln!("  Waypoints reached: {}", vehicle.progress().reached());
    eprintln!("  Target penalty: {:.1}", metrics.target_penalty);
    eprintln!("  Distance traveled: {:.1}m", metrics.distance_traveled);
    eprintln!(
        "  Final position: ({:.1}, {:.1})",
        vehicle.position().x,
        vehicle.position().y
    );

    if let Some(path) = &arg.trace {
        let trace = FlightTrace {
            recorded_at: Utc::now(),
            mode: TraceMode::Counted,
            time_step: params.time_step,
            course: params.course.clone(),
            vehicles: vec![recorder.finish(tick, &vehicle)],
        };
        Output::save_json(&trace, Some(path.clone()))?;
        eprintln!("Trace saved to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use crate::command::{CommandArgs, Mode};

    #[test]
    fn test_fly_requires_model() {
        assert!(CommandArgs::try_parse_from(["hovolve", "fly"]).is_err());
        let args =
            CommandArgs::try_parse_from(["hovolve", "fly", "pilot.json", "--trace-every", "5"])
                .unwrap();
        let Mode::Fly(arg) = args.mode else {
            panic!("expected fly mode");
        };
        assert_eq!(arg.model.to_str(), Some("pilot.json"));
        assert_eq!(arg.trace_every, 5);
        assert_eq!(arg.duration, None);
    }
}
