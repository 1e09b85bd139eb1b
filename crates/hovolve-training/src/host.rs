use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
};

use rand::Rng;

use crate::{
    genetic::GenerationStats,
    snapshot::PopulationSnapshot,
    trainer::{StopSignal, Trainer},
};

/// Notification sent from the training thread.
#[derive(Debug, Clone)]
pub enum TrainerEvent {
    GenerationComplete(GenerationStats),
    /// The trainer finished its in-flight generation and is idle again.
    Stopped(PopulationSnapshot),
}

#[derive(Debug)]
enum Command {
    Start { generations: Option<usize> },
    Shutdown,
}

/// Runs a [`Trainer`] on a background thread.
///
/// Start and stop requests return immediately. A stop lets the in-flight
/// generation finish, after which the trainer sends
/// [`TrainerEvent::Stopped`] with the final ranked generation and waits for
/// the next start.
///
/// ```
/// use hovolve_training::{host::TrainingHandle, params::TrainingParams, trainer::Trainer};
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64Mcg;
///
/// let params = TrainingParams {
///     generation_size: 4,
///     max_generation_duration: 0.1,
///     ..TrainingParams::default()
/// };
/// let trainer = Trainer::new(params, Pcg64Mcg::seed_from_u64(0)).unwrap();
/// let mut handle = TrainingHandle::spawn(trainer);
///
/// handle.start_training_for(2);
/// let snapshot = handle.wait_stopped().unwrap();
/// assert_eq!(snapshot.generation, 1);
/// ```
#[derive(Debug)]
pub struct TrainingHandle {
    commands: Sender<Command>,
    events: Receiver<TrainerEvent>,
    stop: StopSignal,
    running: Arc<AtomicBool>,
    pending_stops: usize,
    worker: Option<JoinHandle<()>>,
}

impl TrainingHandle {
    /// Moves `trainer` onto a new thread. Training does not start until
    /// [`start_training`](Self::start_training) is called.
    #[must_use]
    pub fn spawn<R>(trainer: Trainer<R>) -> Self
    where
        R: Rng + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let stop = trainer.stop_signal();
        let running = Arc::new(AtomicBool::new(false));
        let worker = {
            let running = Arc::clone(&running);
            thread::spawn(move || serve(trainer, &command_rx, &event_tx, &running))
        };
        Self {
            commands: command_tx,
            events: event_rx,
            stop,
            running,
            pending_stops: 0,
            worker: Some(worker),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Resumes training if the trainer is idle; does nothing while it runs.
    pub fn start_training(&mut self) {
        self.start(None);
    }

    /// Like [`start_training`](Self::start_training), but stops on its own
    /// after `generations` more generations.
    pub fn start_training_for(&mut self, generations: usize) {
        self.start(Some(generations));
    }

    fn start(&mut self, generations: Option<usize>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.stop.clear();
        if self.commands.send(Command::Start { generations }).is_ok() {
            self.pending_stops += 1;
        } else {
            self.running.store(false, Ordering::SeqCst);
        }
    }

    /// Asks the trainer to halt at the next generation boundary.
    pub fn stop_training(&self) {
        if self.is_running() {
            self.stop.request();
        }
    }

    /// Blocks for the next event. Returns `None` once the worker is gone.
    pub fn recv_event(&mut self) -> Option<TrainerEvent> {
        let event = self.events.recv().ok()?;
        if matches!(event, TrainerEvent::Stopped(_)) {
            self.pending_stops = self.pending_stops.saturating_sub(1);
        }
        Some(event)
    }

    /// Blocks until every started run has stopped and returns the last
    /// snapshot. Returns `None` when no run was started since the last stop.
    pub fn wait_stopped(&mut self) -> Option<PopulationSnapshot> {
        let mut last = None;
        while self.pending_stops > 0 {
            if let TrainerEvent::Stopped(snapshot) = self.recv_event()? {
                last = Some(snapshot);
            }
        }
        last
    }

    /// Stops training and joins the worker thread.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.stop.request();
        let _ = self.commands.send(Command::Shutdown);
        if let Some(Err(_)) = self.worker.take().map(JoinHandle::join) {
            log::error!("training thread panicked");
        }
    }
}

impl Drop for TrainingHandle {
    fn drop(&mut self) {
        self.close();
    }
}

fn serve<R>(
    mut trainer: Trainer<R>,
    commands: &Receiver<Command>,
    events: &Sender<TrainerEvent>,
    running: &AtomicBool,
) where
    R: Rng,
{
    while let Ok(command) = commands.recv() {
        let generations = match command {
            Command::Start { generations } => generations,
            Command::Shutdown => break,
        };
        let stop = trainer.stop_signal();
        let mut completed = 0;
        let snapshot = trainer.train(|stats| {
            completed += 1;
            if generations.is_some_and(|limit| completed >= limit) {
                stop.request();
            }
            let _ = events.send(TrainerEvent::GenerationComplete(stats.clone()));
        });
        running.store(false, Ordering::SeqCst);
        let _ = events.send(TrainerEvent::Stopped(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::params::TrainingParams;

    fn handle() -> TrainingHandle {
        let params = TrainingParams {
            generation_size: 6,
            max_generation_duration: 0.2,
            threads: 1,
            ..TrainingParams::default()
        };
        TrainingHandle::spawn(Trainer::new(params, Pcg64Mcg::seed_from_u64(41)).unwrap())
    }

    #[test]
    fn test_wait_without_start() {
        let mut handle = handle();
        assert!(!handle.is_running());
        assert!(handle.wait_stopped().is_none());
    }

    #[test]
    fn test_generation_limit() {
        let mut handle = handle();
        handle.start_training_for(3);

        let mut generations = vec![];
        let snapshot = loop {
            match handle.recv_event().unwrap() {
                TrainerEvent::GenerationComplete(stats) => generations.push(stats.generation),
                TrainerEvent::Stopped(snapshot) => break snapshot,
            }
        };
        assert_eq!(generations, vec![0, 1, 2]);
        assert_eq!(snapshot.generation, 2);
        assert!(snapshot.ranked);
        assert!(!handle.is_running());
    }

    #[test]
    fn test_stop_and_resume() {
        let mut handle = handle();
        handle.start_training();
        assert!(handle.is_running());
        // a second start while running is a no-op
        handle.start_training();

        match handle.recv_event().unwrap() {
            TrainerEvent::GenerationComplete(stats) => assert_eq!(stats.generation, 0),
            TrainerEvent::Stopped(_) => panic!("stopped before any stop request"),
        }
        handle.stop_training();
        let first = handle.wait_stopped().unwrap();
        assert!(!handle.is_running());

        handle.start_training_for(1);
        let second = handle.wait_stopped().unwrap();
        assert_eq!(second.generation, first.generation + 1);
        assert_eq!(second.vehicles.len(), 6);
        handle.shutdown();
    }
}
