//! Training system evolving pilot networks with a genetic algorithm.
//!
//! # How Training Works
//!
//! 1. **Population** - Create a generation of vehicles with random networks
//! 2. **Rollout** - Every vehicle flies the shared waypoint course until it
//!    leaves the world box or the generation duration runs out
//! 3. **Ranking** - Vehicles are sorted by waypoints reached, then by how close
//!    they stayed to their current target, then by how long they flew
//! 4. **Reproduction** - The best vehicles survive unchanged and the top half
//!    breeds the rest through crossover and mutation
//! 5. **Repeat** - Continue until a stop is requested
//!
//! # Architecture
//!
//! ```text
//! TrainingHandle (host thread)
//!     ↓ start / stop
//! Trainer (background thread)
//!     ↓ drives
//! Population ── rollout on scoped threads ──→ Vehicle (hovolve-engine)
//!     ↓ ranked by compare_fitness
//! PopulationEvolver
//!     ↓ produces
//! next Population
//! ```
//!
//! # Modules
//!
//! - [`params`] - [`TrainingParams`](params::TrainingParams) and its validation
//! - [`genetic`] - Population, ranking and breeding
//! - [`trainer`] - The generation cycle and its stop signal
//! - [`host`] - Running a trainer on a background thread
//! - [`snapshot`] - Owned, serializable records of a generation
//! - [`showcase`] - Display-only replay of the best pilots
//!
//! # Example
//!
//! ```
//! use hovolve_training::{params::TrainingParams, trainer::Trainer};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64Mcg;
//!
//! let params = TrainingParams {
//!     generation_size: 10,
//!     max_generation_duration: 0.5,
//!     ..TrainingParams::default()
//! };
//! let mut trainer = Trainer::new(params, Pcg64Mcg::seed_from_u64(7)).unwrap();
//! let stop = trainer.stop_signal();
//! let snapshot = trainer.train(|stats| {
//!     if stats.generation == 4 {
//!         stop.request();
//!     }
//! });
//! assert_eq!(snapshot.generation, 4);
//! let best = snapshot.best().unwrap();
//! assert_eq!(best.network.topology().layer_sizes(), &[6, 12, 6, 4]);
//! ```
//!
//! # Current Limitations
//!
//! - **Single course**: Every vehicle of every generation flies the same course,
//!   so pilots can overfit its target order
//! - **Fixed mutation**: The mutation rate never adapts to population diversity
//! - **No resume**: A saved snapshot can be replayed but not trained further

pub mod genetic;
pub mod host;
pub mod params;
pub mod showcase;
pub mod snapshot;
pub mod trainer;
