use chrono::{DateTime, Utc};
use hovolve_engine::Network;
use serde::{Deserialize, Serialize};

/// A trained pilot saved by `hovolve train`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PilotModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Generation the pilot was ranked best in
    pub generation: usize,
    /// Identifier of the pilot within its population
    pub vehicle_id: u64,
    pub reached: u32,
    pub target_penalty: f64,
    pub active_time: f64,
    pub pilot: Network,
}
