use serde::{Deserialize, Serialize};

use hovolve_engine::{Course, FlightMetrics, Network, Vehicle, VehicleParams, WaypointProgress};

use crate::genetic::{Population, compare_records};

/// Owned, serializable record of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: u64,
    pub active: bool,
    pub network: Network,
    pub metrics: FlightMetrics,
    pub progress: WaypointProgress,
}

impl VehicleSnapshot {
    #[must_use]
    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id(),
            active: vehicle.is_active(),
            network: vehicle.controller().clone(),
            metrics: *vehicle.metrics(),
            progress: *vehicle.progress(),
        }
    }

    /// Rebuilds a standalone vehicle at its start position.
    ///
    /// The network and fitness counters are restored; the vehicle is active
    /// and ready to fly outside any population.
    #[must_use]
    pub fn into_vehicle(self, params: VehicleParams) -> Vehicle {
        Vehicle::new(self.network, params)
            .with_id(self.id)
            .with_record(self.metrics, self.progress)
    }
}

/// Owned, serializable record of a whole generation.
///
/// When `ranked` is set, `vehicles` is ordered best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub generation: usize,
    pub ranked: bool,
    pub course: Course,
    pub vehicles: Vec<VehicleSnapshot>,
}

impl PopulationSnapshot {
    #[must_use]
    pub fn from_population(population: &Population) -> Self {
        Self {
            generation: population.generation(),
            ranked: population.is_ranked(),
            course: population.course().clone(),
            vehicles: population
                .vehicles()
                .iter()
                .map(VehicleSnapshot::from_vehicle)
                .collect(),
        }
    }

    /// Returns the fittest vehicle.
    #[must_use]
    pub fn best(&self) -> Option<&VehicleSnapshot> {
        if self.ranked {
            return self.vehicles.first();
        }
        self.vehicles
            .iter()
            .min_by(|a, b| compare_records((&a.progress, &a.metrics), (&b.progress, &b.metrics)))
    }

    /// Returns up to `count` vehicles, best first.
    #[must_use]
    pub fn top(&self, count: usize) -> Vec<&VehicleSnapshot> {
        let mut vehicles = self.vehicles.iter().collect::<Vec<_>>();
        if !self.ranked {
            vehicles.sort_by(|a, b| {
                compare_records((&a.progress, &a.metrics), (&b.progress, &b.metrics))
            });
        }
        vehicles.truncate(count);
        vehicles
    }
}
