use serde::{Deserialize, Serialize};

use crate::TopologyError;

/// Layer sizes of a feedforward network: `[inputs, hidden..., outputs]`.
///
/// A topology is validated once on construction and never changes afterwards,
/// so every [`Network`](crate::Network) built from it can rely on consistent
/// matrix dimensions.
///
/// # Example
///
/// ```
/// use hovolve_engine::Topology;
///
/// let topology = Topology::new([6, 12, 6, 4]).unwrap();
/// assert_eq!(topology.input_count(), 6);
/// assert_eq!(topology.output_count(), 4);
/// // 12*6 + 12 + 6*12 + 6 + 4*6 + 4
/// assert_eq!(topology.parameter_count(), 190);
///
/// assert!(Topology::new([6]).is_err());
/// assert!(Topology::new([6, 0, 4]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Topology {
    layers: Vec<usize>,
}

impl Topology {
    pub fn new<L>(layers: L) -> Result<Self, TopologyError>
    where
        L: Into<Vec<usize>>,
    {
        let layers = layers.into();
        if layers.len() < 2 {
            return Err(TopologyError::TooFewLayers {
                layers: layers.len(),
            });
        }
        if let Some(index) = layers.iter().position(|&size| size == 0) {
            return Err(TopologyError::EmptyLayer { index });
        }
        Ok(Self { layers })
    }

    #[must_use]
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layers
    }

    #[must_use]
    pub fn input_count(&self) -> usize {
        self.layers[0]
    }

    #[must_use]
    pub fn output_count(&self) -> usize {
        self.layers[self.layers.len() - 1]
    }

    /// Number of weighted layers (every layer except the input layer).
    #[must_use]
    pub fn weighted_layer_count(&self) -> usize {
        self.layers.len() - 1
    }

    /// Iterates `(previous, current)` sizes for each weighted layer.
    pub fn connections(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.layers.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Total number of weights and biases of a network with this topology.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.connections()
            .map(|(previous, current)| current * previous + current)
            .sum()
    }
}

impl TryFrom<Vec<usize>> for Topology {
    type Error = TopologyError;

    fn try_from(layers: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(layers)
    }
}

impl From<Topology> for Vec<usize> {
    fn from(topology: Topology) -> Self {
        topology.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_single_layer() {
        assert_eq!(
            Topology::new(vec![6]),
            Err(TopologyError::TooFewLayers { layers: 1 })
        );
        assert_eq!(
            Topology::new(Vec::new()),
            Err(TopologyError::TooFewLayers { layers: 0 })
        );
    }

    #[test]
    fn test_rejects_empty_layer() {
        assert_eq!(
            Topology::new([6, 12, 0, 4]),
            Err(TopologyError::EmptyLayer { index: 2 })
        );
    }

    #[test]
    fn test_connections_follow_adjacent_layers() {
        let topology = Topology::new([6, 12, 6, 4]).unwrap();
        let connections: Vec<_> = topology.connections().collect();
        assert_eq!(connections, vec![(6, 12), (12, 6), (6, 4)]);
        assert_eq!(topology.weighted_layer_count(), 3);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let topology = Topology::new([2, 3, 1]).unwrap();
        let json = serde_json::to_string(&topology).unwrap();
        assert_eq!(json, "[2,3,1]");
        let back: Topology = serde_json::from_str(&json).unwrap();
        assert_eq!(back, topology);
    }

    #[test]
    fn test_deserialization_validates() {
        let result: Result<Topology, _> = serde_json::from_str("[3,0,1]");
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("layer 1 has no nodes"));
    }
}
