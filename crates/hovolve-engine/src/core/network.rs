//! Fixed-topology feedforward network used as a pilot's brain.
//!
//! # Genetic Operators
//!
//! A network is its own genome: every weight and every bias is one gene.
//!
//! - [`Network::init_random`] - uniform initialization in `[-range, range]`
//! - [`Network::mutate`] - adds uniform noise from `[-rate, rate]` to every gene
//! - [`Network::crossover`] - picks each gene from either parent with equal probability
//!
//! Gene-wise crossover (rather than per layer or per individual) mixes parents
//! as finely as possible on every mating.
//!
//! # Serialization
//!
//! Networks serialize through [`NetworkParams`], a nested
//! `weights[layer][node][input]` / `biases[layer][node]` layout. Deserializing
//! checks every dimension against the topology. The activation scratch buffer
//! is never serialized and never takes part in equality.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{InputShapeError, NetworkParamsError, Topology};

#[derive(Debug, Clone, PartialEq)]
struct Layer {
    /// Row-major `current × previous` matrix.
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Layer {
    fn zeroed(previous: usize, current: usize) -> Self {
        Self {
            weights: vec![0.0; previous * current],
            biases: vec![0.0; current],
        }
    }

    fn genes(&self) -> impl Iterator<Item = f64> + '_ {
        self.weights.iter().chain(&self.biases).copied()
    }

    fn genes_mut(&mut self) -> impl Iterator<Item = &mut f64> + '_ {
        self.weights.iter_mut().chain(&mut self.biases)
    }

    fn forward(&self, inputs: &[f64], outputs: &mut [f64]) {
        let rows = self.weights.chunks_exact(inputs.len());
        for ((out, bias), row) in outputs.iter_mut().zip(&self.biases).zip(rows) {
            let z = bias + row.iter().zip(inputs).map(|(w, x)| w * x).sum::<f64>();
            *out = z.tanh();
        }
    }
}

/// Feedforward network with `tanh` activation on every node.
///
/// # Example
///
/// ```
/// use hovolve_engine::{Network, Topology};
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64Mcg;
///
/// let mut rng = Pcg64Mcg::seed_from_u64(7);
/// let topology = Topology::new([2, 3, 1]).unwrap();
///
/// let mut a = Network::random(topology.clone(), 2.0, &mut rng);
/// let b = Network::random(topology, 2.0, &mut rng);
///
/// let mut child = a.crossover(&b, &mut rng);
/// child.mutate(0.1, &mut rng);
///
/// let output = a.evaluate(&[0.5, -0.5]).unwrap();
/// assert_eq!(output.len(), 1);
/// assert!(output[0].abs() < 1.0);
/// assert!(a.evaluate(&[0.5]).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NetworkParams", into = "NetworkParams")]
pub struct Network {
    topology: Topology,
    layers: Vec<Layer>,
    activations: Vec<Vec<f64>>,
}

impl PartialEq for Network {
    fn eq(&self, other: &Self) -> bool {
        self.topology == other.topology && self.layers == other.layers
    }
}

impl Network {
    /// Creates a network whose weights and biases are all zero.
    #[must_use]
    pub fn zeroed(topology: Topology) -> Self {
        let layers = topology
            .connections()
            .map(|(previous, current)| Layer::zeroed(previous, current))
            .collect();
        let activations = topology
            .connections()
            .map(|(_, current)| vec![0.0; current])
            .collect();
        Self {
            topology,
            layers,
            activations,
        }
    }

    /// Creates a network with every parameter uniform in `[-range, range]`.
    #[must_use]
    pub fn random<R>(topology: Topology, range: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut network = Self::zeroed(topology);
        network.init_random(range, rng);
        network
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Iterates every gene: per layer, the weights row by row, then the biases.
    pub fn genes(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers.iter().flat_map(Layer::genes)
    }

    fn genes_mut(&mut self) -> impl Iterator<Item = &mut f64> + '_ {
        self.layers.iter_mut().flat_map(Layer::genes_mut)
    }

    /// Runs the network forward and returns the output layer's activations.
    ///
    /// The returned slice borrows the network's scratch buffer and is
    /// overwritten by the next evaluation.
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<&[f64], InputShapeError> {
        let expected = self.topology.input_count();
        if inputs.len() != expected {
            return Err(InputShapeError {
                expected,
                actual: inputs.len(),
            });
        }

        for (index, layer) in self.layers.iter().enumerate() {
            let (done, rest) = self.activations.split_at_mut(index);
            let previous = done.last().map_or(inputs, Vec::as_slice);
            layer.forward(previous, &mut rest[0]);
        }

        Ok(self.activations.last().map(Vec::as_slice).unwrap_or_default())
    }

    /// Overwrites every gene with an independent draw from `[-range, range]`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is negative or not finite.
    pub fn init_random<R>(&mut self, range: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        assert!(
            range.is_finite() && range >= 0.0,
            "initialization range must be finite and non-negative"
        );
        for gene in self.genes_mut() {
            *gene = rng.random_range(-range..=range);
        }
    }

    /// Adds an independent draw from `[-rate, rate]` to every gene.
    ///
    /// A rate of zero leaves every parameter bit-for-bit unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is negative or not finite.
    pub fn mutate<R>(&mut self, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        assert!(
            rate.is_finite() && rate >= 0.0,
            "mutation rate must be finite and non-negative"
        );
        if rate == 0.0 {
            return;
        }
        for gene in self.genes_mut() {
            *gene += rng.random_range(-rate..=rate);
        }
    }

    /// Builds a child whose every gene comes from `self` or `other` with
    /// probability 0.5, drawn independently per gene.
    ///
    /// # Panics
    ///
    /// Panics if the two networks have different topologies.
    #[must_use]
    pub fn crossover<R>(&self, other: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert_eq!(
            self.topology, other.topology,
            "crossover requires identical topologies"
        );
        let mut child = Self::zeroed(self.topology.clone());
        for ((gene, mine), theirs) in child.genes_mut().zip(self.genes()).zip(other.genes()) {
            *gene = if rng.random_bool(0.5) { mine } else { theirs };
        }
        child
    }

    /// Converts into the nested, serializable parameter layout.
    #[must_use]
    pub fn params(&self) -> NetworkParams {
        let (weights, biases): (Vec<_>, Vec<_>) = self
            .layers
            .iter()
            .zip(self.topology.connections())
            .map(|(layer, (previous, _))| {
                let rows = layer
                    .weights
                    .chunks_exact(previous)
                    .map(<[f64]>::to_vec)
                    .collect::<Vec<_>>();
                (rows, layer.biases.clone())
            })
            .unzip();
        NetworkParams {
            topology: self.topology.clone(),
            weights,
            biases,
        }
    }

    /// Rebuilds a network from nested parameters, checking every dimension.
    pub fn from_params(params: NetworkParams) -> Result<Self, NetworkParamsError> {
        let NetworkParams {
            topology,
            weights,
            biases,
        } = params;

        let expected = topology.weighted_layer_count();
        for actual in [weights.len(), biases.len()] {
            if actual != expected {
                return Err(NetworkParamsError::LayerCount { expected, actual });
            }
        }

        let mut network = Self::zeroed(topology);
        let connections = network.topology.connections().collect::<Vec<_>>();
        for (layer_index, (((layer, rows), layer_biases), (previous, current))) in network
            .layers
            .iter_mut()
            .zip(weights)
            .zip(biases)
            .zip(connections)
            .enumerate()
        {
            if rows.len() != current {
                return Err(NetworkParamsError::RowCount {
                    layer: layer_index,
                    expected: current,
                    actual: rows.len(),
                });
            }
            if layer_biases.len() != current {
                return Err(NetworkParamsError::BiasCount {
                    layer: layer_index,
                    expected: current,
                    actual: layer_biases.len(),
                });
            }
            for (node, row) in rows.iter().enumerate() {
                if row.len() != previous {
                    return Err(NetworkParamsError::RowWidth {
                        layer: layer_index,
                        node,
                        expected: previous,
                        actual: row.len(),
                    });
                }
            }
            layer.weights = rows.concat();
            layer.biases = layer_biases;
        }
        Ok(network)
    }
}

/// Serialized form of a [`Network`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub topology: Topology,
    /// `weights[layer][node][input]`
    pub weights: Vec<Vec<Vec<f64>>>,
    /// `biases[layer][node]`
    pub biases: Vec<Vec<f64>>,
}

impl TryFrom<NetworkParams> for Network {
    type Error = NetworkParamsError;

    fn try_from(params: NetworkParams) -> Result<Self, Self::Error> {
        Self::from_params(params)
    }
}

impl From<Network> for NetworkParams {
    fn from(network: Network) -> Self {
        network.params()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn topology(layers: &[usize]) -> Topology {
        Topology::new(layers.to_vec()).unwrap()
    }

    #[test]
    fn test_zero_network_outputs_zero() {
        for layers in [&[1, 1][..], &[6, 4], &[6, 12, 6, 4], &[3, 5, 5, 5, 2]] {
            let mut network = Network::zeroed(topology(layers));
            let inputs: Vec<f64> = (0..layers[0]).map(|i| i as f64 - 1.5).collect();
            let outputs = network.evaluate(&inputs).unwrap();
            assert_eq!(outputs.len(), *layers.last().unwrap());
            assert!(outputs.iter().all(|&o| o == 0.0));
            assert!(network.activations.iter().flatten().all(|&a| a == 0.0));
        }
    }

    #[test]
    fn test_evaluate_rejects_wrong_input_length() {
        let mut network = Network::zeroed(topology(&[6, 12, 6, 4]));
        assert_eq!(
            network.evaluate(&[0.0; 5]).unwrap_err(),
            InputShapeError {
                expected: 6,
                actual: 5
            }
        );
        assert!(network.evaluate(&[0.0; 7]).is_err());
        assert!(network.evaluate(&[0.0; 6]).is_ok());
    }

    #[test]
    fn test_evaluate_hand_computed() {
        // 2 -> 1, w = [0.5, -1.0], b = 0.25
        let params = NetworkParams {
            topology: topology(&[2, 1]),
            weights: vec![vec![vec![0.5, -1.0]]],
            biases: vec![vec![0.25]],
        };
        let mut network = Network::from_params(params).unwrap();
        let output = network.evaluate(&[1.0, 0.5]).unwrap();
        assert_eq!(output, &[(0.5f64 * 1.0 - 1.0 * 0.5 + 0.25).tanh()]);
    }

    #[test]
    fn test_evaluate_chains_hidden_layers() {
        // 1 -> 2 -> 1 with identity-ish weights
        let params = NetworkParams {
            topology: topology(&[1, 2, 1]),
            weights: vec![vec![vec![1.0], vec![-1.0]], vec![vec![1.0, 1.0]]],
            biases: vec![vec![0.0, 0.0], vec![0.1]],
        };
        let mut network = Network::from_params(params).unwrap();
        let h = 0.3f64.tanh();
        let expected = (h - h + 0.1).tanh();
        let output = network.evaluate(&[0.3]).unwrap()[0];
        assert!((output - expected).abs() < 1e-15);
    }

    #[test]
    fn test_init_random_stays_in_range() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let network = Network::random(topology(&[6, 12, 6, 4]), 2.0, &mut rng);
        assert_eq!(network.genes().count(), 190);
        assert!(network.genes().all(|g| (-2.0..=2.0).contains(&g)));
        assert!(network.genes().any(|g| g != 0.0));
    }

    #[test]
    fn test_mutate_zero_is_identity() {
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        let mut network = Network::random(topology(&[6, 12, 6, 4]), 2.0, &mut rng);
        let before: Vec<u64> = network.genes().map(f64::to_bits).collect();
        network.mutate(0.0, &mut rng);
        let after: Vec<u64> = network.genes().map(f64::to_bits).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_mutate_perturbs_every_gene_within_rate() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let original = Network::random(topology(&[4, 8, 2]), 2.0, &mut rng);
        let mut mutated = original.clone();
        mutated.mutate(0.1, &mut rng);
        let deltas: Vec<f64> = mutated
            .genes()
            .zip(original.genes())
            .map(|(m, o)| m - o)
            .collect();
        assert!(deltas.iter().all(|d| d.abs() <= 0.1 + 1e-12));
        assert!(deltas.iter().filter(|d| **d != 0.0).count() > deltas.len() / 2);
    }

    #[test]
    fn test_crossover_with_self_is_identity() {
        let mut rng = Pcg64Mcg::seed_from_u64(4);
        let a = Network::random(topology(&[6, 12, 6, 4]), 2.0, &mut rng);
        for _ in 0..10 {
            assert_eq!(a.crossover(&a, &mut rng), a);
        }
    }

    #[test]
    fn test_crossover_picks_genes_from_parents() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let a = Network::random(topology(&[6, 12, 6, 4]), 2.0, &mut rng);
        let b = Network::random(topology(&[6, 12, 6, 4]), 2.0, &mut rng);
        let a_before = a.clone();
        let b_before = b.clone();

        let child = a.crossover(&b, &mut rng);
        let mut from_a = 0;
        let mut from_b = 0;
        for ((c, x), y) in child.genes().zip(a.genes()).zip(b.genes()) {
            assert!(c == x || c == y);
            from_a += usize::from(c == x);
            from_b += usize::from(c == y);
        }
        // 190 genes at p = 0.5: both parents contribute
        assert!(from_a > 40 && from_b > 40);
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }

    #[test]
    #[should_panic(expected = "identical topologies")]
    fn test_crossover_rejects_mismatched_topologies() {
        let mut rng = Pcg64Mcg::seed_from_u64(6);
        let a = Network::zeroed(topology(&[2, 2]));
        let b = Network::zeroed(topology(&[2, 3]));
        let _ = a.crossover(&b, &mut rng);
    }

    #[test]
    fn test_scratch_buffer_is_not_identity() {
        let mut rng = Pcg64Mcg::seed_from_u64(8);
        let mut a = Network::random(topology(&[2, 3, 1]), 2.0, &mut rng);
        let b = a.clone();
        a.evaluate(&[1.0, -1.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_params_layout_and_serde_roundtrip() {
        let mut rng = Pcg64Mcg::seed_from_u64(9);
        let network = Network::random(topology(&[3, 2, 1]), 1.0, &mut rng);
        let params = network.params();
        assert_eq!(params.weights.len(), 2);
        assert_eq!(params.weights[0].len(), 2);
        assert_eq!(params.weights[0][0].len(), 3);
        assert_eq!(params.biases[1].len(), 1);

        let json = serde_json::to_string(&network).unwrap();
        let back: Network = serde_json::from_str(&json).unwrap();
        assert_eq!(back, network);
    }

    #[test]
    fn test_from_params_rejects_bad_dimensions() {
        let base = Network::zeroed(topology(&[3, 2, 1])).params();

        let mut short_row = base.clone();
        short_row.weights[0][1].pop();
        assert_eq!(
            Network::from_params(short_row).unwrap_err(),
            NetworkParamsError::RowWidth {
                layer: 0,
                node: 1,
                expected: 3,
                actual: 2
            }
        );

        let mut extra_bias = base.clone();
        extra_bias.biases[1].push(0.0);
        assert_eq!(
            Network::from_params(extra_bias).unwrap_err(),
            NetworkParamsError::BiasCount {
                layer: 1,
                expected: 1,
                actual: 2
            }
        );

        let mut missing_layer = base;
        missing_layer.weights.pop();
        assert_eq!(
            Network::from_params(missing_layer).unwrap_err(),
            NetworkParamsError::LayerCount {
                expected: 2,
                actual: 1
            }
        );
    }
}
