use tracing::debug;

use crate::error::{Error, Result};
use crate::prng::Prng;

pub type NeuronId = usize;

/// Fixed sparse graph of presynaptic inputs, stored in CSR (Compressed Sparse Row) form.
///
/// Neuron `i` receives input from `presyn[offsets[i]..offsets[i+1]]`, in increasing
/// index order. Connectivity is binary: an edge is either present or absent, and
/// every edge carries the same strength during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityGraph {
    /// Flat array of all presynaptic indices.
    presyn: Vec<NeuronId>,
    /// Row offsets. Length = neuron_count + 1.
    offsets: Vec<usize>,
}

impl ConnectivityGraph {
    /// Draw a random graph.
    ///
    /// One value is consumed per ordered pair `(i, j)`, postsynaptic index outer and
    /// presynaptic index inner, and `j -> i` is kept iff the value is below `prob`.
    /// That consumption order is what makes a seed reproduce the same graph.
    pub fn generate(seed: u64, neurons: usize, prob: f64) -> Self {
        let mut rng = Prng::new(seed);

        let expected = (neurons as f64 * neurons as f64 * prob).ceil() as usize;
        let mut presyn = Vec::with_capacity(expected);
        let mut offsets = Vec::with_capacity(neurons + 1);
        offsets.push(0);

        for _i in 0..neurons {
            for j in 0..neurons {
                if rng.next_f64_01() < prob {
                    presyn.push(j);
                }
            }
            offsets.push(presyn.len());
        }

        let graph = Self { presyn, offsets };
        debug!(
            seed,
            neurons,
            edges = graph.edge_count(),
            "generated connectivity graph"
        );
        graph
    }

    /// Build a graph from explicit presynaptic lists, one per neuron.
    ///
    /// Every index must be a valid neuron. Rows keep the order given.
    pub fn from_rows(rows: Vec<Vec<NeuronId>>) -> Result<Self> {
        let neurons = rows.len();
        let mut presyn = Vec::with_capacity(rows.iter().map(Vec::len).sum());
        let mut offsets = Vec::with_capacity(neurons + 1);
        offsets.push(0);

        for (i, row) in rows.into_iter().enumerate() {
            if let Some(&bad) = row.iter().find(|&&j| j >= neurons) {
                return Err(Error::InvalidGraph(format!(
                    "neuron {i} lists presynaptic index {bad}, but there are only {neurons} neurons"
                )));
            }
            presyn.extend(row);
            offsets.push(presyn.len());
        }

        Ok(Self { presyn, offsets })
    }

    /// Graph in which every neuron receives input from every neuron, itself included.
    pub fn fully_connected(neurons: usize) -> Self {
        let presyn = (0..neurons).flat_map(|_| 0..neurons).collect();
        let offsets = (0..=neurons).map(|i| i * neurons).collect();
        Self { presyn, offsets }
    }

    /// Graph with no edges at all.
    pub fn disconnected(neurons: usize) -> Self {
        Self {
            presyn: Vec::new(),
            offsets: vec![0; neurons + 1],
        }
    }

    pub fn neuron_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn edge_count(&self) -> usize {
        self.presyn.len()
    }

    /// Presynaptic neurons of `i`, in increasing index order for generated graphs.
    #[inline]
    pub fn presynaptic(&self, i: NeuronId) -> &[NeuronId] {
        &self.presyn[self.offsets[i]..self.offsets[i + 1]]
    }

    #[inline]
    pub fn in_degree(&self, i: NeuronId) -> usize {
        self.offsets[i + 1] - self.offsets[i]
    }

    pub fn mean_in_degree(&self) -> f64 {
        let n = self.neuron_count();
        if n == 0 {
            return 0.0;
        }
        self.edge_count() as f64 / n as f64
    }
}
