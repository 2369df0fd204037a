//! Leaky-integrator network with global recurrent inhibition.
//!
//! Each step reads only values frozen at `t - 1`:
//!
//! ```text
//! q[i]    <- z[t-1][i] + exp(-1/tau) * q[i]
//! u[i]     = I - sum_{j in pre(i)} (2 kappa / N) * q[j]
//! z[t][i]  = max(u[i], 0)
//! ```
//!
//! Row 0 of the trajectory is the all-zero initial condition.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use tracing::debug;

use crate::config::NetworkConfig;
use crate::connectivity::ConnectivityGraph;
use crate::error::{Error, Result};
use crate::trajectory::Trajectory;

/// Execution tier for the per-step neuron updates and the similarity pass.
///
/// - `Scalar`: Single-threaded (default, works everywhere)
/// - `Parallel`: Multi-threaded via rayon (requires `parallel` feature)
///
/// Both tiers produce bit-identical results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionTier {
    #[default]
    Scalar,
    Parallel,
}

impl ExecutionTier {
    /// The tier that will actually run, given the compiled features.
    pub fn effective(self) -> ExecutionTier {
        match self {
            ExecutionTier::Scalar => ExecutionTier::Scalar,
            ExecutionTier::Parallel => {
                #[cfg(feature = "parallel")]
                {
                    ExecutionTier::Parallel
                }
                #[cfg(not(feature = "parallel"))]
                {
                    ExecutionTier::Scalar
                }
            }
        }
    }
}

pub struct Simulator<'g> {
    cfg: NetworkConfig,
    graph: &'g ConnectivityGraph,
    tier: ExecutionTier,
}

impl<'g> Simulator<'g> {
    pub fn new(cfg: NetworkConfig, graph: &'g ConnectivityGraph) -> Result<Self> {
        cfg.validate()?;
        if graph.neuron_count() != cfg.neurons {
            return Err(Error::InvalidGraph(format!(
                "graph has {} neurons, config expects {}",
                graph.neuron_count(),
                cfg.neurons
            )));
        }
        Ok(Self {
            cfg,
            graph,
            tier: ExecutionTier::Scalar,
        })
    }

    pub fn with_execution_tier(mut self, tier: ExecutionTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn execution_tier(&self) -> ExecutionTier {
        self.tier.effective()
    }

    /// Run all `T` steps and return the filled trajectory.
    pub fn run(&self) -> Trajectory {
        let n = self.cfg.neurons;
        let steps = self.cfg.steps;
        let tier = self.execution_tier();
        let decay = self.cfg.decay();
        let coef = self.cfg.coupling();

        debug!(neurons = n, steps, ?tier, decay, coef, "simulation start");

        let mut z = Trajectory::zeros(steps, n);
        let mut q = vec![0.0; n];

        for t in 1..steps {
            let (prev, cur) = z.previous_and_current_mut(t);
            match tier {
                ExecutionTier::Scalar => self.step_scalar(prev, cur, &mut q, decay, coef),
                ExecutionTier::Parallel => self.step_parallel(prev, cur, &mut q, decay, coef),
            }
        }

        debug!(steps, "simulation done");
        z
    }

    fn step_scalar(&self, prev: &[f64], cur: &mut [f64], q: &mut [f64], decay: f64, coef: f64) {
        for (qi, &zi) in q.iter_mut().zip(prev) {
            *qi = zi + decay * *qi;
        }
        for (i, zi) in cur.iter_mut().enumerate() {
            *zi = self.rectified_drive(i, q, coef);
        }
    }

    #[cfg(feature = "parallel")]
    fn step_parallel(&self, prev: &[f64], cur: &mut [f64], q: &mut [f64], decay: f64, coef: f64) {
        q.par_iter_mut().zip(prev.par_iter()).for_each(|(qi, &zi)| {
            *qi = zi + decay * *qi;
        });
        let q: &[f64] = q;
        cur.par_iter_mut().enumerate().for_each(|(i, zi)| {
            *zi = self.rectified_drive(i, q, coef);
        });
    }

    #[cfg(not(feature = "parallel"))]
    fn step_parallel(&self, prev: &[f64], cur: &mut [f64], q: &mut [f64], decay: f64, coef: f64) {
        self.step_scalar(prev, cur, q, decay, coef);
    }

    #[inline]
    fn rectified_drive(&self, i: usize, q: &[f64], coef: f64) -> f64 {
        let mut r = 0.0;
        for &j in self.graph.presynaptic(i) {
            r += coef * q[j];
        }
        let u = self.cfg.input - r;
        if u > 0.0 {
            u
        } else {
            0.0
        }
    }
}

/// Simulate one run on `graph` with the given parameters, single-threaded.
pub fn simulate(graph: &ConnectivityGraph, cfg: NetworkConfig) -> Result<Trajectory> {
    Ok(Simulator::new(cfg, graph)?.run())
}
