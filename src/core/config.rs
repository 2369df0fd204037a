use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parameters of the recurrent network and the length of a run.
///
/// Every field has a default, so a JSON file only needs the values it changes:
///
/// ```json
/// { "neurons": 200, "steps": 300, "kappa": 2.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Number of neurons `N`.
    pub neurons: usize,
    /// Number of time steps `T`, including the all-zero initial row.
    pub steps: usize,

    /// Probability `Pr` that a given ordered pair is connected.
    pub connection_prob: f64,

    /// Integration time constant of the inhibitory trace.
    pub tau: f64,
    /// Strength of recurrent inhibition.
    pub kappa: f64,
    /// Constant external drive.
    pub input: f64,
}

impl Default for NetworkConfig {
    /// The published parameter set: 1000 neurons over 1000 steps.
    fn default() -> Self {
        Self {
            neurons: 1000,
            steps: 1000,
            connection_prob: 0.1,
            tau: 100.0,
            kappa: 5.0,
            input: 1.0,
        }
    }
}

impl NetworkConfig {
    pub fn with_size(neurons: usize, steps: usize) -> Self {
        Self {
            neurons,
            steps,
            ..Self::default()
        }
    }

    pub fn with_connection_prob(mut self, prob: f64) -> Self {
        self.connection_prob = prob;
        self
    }

    pub fn with_inhibition(mut self, kappa: f64) -> Self {
        self.kappa = kappa;
        self
    }

    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    pub fn with_input(mut self, input: f64) -> Self {
        self.input = input;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.neurons == 0 {
            return Err(Error::InvalidConfig("neurons must be >= 1".into()));
        }
        if self.steps == 0 {
            return Err(Error::InvalidConfig("steps must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&self.connection_prob) {
            return Err(Error::InvalidConfig(
                "connection_prob must be in [0, 1]".into(),
            ));
        }
        if !self.tau.is_finite() || self.tau <= 0.0 {
            return Err(Error::InvalidConfig("tau must be finite and > 0".into()));
        }
        if !self.kappa.is_finite() {
            return Err(Error::InvalidConfig("kappa must be finite".into()));
        }
        if !self.input.is_finite() {
            return Err(Error::InvalidConfig("input must be finite".into()));
        }
        Ok(())
    }

    /// Per-step decay factor of the inhibitory trace, `exp(-1/tau)`.
    #[inline]
    pub fn decay(&self) -> f64 {
        (-1.0 / self.tau).exp()
    }

    /// Uniform synaptic strength applied to every edge, `2 kappa / N`.
    #[inline]
    pub fn coupling(&self) -> f64 {
        2.0 * self.kappa / self.neurons as f64
    }

    /// Number of values in a full trajectory (`T * N`).
    pub fn trajectory_len(&self) -> usize {
        self.steps * self.neurons
    }

    /// Load a config from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
