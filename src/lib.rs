//! # internal_clock
//!
//! A recurrent network of leaky integrators with sparse random inhibition,
//! whose population activity drifts through a sequence of states that never
//! repeats. Comparing every pair of time points shows how well the state at
//! one moment identifies the time elapsed since input onset.
//!
//! The pipeline has two halves that only share the `activity.dat` format:
//!
//! 1. [`connectivity`] draws the graph, [`dynamics`] runs the network and
//!    [`export`] writes the trajectory, raster and readout artifacts.
//! 2. [`trajectory`] reloads the activity and [`similarity`] computes the
//!    cosine-similarity matrix, its grayscale image and row profiles.
//!
//! ## Quick Start
//!
//! ```
//! use internal_clock::prelude::*;
//!
//! let cfg = NetworkConfig::with_size(100, 50);
//! let graph = ConnectivityGraph::generate(42, cfg.neurons, cfg.connection_prob);
//! let z = simulate(&graph, cfg).unwrap();
//!
//! let analysis = analyze(&z, ExecutionTier::Scalar, DEFAULT_PROFILE_STRIDE);
//! assert_eq!(analysis.matrix.size(), 50);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): multi-threaded per-neuron updates and similarity rows via rayon

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/connectivity.rs"]
pub mod connectivity;

#[path = "core/trajectory.rs"]
pub mod trajectory;

#[path = "core/dynamics.rs"]
pub mod dynamics;

#[path = "core/export.rs"]
pub mod export;

#[path = "core/similarity.rs"]
pub mod similarity;

pub mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports.
///
/// ```
/// use internal_clock::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::NetworkConfig;
    pub use crate::connectivity::{ConnectivityGraph, NeuronId};
    pub use crate::dynamics::{simulate, ExecutionTier, Simulator};
    pub use crate::error::{Error, Result};
    pub use crate::export::{export, readout_signal, readout_weights, ExportedArtifacts};
    pub use crate::similarity::{
        analyze, gray_level, similarity_matrix, RowProfile, SimilarityAnalysis, SimilarityMatrix,
        DEFAULT_PROFILE_STRIDE, GRAY_LEVELS,
    };
    pub use crate::trajectory::{Trajectory, TrajectoryStats};
}
