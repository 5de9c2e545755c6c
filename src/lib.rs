//! # anofox-ensemble
//!
//! K-fold model ensembling for segmentation-style prediction tensors.
//!
//! Combines the predictions of independently trained models (typically one
//! per cross-validation fold) by weighted mean or majority vote, and provides
//! the surrounding pieces of the workflow: fold partitioning, activation and
//! discretization transforms, Dice scoring and parallel ensemble evaluation.

pub mod config;
pub mod core;
pub mod ensemble;
pub mod error;
pub mod models;
pub mod transform;
pub mod utils;

pub use error::{EnsembleError, Result};

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::config::EnsembleConfig;
    pub use crate::core::MemberWeights;
    pub use crate::ensemble::{aggregate_mean, aggregate_vote, CombinationMethod, VoteLabel};
    pub use crate::error::{EnsembleError, Result};
    pub use crate::models::{BoxedPredictor, EnsembleEvaluator, FnPredictor, Predictor, Sample};
    pub use crate::transform::{Activation, Discretization, PostTransform};
    pub use crate::utils::{mean_dice, KFold};
}
