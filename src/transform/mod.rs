//! Post-processing transforms for prediction tensors.
//!
//! Turns raw model outputs into discrete masks: an activation followed by a
//! discretization step.
//!
//! # Example
//!
//! ```
//! use anofox_ensemble::transform::{Activation, Discretization, PostTransform};
//! use ndarray::array;
//!
//! let logits = array![[[-2.0, 0.5, 3.0]]].into_dyn();
//! let post = PostTransform::new(Activation::Sigmoid, Discretization::Threshold(0.5));
//! let mask = post.apply(&logits).unwrap();
//! assert_eq!(mask, array![[[0u8, 1, 1]]].into_dyn());
//! ```

pub mod activation;
pub mod discrete;

pub use activation::{activate, sigmoid, softmax_channels, Activation};
pub use discrete::{argmax_channels, discretize, one_hot, threshold, Discretization};

use crate::error::Result;
use ndarray::{ArrayBase, ArrayD, Data, IxDyn};
use serde::{Deserialize, Serialize};

/// Activation followed by discretization.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostTransform {
    pub activation: Activation,
    pub discretization: Discretization,
}

impl PostTransform {
    pub fn new(activation: Activation, discretization: Discretization) -> Self {
        Self {
            activation,
            discretization,
        }
    }

    /// Apply the activation, then discretize.
    pub fn apply<S>(&self, pred: &ArrayBase<S, IxDyn>) -> Result<ArrayD<u8>>
    where
        S: Data<Elem = f64>,
    {
        let activated = activate(pred, self.activation)?;
        discretize(&activated, self.discretization)
    }
}
