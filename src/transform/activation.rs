//! Activation functions applied to raw model outputs.

use crate::error::{EnsembleError, Result};
use ndarray::{Array, ArrayBase, ArrayD, Axis, Data, Dimension, IxDyn};
use serde::{Deserialize, Serialize};

/// Activation applied before discretization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Leave values unchanged.
    None,
    /// Element-wise logistic sigmoid.
    #[default]
    Sigmoid,
    /// Softmax across the channel axis (axis 1).
    Softmax,
}

/// Element-wise logistic sigmoid.
///
/// # Example
///
/// ```
/// use anofox_ensemble::transform::sigmoid;
/// use ndarray::arr1;
///
/// let p = sigmoid(&arr1(&[0.0, 100.0]));
/// assert!((p[0] - 0.5).abs() < 1e-12);
/// assert!(p[1] > 0.999);
/// ```
pub fn sigmoid<S, D>(pred: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    pred.mapv(|x| 1.0 / (1.0 + (-x).exp()))
}

/// Softmax across the channel axis of a `(B, C, ...)` tensor.
///
/// The per-position channel maximum is subtracted before exponentiation.
pub fn softmax_channels<S>(pred: &ArrayBase<S, IxDyn>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
{
    if pred.ndim() < 2 {
        return Err(EnsembleError::InvalidParameter(format!(
            "softmax needs a channel axis, got rank {}",
            pred.ndim()
        )));
    }

    let max = pred
        .fold_axis(Axis(1), f64::NEG_INFINITY, |&m, &x| m.max(x))
        .insert_axis(Axis(1));

    let mut out = pred.to_owned();
    out.zip_mut_with(&max, |v, &m| *v = (*v - m).exp());

    let sum = out.sum_axis(Axis(1)).insert_axis(Axis(1));
    out.zip_mut_with(&sum, |v, &s| *v /= s);
    Ok(out)
}

/// Apply an activation to a prediction tensor.
pub fn activate<S>(pred: &ArrayBase<S, IxDyn>, activation: Activation) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
{
    match activation {
        Activation::None => Ok(pred.to_owned()),
        Activation::Sigmoid => Ok(sigmoid(pred)),
        Activation::Softmax => softmax_channels(pred),
    }
}
