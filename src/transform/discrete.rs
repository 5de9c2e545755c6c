//! Discretization of continuous predictions into label masks.

use crate::error::{EnsembleError, Result};
use ndarray::{Array, ArrayBase, ArrayD, Axis, Data, Dimension, IxDyn};
use serde::{Deserialize, Serialize};

/// How continuous predictions become discrete labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discretization {
    /// 1 where the value is at or above the threshold, else 0.
    Threshold(f64),
    /// Class index of the largest channel, kept as a single channel.
    Argmax,
    /// Argmax followed by one-hot expansion to the given number of classes.
    ArgmaxOneHot(usize),
}

impl Default for Discretization {
    fn default() -> Self {
        Self::Threshold(0.5)
    }
}

/// Binarize with `value >= threshold`.
///
/// # Example
///
/// ```
/// use anofox_ensemble::transform::threshold;
/// use ndarray::arr1;
///
/// let mask = threshold(&arr1(&[0.2, 0.5, 0.9]), 0.5);
/// assert_eq!(mask, arr1(&[0u8, 1, 1]));
/// ```
pub fn threshold<S, D>(pred: &ArrayBase<S, D>, threshold: f64) -> Array<u8, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    pred.mapv(|x| u8::from(x >= threshold))
}

/// Class index of the largest channel of a `(B, C, ...)` tensor.
///
/// Output keeps a channel axis of extent 1. Ties go to the lowest channel.
pub fn argmax_channels<S>(pred: &ArrayBase<S, IxDyn>) -> Result<ArrayD<u8>>
where
    S: Data<Elem = f64>,
{
    if pred.ndim() < 2 {
        return Err(EnsembleError::InvalidParameter(format!(
            "argmax needs a channel axis, got rank {}",
            pred.ndim()
        )));
    }
    let channels = pred.len_of(Axis(1));
    if channels == 0 || channels > usize::from(u8::MAX) + 1 {
        return Err(EnsembleError::InvalidParameter(format!(
            "argmax supports 1..=256 channels, got {}",
            channels
        )));
    }

    let labels = pred.map_axis(Axis(1), |lane| {
        let (best, _) = lane
            .iter()
            .enumerate()
            .fold((0usize, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
                if v > bv {
                    (i, v)
                } else {
                    (bi, bv)
                }
            });
        best as u8
    });

    Ok(labels.insert_axis(Axis(1)))
}

/// Expand single-channel class labels into `num_classes` one-hot channels.
pub fn one_hot<S>(labels: &ArrayBase<S, IxDyn>, num_classes: usize) -> Result<ArrayD<u8>>
where
    S: Data<Elem = u8>,
{
    if labels.ndim() < 2 || labels.len_of(Axis(1)) != 1 {
        return Err(EnsembleError::InvalidParameter(format!(
            "one-hot needs labels shaped (B, 1, ...), got {:?}",
            labels.shape()
        )));
    }

    let mut shape = labels.shape().to_vec();
    shape[1] = num_classes;
    let mut out = ArrayD::<u8>::zeros(IxDyn(&shape));

    for (idx, &label) in labels.index_axis(Axis(1), 0).indexed_iter() {
        let label = usize::from(label);
        if label >= num_classes {
            return Err(EnsembleError::InvalidParameter(format!(
                "label {} out of range for {} classes",
                label, num_classes
            )));
        }
        let coords = idx.slice();
        let mut full = Vec::with_capacity(coords.len() + 1);
        full.push(coords[0]);
        full.push(label);
        full.extend_from_slice(&coords[1..]);
        out[IxDyn(&full)] = 1;
    }

    Ok(out)
}

/// Discretize a prediction tensor.
pub fn discretize<S>(pred: &ArrayBase<S, IxDyn>, method: Discretization) -> Result<ArrayD<u8>>
where
    S: Data<Elem = f64>,
{
    match method {
        Discretization::Threshold(t) => Ok(threshold(pred, t)),
        Discretization::Argmax => argmax_channels(pred),
        Discretization::ArgmaxOneHot(num_classes) => one_hot(&argmax_channels(pred)?, num_classes),
    }
}
