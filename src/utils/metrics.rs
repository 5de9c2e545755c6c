//! Overlap metrics for scoring segmentation masks.

use crate::error::{EnsembleError, Result};
use ndarray::{ArrayBase, Axis, Data, IxDyn, Zip};

/// Dice coefficient per channel of binary `(B, C, ...)` masks.
///
/// Each channel is scored over all batch items and spatial positions:
/// `2 |P ∩ L| / (|P| + |L|)`, where any non-zero value counts as foreground.
/// Channels with an empty label are not scorable and yield `None`.
pub fn dice_per_channel<S1, S2>(
    pred: &ArrayBase<S1, IxDyn>,
    label: &ArrayBase<S2, IxDyn>,
) -> Result<Vec<Option<f64>>>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
{
    if pred.shape() != label.shape() {
        return Err(EnsembleError::ShapeMismatch {
            member: 0,
            expected: label.shape().to_vec(),
            got: pred.shape().to_vec(),
        });
    }
    if pred.ndim() < 2 {
        return Err(EnsembleError::InvalidParameter(format!(
            "dice needs (B, C, ...) masks, got rank {}",
            pred.ndim()
        )));
    }

    let channels = pred.len_of(Axis(1));
    let mut scores = Vec::with_capacity(channels);

    for c in 0..channels {
        let p = pred.index_axis(Axis(1), c);
        let l = label.index_axis(Axis(1), c);

        let mut intersection = 0usize;
        let mut pred_count = 0usize;
        let mut label_count = 0usize;
        Zip::from(&p).and(&l).for_each(|&pv, &lv| {
            let (pv, lv) = (pv != 0, lv != 0);
            pred_count += usize::from(pv);
            label_count += usize::from(lv);
            intersection += usize::from(pv && lv);
        });

        scores.push(if label_count == 0 {
            None
        } else {
            Some(2.0 * intersection as f64 / (pred_count + label_count) as f64)
        });
    }

    Ok(scores)
}

/// Mean Dice over scorable channels.
///
/// Channel 0 is skipped when `include_background` is false. Returns NaN when
/// no channel has a non-empty label.
///
/// # Example
///
/// ```
/// use anofox_ensemble::utils::mean_dice;
/// use ndarray::array;
///
/// let pred = array![[[1u8, 1, 0, 0]]].into_dyn();
/// let label = array![[[1u8, 0, 0, 0]]].into_dyn();
/// let dice = mean_dice(&pred, &label, true).unwrap();
/// assert!((dice - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn mean_dice<S1, S2>(
    pred: &ArrayBase<S1, IxDyn>,
    label: &ArrayBase<S2, IxDyn>,
    include_background: bool,
) -> Result<f64>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
{
    let skip = usize::from(!include_background);
    let scored: Vec<f64> = dice_per_channel(pred, label)?
        .into_iter()
        .skip(skip)
        .flatten()
        .collect();

    Ok(nan_mean(&scored))
}

/// Mean of the non-NaN values; NaN when there are none.
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
