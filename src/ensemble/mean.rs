//! Mean aggregation of ensemble predictions.
//!
//! Computes `(1/E) * Σ_i w_i * stack[i]` element-wise. Weights are literal
//! factors: they are not normalized and the weighted sum is divided by the
//! member count E, not by the sum of the weights. Passing per-fold validation
//! scores as weights therefore boosts members relative to each other without
//! turning the result into a convex combination.

use crate::core::{unstack, validate_stack, MemberWeights, ResolvedWeights};
use crate::error::Result;
use ndarray::{ArrayBase, ArrayD, ArrayView, Axis, Data, IxDyn, Zip};
use tracing::trace;

/// Element-wise (optionally weighted) mean across ensemble members.
///
/// Members are accumulated in stack order (0..E-1) into a single `f64`
/// accumulator, so results are reproducible run to run and peak extra memory
/// is one member's worth.
///
/// # Errors
/// - [`EnsembleError::EmptyStack`](crate::EnsembleError::EmptyStack) when the stack is empty.
/// - [`EnsembleError::ShapeMismatch`](crate::EnsembleError::ShapeMismatch) when members differ in shape.
/// - [`EnsembleError::WeightShapeMismatch`](crate::EnsembleError::WeightShapeMismatch) when the
///   weights are not rank 1 `(E)` or rank 3 `(E, B, C)`.
///
/// # Example
///
/// ```
/// use anofox_ensemble::ensemble::aggregate_mean;
/// use anofox_ensemble::core::MemberWeights;
/// use ndarray::{arr1, ArrayD};
///
/// let stack: Vec<ArrayD<f64>> = vec![
///     arr1(&[1.0]).into_dyn(),
///     arr1(&[3.0]).into_dyn(),
///     arr1(&[2.0]).into_dyn(),
/// ];
///
/// let mean = aggregate_mean(&stack, None).unwrap();
/// assert!((mean[[0]] - 2.0).abs() < 1e-12);
///
/// let weights = MemberWeights::per_member(vec![0.95, 0.94, 0.95]);
/// let weighted = aggregate_mean(&stack, Some(&weights)).unwrap();
/// assert!((weighted[[0]] - 1.89).abs() < 1e-12);
/// ```
pub fn aggregate_mean<S, A>(
    stack: &[ArrayBase<S, IxDyn>],
    weights: Option<&MemberWeights>,
) -> Result<ArrayD<f64>>
where
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
{
    let shape = validate_stack(stack)?.to_vec();
    let resolved = weights
        .map(|w| w.resolve(stack.len(), &shape))
        .transpose()?;

    trace!(
        members = stack.len(),
        weighted = resolved.is_some(),
        "mean aggregation"
    );

    let mut acc = ArrayD::<f64>::zeros(IxDyn(&shape));
    for (member, array) in stack.iter().enumerate() {
        accumulate(&mut acc, array.view(), member, resolved);
    }

    let n = stack.len() as f64;
    acc.mapv_inplace(|v| v / n);
    Ok(acc)
}

/// Mean aggregation over a pre-stacked tensor whose axis 0 indexes members.
///
/// A tensor of shape `(E, B, C, ...)` produces a result of shape `(B, C, ...)`.
pub fn aggregate_mean_stacked<S, A>(
    stacked: &ArrayBase<S, IxDyn>,
    weights: Option<&MemberWeights>,
) -> Result<ArrayD<f64>>
where
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
{
    let members = unstack(stacked)?;
    aggregate_mean(&members, weights)
}

fn accumulate<A>(
    acc: &mut ArrayD<f64>,
    array: ArrayView<'_, A, IxDyn>,
    member: usize,
    weights: Option<ResolvedWeights<'_>>,
) where
    A: Copy + Into<f64>,
{
    match weights {
        None => {
            Zip::from(acc).and(&array).for_each(|a, &x| *a += Into::<f64>::into(x));
        }
        Some(ResolvedWeights::PerMember(w)) => {
            let factor = w[member];
            Zip::from(acc)
                .and(&array)
                .for_each(|a, &x| *a += factor * Into::<f64>::into(x));
        }
        Some(resolved @ ResolvedWeights::PerChannel(_)) => {
            for (b, (mut acc_b, array_b)) in acc
                .axis_iter_mut(Axis(0))
                .zip(array.axis_iter(Axis(0)))
                .enumerate()
            {
                for (c, (acc_bc, array_bc)) in acc_b
                    .axis_iter_mut(Axis(0))
                    .zip(array_b.axis_iter(Axis(0)))
                    .enumerate()
                {
                    let factor = resolved.factor(member, b, c);
                    Zip::from(acc_bc)
                        .and(array_bc)
                        .for_each(|a, &x| *a += factor * Into::<f64>::into(x));
                }
            }
        }
    }
}
