//! Ensemble stack validation and unstacking.
//!
//! An ensemble stack is an ordered slice of prediction tensors, one per
//! ensemble member, all with the same shape. Member order matters only for
//! aligning per-member weights.

use crate::error::{EnsembleError, Result};
use ndarray::{ArrayBase, ArrayView, Axis, Data, IxDyn};

/// Check that the stack is non-empty and that every member shares the shape
/// of member 0.
///
/// Returns the common member shape.
///
/// # Example
///
/// ```
/// use anofox_ensemble::core::validate_stack;
/// use ndarray::{ArrayD, IxDyn};
///
/// let a = ArrayD::<f64>::zeros(IxDyn(&[1, 2, 4]));
/// let b = ArrayD::<f64>::ones(IxDyn(&[1, 2, 4]));
/// let stack = [a, b];
/// assert_eq!(validate_stack(&stack).unwrap(), &[1, 2, 4]);
/// ```
pub fn validate_stack<S, A>(stack: &[ArrayBase<S, IxDyn>]) -> Result<&[usize]>
where
    S: Data<Elem = A>,
{
    let first = stack.first().ok_or(EnsembleError::EmptyStack)?;
    let expected = first.shape();

    for (member, array) in stack.iter().enumerate().skip(1) {
        if array.shape() != expected {
            return Err(EnsembleError::ShapeMismatch {
                member,
                expected: expected.to_vec(),
                got: array.shape().to_vec(),
            });
        }
    }

    Ok(expected)
}

/// Split a pre-stacked tensor into member views along axis 0.
///
/// A tensor of shape `(E, B, C, ...)` yields E views of shape `(B, C, ...)`.
/// An extent of 0 along axis 0 yields an empty stack.
pub fn unstack<S, A>(stacked: &ArrayBase<S, IxDyn>) -> Result<Vec<ArrayView<'_, A, IxDyn>>>
where
    S: Data<Elem = A>,
{
    if stacked.ndim() == 0 {
        return Err(EnsembleError::InvalidParameter(
            "stacked tensor must have a member axis".to_string(),
        ));
    }
    Ok(stacked.axis_iter(Axis(0)).collect())
}
