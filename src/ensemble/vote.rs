//! Majority-vote aggregation of discrete ensemble predictions.
//!
//! Each output coordinate holds the label seen most often at that coordinate
//! across the ensemble members. When several labels tie for the highest count
//! the numerically largest one wins, so in binary segmentation a split vote
//! resolves to foreground.

use crate::core::{unstack, validate_stack};
use crate::error::{EnsembleError, Result};
use ndarray::{ArrayBase, ArrayD, Data, IxDyn};
use std::fmt::Debug;
use tracing::trace;

/// Element types that can take part in a majority vote.
///
/// Integer and boolean labels are always discrete. Floating-point labels are
/// discrete only when finite and integral, which covers one-hot masks and
/// class indices stored as floats.
pub trait VoteLabel: Copy + PartialEq + PartialOrd + Debug {
    /// Whether the value belongs to a discrete label set.
    fn is_discrete(&self) -> bool;

    /// Value as `f64`, for error reporting.
    fn to_f64(&self) -> f64;
}

macro_rules! impl_vote_label_int {
    ($($t:ty),*) => {
        $(
            impl VoteLabel for $t {
                #[inline]
                fn is_discrete(&self) -> bool {
                    true
                }

                #[inline]
                fn to_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

macro_rules! impl_vote_label_float {
    ($($t:ty),*) => {
        $(
            impl VoteLabel for $t {
                #[inline]
                fn is_discrete(&self) -> bool {
                    self.is_finite() && self.fract() == 0.0
                }

                #[inline]
                fn to_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_vote_label_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64);
impl_vote_label_float!(f32, f64);

impl VoteLabel for bool {
    #[inline]
    fn is_discrete(&self) -> bool {
        true
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        if *self {
            1.0
        } else {
            0.0
        }
    }
}

/// Per-coordinate majority vote across ensemble members.
///
/// # Errors
/// - [`EnsembleError::EmptyStack`] when the stack is empty.
/// - [`EnsembleError::ShapeMismatch`] when members differ in shape.
/// - [`EnsembleError::NonDiscreteInput`] when a member holds a value outside
///   the discrete label set (e.g. `0.5` or `NaN`).
///
/// # Example
///
/// ```
/// use anofox_ensemble::ensemble::aggregate_vote;
/// use ndarray::{arr1, ArrayD};
///
/// let stack: Vec<ArrayD<u8>> = vec![
///     arr1(&[1, 0, 1]).into_dyn(),
///     arr1(&[1, 0, 0]).into_dyn(),
///     arr1(&[0, 1, 0]).into_dyn(),
/// ];
/// let voted = aggregate_vote(&stack).unwrap();
/// assert_eq!(voted, arr1(&[1, 0, 0]).into_dyn());
/// ```
pub fn aggregate_vote<S, T>(stack: &[ArrayBase<S, IxDyn>]) -> Result<ArrayD<T>>
where
    S: Data<Elem = T>,
    T: VoteLabel,
{
    let shape = validate_stack(stack)?.to_vec();
    check_discrete(stack)?;

    trace!(members = stack.len(), "vote aggregation");

    let size: usize = shape.iter().product();
    let mut lanes: Vec<_> = stack.iter().map(|m| m.iter()).collect();
    let mut tally: Vec<(T, usize)> = Vec::with_capacity(stack.len());
    let mut voted = Vec::with_capacity(size);

    for _ in 0..size {
        tally.clear();
        for lane in lanes.iter_mut() {
            let value = *lane.next().ok_or_else(|| {
                EnsembleError::ComputationError("member exhausted before stack end".to_string())
            })?;
            match tally.iter_mut().find(|(label, _)| *label == value) {
                Some((_, count)) => *count += 1,
                None => tally.push((value, 1)),
            }
        }
        voted.push(majority(&tally).ok_or_else(|| {
            EnsembleError::ComputationError("no votes at coordinate".to_string())
        })?);
    }

    ArrayD::from_shape_vec(IxDyn(&shape), voted)
        .map_err(|e| EnsembleError::ComputationError(e.to_string()))
}

/// Majority vote over a pre-stacked tensor whose axis 0 indexes members.
pub fn aggregate_vote_stacked<S, T>(stacked: &ArrayBase<S, IxDyn>) -> Result<ArrayD<T>>
where
    S: Data<Elem = T>,
    T: VoteLabel,
{
    let members = unstack(stacked)?;
    aggregate_vote(&members)
}

fn check_discrete<S, T>(stack: &[ArrayBase<S, IxDyn>]) -> Result<()>
where
    S: Data<Elem = T>,
    T: VoteLabel,
{
    for (member, array) in stack.iter().enumerate() {
        if let Some(value) = array.iter().find(|v| !v.is_discrete()) {
            return Err(EnsembleError::NonDiscreteInput {
                member,
                value: value.to_f64(),
            });
        }
    }
    Ok(())
}

/// Label with the highest count; ties go to the largest label.
fn majority<T: VoteLabel>(tally: &[(T, usize)]) -> Option<T> {
    tally
        .iter()
        .copied()
        .reduce(|best, candidate| {
            if candidate.1 > best.1 || (candidate.1 == best.1 && candidate.0 > best.0) {
                candidate
            } else {
                best
            }
        })
        .map(|(label, _)| label)
}
