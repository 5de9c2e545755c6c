//! Per-member weights for mean aggregation.

use crate::error::{EnsembleError, Result};
use ndarray::{Array1, Array3, ArrayD, ArrayView1, ArrayView3, Ix1, Ix3};

/// Weights applied as literal multiplicative factors to ensemble members.
///
/// Two layouts are supported:
/// - rank 1, shape `(E)`: one weight per member.
/// - rank 3, shape `(E, B, C)`: one weight per member, batch item and channel,
///   broadcast over the spatial dimensions. `B` and `C` may be 1 to broadcast
///   over the batch or channel axis.
///
/// Weights are not normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberWeights {
    weights: ArrayD<f64>,
}

/// Weights checked against a concrete stack.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ResolvedWeights<'a> {
    PerMember(ArrayView1<'a, f64>),
    PerChannel(ArrayView3<'a, f64>),
}

impl MemberWeights {
    /// One weight per ensemble member.
    pub fn per_member(weights: Vec<f64>) -> Self {
        Self {
            weights: Array1::from(weights).into_dyn(),
        }
    }

    /// Weights indexed by (member, batch, channel).
    pub fn per_channel(weights: Array3<f64>) -> Self {
        Self {
            weights: weights.into_dyn(),
        }
    }

    /// Wrap an arbitrary array. The layout is checked when aggregating.
    pub fn from_array(weights: ArrayD<f64>) -> Self {
        Self { weights }
    }

    /// Get the underlying weight array.
    pub fn as_array(&self) -> &ArrayD<f64> {
        &self.weights
    }

    /// Get the shape of the weight array.
    pub fn shape(&self) -> &[usize] {
        self.weights.shape()
    }

    /// Check the weights against a stack of `n_members` tensors of `member_shape`.
    pub(crate) fn resolve(
        &self,
        n_members: usize,
        member_shape: &[usize],
    ) -> Result<ResolvedWeights<'_>> {
        let mismatch = || EnsembleError::WeightShapeMismatch {
            expected_members: n_members,
            got: self.weights.shape().to_vec(),
        };

        let shape = self.weights.shape();
        if shape.first() != Some(&n_members) {
            return Err(mismatch());
        }

        match shape.len() {
            1 => {
                let view = self
                    .weights
                    .view()
                    .into_dimensionality::<Ix1>()
                    .map_err(|_| mismatch())?;
                Ok(ResolvedWeights::PerMember(view))
            }
            3 => {
                if member_shape.len() < 2 {
                    return Err(mismatch());
                }
                let broadcastable = |w: usize, m: usize| w == m || w == 1;
                if !broadcastable(shape[1], member_shape[0])
                    || !broadcastable(shape[2], member_shape[1])
                {
                    return Err(mismatch());
                }
                let view = self
                    .weights
                    .view()
                    .into_dimensionality::<Ix3>()
                    .map_err(|_| mismatch())?;
                Ok(ResolvedWeights::PerChannel(view))
            }
            _ => Err(mismatch()),
        }
    }
}

impl From<Vec<f64>> for MemberWeights {
    fn from(weights: Vec<f64>) -> Self {
        Self::per_member(weights)
    }
}

impl ResolvedWeights<'_> {
    /// Weight of `member` for the given batch item and channel.
    #[inline]
    pub(crate) fn factor(&self, member: usize, batch: usize, channel: usize) -> f64 {
        match self {
            ResolvedWeights::PerMember(w) => w[member],
            ResolvedWeights::PerChannel(w) => {
                let (_, nb, nc) = w.dim();
                let b = if nb == 1 { 0 } else { batch };
                let c = if nc == 1 { 0 } else { channel };
                w[[member, b, c]]
            }
        }
    }
}
