//! K-fold partitioning for training ensemble members.
//!
//! Each fold holds out a contiguous block of (optionally shuffled) sample
//! indices for validation and trains on the rest. Training one model per fold
//! yields the members of a K-fold ensemble.

use crate::error::{EnsembleError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Configuration for K-fold partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KFold {
    /// Number of folds (and ensemble members).
    pub n_splits: usize,
    /// Seed for shuffling sample order before partitioning; `None` keeps order.
    pub shuffle_seed: Option<u64>,
}

impl Default for KFold {
    fn default() -> Self {
        Self {
            n_splits: 5,
            shuffle_seed: None,
        }
    }
}

/// Train/validation indices of one fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit {
    /// Index of this fold.
    pub fold: usize,
    /// Training sample indices.
    pub train: Vec<usize>,
    /// Held-out validation sample indices.
    pub validation: Vec<usize>,
}

impl FoldSplit {
    /// Clone the training and validation items out of `items`.
    ///
    /// Returns an error if an index is out of bounds.
    pub fn select<T: Clone>(&self, items: &[T]) -> Result<(Vec<T>, Vec<T>)> {
        let pick = |indices: &[usize]| -> Result<Vec<T>> {
            indices
                .iter()
                .map(|&i| {
                    items.get(i).cloned().ok_or_else(|| {
                        EnsembleError::InvalidParameter(format!(
                            "fold index {} out of bounds for {} items",
                            i,
                            items.len()
                        ))
                    })
                })
                .collect()
        };
        Ok((pick(&self.train)?, pick(&self.validation)?))
    }
}

impl KFold {
    /// Create a K-fold configuration without shuffling.
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle_seed: None,
        }
    }

    /// Shuffle samples with the given seed before partitioning.
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Generate the train/validation splits for `n_samples` samples.
    ///
    /// Fold `i` validates on positions `[i*n/k, (i+1)*n/k)` of the (shuffled)
    /// sample order and trains on every other position, in order.
    ///
    /// # Example
    ///
    /// ```
    /// use anofox_ensemble::utils::KFold;
    ///
    /// let splits = KFold::new(5).split(10).unwrap();
    /// assert_eq!(splits.len(), 5);
    /// assert_eq!(splits[1].validation, vec![2, 3]);
    /// assert_eq!(splits[1].train.len(), 8);
    /// ```
    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        if self.n_splits < 2 {
            return Err(EnsembleError::InvalidParameter(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(EnsembleError::InvalidParameter(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, self.n_splits
            )));
        }

        let mut order: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.shuffle_seed {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }

        let k = self.n_splits;
        let splits = (0..k)
            .map(|fold| {
                let start = fold * n_samples / k;
                let end = (fold + 1) * n_samples / k;
                let validation = order[start..end].to_vec();
                let train = order[..start]
                    .iter()
                    .chain(order[end..].iter())
                    .copied()
                    .collect();
                FoldSplit {
                    fold,
                    train,
                    validation,
                }
            })
            .collect();

        Ok(splits)
    }
}
