//! Ensemble aggregation.
//!
//! Combines the predictions of several independently trained models into one.
//! Both aggregators are pure functions over an explicit stack of tensors:
//! - [`aggregate_mean`]: element-wise (optionally weighted) mean.
//! - [`aggregate_vote`]: element-wise majority vote over discrete labels.

mod mean;
mod vote;

pub use mean::{aggregate_mean, aggregate_mean_stacked};
pub use vote::{aggregate_vote, aggregate_vote_stacked, VoteLabel};

use serde::{Deserialize, Serialize};

/// Method for combining member predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMethod {
    /// Average raw predictions, then post-process the mean.
    #[default]
    Mean,
    /// Post-process each member, then take a majority vote.
    Vote,
}

impl CombinationMethod {
    /// Display name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            CombinationMethod::Mean => "Ensemble (Mean)",
            CombinationMethod::Vote => "Ensemble (Vote)",
        }
    }
}
