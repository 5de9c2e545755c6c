//! Utilities around ensemble training and scoring.

pub mod folds;
pub mod metrics;

pub use folds::{FoldSplit, KFold};
pub use metrics::{dice_per_channel, mean_dice, nan_mean};
