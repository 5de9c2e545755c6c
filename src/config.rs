//! Ensemble evaluation configuration.

use crate::core::MemberWeights;
use crate::ensemble::CombinationMethod;
use crate::error::{EnsembleError, Result};
use crate::transform::{Activation, Discretization, PostTransform};
use serde::{Deserialize, Serialize};

/// Configuration for combining and scoring ensemble predictions.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use anofox_ensemble::config::EnsembleConfig;
/// use anofox_ensemble::ensemble::CombinationMethod;
///
/// let config = EnsembleConfig::from_json(r#"{ "method": "vote" }"#).unwrap();
/// assert_eq!(config.method, CombinationMethod::Vote);
/// assert!(config.include_background);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// How member predictions are combined.
    pub method: CombinationMethod,
    /// Per-member weights for mean aggregation (e.g. fold validation scores).
    pub weights: Option<Vec<f64>>,
    /// Activation and discretization applied to predictions.
    pub post: PostTransform,
    /// Whether channel 0 counts towards the Dice score.
    pub include_background: bool,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            method: CombinationMethod::Mean,
            weights: None,
            post: PostTransform::default(),
            include_background: true,
        }
    }
}

impl EnsembleConfig {
    /// Mean aggregation with default post-processing.
    pub fn mean() -> Self {
        Self::default()
    }

    /// Majority-vote aggregation with default post-processing.
    pub fn vote() -> Self {
        Self {
            method: CombinationMethod::Vote,
            ..Self::default()
        }
    }

    /// Set per-member weights for mean aggregation.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the activation.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.post.activation = activation;
        self
    }

    /// Set the discretization.
    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.post.discretization = discretization;
        self
    }

    /// Set whether the background channel is scored.
    pub fn with_include_background(mut self, include: bool) -> Self {
        self.include_background = include;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EnsembleError::InvalidParameter(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter values.
    pub fn validate(&self) -> Result<()> {
        match self.post.discretization {
            Discretization::Threshold(t) if !t.is_finite() => {
                return Err(EnsembleError::InvalidParameter(format!(
                    "threshold must be finite, got {}",
                    t
                )));
            }
            Discretization::ArgmaxOneHot(0) => {
                return Err(EnsembleError::InvalidParameter(
                    "one-hot needs at least one class".to_string(),
                ));
            }
            _ => {}
        }
        if let Some(ref weights) = self.weights {
            if weights.iter().any(|w| !w.is_finite()) {
                return Err(EnsembleError::InvalidParameter(
                    "weights must be finite".to_string(),
                ));
            }
            if self.method == CombinationMethod::Vote {
                return Err(EnsembleError::InvalidParameter(
                    "weights only apply to mean aggregation".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Weights as [`MemberWeights`], if configured.
    pub fn member_weights(&self) -> Option<MemberWeights> {
        self.weights.clone().map(MemberWeights::per_member)
    }
}
