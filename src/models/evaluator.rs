//! Ensemble evaluation over externally trained members.
//!
//! Runs every member on a sample, combines the member predictions with the
//! configured method, post-processes to a discrete mask and scores it with
//! mean Dice. Batches of samples are evaluated in parallel.

use crate::config::EnsembleConfig;
use crate::core::validate_stack;
use crate::ensemble::{aggregate_mean, aggregate_vote, CombinationMethod};
use crate::error::{EnsembleError, Result};
use crate::models::BoxedPredictor;
use crate::utils::{mean_dice, nan_mean};
use ndarray::ArrayD;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// One evaluation sample: model input and its ground-truth mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: ArrayD<f64>,
    pub label: ArrayD<u8>,
}

impl Sample {
    pub fn new(input: ArrayD<f64>, label: ArrayD<u8>) -> Self {
        Self { input, label }
    }
}

/// Scores from evaluating an ensemble on a batch of samples.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Mean Dice of the combined prediction, per sample, in sample order.
    pub sample_scores: Vec<f64>,
    /// Mean of `sample_scores`, ignoring unscorable (NaN) samples.
    pub mean_score: f64,
    /// Mean Dice of each member on its own, in member order.
    pub member_scores: Vec<f64>,
}

/// Ensemble of predictors combined by mean or majority vote.
pub struct EnsembleEvaluator {
    /// The ensemble members, in weight order.
    members: Vec<BoxedPredictor>,
    /// Combination and post-processing settings.
    config: EnsembleConfig,
}

impl EnsembleEvaluator {
    /// Create a new evaluator with the default (mean) configuration.
    pub fn new(members: Vec<BoxedPredictor>) -> Self {
        Self {
            members,
            config: EnsembleConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EnsembleConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// Get the number of members in the ensemble.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Get the member names, in member order.
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name()).collect()
    }

    /// Get the ensemble name.
    pub fn name(&self) -> &str {
        self.config.method.name()
    }

    /// Raw predictions of every member for one input, in member order.
    pub fn predict_members(&self, input: &ArrayD<f64>) -> Result<Vec<ArrayD<f64>>> {
        if self.members.is_empty() {
            return Err(EnsembleError::EmptyStack);
        }
        self.members.iter().map(|m| m.predict(input)).collect()
    }

    /// Combine raw member predictions into one discrete mask.
    ///
    /// Mean: average the raw predictions, then post-process.
    /// Vote: post-process each member, then take the majority.
    pub fn combine(&self, stack: &[ArrayD<f64>]) -> Result<ArrayD<u8>> {
        self.config.validate()?;
        validate_stack(stack)?;

        match self.config.method {
            CombinationMethod::Mean => {
                let weights = self.config.member_weights();
                let mean = aggregate_mean(stack, weights.as_ref())?;
                self.config.post.apply(&mean)
            }
            CombinationMethod::Vote => {
                let masks = stack
                    .iter()
                    .map(|p| self.config.post.apply(p))
                    .collect::<Result<Vec<_>>>()?;
                aggregate_vote(&masks)
            }
        }
    }

    /// Combined discrete prediction for one input.
    pub fn predict(&self, input: &ArrayD<f64>) -> Result<ArrayD<u8>> {
        let stack = self.predict_members(input)?;
        self.combine(&stack)
    }

    /// Evaluate the ensemble and each member on a batch of samples.
    pub fn evaluate(&self, samples: &[Sample]) -> Result<EvaluationReport> {
        if samples.is_empty() {
            return Err(EnsembleError::EmptyData);
        }
        if self.members.is_empty() {
            return Err(EnsembleError::EmptyStack);
        }
        self.config.validate()?;

        let include_background = self.config.include_background;
        let per_sample: Vec<(f64, Vec<f64>)> = samples
            .par_iter()
            .enumerate()
            .map(|(i, sample)| -> Result<(f64, Vec<f64>)> {
                let stack = self.predict_members(&sample.input)?;

                let member_scores = stack
                    .iter()
                    .map(|p| -> Result<f64> {
                        let mask = self.config.post.apply(p)?;
                        mean_dice(&mask, &sample.label, include_background)
                    })
                    .collect::<Result<Vec<f64>>>()?;

                let combined = self.combine(&stack)?;
                let score = mean_dice(&combined, &sample.label, include_background)?;

                if score.is_nan() {
                    warn!(sample = i, "sample has no scorable channel");
                } else {
                    debug!(sample = i, dice = score, "evaluated sample");
                }
                Ok((score, member_scores))
            })
            .collect::<Result<Vec<_>>>()?;

        let sample_scores: Vec<f64> = per_sample.iter().map(|(s, _)| *s).collect();
        let mean_score = nan_mean(&sample_scores);

        let member_scores: Vec<f64> = (0..self.members.len())
            .map(|m| {
                let scores: Vec<f64> = per_sample.iter().map(|(_, ms)| ms[m]).collect();
                nan_mean(&scores)
            })
            .collect();

        info!(
            method = self.name(),
            members = self.members.len(),
            samples = samples.len(),
            mean_dice = mean_score,
            "ensemble evaluation finished"
        );

        Ok(EvaluationReport {
            sample_scores,
            mean_score,
            member_scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FnPredictor;
    use crate::transform::{Activation, Discretization};
    use approx::assert_relative_eq;
    use ndarray::{array, ArrayD};

    /// Member that always predicts the given probabilities.
    fn constant(name: &str, probs: ArrayD<f64>) -> BoxedPredictor {
        Box::new(FnPredictor::new(name, move |_: &ArrayD<f64>| Ok(probs.clone())))
    }

    fn probability_config(method: CombinationMethod) -> EnsembleConfig {
        EnsembleConfig {
            method,
            ..EnsembleConfig::default()
        }
        .with_activation(Activation::None)
    }

    fn input() -> ArrayD<f64> {
        ArrayD::zeros(ndarray::IxDyn(&[1, 1, 3]))
    }

    fn members() -> Vec<BoxedPredictor> {
        vec![
            constant("fold0", array![[[0.9, 0.6, 0.1]]].into_dyn()),
            constant("fold1", array![[[0.8, 0.2, 0.4]]].into_dyn()),
            constant("fold2", array![[[0.1, 0.3, 0.45]]].into_dyn()),
        ]
    }

    #[test]
    fn mean_then_threshold() {
        let evaluator =
            EnsembleEvaluator::new(members()).with_config(probability_config(CombinationMethod::Mean));
        // means: 0.6, 0.3667, 0.3167
        let mask = evaluator.predict(&input()).unwrap();
        assert_eq!(mask, array![[[1u8, 0, 0]]].into_dyn());
    }

    #[test]
    fn threshold_then_vote() {
        let evaluator =
            EnsembleEvaluator::new(members()).with_config(probability_config(CombinationMethod::Vote));
        // masks: [1,1,0], [1,0,0], [0,0,0]
        let mask = evaluator.predict(&input()).unwrap();
        assert_eq!(mask, array![[[1u8, 0, 0]]].into_dyn());
    }

    #[test]
    fn weighted_mean_uses_config_weights() {
        let config = probability_config(CombinationMethod::Mean).with_weights(vec![0.0, 0.0, 3.0]);
        let evaluator = EnsembleEvaluator::new(members()).with_config(config);
        // third member only: 3 * [0.1, 0.3, 0.45] / 3
        let mask = evaluator.predict(&input()).unwrap();
        assert_eq!(mask, array![[[0u8, 0, 0]]].into_dyn());
    }

    #[test]
    fn weight_count_mismatch_propagates() {
        let config = probability_config(CombinationMethod::Mean).with_weights(vec![1.0, 1.0]);
        let evaluator = EnsembleEvaluator::new(members()).with_config(config);
        assert!(matches!(
            evaluator.predict(&input()),
            Err(EnsembleError::WeightShapeMismatch { .. })
        ));
    }

    #[test]
    fn empty_ensemble() {
        let evaluator = EnsembleEvaluator::new(vec![]);
        assert_eq!(evaluator.predict(&input()), Err(EnsembleError::EmptyStack));
    }

    #[test]
    fn member_failure_propagates() {
        let mut members = members();
        members.push(Box::new(FnPredictor::new("broken", |_: &ArrayD<f64>| {
            Err(EnsembleError::ComputationError("out of memory".to_string()))
        })));
        let evaluator = EnsembleEvaluator::new(members);
        assert_eq!(
            evaluator.predict(&input()),
            Err(EnsembleError::ComputationError("out of memory".to_string()))
        );
    }

    #[test]
    fn member_shape_mismatch_is_reported() {
        let mut members = members();
        members.push(constant("odd", array![[[0.5, 0.5]]].into_dyn()));
        let evaluator = EnsembleEvaluator::new(members);
        assert!(matches!(
            evaluator.predict(&input()),
            Err(EnsembleError::ShapeMismatch { member: 3, .. })
        ));
    }

    #[test]
    fn evaluate_reports_scores_in_order() {
        let evaluator =
            EnsembleEvaluator::new(members()).with_config(probability_config(CombinationMethod::Mean));
        let samples = vec![
            Sample::new(input(), array![[[1u8, 0, 0]]].into_dyn()),
            Sample::new(input(), array![[[1u8, 1, 0]]].into_dyn()),
        ];

        let report = evaluator.evaluate(&samples).unwrap();
        assert_eq!(report.sample_scores.len(), 2);
        assert_relative_eq!(report.sample_scores[0], 1.0);
        // pred [1,0,0] vs label [1,1,0]: 2*1 / (1+2)
        assert_relative_eq!(report.sample_scores[1], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(report.mean_score, (1.0 + 2.0 / 3.0) / 2.0, epsilon = 1e-12);

        assert_eq!(report.member_scores.len(), 3);
        // fold0 mask [1,1,0]: sample0 2/3, sample1 1.0
        assert_relative_eq!(report.member_scores[0], (2.0 / 3.0 + 1.0) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn evaluate_empty_samples() {
        let evaluator = EnsembleEvaluator::new(members());
        assert!(matches!(
            evaluator.evaluate(&[]),
            Err(EnsembleError::EmptyData)
        ));
    }

    #[test]
    fn predict_rejects_weights_with_vote() {
        let config = EnsembleConfig::vote().with_weights(vec![100.0, 0.0, 0.0]);
        let evaluator = EnsembleEvaluator::new(members()).with_config(config);
        assert!(matches!(
            evaluator.predict(&input()),
            Err(EnsembleError::InvalidParameter(_))
        ));
    }

    #[test]
    fn predict_rejects_nan_threshold() {
        let config = probability_config(CombinationMethod::Mean)
            .with_discretization(Discretization::Threshold(f64::NAN));
        let evaluator = EnsembleEvaluator::new(members()).with_config(config);
        assert!(matches!(
            evaluator.predict(&input()),
            Err(EnsembleError::InvalidParameter(_))
        ));

        let stack = evaluator.predict_members(&input()).unwrap();
        assert!(matches!(
            evaluator.combine(&stack),
            Err(EnsembleError::InvalidParameter(_))
        ));
    }

    #[test]
    fn evaluate_rejects_invalid_config() {
        let config = EnsembleConfig::vote().with_weights(vec![1.0, 1.0, 1.0]);
        let evaluator = EnsembleEvaluator::new(members()).with_config(config);
        let samples = vec![Sample::new(input(), array![[[1u8, 0, 0]]].into_dyn())];
        assert!(matches!(
            evaluator.evaluate(&samples),
            Err(EnsembleError::InvalidParameter(_))
        ));
    }

    #[test]
    fn softmax_argmax_pipeline() {
        // Two-channel logits: background vs foreground
        let members: Vec<BoxedPredictor> = vec![
            constant("a", array![[[2.0, 0.0], [0.0, 1.0]]].into_dyn()),
            constant("b", array![[[0.0, 0.0], [1.0, 3.0]]].into_dyn()),
        ];
        let config = EnsembleConfig::mean()
            .with_activation(Activation::Softmax)
            .with_discretization(Discretization::ArgmaxOneHot(2));
        let evaluator = EnsembleEvaluator::new(members).with_config(config);

        // mean logits: channel0 [1.0, 0.0], channel1 [0.5, 2.0]
        let mask = evaluator.predict(&ArrayD::zeros(ndarray::IxDyn(&[1, 2, 2]))).unwrap();
        assert_eq!(mask, array![[[1u8, 0], [0, 1]]].into_dyn());
    }

    #[test]
    fn names() {
        let evaluator = EnsembleEvaluator::new(members());
        assert_eq!(evaluator.name(), "Ensemble (Mean)");
        assert_eq!(evaluator.member_count(), 3);
        assert_eq!(evaluator.member_names(), vec!["fold0", "fold1", "fold2"]);
    }
}
