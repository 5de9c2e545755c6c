//! End-to-end K-fold ensembling workflow.
//!
//! Splits a synthetic segmentation dataset into folds, "trains" one simple
//! threshold model per fold, then evaluates the ensemble with mean, weighted
//! mean and majority-vote combination.

use anofox_ensemble::config::EnsembleConfig;
use anofox_ensemble::models::{BoxedPredictor, EnsembleEvaluator, FnPredictor, Sample};
use anofox_ensemble::transform::Activation;
use anofox_ensemble::utils::KFold;
use approx::assert_relative_eq;
use ndarray::{ArrayD, IxDyn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LENGTH: usize = 16;

/// Samples shaped (1, 1, LENGTH): foreground around 1.0, background around 0.0.
fn make_dataset(n: usize, seed: u64) -> Vec<Sample> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let label: Vec<u8> = (0..LENGTH)
                .map(|i| if i == 0 { 1 } else { u8::from(rng.gen_bool(0.4)) })
                .collect();
            let input: Vec<f64> = label
                .iter()
                .map(|&l| f64::from(l) + rng.gen_range(-0.3..0.3))
                .collect();
            Sample::new(
                ArrayD::from_shape_vec(IxDyn(&[1, 1, LENGTH]), input).unwrap(),
                ArrayD::from_shape_vec(IxDyn(&[1, 1, LENGTH]), label).unwrap(),
            )
        })
        .collect()
}

/// Fit a threshold halfway between the mean foreground and background values.
fn train_threshold_model(name: String, train: &[Sample]) -> BoxedPredictor {
    let (mut fg, mut bg) = ((0.0, 0usize), (0.0, 0usize));
    for sample in train {
        for (&x, &l) in sample.input.iter().zip(sample.label.iter()) {
            if l == 1 {
                fg = (fg.0 + x, fg.1 + 1);
            } else {
                bg = (bg.0 + x, bg.1 + 1);
            }
        }
    }
    let bias = (fg.0 / fg.1 as f64 + bg.0 / bg.1.max(1) as f64) / 2.0;
    Box::new(FnPredictor::new(name, move |x: &ArrayD<f64>| {
        Ok(x.mapv(|v| 10.0 * (v - bias)))
    }))
}

fn train_fold_models(dataset: &[Sample], folds: &KFold) -> Vec<BoxedPredictor> {
    folds
        .split(dataset.len())
        .unwrap()
        .iter()
        .map(|split| {
            let (train, _) = split.select(dataset).unwrap();
            train_threshold_model(format!("fold{}", split.fold), &train)
        })
        .collect()
}

#[test]
fn kfold_mean_ensemble_segments_test_set() {
    let train = make_dataset(20, 1);
    let test = make_dataset(8, 2);
    let members = train_fold_models(&train, &KFold::new(5));
    assert_eq!(members.len(), 5);

    let evaluator = EnsembleEvaluator::new(members).with_config(EnsembleConfig::mean());
    let report = evaluator.evaluate(&test).unwrap();

    assert_eq!(report.sample_scores.len(), 8);
    assert_relative_eq!(report.mean_score, 1.0, epsilon = 1e-12);
    assert!(report.member_scores.iter().all(|&s| (s - 1.0).abs() < 1e-12));
}

#[test]
fn kfold_vote_ensemble_segments_test_set() {
    let train = make_dataset(20, 3);
    let test = make_dataset(8, 4);
    let members = train_fold_models(&train, &KFold::new(5).with_shuffle(7));

    let evaluator = EnsembleEvaluator::new(members).with_config(EnsembleConfig::vote());
    let report = evaluator.evaluate(&test).unwrap();
    assert_relative_eq!(report.mean_score, 1.0, epsilon = 1e-12);
}

#[test]
fn validation_scores_as_mean_weights() {
    let train = make_dataset(20, 5);
    let test = make_dataset(6, 6);
    let folds = KFold::new(5);
    let splits = folds.split(train.len()).unwrap();

    // Score each fold model on its own held-out samples.
    let mut members = Vec::new();
    let mut weights = Vec::new();
    for split in &splits {
        let (fold_train, fold_val) = split.select(&train).unwrap();
        let member = train_threshold_model(format!("fold{}", split.fold), &fold_train);
        let single = EnsembleEvaluator::new(vec![member]);
        weights.push(single.evaluate(&fold_val).unwrap().mean_score);
        members.push(train_threshold_model(format!("fold{}", split.fold), &fold_train));
    }
    assert!(weights.iter().all(|w| w.is_finite() && *w > 0.0));

    let config = EnsembleConfig::mean().with_weights(weights);
    let evaluator = EnsembleEvaluator::new(members).with_config(config);
    let report = evaluator.evaluate(&test).unwrap();
    assert_relative_eq!(report.mean_score, 1.0, epsilon = 1e-12);
}

#[test]
fn vote_outvotes_a_broken_member() {
    let train = make_dataset(20, 8);
    let test = make_dataset(4, 9);
    let mut members = train_fold_models(&train, &KFold::new(4));
    members.push(Box::new(FnPredictor::new("all-foreground", |x: &ArrayD<f64>| {
        Ok(x.mapv(|_| 5.0))
    })));

    let evaluator = EnsembleEvaluator::new(members).with_config(EnsembleConfig::vote());
    let report = evaluator.evaluate(&test).unwrap();

    assert_relative_eq!(report.mean_score, 1.0, epsilon = 1e-12);
    assert!(report.member_scores[4] < 1.0);
}

#[test]
fn probabilities_can_skip_activation() {
    let member = |name: &str, p: f64| -> BoxedPredictor {
        Box::new(FnPredictor::new(name, move |x: &ArrayD<f64>| Ok(x.mapv(|_| p))))
    };
    let members = vec![member("a", 0.7), member("b", 0.2), member("c", 0.7)];
    let config = EnsembleConfig::mean().with_activation(Activation::None);
    let evaluator = EnsembleEvaluator::new(members).with_config(config);

    // mean 0.5333 -> foreground everywhere
    let mask = evaluator
        .predict(&ArrayD::zeros(IxDyn(&[1, 1, 4])))
        .unwrap();
    assert!(mask.iter().all(|&v| v == 1));
}
