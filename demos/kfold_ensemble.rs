//! K-fold ensemble example.
//!
//! Run with: cargo run --example kfold_ensemble

use anofox_ensemble::config::EnsembleConfig;
use anofox_ensemble::ensemble::{aggregate_mean, aggregate_vote};
use anofox_ensemble::models::{BoxedPredictor, EnsembleEvaluator, FnPredictor, Sample};
use anofox_ensemble::prelude::MemberWeights;
use anofox_ensemble::utils::KFold;
use ndarray::{arr1, ArrayD, IxDyn};

/// Synthetic 1D "images": a foreground block whose position depends on the index.
fn make_dataset(n: usize, length: usize) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let start = i % (length / 2);
            let label: Vec<u8> = (0..length)
                .map(|x| u8::from(x >= start && x < start + length / 4))
                .collect();
            let input: Vec<f64> = label
                .iter()
                .enumerate()
                .map(|(x, &l)| f64::from(l) + 0.2 * ((x * 7 + i * 3) as f64).sin())
                .collect();
            Sample::new(
                ArrayD::from_shape_vec(IxDyn(&[1, 1, length]), input).unwrap(),
                ArrayD::from_shape_vec(IxDyn(&[1, 1, length]), label).unwrap(),
            )
        })
        .collect()
}

/// "Train" a threshold model: bias halfway between class means.
fn train(name: String, samples: &[Sample]) -> BoxedPredictor {
    let (mut fg, mut bg) = (Vec::new(), Vec::new());
    for s in samples {
        for (&x, &l) in s.input.iter().zip(s.label.iter()) {
            if l == 1 {
                fg.push(x);
            } else {
                bg.push(x);
            }
        }
    }
    let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len().max(1) as f64;
    let bias = (mean(&fg) + mean(&bg)) / 2.0;
    Box::new(FnPredictor::new(name, move |x: &ArrayD<f64>| {
        Ok(x.mapv(|v| 8.0 * (v - bias)))
    }))
}

fn main() {
    println!("=== K-Fold Ensemble Example ===\n");

    // 1. The two aggregators on their own
    println!("--- Aggregators ---");
    let stack = vec![
        arr1(&[1.0]).into_dyn(),
        arr1(&[3.0]).into_dyn(),
        arr1(&[2.0]).into_dyn(),
    ];
    let mean = aggregate_mean(&stack, None).unwrap();
    let weights = MemberWeights::per_member(vec![0.95, 0.94, 0.95]);
    let weighted = aggregate_mean(&stack, Some(&weights)).unwrap();
    println!("Mean of [1, 3, 2]:            {:.4}", mean[[0]]);
    println!("Weighted (0.95, 0.94, 0.95):  {:.4}", weighted[[0]]);

    let votes = vec![
        arr1(&[1u8, 1, 0]).into_dyn(),
        arr1(&[1u8, 0, 0]).into_dyn(),
        arr1(&[0u8, 1, 1]).into_dyn(),
    ];
    let voted = aggregate_vote(&votes).unwrap();
    println!("Majority vote:                {:?}\n", voted.as_slice().unwrap_or(&[]));

    // 2. Train one model per fold
    let length = 32;
    let train_set = make_dataset(40, length);
    let test_set = make_dataset(10, length);

    println!("--- Training (5 folds) ---");
    let splits = KFold::new(5).with_shuffle(42).split(train_set.len()).unwrap();
    let fold_sets: Vec<Vec<Sample>> = splits
        .iter()
        .map(|split| split.select(&train_set).unwrap().0)
        .collect();
    let build_members = || -> Vec<BoxedPredictor> {
        fold_sets
            .iter()
            .enumerate()
            .map(|(fold, samples)| train(format!("fold{}", fold), samples))
            .collect()
    };
    for (fold, samples) in fold_sets.iter().enumerate() {
        println!("  fold{}: {} training samples", fold, samples.len());
    }

    // 3. Ensemble evaluation
    println!("\n--- Evaluation on {} test samples ---", test_set.len());
    for config in [EnsembleConfig::mean(), EnsembleConfig::vote()] {
        let evaluator = EnsembleEvaluator::new(build_members()).with_config(config);
        let report = evaluator.evaluate(&test_set).unwrap();
        println!("{}", evaluator.name());
        for (name, score) in evaluator.member_names().iter().zip(&report.member_scores) {
            println!("  {:<6} mean dice: {:.4}", name, score);
        }
        println!("  ensemble mean dice: {:.4}\n", report.mean_score);
    }
}
