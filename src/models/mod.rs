//! Ensemble members and their evaluation.

mod traits;

pub mod evaluator;

pub use evaluator::{EnsembleEvaluator, EvaluationReport, Sample};
pub use traits::{BoxedPredictor, FnPredictor, Predictor};
