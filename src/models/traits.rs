//! Predictor trait defining the interface to ensemble members.

use crate::error::Result;
use ndarray::ArrayD;

/// A trained model that maps an input tensor to a prediction tensor.
///
/// Training, architectures and device placement live outside this crate;
/// an ensemble only needs each member's prediction for a given input.
/// Predictors are shared across threads during batch evaluation.
///
/// This trait is object-safe and can be used with `Box<dyn Predictor>`.
pub trait Predictor: Send + Sync {
    /// Predict raw (pre-activation) outputs for one input, shaped `(B, C, ...)`.
    fn predict(&self, input: &ArrayD<f64>) -> Result<ArrayD<f64>>;

    /// Get the member name.
    fn name(&self) -> &str;
}

/// Type alias for boxed predictor trait objects.
pub type BoxedPredictor = Box<dyn Predictor>;

/// Predictor backed by a closure.
///
/// # Example
///
/// ```
/// use anofox_ensemble::models::{FnPredictor, Predictor};
/// use ndarray::{arr1, ArrayD};
///
/// let double = FnPredictor::new("double", |x: &ArrayD<f64>| Ok(x * 2.0));
/// let out = double.predict(&arr1(&[1.0, 2.0]).into_dyn()).unwrap();
/// assert_eq!(out, arr1(&[2.0, 4.0]).into_dyn());
/// assert_eq!(double.name(), "double");
/// ```
pub struct FnPredictor<F> {
    name: String,
    predict: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&ArrayD<f64>) -> Result<ArrayD<f64>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, predict: F) -> Self {
        Self {
            name: name.into(),
            predict,
        }
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(&ArrayD<f64>) -> Result<ArrayD<f64>> + Send + Sync,
{
    fn predict(&self, input: &ArrayD<f64>) -> Result<ArrayD<f64>> {
        (self.predict)(input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
