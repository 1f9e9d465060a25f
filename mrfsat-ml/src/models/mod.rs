//! Satisfiability classifiers
//!
//! Tree-based binary classifiers over dense feature rows:
//! - Decision trees with Gini or entropy splits
//! - Random forests (bagged trees with per-split feature sampling)
//!
//! Models serialize to JSON through [`Classifier::save`] and
//! [`Classifier::load`].

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{DecisionNode, DecisionTree, SplitCriterion, TreeConfig, TreeInfo};
pub use random_forest::{ForestConfig, RandomForest};

use mrfsat_core::Label;

/// Common trait for satisfiability classifiers
pub trait Classifier {
    /// Input feature dimension
    fn input_dim(&self) -> usize;

    /// Whether the model has been fitted or loaded
    fn is_fitted(&self) -> bool;

    /// Fit the model to labelled rows
    fn fit(&mut self, features: &[Vec<f64>], labels: &[Label]) -> ModelResult<()>;

    /// Probability that `input` is satisfiable
    fn predict_proba(&self, input: &[f64]) -> f64;

    /// Predicted label for `input`
    fn predict(&self, input: &[f64]) -> Label {
        Label::from_class(self.predict_proba(input))
    }

    /// Save model to bytes
    fn save(&self) -> ModelResult<Vec<u8>>;

    /// Load model from bytes
    fn load(&mut self, data: &[u8]) -> ModelResult<()>;
}

/// Check a training set before fitting
pub(crate) fn validate_training_set(
    features: &[Vec<f64>],
    labels: &[Label],
    input_dim: usize,
) -> ModelResult<()> {
    if features.is_empty() || labels.is_empty() {
        return Err(ModelError::EmptyInput);
    }
    if features.len() != labels.len() {
        return Err(ModelError::DimensionMismatch {
            expected: features.len(),
            got: labels.len(),
        });
    }
    for row in features {
        if row.len() != input_dim {
            return Err(ModelError::DimensionMismatch {
                expected: input_dim,
                got: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NumericalError(
                "training row contains NaN or infinite values".to_string(),
            ));
        }
    }
    Ok(())
}

/// ML model errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        got: usize,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Numerical error (NaN, Inf)
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Empty input
    #[error("Empty input provided")]
    EmptyInput,

    /// Model used before fitting
    #[error("Model has not been fitted")]
    NotFitted,
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
