//! Holdout splitting and evaluation

use crate::models::{Classifier, ModelError, ModelResult};
use mrfsat_core::Label;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Train/test partition of a labelled matrix
#[derive(Debug, Clone, Default)]
pub struct HoldoutSplit {
    /// Training rows
    pub train_x: Vec<Vec<f64>>,
    /// Training labels
    pub train_y: Vec<Label>,
    /// Test rows
    pub test_x: Vec<Vec<f64>>,
    /// Test labels
    pub test_y: Vec<Label>,
}

/// Shuffle and split rows, holding out `ceil(n * test_fraction)` for testing
pub fn holdout_split(
    x: &[Vec<f64>],
    y: &[Label],
    test_fraction: f64,
    seed: Option<u64>,
) -> ModelResult<HoldoutSplit> {
    if x.len() != y.len() {
        return Err(ModelError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(ModelError::InvalidConfig(format!(
            "test fraction must be in [0, 1), got {test_fraction}"
        )));
    }

    let n = x.len();
    let test_size = ((n as f64) * test_fraction).ceil() as usize;
    if test_size >= n && n > 0 {
        return Err(ModelError::InvalidConfig(format!(
            "holding out {test_size} of {n} rows leaves nothing to train on"
        )));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);

    let mut split = HoldoutSplit::default();
    for (pos, &i) in order.iter().enumerate() {
        if pos < test_size {
            split.test_x.push(x[i].clone());
            split.test_y.push(y[i]);
        } else {
            split.train_x.push(x[i].clone());
            split.train_y.push(y[i]);
        }
    }
    Ok(split)
}

/// Confusion counts and accuracy on a labelled set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// SAT instances predicted SAT
    pub true_sat: usize,
    /// UNSAT instances predicted UNSAT
    pub true_unsat: usize,
    /// UNSAT instances predicted SAT
    pub false_sat: usize,
    /// SAT instances predicted UNSAT
    pub false_unsat: usize,
}

impl Evaluation {
    /// Number of evaluated rows
    pub fn total(&self) -> usize {
        self.true_sat + self.true_unsat + self.false_sat + self.false_unsat
    }

    /// Fraction of correct predictions (0 when empty)
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_sat + self.true_unsat) as f64 / total as f64
    }
}

/// Evaluate a fitted classifier
pub fn evaluate<C: Classifier + ?Sized>(model: &C, x: &[Vec<f64>], y: &[Label]) -> Evaluation {
    let mut eval = Evaluation::default();
    for (row, &truth) in x.iter().zip(y) {
        match (truth, model.predict(row)) {
            (Label::Sat, Label::Sat) => eval.true_sat += 1,
            (Label::Unsat, Label::Unsat) => eval.true_unsat += 1,
            (Label::Unsat, Label::Sat) => eval.false_sat += 1,
            (Label::Sat, Label::Unsat) => eval.false_unsat += 1,
        }
    }
    eval
}
