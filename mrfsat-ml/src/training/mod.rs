//! Training Infrastructure
//!
//! Preprocessing, holdout splitting and evaluation around
//! [`Classifier::fit`](crate::models::Classifier::fit).

mod scaler;
mod split;

pub use scaler::{StandardScaler, sanitize_matrix, sanitize_row};
pub use split::{Evaluation, HoldoutSplit, evaluate, holdout_split};
