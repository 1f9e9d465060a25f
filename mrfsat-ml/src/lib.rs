//! MRFSAT ML - Satisfiability Classification
//!
//! Classifiers and the prediction service used by the `mrfsat` tool:
//! - **Models**: decision trees and random forests behind the [`Classifier`] trait
//! - **Training**: sanitization, standardization, holdout splits and evaluation
//! - **Service**: [`PredictionService`] turns analyzer output into labels,
//!   skipping instances whose features cannot be computed
//!
//! # Examples
//!
//! ```
//! use mrfsat_core::Label;
//! use mrfsat_ml::{Classifier, ForestConfig, RandomForest};
//!
//! let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64 / 20.0]).collect();
//! let y: Vec<Label> = (0..20).map(|i| Label::from(i >= 10)).collect();
//!
//! let mut forest = RandomForest::new(1, ForestConfig::default().with_trees(10).with_seed(42));
//! forest.fit(&x, &y).expect("valid training set");
//! assert_eq!(forest.predict(&[0.95]), Label::Sat);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod models;
pub mod service;
pub mod training;

pub use models::{
    Classifier, DecisionTree, ForestConfig, ModelError, ModelResult, RandomForest, SplitCriterion,
    TreeConfig,
};
pub use service::{InstanceOutcome, PredictionConfig, PredictionError, PredictionService, SkipReason};
pub use training::{Evaluation, HoldoutSplit, StandardScaler, evaluate, holdout_split};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
