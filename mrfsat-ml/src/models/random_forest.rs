//! Random Forest Implementation
//!
//! Bootstrap-aggregated decision trees. Each tree sees a bootstrap sample of
//! the rows and a random subset of features at every split; the forest
//! averages the trees' SAT probabilities.

use super::{Classifier, DecisionTree, ModelError, ModelResult, TreeConfig, validate_training_set};
use crate::training::{StandardScaler, sanitize_row};
use mrfsat_core::Label;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Forest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees
    pub n_trees: usize,
    /// Per-tree configuration (`max_features == 0` means `sqrt(input_dim)`)
    pub tree: TreeConfig,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Standardize inputs before fitting and predicting
    pub standardize: bool,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree: TreeConfig::default(),
            bootstrap: true,
            standardize: false,
            seed: None,
        }
    }
}

impl ForestConfig {
    /// Set the number of trees
    #[must_use]
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Set random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable input standardization
    #[must_use]
    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }
}

/// Random forest classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    config: ForestConfig,
    input_dim: usize,
    scaler: Option<StandardScaler>,
}

impl RandomForest {
    /// Create an unfitted forest
    pub fn new(input_dim: usize, config: ForestConfig) -> Self {
        Self {
            trees: Vec::new(),
            config,
            input_dim,
            scaler: None,
        }
    }

    /// Create with default configuration
    pub fn default_config(input_dim: usize) -> Self {
        Self::new(input_dim, ForestConfig::default())
    }

    /// Deserialize a fitted forest
    pub fn from_bytes(data: &[u8]) -> ModelResult<Self> {
        let mut forest = Self::default_config(0);
        forest.load(data)?;
        Ok(forest)
    }

    /// Number of fitted trees
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Forest configuration
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    fn features_per_split(&self) -> usize {
        if self.config.tree.max_features > 0 {
            self.config.tree.max_features.min(self.input_dim)
        } else {
            ((self.input_dim as f64).sqrt().round() as usize).max(1)
        }
    }
}

impl Classifier for RandomForest {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn fit(&mut self, features: &[Vec<f64>], labels: &[Label]) -> ModelResult<()> {
        if self.config.n_trees == 0 {
            return Err(ModelError::InvalidConfig(
                "forest needs at least one tree".to_string(),
            ));
        }
        validate_training_set(features, labels, self.input_dim)?;

        let scaled;
        let rows: &[Vec<f64>] = if self.config.standardize {
            let scaler = StandardScaler::fit(features)?;
            scaled = scaler.transform(features);
            self.scaler = Some(scaler);
            &scaled
        } else {
            self.scaler = None;
            features
        };

        let targets: Vec<f64> = labels.iter().map(|l| l.as_class()).collect();
        let n = rows.len();
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let tree_config = TreeConfig {
            max_features: self.features_per_split(),
            ..self.config.tree.clone()
        };

        let mut trees = Vec::with_capacity(self.config.n_trees);
        for _ in 0..self.config.n_trees {
            let indices: Vec<usize> = if self.config.bootstrap {
                (0..n).map(|_| rng.random_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            let mut tree = DecisionTree::new(self.input_dim, tree_config.clone());
            tree.fit_rows(rows, &targets, &indices, &mut rng)?;
            trees.push(tree);
        }
        self.trees = trees;

        tracing::debug!(
            trees = self.trees.len(),
            rows = n,
            features = self.input_dim,
            "fitted random forest"
        );
        Ok(())
    }

    fn predict_proba(&self, input: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let row = match self.scaler {
            Some(ref scaler) => scaler.transform_row(input),
            None => sanitize_row(input),
        };
        self.trees.iter().map(|t| t.predict_proba(&row)).sum::<f64>() / self.trees.len() as f64
    }

    fn save(&self) -> ModelResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ModelError::SerializationError(e.to_string()))
    }

    fn load(&mut self, data: &[u8]) -> ModelResult<()> {
        let loaded: RandomForest = serde_json::from_slice(data)
            .map_err(|e| ModelError::SerializationError(e.to_string()))?;
        if loaded.trees.iter().any(|t| t.input_dim() != loaded.input_dim) {
            return Err(ModelError::SerializationError(
                "tree input dimension disagrees with forest".to_string(),
            ));
        }
        *self = loaded;
        Ok(())
    }
}
