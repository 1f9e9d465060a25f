//! Decision Tree Implementation
//!
//! CART trees for binary SAT/UNSAT classification. Leaves store the fraction
//! of satisfiable training rows that reached them.

use super::{Classifier, ModelError, ModelResult, validate_training_set};
use mrfsat_core::Label;
use rand::prelude::*;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// Split criterion for decision trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitCriterion {
    /// Gini impurity
    Gini,
    /// Information gain / entropy
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node whose positive-class fraction is `p`
    pub fn from_fraction(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match self {
            SplitCriterion::Gini => 1.0 - (p * p + (1.0 - p) * (1.0 - p)),
            SplitCriterion::Entropy => {
                if p <= 0.0 || p >= 1.0 {
                    0.0
                } else {
                    -(p * p.ln() + (1.0 - p) * (1.0 - p).ln())
                }
            }
        }
    }

    /// Impurity for a set of 0/1 class values
    pub fn compute(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        self.from_fraction(mean)
    }
}

/// A node in the decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DecisionNode {
    /// Internal node with split condition
    Internal {
        /// Feature index to split on
        feature_idx: usize,
        /// Threshold value
        threshold: f64,
        /// Left child (feature <= threshold)
        left: Box<DecisionNode>,
        /// Right child (feature > threshold)
        right: Box<DecisionNode>,
    },
    /// Leaf node with prediction value
    Leaf {
        /// Fraction of satisfiable samples
        value: f64,
        /// Number of samples in this leaf
        num_samples: usize,
    },
}

impl DecisionNode {
    /// Predict for a single sample
    pub fn predict(&self, features: &[f64]) -> f64 {
        match self {
            DecisionNode::Internal {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                let value = features.get(*feature_idx).copied().unwrap_or(0.0);
                if value <= *threshold {
                    left.predict(features)
                } else {
                    right.predict(features)
                }
            }
            DecisionNode::Leaf { value, .. } => *value,
        }
    }

    /// Count total nodes in tree
    pub fn count_nodes(&self) -> usize {
        match self {
            DecisionNode::Internal { left, right, .. } => {
                1 + left.count_nodes() + right.count_nodes()
            }
            DecisionNode::Leaf { .. } => 1,
        }
    }

    /// Count leaf nodes
    pub fn count_leaves(&self) -> usize {
        match self {
            DecisionNode::Internal { left, right, .. } => left.count_leaves() + right.count_leaves(),
            DecisionNode::Leaf { .. } => 1,
        }
    }

    /// Get maximum depth of tree
    pub fn max_depth(&self) -> usize {
        match self {
            DecisionNode::Internal { left, right, .. } => {
                1 + left.max_depth().max(right.max_depth())
            }
            DecisionNode::Leaf { .. } => 0,
        }
    }
}

/// Tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples required in a leaf
    pub min_samples_leaf: usize,
    /// Split criterion
    pub criterion: SplitCriterion,
    /// Features sampled per split (0 = all features)
    pub max_features: usize,
    /// Seed for feature sampling
    pub seed: Option<u64>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            max_features: 0,
            seed: None,
        }
    }
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Root node of the tree
    root: Option<DecisionNode>,
    /// Configuration
    config: TreeConfig,
    /// Input dimension
    input_dim: usize,
}

impl DecisionTree {
    /// Create a new decision tree
    pub fn new(input_dim: usize, config: TreeConfig) -> Self {
        Self {
            root: None,
            config,
            input_dim,
        }
    }

    /// Create with default configuration
    pub fn default_config(input_dim: usize) -> Self {
        Self::new(input_dim, TreeConfig::default())
    }

    /// Root node, if fitted
    pub fn root(&self) -> Option<&DecisionNode> {
        self.root.as_ref()
    }

    /// Fit on a subset of rows (indices may repeat, as in bootstrap samples)
    pub(crate) fn fit_rows<R: Rng + ?Sized>(
        &mut self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        rng: &mut R,
    ) -> ModelResult<()> {
        if indices.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        if self.config.min_samples_leaf == 0 {
            return Err(ModelError::InvalidConfig(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        self.root = Some(self.build_tree(features, targets, indices, 0, rng));
        Ok(())
    }

    /// Recursively build tree
    fn build_tree<R: Rng + ?Sized>(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        depth: usize,
        rng: &mut R,
    ) -> DecisionNode {
        let positives: f64 = indices.iter().map(|&i| targets[i]).sum();
        let value = positives / indices.len() as f64;

        let should_stop = depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || value <= 0.0
            || value >= 1.0;

        if should_stop {
            return DecisionNode::Leaf {
                value,
                num_samples: indices.len(),
            };
        }

        let Some((feature_idx, threshold)) = self.find_best_split(features, targets, indices, rng)
        else {
            return DecisionNode::Leaf {
                value,
                num_samples: indices.len(),
            };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| features[i][feature_idx] <= threshold);

        let left = Box::new(self.build_tree(features, targets, &left_indices, depth + 1, rng));
        let right = Box::new(self.build_tree(features, targets, &right_indices, depth + 1, rng));

        DecisionNode::Internal {
            feature_idx,
            threshold,
            left,
            right,
        }
    }

    /// Candidate features for one split
    fn candidate_features<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let k = self.config.max_features;
        if k == 0 || k >= self.input_dim {
            (0..self.input_dim).collect()
        } else {
            index::sample(rng, self.input_dim, k).into_vec()
        }
    }

    /// Find the split with the largest impurity decrease
    fn find_best_split<R: Rng + ?Sized>(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        rng: &mut R,
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let total_pos: f64 = indices.iter().map(|&i| targets[i]).sum();
        let current_impurity = self.config.criterion.from_fraction(total_pos / n as f64);
        let min_leaf = self.config.min_samples_leaf;

        let mut best: Option<(usize, f64)> = None;
        let mut best_gain = 0.0;
        let mut order = indices.to_vec();

        for feature_idx in self.candidate_features(rng) {
            order.sort_by(|&a, &b| features[a][feature_idx].total_cmp(&features[b][feature_idx]));

            let mut left_pos = 0.0;
            for k in 0..n - 1 {
                left_pos += targets[order[k]];
                let left_n = k + 1;
                let right_n = n - left_n;

                let here = features[order[k]][feature_idx];
                let next = features[order[k + 1]][feature_idx];
                if here == next || left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let left_impurity = self.config.criterion.from_fraction(left_pos / left_n as f64);
                let right_impurity = self
                    .config
                    .criterion
                    .from_fraction((total_pos - left_pos) / right_n as f64);
                let weighted = (left_n as f64 * left_impurity + right_n as f64 * right_impurity)
                    / n as f64;
                let gain = current_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature_idx, (here + next) / 2.0));
                }
            }
        }

        best
    }

    /// Get tree structure information
    pub fn info(&self) -> TreeInfo {
        match self.root {
            Some(ref root) => TreeInfo {
                num_nodes: root.count_nodes(),
                max_depth: root.max_depth(),
                num_leaves: root.count_leaves(),
            },
            None => TreeInfo::default(),
        }
    }
}

/// Tree information
#[derive(Debug, Clone, Default)]
pub struct TreeInfo {
    /// Total number of nodes
    pub num_nodes: usize,
    /// Maximum depth
    pub max_depth: usize,
    /// Number of leaf nodes
    pub num_leaves: usize,
}

impl Classifier for DecisionTree {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    fn fit(&mut self, features: &[Vec<f64>], labels: &[Label]) -> ModelResult<()> {
        validate_training_set(features, labels, self.input_dim)?;
        let targets: Vec<f64> = labels.iter().map(|l| l.as_class()).collect();
        let indices: Vec<usize> = (0..features.len()).collect();
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        self.fit_rows(features, &targets, &indices, &mut rng)
    }

    fn predict_proba(&self, input: &[f64]) -> f64 {
        self.root.as_ref().map_or(0.0, |root| root.predict(input))
    }

    fn save(&self) -> ModelResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ModelError::SerializationError(e.to_string()))
    }

    fn load(&mut self, data: &[u8]) -> ModelResult<()> {
        let loaded: DecisionTree = serde_json::from_slice(data)
            .map_err(|e| ModelError::SerializationError(e.to_string()))?;
        *self = loaded;
        Ok(())
    }
}
