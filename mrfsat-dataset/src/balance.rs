//! Stratified class balancing
//!
//! Rows are binned into quantile buckets along a size metric and a
//! variable-count metric. Inside every combined stratum the majority class is
//! downsampled to the size of the minority class, so the classifier cannot
//! learn the label from instance size alone.

use crate::error::{DatasetError, DatasetResult};
use crate::loader::columns;
use crate::table::{Dataset, Row};
use mrfsat_core::Label;
use rand::prelude::*;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Balancer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// First binning dimension
    pub size_column: String,
    /// Second binning dimension
    pub variables_column: String,
    /// Quantile buckets per dimension
    pub bins: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            size_column: columns::FORMULA_CONSTRAINTS.to_string(),
            variables_column: columns::VARIABLES.to_string(),
            bins: 4,
            seed: None,
        }
    }
}

impl BalanceConfig {
    /// Set random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set buckets per dimension
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Use different binning columns
    #[must_use]
    pub fn with_columns(mut self, size: impl Into<String>, variables: impl Into<String>) -> Self {
        self.size_column = size.into();
        self.variables_column = variables.into();
        self
    }
}

/// What balancing did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Non-empty strata
    pub strata: usize,
    /// Rows in the balanced output
    pub kept: usize,
    /// Rows removed by downsampling or one-class strata
    pub dropped: usize,
    /// Rows without binning metrics or a SAT/UNSAT label
    pub unstratified: usize,
}

/// Downsamples the majority class per stratum
#[derive(Debug, Clone, Default)]
pub struct ClassBalancer {
    config: BalanceConfig,
}

#[derive(Default)]
struct Stratum {
    sat: Vec<usize>,
    unsat: Vec<usize>,
}

impl ClassBalancer {
    /// Create a balancer
    pub fn new(config: BalanceConfig) -> Self {
        Self { config }
    }

    /// Balancer configuration
    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Balance a dataset
    pub fn balance(&self, dataset: Dataset) -> DatasetResult<(Dataset, BalanceSummary)> {
        if self.config.bins == 0 {
            return Err(DatasetError::InvalidConfig(
                "balancing needs at least one bin".to_string(),
            ));
        }
        let size_idx = dataset.column_index(&self.config.size_column)?;
        let vars_idx = dataset.column_index(&self.config.variables_column)?;

        let usable: Vec<(usize, f64, f64, Label)> = dataset
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(i, r)| Some((i, r.get(size_idx)?, r.get(vars_idx)?, r.label()?)))
            .collect();
        let mut summary = BalanceSummary {
            unstratified: dataset.len() - usable.len(),
            ..Default::default()
        };

        let size_edges = quantile_edges(usable.iter().map(|u| u.1).collect(), self.config.bins);
        let vars_edges = quantile_edges(usable.iter().map(|u| u.2).collect(), self.config.bins);

        let mut strata: BTreeMap<(usize, usize), Stratum> = BTreeMap::new();
        for &(i, size, vars, label) in &usable {
            let key = (bucket(&size_edges, size), bucket(&vars_edges, vars));
            let stratum = strata.entry(key).or_default();
            match label {
                Label::Sat => stratum.sat.push(i),
                Label::Unsat => stratum.unsat.push(i),
            }
        }
        summary.strata = strata.len();

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut keep = Vec::new();
        for (key, stratum) in &strata {
            let (minority, majority) = if stratum.sat.len() <= stratum.unsat.len() {
                (&stratum.sat, &stratum.unsat)
            } else {
                (&stratum.unsat, &stratum.sat)
            };
            let m = minority.len();
            tracing::trace!(
                size_bin = key.0,
                vars_bin = key.1,
                sat = stratum.sat.len(),
                unsat = stratum.unsat.len(),
                "balancing stratum"
            );
            if m == 0 {
                continue;
            }

            let mut chosen: Vec<usize> = index::sample(&mut rng, majority.len(), m)
                .into_iter()
                .map(|j| majority[j])
                .collect();
            chosen.extend_from_slice(minority);
            chosen.sort_unstable();
            keep.extend(chosen);
        }

        let columns = dataset.columns().to_vec();
        let mut slots: Vec<Option<Row>> = dataset.into_rows().into_iter().map(Some).collect();
        let rows: Vec<Row> = keep.iter().filter_map(|&i| slots[i].take()).collect();

        summary.kept = rows.len();
        summary.dropped = usable.len() - rows.len();
        tracing::debug!(
            strata = summary.strata,
            kept = summary.kept,
            dropped = summary.dropped,
            unstratified = summary.unstratified,
            "balanced dataset"
        );
        Ok((Dataset::with_rows(columns, rows)?, summary))
    }
}

/// Quantile bucket edges with linear interpolation, duplicates collapsed
fn quantile_edges(mut values: Vec<f64>, bins: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    values.sort_by(f64::total_cmp);
    let last = (values.len() - 1) as f64;

    let mut edges: Vec<f64> = (0..=bins)
        .map(|q| {
            let pos = last * q as f64 / bins as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            values[lo] + (values[hi] - values[lo]) * (pos - lo as f64)
        })
        .collect();
    edges.dedup();
    edges
}

/// Bucket of `x`: intervals are `(e[i], e[i+1]]`, the first one closed
fn bucket(edges: &[f64], x: f64) -> usize {
    let buckets = edges.len().saturating_sub(1).max(1);
    let below = edges.partition_point(|&e| e < x);
    (below.max(1) - 1).min(buckets - 1)
}
