//! Preparation pipeline
//!
//! Chains enrichment, filtering, feature extension and balancing over one
//! analyzer export, or over two exports aligned to their common instances.

use crate::align::align;
use crate::balance::{BalanceConfig, BalanceSummary, ClassBalancer};
use crate::enrich::DatasetEnricher;
use crate::error::{DatasetError, DatasetResult};
use crate::extend::FeatureExtender;
use crate::filtering::{DatasetFilter, FilterConfig};
use crate::loader::ReferenceTables;
use crate::table::Dataset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Size metric column in third-party feature exports
pub const FEATURE_EXPORT_SIZE_COLUMN: &str = "c";

/// Pipeline configuration, readable from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Filter for the primary (analyzer) export
    pub filter: FilterConfig,
    /// Filter for the secondary (feature) export
    pub secondary_filter: FilterConfig,
    /// Compute training-only derived columns
    pub extend: bool,
    /// Balancing; `None` keeps the filtered dataset as is
    pub balance: Option<BalanceConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            secondary_filter: FilterConfig::default()
                .with_size_column(FEATURE_EXPORT_SIZE_COLUMN)
                .with_dedup(true),
            extend: true,
            balance: Some(BalanceConfig::default()),
        }
    }
}

impl PipelineConfig {
    /// Parse from YAML text; absent keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> DatasetResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML file
    pub fn load(path: &Path) -> DatasetResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
        Self::from_yaml_str(&text)
    }

    /// Seed the balancer
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        if let Some(ref mut balance) = self.balance {
            balance.seed = Some(seed);
        }
        self
    }
}

/// Output of a single-source run
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// Prepared rows
    pub dataset: Dataset,
    /// Balancing report, when balancing ran
    pub balance: Option<BalanceSummary>,
}

/// Output of an aligned two-source run
#[derive(Debug, Clone)]
pub struct AlignedDatasets {
    /// Prepared primary dataset
    pub primary: Dataset,
    /// Secondary dataset restricted to the prepared primary's instances
    pub secondary: Dataset,
    /// Balancing report for the primary, when balancing ran
    pub balance: Option<BalanceSummary>,
}

/// Runs the preparation stages against fixed reference tables
#[derive(Debug, Clone)]
pub struct PreparationPipeline {
    config: PipelineConfig,
    tables: ReferenceTables,
}

impl PreparationPipeline {
    /// Create a pipeline
    pub fn new(config: PipelineConfig, tables: ReferenceTables) -> Self {
        Self { config, tables }
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// enrich → filter → extend → balance
    pub fn run(&self, dataset: Dataset) -> DatasetResult<PreparedDataset> {
        let filtered = self.enrich_and_filter(dataset, &self.config.filter)?;
        self.finish(filtered)
    }

    /// enrich → filter both sources, align them, extend and balance the
    /// primary, then restrict the secondary to the rows balancing kept
    pub fn prepare_aligned(
        &self,
        primary: Dataset,
        secondary: Dataset,
    ) -> DatasetResult<AlignedDatasets> {
        let primary = self.enrich_and_filter(primary, &self.config.filter)?;
        let secondary = self.enrich_and_filter(secondary, &self.config.secondary_filter)?;
        let (primary, secondary) = align(primary, secondary);
        tracing::info!(rows = primary.len(), "aligned sources");

        let PreparedDataset { dataset, balance } = self.finish(primary)?;
        let (primary, secondary) = align(dataset, secondary);
        Ok(AlignedDatasets {
            primary,
            secondary,
            balance,
        })
    }

    fn enrich_and_filter(&self, dataset: Dataset, filter: &FilterConfig) -> DatasetResult<Dataset> {
        let input = dataset.len();
        let enriched = DatasetEnricher::new(&self.tables).enrich(dataset);
        let enriched_rows = enriched.len();
        let filtered = DatasetFilter::new(filter.clone()).filter(enriched)?;
        tracing::info!(
            input,
            enriched = enriched_rows,
            filtered = filtered.len(),
            "enriched and filtered"
        );
        Ok(filtered)
    }

    fn finish(&self, dataset: Dataset) -> DatasetResult<PreparedDataset> {
        let dataset = if self.config.extend {
            FeatureExtender::new().extend(dataset)?
        } else {
            dataset
        };
        match &self.config.balance {
            Some(config) => {
                let (dataset, summary) = ClassBalancer::new(config.clone()).balance(dataset)?;
                tracing::info!(
                    strata = summary.strata,
                    kept = summary.kept,
                    dropped = summary.dropped,
                    "balanced"
                );
                Ok(PreparedDataset {
                    dataset,
                    balance: Some(summary),
                })
            }
            None => Ok(PreparedDataset {
                dataset,
                balance: None,
            }),
        }
    }
}
