//! MRFSAT Dataset - Training Data Preparation
//!
//! This crate builds labelled training sets from analyzer exports:
//! - **Loading**: tolerant CSV readers for analyzer and third-party exports
//!   and for the reference tables
//! - **Enrichment**: joins reference labels, instance kinds and families
//! - **Filtering**: drops unknown labels and out-of-window optimization
//!   instances
//! - **Alignment**: restricts two exports to their common instances
//! - **Extension**: training-only derived columns
//! - **Balancing**: stratified downsampling of the majority class
//!
//! # Examples
//!
//! ```
//! use mrfsat_dataset::{Dataset, FeatureExtender, Row, SatStatus};
//!
//! let columns = mrfsat_dataset::loader::columns::MRFSAT_EXPORT
//!     .iter()
//!     .map(|c| c.to_string())
//!     .collect();
//! let row = Row::new("inst", vec![Some(3.0), Some(4.0), Some(50.0), Some(20.0), Some(0.5), Some(0.1)])
//!     .with_status(SatStatus::Sat);
//! let dataset = Dataset::with_rows(columns, vec![row]).expect("consistent widths");
//!
//! let extended = FeatureExtender::new().extend(dataset).expect("export columns present");
//! let matrix = extended
//!     .to_matrix(&["ratio".to_string()])
//!     .expect("ratio column present");
//! assert_eq!(matrix.x, vec![vec![0.75]]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod align;
pub mod balance;
pub mod enrich;
pub mod error;
pub mod extend;
pub mod filtering;
pub mod loader;
pub mod pipeline;
pub mod table;

pub use align::align;
pub use balance::{BalanceConfig, BalanceSummary, ClassBalancer};
pub use enrich::DatasetEnricher;
pub use error::{DatasetError, DatasetResult};
pub use extend::{FeatureExtender, TRAINING_FEATURES};
pub use filtering::{DatasetFilter, FilterConfig};
pub use loader::{ReferenceTables, load_feature_export, load_mrfsat_export, load_prepared_dataset};
pub use pipeline::{AlignedDatasets, PipelineConfig, PreparationPipeline, PreparedDataset};
pub use table::{Dataset, InstanceKind, Row, SatStatus, TrainingMatrix};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
