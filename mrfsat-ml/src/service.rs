//! Prediction service
//!
//! [`PredictionService`] owns one loaded classifier together with the parser
//! and feature builder it was trained against. It is built from an explicit
//! [`PredictionConfig`]; nothing is loaded or configured process-wide.

use crate::models::{Classifier, ModelError, RandomForest};
use mrfsat_core::{
    DegenerateClusterPolicy, FeatureError, FeatureSchema, FeatureVector, FeatureVectorBuilder,
    Label, MeasurementRecord, RecordParser, RecordSchema,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the prediction service
#[derive(Error, Debug)]
pub enum PredictionError {
    /// Record or schema problem
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Classifier problem
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The model file could not be read
    #[error("Failed to read model '{}': {source}", path.display())]
    Io {
        /// Model path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

impl PredictionError {
    /// Whether the error invalidates the service rather than one instance
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Feature(e) => e.is_fatal(),
            Self::Model(_) | Self::Io { .. } => true,
        }
    }
}

/// Explicit service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Serialized model location
    pub model_path: PathBuf,
    /// Analyzer layout name (`canonical` or `legacy`)
    #[serde(default = "default_record_schema")]
    pub record_schema: String,
    /// Features the model was trained on, in order
    #[serde(default)]
    pub feature_schema: FeatureSchema,
    /// Treatment of zero cluster counts
    #[serde(default)]
    pub degenerate_policy: DegenerateClusterPolicy,
}

fn default_record_schema() -> String {
    "canonical".to_string()
}

impl PredictionConfig {
    /// Canonical schemas for the model at `model_path`
    #[must_use]
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            record_schema: default_record_schema(),
            feature_schema: FeatureSchema::canonical(),
            degenerate_policy: DegenerateClusterPolicy::Reject,
        }
    }

    /// Use the legacy analyzer layout and three-feature schema
    #[must_use]
    pub fn legacy(mut self) -> Self {
        self.record_schema = "legacy".to_string();
        self.feature_schema = FeatureSchema::legacy();
        self
    }

    /// Set the degenerate-cluster policy
    #[must_use]
    pub fn with_policy(mut self, policy: DegenerateClusterPolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }
}

/// Why an instance was not classified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Analyzer output could not be parsed
    Malformed(String),
    /// Zero cluster counts made a ratio undefined
    DegenerateClusters(String),
    /// The feature vector held NaN or infinite values
    NonFiniteFeatures(String),
    /// The analyzer did not produce output
    Analyzer(String),
}

impl SkipReason {
    /// Classify a per-record error; `None` for fatal configuration errors
    #[must_use]
    pub fn from_feature_error(err: &FeatureError) -> Option<Self> {
        let detail = err.to_string();
        match err {
            FeatureError::Parse { .. } | FeatureError::TokenCount { .. } | FeatureError::EmptyLine => {
                Some(Self::Malformed(detail))
            }
            FeatureError::DivisionByZero { .. } => Some(Self::DegenerateClusters(detail)),
            FeatureError::InvalidFeatureVector { .. } => Some(Self::NonFiniteFeatures(detail)),
            FeatureError::Configuration(_) => None,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(d) => write!(f, "malformed analyzer output ({d})"),
            Self::DegenerateClusters(d) => write!(f, "degenerate cluster statistics ({d})"),
            Self::NonFiniteFeatures(d) => write!(f, "NaN values in feature vector ({d})"),
            Self::Analyzer(d) => write!(f, "analyzer failed ({d})"),
        }
    }
}

/// Result of processing one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstanceOutcome {
    /// The classifier produced a label
    Predicted {
        /// Predicted label
        label: Label,
    },
    /// The instance was skipped before reaching the classifier
    Skipped {
        /// Reason for skipping
        reason: SkipReason,
    },
}

impl InstanceOutcome {
    /// Predicted label, if any
    #[must_use]
    pub fn label(&self) -> Option<Label> {
        match self {
            Self::Predicted { label } => Some(*label),
            Self::Skipped { .. } => None,
        }
    }

    /// Whether the instance was skipped
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Classifies instances from analyzer output
#[derive(Debug)]
pub struct PredictionService<C = RandomForest> {
    classifier: C,
    parser: RecordParser,
    builder: FeatureVectorBuilder,
}

impl PredictionService<RandomForest> {
    /// Load a serialized forest and build the service around it
    pub fn load(config: &PredictionConfig) -> Result<Self, PredictionError> {
        let classifier = read_model(&config.model_path)?;
        let record_schema = RecordSchema::by_name(&config.record_schema)?;
        let parser = RecordParser::new(record_schema).with_policy(config.degenerate_policy);
        let service = Self::new(classifier, parser, config.feature_schema.clone())?;
        tracing::info!(
            model = %config.model_path.display(),
            features = service.builder.schema().len(),
            "loaded classifier"
        );
        Ok(service)
    }
}

fn read_model(path: &Path) -> Result<RandomForest, PredictionError> {
    let bytes = std::fs::read(path).map_err(|source| PredictionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(RandomForest::from_bytes(&bytes)?)
}

impl<C: Classifier> PredictionService<C> {
    /// Assemble a service from a fitted classifier
    ///
    /// Fails with a configuration error when the feature schema does not fit
    /// the parser's record schema, the classifier's input dimension, or the
    /// classifier has not been fitted.
    pub fn new(
        classifier: C,
        parser: RecordParser,
        feature_schema: FeatureSchema,
    ) -> Result<Self, PredictionError> {
        let builder = FeatureVectorBuilder::new(feature_schema, parser.schema())?;
        if classifier.input_dim() != builder.schema().len() {
            return Err(FeatureError::Configuration(format!(
                "model expects {} features but the feature schema has {}",
                classifier.input_dim(),
                builder.schema().len()
            ))
            .into());
        }
        if !classifier.is_fitted() {
            return Err(ModelError::NotFitted.into());
        }
        Ok(Self {
            classifier,
            parser,
            builder,
        })
    }

    /// Underlying classifier
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Parser used for analyzer output
    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    /// Feature schema fed to the classifier
    pub fn feature_schema(&self) -> &FeatureSchema {
        self.builder.schema()
    }

    /// Predict the label of a validated feature vector
    pub fn predict(&self, vector: &FeatureVector) -> Result<Label, PredictionError> {
        if vector.len() != self.classifier.input_dim() {
            return Err(ModelError::DimensionMismatch {
                expected: self.classifier.input_dim(),
                got: vector.len(),
            }
            .into());
        }
        // reject non-finite values before classifying
        let vector = FeatureVector::checked(self.builder.schema().names(), vector.as_slice().to_vec())?;
        Ok(self.classifier.predict(vector.as_slice()))
    }

    /// Build the vector for a record and classify it
    pub fn classify_record(
        &self,
        record: &MeasurementRecord,
    ) -> Result<InstanceOutcome, PredictionError> {
        let vector = match self.builder.build(record) {
            Ok(v) => v,
            Err(e) => return skip_or_fail(e),
        };
        let label = self.predict(&vector)?;
        Ok(InstanceOutcome::Predicted { label })
    }

    /// Parse one analyzer line and classify it
    pub fn classify_line(&self, line: &str) -> Result<InstanceOutcome, PredictionError> {
        match self.parser.parse_line(line) {
            Ok(record) => self.classify_record(&record),
            Err(e) => skip_or_fail(e),
        }
    }

    /// Parse full analyzer stdout and classify it
    pub fn classify_output(&self, output: &str) -> Result<InstanceOutcome, PredictionError> {
        match self.parser.parse_output(output) {
            Ok(record) => self.classify_record(&record),
            Err(e) => skip_or_fail(e),
        }
    }
}

fn skip_or_fail(err: FeatureError) -> Result<InstanceOutcome, PredictionError> {
    match SkipReason::from_feature_error(&err) {
        Some(reason) => {
            tracing::debug!(%reason, "skipping instance");
            Ok(InstanceOutcome::Skipped { reason })
        }
        None => Err(err.into()),
    }
}
