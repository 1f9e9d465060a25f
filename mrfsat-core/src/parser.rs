//! Analyzer output parsing
//!
//! The structural analyzer prints one comma-separated line per instance:
//! the instance name followed by the numeric fields of its
//! [`RecordSchema`], usually with a trailing delimiter.

use crate::error::{FeatureError, FeatureResult};
use crate::name::normalize_instance_name;
use crate::record::{DegenerateClusterPolicy, FieldValue, MeasurementRecord};
use crate::schema::{FieldKind, RecordSchema};

/// Token delimiter used by the analyzer
pub const DELIMITER: char = ',';

/// Parses analyzer lines into [`MeasurementRecord`]s
#[derive(Debug, Clone)]
pub struct RecordParser {
    schema: RecordSchema,
    policy: DegenerateClusterPolicy,
}

impl RecordParser {
    /// Create a parser for a validated schema
    #[must_use]
    pub fn new(schema: RecordSchema) -> Self {
        Self {
            schema,
            policy: DegenerateClusterPolicy::default(),
        }
    }

    /// Set the degenerate-cluster policy
    #[must_use]
    pub fn with_policy(mut self, policy: DegenerateClusterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Schema this parser maps tokens onto
    #[must_use]
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Degenerate-cluster policy in effect
    #[must_use]
    pub fn policy(&self) -> DegenerateClusterPolicy {
        self.policy
    }

    /// Parse one analyzer line
    pub fn parse_line(&self, line: &str) -> FeatureResult<MeasurementRecord> {
        let line = line.trim();
        if line.is_empty() {
            return Err(FeatureError::EmptyLine);
        }

        let mut tokens: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        if tokens.len() > 1 && tokens.last().is_some_and(|t| t.is_empty()) {
            tokens.pop();
        }

        let (name, values) = tokens.split_first().ok_or(FeatureError::EmptyLine)?;
        if name.is_empty() {
            return Err(FeatureError::EmptyLine);
        }

        if values.len() != self.schema.len() {
            return Err(FeatureError::TokenCount {
                schema: self.schema.version().to_string(),
                expected: self.schema.len(),
                got: values.len(),
            });
        }

        let typed = self
            .schema
            .fields()
            .iter()
            .zip(values)
            .map(|(field, token)| {
                let value = match field.kind {
                    FieldKind::Integer => token.parse::<u64>().map(FieldValue::Integer).ok(),
                    FieldKind::Float => token.parse::<f64>().map(FieldValue::Float).ok(),
                };
                value
                    .map(|v| (field.name.clone(), v))
                    .ok_or_else(|| FeatureError::Parse {
                        field: field.name.clone(),
                        token: (*token).to_string(),
                        expected: field.kind.as_str(),
                    })
            })
            .collect::<FeatureResult<Vec<_>>>()?;

        let name = normalize_instance_name(name);
        tracing::trace!(instance = %name, schema = self.schema.version(), "parsed measurement");
        MeasurementRecord::from_values(name, typed, self.policy)
    }

    /// Parse the full stdout of one analyzer run
    ///
    /// Only the last non-empty line carries the measurement.
    pub fn parse_output(&self, output: &str) -> FeatureResult<MeasurementRecord> {
        let line = output
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .ok_or(FeatureError::EmptyLine)?;
        self.parse_line(line)
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(RecordSchema::canonical())
    }
}
