//! Measurement records and first-tier derived features

use crate::error::{FeatureError, FeatureResult};
use crate::schema::fields;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A typed field value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Non-negative count
    Integer(u64),
    /// Decimal statistic
    Float(f64),
}

impl FieldValue {
    /// Numeric value as `f64`
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(n) => n as f64,
            Self::Float(x) => x,
        }
    }

    /// Integer value, if this is a count
    #[must_use]
    pub fn as_u64(self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(n),
            Self::Float(_) => None,
        }
    }
}

/// What to do when a derived ratio would divide by zero
///
/// Observed analyzer runs disagree on how to treat instances where
/// `variable_clusters` or `total_clusters` is zero, so the choice is explicit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateClusterPolicy {
    /// Report the record as [`FeatureError::DivisionByZero`]
    #[default]
    Reject,
    /// Accept the record and set each undefined ratio to `0.0`
    ZeroFill,
}

/// One instance's structural statistics plus derived ratios
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    name: String,
    values: FxHashMap<String, FieldValue>,
}

impl MeasurementRecord {
    /// Build a record from raw values and compute derived fields
    ///
    /// The count fields (`variable_clusters`, `total_clusters`,
    /// `total_clauses`, `total_variables`) must be present.
    pub fn from_values(
        name: impl Into<String>,
        values: impl IntoIterator<Item = (String, FieldValue)>,
        policy: DegenerateClusterPolicy,
    ) -> FeatureResult<Self> {
        let mut record = Self {
            name: name.into(),
            values: values.into_iter().collect(),
        };
        record.derive(policy)?;
        Ok(record)
    }

    fn count(&self, field: &'static str) -> FeatureResult<u64> {
        self.values
            .get(field)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| FeatureError::Configuration(format!("record lacks count field '{field}'")))
    }

    fn derive(&mut self, policy: DegenerateClusterPolicy) -> FeatureResult<()> {
        let variable_clusters = self.count(fields::VARIABLE_CLUSTERS)?;
        let total_clusters = self.count(fields::TOTAL_CLUSTERS)?;
        let total_clauses = self.count(fields::TOTAL_CLAUSES)?;
        let total_variables = self.count(fields::TOTAL_VARIABLES)?;

        let ratio = checked_ratio(
            variable_clusters,
            total_clusters,
            fields::RATIO,
            fields::TOTAL_CLUSTERS,
            policy,
        )?;
        let variables_per_cluster = checked_ratio(
            total_variables,
            variable_clusters,
            fields::VARIABLES_PER_CLUSTER,
            fields::VARIABLE_CLUSTERS,
            policy,
        )?;
        let clauses_per_cluster = checked_ratio(
            total_clauses,
            total_clusters,
            fields::CLAUSES_PER_CLUSTER,
            fields::TOTAL_CLUSTERS,
            policy,
        )?;

        self.values
            .insert(fields::RATIO.to_string(), FieldValue::Float(ratio));
        self.values.insert(
            fields::VARIABLES_PER_CLUSTER.to_string(),
            FieldValue::Float(variables_per_cluster),
        );
        self.values.insert(
            fields::CLAUSES_PER_CLUSTER.to_string(),
            FieldValue::Float(clauses_per_cluster),
        );
        Ok(())
    }

    /// Instance name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Typed value of a field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<FieldValue> {
        self.values.get(field).copied()
    }

    /// Numeric value of a field
    #[must_use]
    pub fn value(&self, field: &str) -> Option<f64> {
        self.get(field).map(FieldValue::as_f64)
    }

    /// `variable_clusters / total_clusters`
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.value(fields::RATIO).unwrap_or_default()
    }

    /// `total_variables / variable_clusters`
    #[must_use]
    pub fn variables_per_cluster(&self) -> f64 {
        self.value(fields::VARIABLES_PER_CLUSTER).unwrap_or_default()
    }

    /// `total_clauses / total_clusters`
    #[must_use]
    pub fn clauses_per_cluster(&self) -> f64 {
        self.value(fields::CLAUSES_PER_CLUSTER).unwrap_or_default()
    }

    /// Number of stored fields, derived ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record holds no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn checked_ratio(
    numerator: u64,
    denominator: u64,
    derived: &'static str,
    divisor: &'static str,
    policy: DegenerateClusterPolicy,
) -> FeatureResult<f64> {
    if denominator == 0 {
        return match policy {
            DegenerateClusterPolicy::Reject => {
                Err(FeatureError::DivisionByZero { derived, divisor })
            }
            DegenerateClusterPolicy::ZeroFill => Ok(0.0),
        };
    }
    Ok(numerator as f64 / denominator as f64)
}
