//! Declared record and feature schemas
//!
//! The analyzer has shipped more than one output layout, and classifiers have
//! been trained on more than one feature subset. Both are described here as
//! data rather than code: a [`RecordSchema`] declares the positional layout of
//! an analyzer line, a [`FeatureSchema`] declares which record fields feed the
//! classifier and in what order. Both are validated once, at construction.

use crate::error::{FeatureError, FeatureResult};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Canonical field names
pub mod fields {
    /// Clusters containing variable nodes
    pub const VARIABLE_CLUSTERS: &str = "variable_clusters";
    /// All clusters found by the analyzer
    pub const TOTAL_CLUSTERS: &str = "total_clusters";
    /// Constraints in the instance
    pub const TOTAL_CLAUSES: &str = "total_clauses";
    /// Variables in the instance
    pub const TOTAL_VARIABLES: &str = "total_variables";
    /// Mean cluster freedom
    pub const AVERAGE_FREEDOM: &str = "average_freedom";
    /// Standard deviation of cluster freedom
    pub const STD_DEV_FREEDOM: &str = "std_dev_freedom";
    /// Mean cluster strength
    pub const AVERAGE_STRENGTH: &str = "average_strength";
    /// Standard deviation of cluster strength
    pub const STD_DEV_STRENGTH: &str = "std_dev_strength";

    /// `variable_clusters / total_clusters`
    pub const RATIO: &str = "ratio";
    /// `total_variables / variable_clusters`
    pub const VARIABLES_PER_CLUSTER: &str = "variables_per_cluster";
    /// `total_clauses / total_clusters`
    pub const CLAUSES_PER_CLUSTER: &str = "clauses_per_cluster";
}

/// Fields computed while building a record
pub const DERIVED_FIELDS: &[&str] = &[
    fields::RATIO,
    fields::VARIABLES_PER_CLUSTER,
    fields::CLAUSES_PER_CLUSTER,
];

/// Fields every record schema must declare, since derived fields read them
const REQUIRED_COUNT_FIELDS: &[&str] = &[
    fields::VARIABLE_CLUSTERS,
    fields::TOTAL_CLUSTERS,
    fields::TOTAL_CLAUSES,
    fields::TOTAL_VARIABLES,
];

/// Numeric type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Exact integer parse
    Integer,
    /// Decimal parse
    Float,
}

impl FieldKind {
    /// Human-readable type name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
        }
    }
}

/// One positional field of an analyzer line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Declared numeric type
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Integer field
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Integer,
        }
    }

    /// Floating-point field
    #[must_use]
    pub fn float(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Float,
        }
    }
}

/// Positional layout of the numeric tokens following the instance name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSchema {
    version: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    /// Build and validate a schema
    ///
    /// Fails when the schema is empty, repeats a name, shadows a derived
    /// field, or lacks one of the count fields derived features divide by.
    pub fn new(version: impl Into<String>, fields: Vec<FieldDescriptor>) -> FeatureResult<Self> {
        let version = version.into();
        if fields.is_empty() {
            return Err(FeatureError::Configuration(format!(
                "record schema '{version}' declares no fields"
            )));
        }

        let mut seen = FxHashSet::default();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FeatureError::Configuration(format!(
                    "record schema '{version}' declares '{}' twice",
                    field.name
                )));
            }
            if DERIVED_FIELDS.contains(&field.name.as_str()) {
                return Err(FeatureError::Configuration(format!(
                    "record schema '{version}' declares derived field '{}'",
                    field.name
                )));
            }
        }

        for required in REQUIRED_COUNT_FIELDS {
            match fields.iter().find(|f| f.name == *required) {
                Some(f) if f.kind == FieldKind::Integer => {}
                Some(_) => {
                    return Err(FeatureError::Configuration(format!(
                        "record schema '{version}' must declare '{required}' as integer"
                    )));
                }
                None => {
                    return Err(FeatureError::Configuration(format!(
                        "record schema '{version}' is missing required field '{required}'"
                    )));
                }
            }
        }

        Ok(Self { version, fields })
    }

    /// Current analyzer layout: counts, freedom and strength statistics
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            version: "canonical".to_string(),
            fields: vec![
                FieldDescriptor::integer(fields::VARIABLE_CLUSTERS),
                FieldDescriptor::integer(fields::TOTAL_CLUSTERS),
                FieldDescriptor::integer(fields::TOTAL_CLAUSES),
                FieldDescriptor::integer(fields::TOTAL_VARIABLES),
                FieldDescriptor::float(fields::AVERAGE_FREEDOM),
                FieldDescriptor::float(fields::STD_DEV_FREEDOM),
                FieldDescriptor::float(fields::AVERAGE_STRENGTH),
                FieldDescriptor::float(fields::STD_DEV_STRENGTH),
            ],
        }
    }

    /// Deprecated layout emitted by analyzers without strength statistics
    #[must_use]
    pub fn legacy() -> Self {
        let mut schema = Self::canonical();
        schema.version = "legacy".to_string();
        schema.fields.truncate(6);
        schema
    }

    /// Look up a built-in schema by version name
    pub fn by_name(name: &str) -> FeatureResult<Self> {
        match name {
            "canonical" => Ok(Self::canonical()),
            "legacy" => Ok(Self::legacy()),
            other => Err(FeatureError::Configuration(format!(
                "unknown record schema '{other}'"
            ))),
        }
    }

    /// Version name
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declared fields in positional order
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Number of numeric tokens expected after the name
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a validated schema
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether a record built with this schema exposes `name`
    #[must_use]
    pub fn provides(&self, name: &str) -> bool {
        DERIVED_FIELDS.contains(&name) || self.fields.iter().any(|f| f.name == name)
    }
}

/// Ordered feature names fed to the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Create a schema from feature names (validated by the vector builder)
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Five-feature schema used by the current model
    #[must_use]
    pub fn canonical() -> Self {
        Self::new([
            fields::AVERAGE_FREEDOM,
            fields::STD_DEV_FREEDOM,
            fields::RATIO,
            fields::AVERAGE_STRENGTH,
            fields::STD_DEV_STRENGTH,
        ])
    }

    /// Deprecated three-feature schema for models trained without strength
    #[must_use]
    pub fn legacy() -> Self {
        Self::new([fields::AVERAGE_FREEDOM, fields::STD_DEV_FREEDOM, fields::RATIO])
    }

    /// Look up a built-in schema by name
    pub fn by_name(name: &str) -> FeatureResult<Self> {
        match name {
            "canonical" => Ok(Self::canonical()),
            "legacy" => Ok(Self::legacy()),
            other => Err(FeatureError::Configuration(format!(
                "unknown feature schema '{other}'"
            ))),
        }
    }

    /// Feature names in order
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Vector length produced by this schema
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no features are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check the schema against the records it will be applied to
    pub fn validate(&self, record_schema: &RecordSchema) -> FeatureResult<()> {
        if self.names.is_empty() {
            return Err(FeatureError::Configuration(
                "feature schema declares no features".to_string(),
            ));
        }

        let mut seen = FxHashSet::default();
        for name in &self.names {
            if !seen.insert(name.as_str()) {
                return Err(FeatureError::Configuration(format!(
                    "feature '{name}' is listed twice"
                )));
            }
            if !record_schema.provides(name) {
                return Err(FeatureError::Configuration(format!(
                    "feature '{name}' is not produced by record schema '{}'",
                    record_schema.version()
                )));
            }
        }
        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::canonical()
    }
}
