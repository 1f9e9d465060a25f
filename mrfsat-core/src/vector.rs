//! Feature vector assembly

use crate::error::{FeatureError, FeatureResult};
use crate::record::MeasurementRecord;
use crate::schema::{FeatureSchema, RecordSchema};

/// Ordered numeric input for one prediction
///
/// Only [`FeatureVectorBuilder::build`] and [`FeatureVector::checked`] create
/// vectors, and both guarantee every element is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap raw values, rejecting NaN and infinities
    pub fn checked(names: &[String], values: Vec<f64>) -> FeatureResult<Self> {
        if let Some((i, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            let feature = names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("#{i}"));
            return Err(FeatureError::InvalidFeatureVector { feature, value });
        }
        Ok(Self { values })
    }

    /// Values in schema order
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Vector length
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume into the underlying values
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

/// Selects schema features from records
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    schema: FeatureSchema,
}

impl FeatureVectorBuilder {
    /// Create a builder, validating `schema` against the record layout
    pub fn new(schema: FeatureSchema, record_schema: &RecordSchema) -> FeatureResult<Self> {
        schema.validate(record_schema)?;
        Ok(Self { schema })
    }

    /// Feature schema in use
    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Assemble the feature vector for one record
    pub fn build(&self, record: &MeasurementRecord) -> FeatureResult<FeatureVector> {
        let values = self
            .schema
            .names()
            .iter()
            .map(|name| {
                record.value(name).ok_or_else(|| {
                    FeatureError::Configuration(format!(
                        "record '{}' has no field '{name}'",
                        record.name()
                    ))
                })
            })
            .collect::<FeatureResult<Vec<f64>>>()?;

        FeatureVector::checked(self.schema.names(), values)
    }
}
