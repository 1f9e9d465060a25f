//! Error taxonomy for record parsing and feature assembly
//!
//! Per-record failures ([`FeatureError::Parse`], [`FeatureError::TokenCount`],
//! [`FeatureError::DivisionByZero`], [`FeatureError::InvalidFeatureVector`])
//! only affect the instance being processed. [`FeatureError::Configuration`]
//! is raised while validating schemas and means the process cannot continue.

use thiserror::Error;

/// Errors raised while turning analyzer output into feature vectors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// A token could not be coerced to its declared numeric type
    #[error("Parse error in field '{field}': cannot read '{token}' as {expected}")]
    Parse {
        /// Field the token was mapped onto
        field: String,
        /// Offending raw token
        token: String,
        /// Declared type name
        expected: &'static str,
    },

    /// The raw line does not carry the number of values the schema declares
    #[error("Token count mismatch: schema '{schema}' expects {expected} values, got {got}")]
    TokenCount {
        /// Schema version name
        schema: String,
        /// Expected number of numeric tokens
        expected: usize,
        /// Actual number of numeric tokens
        got: usize,
    },

    /// The line had no instance name token
    #[error("Empty measurement line")]
    EmptyLine,

    /// A derived ratio has a zero divisor
    #[error("Division by zero computing '{derived}': '{divisor}' is 0")]
    DivisionByZero {
        /// Derived field being computed
        derived: &'static str,
        /// Field used as the divisor
        divisor: &'static str,
    },

    /// The assembled vector holds a NaN or infinite value
    #[error("Invalid feature vector: '{feature}' is not finite ({value})")]
    InvalidFeatureVector {
        /// First feature holding a non-finite value
        feature: String,
        /// The offending value
        value: f64,
    },

    /// A schema is inconsistent or names an unknown field
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FeatureError {
    /// Whether this error invalidates the whole run rather than one record
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type for feature operations
pub type FeatureResult<T> = Result<T, FeatureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeatureError::TokenCount {
            schema: "canonical".to_string(),
            expected: 8,
            got: 6,
        };
        let msg = err.to_string();
        assert!(msg.contains("canonical"));
        assert!(msg.contains('8'));
        assert!(msg.contains('6'));
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(FeatureError::Configuration("x".into()).is_fatal());
        assert!(!FeatureError::EmptyLine.is_fatal());
        assert!(
            !FeatureError::DivisionByZero {
                derived: "ratio",
                divisor: "total_clusters",
            }
            .is_fatal()
        );
    }
}
