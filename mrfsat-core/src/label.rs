//! Satisfiability labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicted or known satisfiability of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Unsatisfiable
    Unsat,
    /// Satisfiable
    Sat,
}

impl Label {
    /// Parse a label from its textual form
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sat" | "1" | "true" => Some(Self::Sat),
            "unsat" | "0" | "false" => Some(Self::Unsat),
            _ => None,
        }
    }

    /// Class index used by classifiers (0 = UNSAT, 1 = SAT)
    #[must_use]
    pub fn as_class(self) -> f64 {
        match self {
            Self::Unsat => 0.0,
            Self::Sat => 1.0,
        }
    }

    /// Map a class score back to a label, thresholding at 0.5
    #[must_use]
    pub fn from_class(score: f64) -> Self {
        if score >= 0.5 { Self::Sat } else { Self::Unsat }
    }

    /// Upper-case display form
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sat => "SAT",
            Self::Unsat => "UNSAT",
        }
    }
}

impl From<bool> for Label {
    fn from(sat: bool) -> Self {
        if sat { Self::Sat } else { Self::Unsat }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse() {
        assert_eq!(Label::parse("SAT"), Some(Label::Sat));
        assert_eq!(Label::parse(" unsat "), Some(Label::Unsat));
        assert_eq!(Label::parse("True"), Some(Label::Sat));
        assert_eq!(Label::parse("maybe"), None);
    }

    #[test]
    fn test_label_class_mapping() {
        assert_eq!(Label::from_class(Label::Sat.as_class()), Label::Sat);
        assert_eq!(Label::from_class(Label::Unsat.as_class()), Label::Unsat);
        assert_eq!(Label::from_class(0.49), Label::Unsat);
        assert_eq!(Label::from_class(0.5), Label::Sat);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Sat.to_string(), "SAT");
        assert_eq!(Label::from(false).to_string(), "UNSAT");
    }
}
