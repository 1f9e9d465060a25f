//! Dataset filtering by label, instance kind and size window
//!
//! Unknown-status rows are dropped. Decision instances are always kept;
//! optimization instances are kept only when their size falls inside a
//! window derived from the decision instances.

use crate::error::{DatasetError, DatasetResult};
use crate::loader::columns;
use crate::table::{Dataset, InstanceKind, SatStatus};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Column holding the instance size metric
    pub size_column: String,
    /// OPT rows need `size >= min_factor * min(DEC size)`
    pub min_factor: f64,
    /// OPT rows need `size <= max_factor * max(DEC size)`
    pub max_factor: f64,
    /// Columns that must be present in a kept row (`None` = all columns)
    pub required_columns: Option<Vec<String>>,
    /// Drop rows whose name contains any of these substrings
    pub exclude_name_patterns: Vec<String>,
    /// Keep only the first row per instance name
    pub dedup_names: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            size_column: columns::FORMULA_CONSTRAINTS.to_string(),
            min_factor: 1.2,
            max_factor: 0.8,
            required_columns: None,
            exclude_name_patterns: vec!["aim".to_string()],
            dedup_names: false,
        }
    }
}

impl FilterConfig {
    /// Use a different size metric
    #[must_use]
    pub fn with_size_column(mut self, column: impl Into<String>) -> Self {
        self.size_column = column.into();
        self
    }

    /// Replace the name exclusion patterns
    #[must_use]
    pub fn with_exclusions(mut self, patterns: Vec<String>) -> Self {
        self.exclude_name_patterns = patterns;
        self
    }

    /// Enable name de-duplication
    #[must_use]
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup_names = dedup;
        self
    }
}

/// Applies a [`FilterConfig`]
#[derive(Debug, Clone, Default)]
pub struct DatasetFilter {
    config: FilterConfig,
}

impl DatasetFilter {
    /// Create a filter
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Filter configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Size window `[min_factor * min, max_factor * max]` over DEC rows
    ///
    /// `None` when no DEC row has a size value.
    pub fn size_window(&self, dataset: &Dataset) -> DatasetResult<Option<(f64, f64)>> {
        let idx = dataset.column_index(&self.config.size_column)?;
        let window = dataset
            .rows()
            .iter()
            .filter(|r| r.dec_opt == Some(InstanceKind::Dec) && is_known(r.is_sat))
            .filter_map(|r| r.get(idx))
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .map(|(lo, hi)| (lo * self.config.min_factor, hi * self.config.max_factor));
        Ok(window)
    }

    /// Apply the filter
    pub fn filter(&self, dataset: Dataset) -> DatasetResult<Dataset> {
        let required = match &self.config.required_columns {
            Some(cols) => cols
                .iter()
                .map(|c| dataset.column_index(c))
                .collect::<DatasetResult<Vec<_>>>()?,
            None => (0..dataset.columns().len()).collect(),
        };
        if self.config.min_factor < 0.0 || self.config.max_factor < 0.0 {
            return Err(DatasetError::InvalidConfig(
                "size window factors must be non-negative".to_string(),
            ));
        }

        let size_idx = dataset.column_index(&self.config.size_column)?;
        let window = self.size_window(&dataset)?;
        if window.is_none() {
            tracing::debug!("no DEC rows with a size; every OPT row falls outside the window");
        }

        let before = dataset.len();
        let mut seen = FxHashSet::default();
        let filtered = dataset.retain(|row| {
            if !is_known(row.is_sat) {
                return false;
            }
            if self
                .config
                .exclude_name_patterns
                .iter()
                .any(|p| row.name.contains(p.as_str()))
            {
                return false;
            }
            let in_window = match row.dec_opt {
                Some(InstanceKind::Dec) => true,
                Some(InstanceKind::Opt) => match (window, row.get(size_idx)) {
                    (Some((lo, hi)), Some(size)) => size >= lo && size <= hi,
                    _ => false,
                },
                None => false,
            };
            if !in_window || required.iter().any(|&i| row.get(i).is_none()) {
                return false;
            }
            !self.config.dedup_names || seen.insert(row.name.clone())
        });

        tracing::debug!(before, kept = filtered.len(), "filtered dataset");
        Ok(filtered)
    }
}

fn is_known(status: Option<SatStatus>) -> bool {
    matches!(status, Some(SatStatus::Sat | SatStatus::Unsat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    fn row(name: &str, size: Option<f64>, status: SatStatus, kind: InstanceKind) -> Row {
        Row::new(name, vec![size, Some(1.0)])
            .with_status(status)
            .with_kind(kind)
            .with_family("f")
    }

    fn dataset(rows: Vec<Row>) -> Dataset {
        Dataset::with_rows(vec!["size".to_string(), "other".to_string()], rows).unwrap()
    }

    fn filter() -> DatasetFilter {
        DatasetFilter::new(FilterConfig::default().with_size_column("size"))
    }

    #[test]
    fn test_opt_window() {
        use InstanceKind::{Dec, Opt};
        use SatStatus::{Sat, Unsat};
        let ds = dataset(vec![
            row("d1", Some(10.0), Sat, Dec),
            row("d2", Some(100.0), Unsat, Dec),
            row("o_low", Some(11.0), Sat, Opt),
            row("o_in_lo", Some(12.5), Sat, Opt),
            row("o_mid", Some(50.0), Unsat, Opt),
            row("o_in_hi", Some(79.5), Sat, Opt),
            row("o_high", Some(81.0), Sat, Opt),
        ]);

        let (lo, hi) = filter().size_window(&ds).unwrap().unwrap();
        assert!((lo - 12.0).abs() < 1e-9);
        assert!((hi - 80.0).abs() < 1e-9);
        let out = filter().filter(ds).unwrap();
        assert_eq!(
            out.names().collect::<Vec<_>>(),
            vec!["d1", "d2", "o_in_lo", "o_mid", "o_in_hi"]
        );
    }

    #[test]
    fn test_unknown_and_incomplete_rows_dropped() {
        let mut incomplete = row("d3", Some(20.0), SatStatus::Sat, InstanceKind::Dec);
        incomplete.values[1] = None;
        let ds = dataset(vec![
            row("d1", Some(10.0), SatStatus::Unknown, InstanceKind::Dec),
            row("d2", Some(10.0), SatStatus::Sat, InstanceKind::Dec),
            incomplete,
        ]);
        let out = filter().filter(ds).unwrap();
        assert_eq!(out.names().collect::<Vec<_>>(), vec!["d2"]);
    }

    #[test]
    fn test_no_dec_rows_drops_all_opt() {
        let ds = dataset(vec![
            row("o1", Some(10.0), SatStatus::Sat, InstanceKind::Opt),
            row("o2", Some(20.0), SatStatus::Unsat, InstanceKind::Opt),
        ]);
        assert_eq!(filter().size_window(&ds).unwrap(), None);
        assert!(filter().filter(ds).unwrap().is_empty());
    }

    #[test]
    fn test_exclusions_and_dedup() {
        let ds = dataset(vec![
            row("aim-50", Some(10.0), SatStatus::Sat, InstanceKind::Dec),
            row("x", Some(10.0), SatStatus::Sat, InstanceKind::Dec),
            row("x", Some(11.0), SatStatus::Unsat, InstanceKind::Dec),
        ]);
        let out = DatasetFilter::new(
            FilterConfig::default()
                .with_size_column("size")
                .with_dedup(true),
        )
        .filter(ds)
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.rows()[0].is_sat, Some(SatStatus::Sat));
    }

    #[test]
    fn test_missing_size_column() {
        let ds = dataset(vec![]);
        let f = DatasetFilter::new(FilterConfig::default());
        assert!(matches!(f.filter(ds), Err(DatasetError::MissingColumn(_))));
    }
}
