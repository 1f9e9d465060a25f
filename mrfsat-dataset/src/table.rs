//! In-memory training dataset
//!
//! A [`Dataset`] is an ordered list of numeric columns plus per-row
//! metadata (label, instance kind, family). Missing or undefined cells are
//! `None`. Preparation stages take a dataset by value and return a new one.

use crate::error::{DatasetError, DatasetResult};
use mrfsat_core::Label;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Reference satisfiability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SatStatus {
    /// Unknown; excluded from training (`-1`)
    Unknown,
    /// Unsatisfiable (`0`)
    Unsat,
    /// Satisfiable (`1`)
    Sat,
}

impl SatStatus {
    /// Parse `-1`/`0`/`1` (integer or float form) or `true`/`false`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "true" | "sat" => return Some(Self::Sat),
            "false" | "unsat" => return Some(Self::Unsat),
            _ => {}
        }
        let code = s.parse::<f64>().ok()?;
        if code == 1.0 {
            Some(Self::Sat)
        } else if code == 0.0 {
            Some(Self::Unsat)
        } else if code == -1.0 {
            Some(Self::Unknown)
        } else {
            None
        }
    }

    /// Trinary code as written to CSV
    pub fn code(self) -> i8 {
        match self {
            Self::Unknown => -1,
            Self::Unsat => 0,
            Self::Sat => 1,
        }
    }

    /// Training label, if known
    pub fn label(self) -> Option<Label> {
        match self {
            Self::Unknown => None,
            Self::Unsat => Some(Label::Unsat),
            Self::Sat => Some(Label::Sat),
        }
    }
}

/// Decision or optimization instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceKind {
    /// Decision instance (`DEC`)
    Dec,
    /// Optimization instance (`OPT`)
    Opt,
}

impl InstanceKind {
    /// Parse `DEC`/`OPT`, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEC" => Some(Self::Dec),
            "OPT" => Some(Self::Opt),
            _ => None,
        }
    }

    /// Canonical spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dec => "DEC",
            Self::Opt => "OPT",
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instance in a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Normalized instance name
    pub name: String,
    /// Cells, one per dataset column
    pub values: Vec<Option<f64>>,
    /// Reference status, set by enrichment
    pub is_sat: Option<SatStatus>,
    /// Instance kind, set by enrichment
    pub dec_opt: Option<InstanceKind>,
    /// Benchmark family, set by enrichment
    pub family: Option<String>,
}

impl Row {
    /// Row without metadata
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
            is_sat: None,
            dec_opt: None,
            family: None,
        }
    }

    /// Set the reference status
    #[must_use]
    pub fn with_status(mut self, status: SatStatus) -> Self {
        self.is_sat = Some(status);
        self
    }

    /// Set the instance kind
    #[must_use]
    pub fn with_kind(mut self, kind: InstanceKind) -> Self {
        self.dec_opt = Some(kind);
        self
    }

    /// Set the family
    #[must_use]
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Cell at column `idx`
    pub fn get(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied().flatten()
    }

    /// Training label (`None` unless SAT or UNSAT)
    pub fn label(&self) -> Option<Label> {
        self.is_sat.and_then(SatStatus::label)
    }
}

/// Feature matrix and labels ready for fitting
#[derive(Debug, Clone, Default)]
pub struct TrainingMatrix {
    /// One row per kept instance
    pub x: Vec<Vec<f64>>,
    /// Labels aligned with `x`
    pub y: Vec<Label>,
    /// Column names of `x`
    pub feature_names: Vec<String>,
    /// Rows left out for missing cells or labels
    pub skipped: usize,
}

/// Columnar training dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// Metadata columns appended by [`Dataset::write_csv`]
pub const METADATA_COLUMNS: [&str; 3] = ["is_sat", "dec_opt", "family"];

impl Dataset {
    /// Empty dataset with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Dataset from rows, checking every row's width
    pub fn with_rows(columns: Vec<String>, rows: Vec<Row>) -> DatasetResult<Self> {
        let mut dataset = Self::new(columns);
        dataset.rows.reserve(rows.len());
        for row in rows {
            dataset.push(row)?;
        }
        Ok(dataset)
    }

    /// Append a row
    pub fn push(&mut self, row: Row) -> DatasetResult<()> {
        if row.values.len() != self.columns.len() {
            return Err(DatasetError::InvalidConfig(format!(
                "row '{}' has {} cells but the dataset has {} columns",
                row.name,
                row.values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume into rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Index of a column
    pub fn column_index(&self, name: &str) -> DatasetResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    /// Instance names in row order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.name.as_str())
    }

    /// Keep rows matching `keep`, preserving order
    #[must_use]
    pub fn retain(mut self, keep: impl FnMut(&Row) -> bool) -> Self {
        self.rows.retain(keep);
        self
    }

    /// Rewrite or drop rows; row widths must be left unchanged
    pub(crate) fn filter_map_rows(mut self, f: impl FnMut(Row) -> Option<Row>) -> Self {
        self.rows = self.rows.into_iter().filter_map(f).collect();
        self
    }

    /// Add a column, or overwrite it if it exists
    pub fn set_column(&mut self, name: &str, values: Vec<Option<f64>>) -> DatasetResult<()> {
        if values.len() != self.rows.len() {
            return Err(DatasetError::InvalidConfig(format!(
                "column '{name}' has {} cells but the dataset has {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.values[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.values.push(v);
                }
            }
        }
        Ok(())
    }

    /// Select feature columns and labels for fitting
    pub fn to_matrix(&self, features: &[String]) -> DatasetResult<TrainingMatrix> {
        let indices = features
            .iter()
            .map(|f| self.column_index(f))
            .collect::<DatasetResult<Vec<_>>>()?;

        let mut matrix = TrainingMatrix {
            feature_names: features.to_vec(),
            ..Default::default()
        };
        for row in &self.rows {
            let cells: Option<Vec<f64>> = indices.iter().map(|&i| row.get(i)).collect();
            match (cells, row.label()) {
                (Some(cells), Some(label)) => {
                    matrix.x.push(cells);
                    matrix.y.push(label);
                }
                _ => matrix.skipped += 1,
            }
        }

        if matrix.skipped > 0 {
            tracing::debug!(
                kept = matrix.x.len(),
                skipped = matrix.skipped,
                "rows left out of training matrix"
            );
        }
        Ok(matrix)
    }

    /// Write the dataset as headered CSV; missing cells are empty
    pub fn write_csv(&self, path: &Path) -> DatasetResult<()> {
        let file = File::create(path).map_err(|e| DatasetError::io(path, e))?;
        let mut writer = csv::Writer::from_writer(file);

        let header = std::iter::once("name")
            .chain(self.columns.iter().map(String::as_str))
            .chain(METADATA_COLUMNS);
        writer.write_record(header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(self.columns.len() + 4);
            record.push(row.name.clone());
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            record.push(row.is_sat.map(|s| s.code().to_string()).unwrap_or_default());
            record.push(row.dec_opt.map(|k| k.as_str().to_string()).unwrap_or_default());
            record.push(row.family.clone().unwrap_or_default());
            writer.write_record(&record)?;
        }
        writer.flush().map_err(|e| DatasetError::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::with_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![
                Row::new("x", vec![Some(1.0), Some(2.0)]).with_status(SatStatus::Sat),
                Row::new("y", vec![Some(3.0), None]).with_status(SatStatus::Unsat),
                Row::new("z", vec![Some(5.0), Some(6.0)]).with_status(SatStatus::Unknown),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(SatStatus::parse("1"), Some(SatStatus::Sat));
        assert_eq!(SatStatus::parse("0.0"), Some(SatStatus::Unsat));
        assert_eq!(SatStatus::parse("-1"), Some(SatStatus::Unknown));
        assert_eq!(SatStatus::parse("True"), Some(SatStatus::Sat));
        assert_eq!(SatStatus::parse("2"), None);
        assert_eq!(SatStatus::parse(""), None);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(InstanceKind::parse("dec"), Some(InstanceKind::Dec));
        assert_eq!(InstanceKind::parse(" OPT "), Some(InstanceKind::Opt));
        assert_eq!(InstanceKind::parse("both"), None);
    }

    #[test]
    fn test_push_checks_width() {
        let mut ds = Dataset::new(vec!["a".to_string()]);
        assert!(ds.push(Row::new("x", vec![])).is_err());
        assert!(ds.push(Row::new("x", vec![None])).is_ok());
    }

    #[test]
    fn test_to_matrix_skips_incomplete_rows() {
        let ds = sample();
        let m = ds.to_matrix(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(m.x, vec![vec![1.0, 2.0]]);
        assert_eq!(m.y, vec![Label::Sat]);
        assert_eq!(m.skipped, 2);

        let m = ds.to_matrix(&["a".to_string()]).unwrap();
        assert_eq!(m.x.len(), 2);
        assert_eq!(m.skipped, 1);

        assert!(matches!(
            ds.to_matrix(&["c".to_string()]),
            Err(DatasetError::MissingColumn(c)) if c == "c"
        ));
    }

    #[test]
    fn test_set_column_overwrites() {
        let mut ds = sample();
        ds.set_column("c", vec![None, None, Some(1.0)]).unwrap();
        assert_eq!(ds.columns().len(), 3);
        ds.set_column("c", vec![Some(2.0), Some(2.0), Some(2.0)]).unwrap();
        assert_eq!(ds.columns().len(), 3);
        assert!(ds.rows().iter().all(|r| r.get(2) == Some(2.0)));
        assert!(ds.set_column("d", vec![]).is_err());
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let ds = sample().retain(|r| r.name != "z");
        ds.write_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,a,b,is_sat,dec_opt,family");
        assert_eq!(lines[1], "x,1,2,1,,");
        assert_eq!(lines[2], "y,3,,0,,");
    }
}
