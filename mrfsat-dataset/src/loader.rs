//! CSV loaders for analyzer exports and reference tables
//!
//! Readers are tolerant: a malformed record is logged and skipped so one bad
//! line does not discard a whole export.

use crate::error::{DatasetError, DatasetResult};
use crate::table::{Dataset, InstanceKind, METADATA_COLUMNS, Row, SatStatus};
use mrfsat_core::normalize_instance_name;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::path::Path;

/// Column names of the analyzer's training export
pub mod columns {
    /// Clusters made of variables
    pub const VARIABLE_CLUSTERS: &str = "variable_clusters";
    /// All clusters
    pub const TOTAL_CLUSTERS: &str = "total_clusters";
    /// Constraint count, the default size metric
    pub const FORMULA_CONSTRAINTS: &str = "formula_constraints";
    /// Variable count
    pub const VARIABLES: &str = "variables";
    /// Mean cluster intersection size
    pub const AVERAGE_INTERSECTION: &str = "average_intersection";
    /// Standard deviation of cluster intersection size
    pub const STD_DEV_INTERSECTION: &str = "std_dev_intersection";

    /// Export layout after the instance name
    pub const MRFSAT_EXPORT: [&str; 6] = [
        VARIABLE_CLUSTERS,
        TOTAL_CLUSTERS,
        FORMULA_CONSTRAINTS,
        VARIABLES,
        AVERAGE_INTERSECTION,
        STD_DEV_INTERSECTION,
    ];
}

fn open_reader(path: &Path, has_headers: bool) -> DatasetResult<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

/// Strict cell parse: empty, NaN and infinite cells are missing, anything
/// else must be a number
fn parse_strict(cell: &str) -> Result<Option<f64>, ()> {
    if cell.is_empty() {
        return Ok(None);
    }
    let v = cell.parse::<f64>().map_err(|_| ())?;
    Ok(v.is_finite().then_some(v))
}

/// Lenient cell parse: unparseable and NaN cells are missing, infinities kept
fn parse_lenient(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Load the analyzer's headerless training export
///
/// Columns are `name` followed by [`columns::MRFSAT_EXPORT`]. A trailing
/// empty cell is tolerated.
pub fn load_mrfsat_export(path: &Path) -> DatasetResult<Dataset> {
    let mut reader = open_reader(path, false)?;
    let columns: Vec<String> = columns::MRFSAT_EXPORT.iter().map(|c| c.to_string()).collect();
    let mut dataset = Dataset::new(columns);
    let mut skipped = 0usize;

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path = %path.display(), line = line + 1, error = %e, "skipping unreadable record");
                skipped += 1;
                continue;
            }
        };

        let mut cells: Vec<&str> = record.iter().collect();
        if cells.len() > 1 && cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        let Some((name, values)) = cells.split_first() else {
            continue;
        };
        if name.is_empty() && values.iter().all(|c| c.is_empty()) {
            continue;
        }
        if name.is_empty() || values.len() != columns::MRFSAT_EXPORT.len() {
            tracing::warn!(
                path = %path.display(),
                line = line + 1,
                cells = values.len(),
                "skipping record with wrong shape"
            );
            skipped += 1;
            continue;
        }

        let parsed: Result<Vec<Option<f64>>, ()> = values.iter().map(|c| parse_strict(c)).collect();
        let Ok(values) = parsed else {
            tracing::warn!(path = %path.display(), line = line + 1, "skipping record with non-numeric cell");
            skipped += 1;
            continue;
        };
        dataset.push(Row::new(normalize_instance_name(name), values))?;
    }

    tracing::debug!(path = %path.display(), rows = dataset.len(), skipped, "loaded analyzer export");
    Ok(dataset)
}

/// Load a headered third-party feature export
///
/// The first column is the instance name; every other column is numeric.
pub fn load_feature_export(path: &Path) -> DatasetResult<Dataset> {
    let mut reader = open_reader(path, true)?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(DatasetError::MissingColumn("name".to_string()));
    }
    let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let width = headers.len();
    let mut dataset = Dataset::new(columns);
    let mut skipped = 0usize;

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) if r.len() == width && r.get(0).is_some_and(|n| !n.is_empty()) => r,
            Ok(r) => {
                tracing::warn!(path = %path.display(), line = line + 2, cells = r.len(), expected = width, "skipping record with wrong shape");
                skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), line = line + 2, error = %e, "skipping unreadable record");
                skipped += 1;
                continue;
            }
        };

        let name = normalize_instance_name(&record[0]);
        let values = record.iter().skip(1).map(parse_lenient).collect();
        dataset.push(Row::new(name, values))?;
    }

    tracing::debug!(path = %path.display(), rows = dataset.len(), skipped, "loaded feature export");
    Ok(dataset)
}

/// Load a dataset previously written by [`Dataset::write_csv`]
pub fn load_prepared_dataset(path: &Path) -> DatasetResult<Dataset> {
    let mut reader = open_reader(path, true)?;
    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let name_idx = position("name").ok_or_else(|| DatasetError::MissingColumn("name".to_string()))?;
    let status_idx = position(METADATA_COLUMNS[0]);
    let kind_idx = position(METADATA_COLUMNS[1]);
    let family_idx = position(METADATA_COLUMNS[2]);
    let data_idx: Vec<usize> = (0..headers.len())
        .filter(|&i| i != name_idx && Some(i) != status_idx && Some(i) != kind_idx && Some(i) != family_idx)
        .collect();

    let columns = data_idx.iter().map(|&i| headers[i].to_string()).collect();
    let mut dataset = Dataset::new(columns);

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) if r.len() == headers.len() => r,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %path.display(), line = line + 2, "skipping malformed record");
                continue;
            }
        };

        let mut row = Row::new(
            &record[name_idx],
            data_idx.iter().map(|&i| parse_lenient(&record[i])).collect(),
        );
        row.is_sat = status_idx.and_then(|i| SatStatus::parse(&record[i]));
        row.dec_opt = kind_idx.and_then(|i| InstanceKind::parse(&record[i]));
        row.family = family_idx
            .map(|i| record[i].to_string())
            .filter(|f| !f.is_empty());
        dataset.push(row)?;
    }
    Ok(dataset)
}

/// Baseline labels, instance kinds and families keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    /// Reference satisfiability status
    pub baseline: FxHashMap<String, SatStatus>,
    /// Decision/optimization category
    pub dec_opt: FxHashMap<String, InstanceKind>,
    /// Benchmark family
    pub family: FxHashMap<String, String>,
}

impl ReferenceTables {
    /// Read `baseline.csv` (`name,is_sat`), `dec_opt_mapping.csv`
    /// (`name,dec_opt`) and `family_mapping.csv` (`name,family`)
    pub fn load(baseline: &Path, dec_opt: &Path, family: &Path) -> DatasetResult<Self> {
        let tables = Self {
            baseline: read_keyed(baseline, "is_sat", SatStatus::parse)?,
            dec_opt: read_keyed(dec_opt, "dec_opt", InstanceKind::parse)?,
            family: read_keyed(family, "family", |s| {
                (!s.is_empty()).then(|| s.to_string())
            })?,
        };
        tracing::debug!(
            baseline = tables.baseline.len(),
            dec_opt = tables.dec_opt.len(),
            family = tables.family.len(),
            "loaded reference tables"
        );
        Ok(tables)
    }
}

fn read_keyed<T>(
    path: &Path,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> DatasetResult<FxHashMap<String, T>> {
    let mut reader = open_reader(path, true)?;
    let headers = reader.headers()?.clone();
    let name_idx = headers
        .iter()
        .position(|h| h == "name")
        .ok_or_else(|| DatasetError::MissingColumn("name".to_string()))?;
    let value_idx = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DatasetError::MissingColumn(column.to_string()))?;

    let mut table = FxHashMap::default();
    for (line, result) in reader.records().enumerate() {
        let parsed = result.ok().and_then(|r| {
            let name = r.get(name_idx).filter(|n| !n.is_empty())?;
            let value = parse(r.get(value_idx)?)?;
            Some((normalize_instance_name(name), value))
        });
        match parsed {
            Some((name, value)) => {
                table.entry(name).or_insert(value);
            }
            None => {
                tracing::warn!(path = %path.display(), line = line + 2, column, "skipping invalid reference record");
            }
        }
    }
    Ok(table)
}
