//! Training-only derived columns

use crate::error::DatasetResult;
use crate::loader::columns;
use crate::table::Dataset;

/// `variable_clusters / total_clusters`
pub const RATIO: &str = "ratio";
/// `min(1, ratio)`
pub const RATIO_NORM: &str = "ratio_norm";
/// `std_dev_intersection²`
pub const VAR_INTERSECTION: &str = "var_intersection";
/// `(total_clusters - variable_clusters) / total_clusters`
pub const FORMULA_RATIO: &str = "formula_ratio";

/// Default classifier inputs for models trained on the analyzer export
pub const TRAINING_FEATURES: [&str; 4] = [
    columns::AVERAGE_INTERSECTION,
    columns::STD_DEV_INTERSECTION,
    RATIO,
    FORMULA_RATIO,
];

/// Adds [`RATIO`], [`RATIO_NORM`], [`VAR_INTERSECTION`] and [`FORMULA_RATIO`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtender;

impl FeatureExtender {
    /// Create an extender
    pub fn new() -> Self {
        Self
    }

    /// Compute the derived columns, overwriting earlier ones
    ///
    /// A zero cluster count or a missing source cell leaves the derived cell
    /// missing.
    pub fn extend(&self, mut dataset: Dataset) -> DatasetResult<Dataset> {
        let vc = dataset.column_index(columns::VARIABLE_CLUSTERS)?;
        let tc = dataset.column_index(columns::TOTAL_CLUSTERS)?;
        let sd = dataset.column_index(columns::STD_DEV_INTERSECTION)?;

        let n = dataset.len();
        let (mut ratio, mut ratio_norm, mut var_int, mut formula) = (
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
        );
        for row in dataset.rows() {
            let total = row.get(tc).filter(|&t| t != 0.0);
            let r = row.get(vc).zip(total).map(|(v, t)| v / t);
            ratio.push(r);
            ratio_norm.push(r.map(|r| r.min(1.0)));
            var_int.push(row.get(sd).map(|s| s * s));
            formula.push(row.get(vc).zip(total).map(|(v, t)| (t - v) / t));
        }

        dataset.set_column(RATIO, ratio)?;
        dataset.set_column(RATIO_NORM, ratio_norm)?;
        dataset.set_column(VAR_INTERSECTION, var_int)?;
        dataset.set_column(FORMULA_RATIO, formula)?;
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatasetError;
    use crate::table::Row;

    fn export(rows: Vec<Row>) -> Dataset {
        Dataset::with_rows(
            columns::MRFSAT_EXPORT.iter().map(|c| c.to_string()).collect(),
            rows,
        )
        .unwrap()
    }

    fn cells(vc: f64, tc: f64, sd: Option<f64>) -> Vec<Option<f64>> {
        vec![Some(vc), Some(tc), Some(50.0), Some(20.0), Some(0.5), sd]
    }

    #[test]
    fn test_extend_values() {
        let ds = export(vec![Row::new("a", cells(3.0, 4.0, Some(0.5)))]);
        let out = FeatureExtender::new().extend(ds).unwrap();

        let row = &out.rows()[0];
        let get = |c: &str| row.get(out.column_index(c).unwrap());
        assert_eq!(get(RATIO), Some(0.75));
        assert_eq!(get(RATIO_NORM), Some(0.75));
        assert_eq!(get(VAR_INTERSECTION), Some(0.25));
        assert_eq!(get(FORMULA_RATIO), Some(0.25));
    }

    #[test]
    fn test_ratio_norm_caps_at_one() {
        let ds = export(vec![Row::new("a", cells(6.0, 4.0, Some(1.0)))]);
        let out = FeatureExtender::new().extend(ds).unwrap();
        let idx = out.column_index(RATIO_NORM).unwrap();
        assert_eq!(out.rows()[0].get(idx), Some(1.0));
    }

    #[test]
    fn test_degenerate_rows_get_missing_cells() {
        let ds = export(vec![
            Row::new("zero", cells(0.0, 0.0, Some(1.0))),
            Row::new("nosd", cells(1.0, 2.0, None)),
        ]);
        let out = FeatureExtender::new().extend(ds).unwrap();
        assert_eq!(out.len(), 2);

        let ratio = out.column_index(RATIO).unwrap();
        let var = out.column_index(VAR_INTERSECTION).unwrap();
        assert_eq!(out.rows()[0].get(ratio), None);
        assert_eq!(out.rows()[1].get(ratio), Some(0.5));
        assert_eq!(out.rows()[1].get(var), None);
    }

    #[test]
    fn test_re_extend_overwrites() {
        let ds = export(vec![Row::new("a", cells(1.0, 2.0, Some(1.0)))]);
        let once = FeatureExtender::new().extend(ds).unwrap();
        let twice = FeatureExtender::new().extend(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.columns().len(), 10);
    }

    #[test]
    fn test_missing_source_column() {
        let ds = Dataset::new(vec!["variable_clusters".to_string()]);
        assert!(matches!(
            FeatureExtender::new().extend(ds),
            Err(DatasetError::MissingColumn(_))
        ));
    }
}
