//! Restricting two datasets to their common instances

use crate::table::Dataset;
use rustc_hash::FxHashSet;

/// Restrict `primary` and `secondary` to the instance names they share
///
/// Each side keeps its own columns and row order.
pub fn align(primary: Dataset, secondary: Dataset) -> (Dataset, Dataset) {
    let left: FxHashSet<String> = primary.names().map(str::to_string).collect();
    let right: FxHashSet<String> = secondary.names().map(str::to_string).collect();
    let common: FxHashSet<&String> = left.intersection(&right).collect();

    let (before_p, before_s) = (primary.len(), secondary.len());
    let primary = primary.retain(|r| common.contains(&r.name));
    let secondary = secondary.retain(|r| common.contains(&r.name));

    tracing::debug!(
        common = common.len(),
        primary_dropped = before_p - primary.len(),
        secondary_dropped = before_s - secondary.len(),
        "aligned datasets"
    );
    (primary, secondary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    fn named(names: &[&str]) -> Dataset {
        Dataset::with_rows(
            vec!["v".to_string()],
            names.iter().map(|n| Row::new(*n, vec![Some(1.0)])).collect(),
        )
        .unwrap()
    }

    fn names(ds: &Dataset) -> Vec<&str> {
        ds.names().collect()
    }

    #[test]
    fn test_align_intersects() {
        let (a, b) = align(named(&["a", "b", "c"]), named(&["d", "c", "b"]));
        assert_eq!(names(&a), vec!["b", "c"]);
        assert_eq!(names(&b), vec!["c", "b"]);
    }

    #[test]
    fn test_align_commutative_and_idempotent() {
        let (a1, b1) = align(named(&["a", "b", "c"]), named(&["b", "c", "d"]));
        let (b2, a2) = align(named(&["b", "c", "d"]), named(&["a", "b", "c"]));
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);

        let (a3, b3) = align(a1.clone(), b1.clone());
        assert_eq!(a3, a1);
        assert_eq!(b3, b1);
    }

    #[test]
    fn test_align_disjoint() {
        let (a, b) = align(named(&["a"]), named(&["b"]));
        assert!(a.is_empty() && b.is_empty());
    }
}
