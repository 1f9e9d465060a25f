//! Property-based tests for balancing and alignment

use mrfsat_dataset::{BalanceConfig, ClassBalancer, Dataset, Row, SatStatus, align};
use proptest::prelude::*;
use std::collections::HashSet;

fn build(rows: &[(u8, u8, bool)]) -> Dataset {
    Dataset::with_rows(
        vec!["size".to_string(), "vars".to_string()],
        rows.iter()
            .enumerate()
            .map(|(i, &(s, v, sat))| {
                let status = if sat { SatStatus::Sat } else { SatStatus::Unsat };
                Row::new(format!("r{i}"), vec![Some(f64::from(s)), Some(f64::from(v))]).with_status(status)
            })
            .collect(),
    )
    .unwrap()
}

fn named(names: &[u8]) -> Dataset {
    Dataset::with_rows(
        vec![],
        names.iter().map(|n| Row::new(format!("n{n}"), vec![])).collect(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn balanced_output_has_equal_classes(
        rows in prop::collection::vec((0u8..20, 0u8..20, any::<bool>()), 0..80),
        bins in 1usize..6,
        seed in any::<u64>(),
    ) {
        let input = build(&rows);
        let input_names: HashSet<String> = input.names().map(str::to_string).collect();
        let balancer = ClassBalancer::new(
            BalanceConfig::default().with_columns("size", "vars").with_bins(bins).with_seed(seed),
        );
        let (out, summary) = balancer.balance(input).unwrap();

        let sat = out.rows().iter().filter(|r| r.is_sat == Some(SatStatus::Sat)).count();
        prop_assert_eq!(sat * 2, out.len());
        prop_assert_eq!(summary.kept + summary.dropped, rows.len());
        prop_assert!(summary.strata <= bins * bins);
        prop_assert!(out.names().all(|n| input_names.contains(n)));
    }

    #[test]
    fn align_restricts_to_common_names(
        left in prop::collection::vec(0u8..30, 0..30),
        right in prop::collection::vec(0u8..30, 0..30),
    ) {
        let (a, b) = align(named(&left), named(&right));
        let a_names: HashSet<&str> = a.names().collect();
        let b_names: HashSet<&str> = b.names().collect();
        prop_assert_eq!(&a_names, &b_names);

        let (b2, a2) = align(named(&right), named(&left));
        prop_assert_eq!(a, a2);
        prop_assert_eq!(b, b2);
    }
}
