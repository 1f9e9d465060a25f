//! Property-based tests for record parsing and vector assembly

use mrfsat_core::{
    FeatureError, FeatureSchema, FeatureVectorBuilder, RecordParser, RecordSchema, fields,
};
use proptest::prelude::*;

fn line(name: &str, counts: [u64; 4], stats: [f64; 4]) -> String {
    format!(
        "{name},{},{},{},{},{},{},{},{}",
        counts[0], counts[1], counts[2], counts[3], stats[0], stats[1], stats[2], stats[3]
    )
}

proptest! {
    /// The ratio is exactly variable_clusters / total_clusters and non-negative
    #[test]
    fn ratio_is_exact(
        vc in 1u64..10_000,
        tc in 1u64..10_000,
        clauses in 0u64..100_000,
        vars in 0u64..100_000,
    ) {
        let parser = RecordParser::default();
        let record = parser
            .parse_line(&line("p", [vc, tc, clauses, vars], [0.5, 0.1, 1.0, 0.2]))
            .unwrap();

        prop_assert!(record.ratio() >= 0.0);
        prop_assert_eq!(record.ratio(), vc as f64 / tc as f64);
        prop_assert_eq!(record.clauses_per_cluster(), clauses as f64 / tc as f64);
        prop_assert_eq!(record.variables_per_cluster(), vars as f64 / vc as f64);
    }

    /// A zero divisor never yields a record
    #[test]
    fn zero_total_clusters_never_parses(vc in 0u64..100, clauses in 0u64..100) {
        let parser = RecordParser::default();
        let result = parser.parse_line(&line("z", [vc, 0, clauses, 7], [0.5, 0.1, 1.0, 0.2]));
        let is_division_by_zero = matches!(result, Err(FeatureError::DivisionByZero { .. }));
        prop_assert!(is_division_by_zero);
    }

    /// Vectors always match the schema length and are finite
    #[test]
    fn vector_length_matches_schema(
        vc in 1u64..500,
        tc in 1u64..500,
        af in -10.0f64..10.0,
        sf in 0.0f64..5.0,
        take in 1usize..=5,
    ) {
        let names: Vec<&str> = [
            fields::RATIO,
            fields::AVERAGE_FREEDOM,
            fields::STD_DEV_FREEDOM,
            fields::CLAUSES_PER_CLUSTER,
            fields::VARIABLES_PER_CLUSTER,
        ]
        .into_iter()
        .take(take)
        .collect();
        let schema = FeatureSchema::new(names);
        let builder = FeatureVectorBuilder::new(schema, &RecordSchema::canonical()).unwrap();

        let record = RecordParser::default()
            .parse_line(&line("v", [vc, tc, 10, 10], [af, sf, 1.0, 0.2]))
            .unwrap();
        let vector = builder.build(&record).unwrap();

        prop_assert_eq!(vector.len(), take);
        prop_assert!(vector.as_slice().iter().all(|v| v.is_finite()));
    }

    /// Any line with the wrong number of values is a token-count error
    #[test]
    fn wrong_arity_is_token_count_error(extra in 1usize..5) {
        let mut raw = line("a", [1, 2, 3, 4], [0.5, 0.1, 1.0, 0.2]);
        for _ in 0..extra {
            raw.push_str(",1");
        }
        let result = RecordParser::default().parse_line(&raw);
        let is_token_count = matches!(result, Err(FeatureError::TokenCount { got, .. }) if got == 8 + extra);
        prop_assert!(is_token_count);
    }
}
