//! Joining reference labels, kinds and families onto a dataset

use crate::loader::ReferenceTables;
use crate::table::Dataset;
use mrfsat_core::normalize_instance_name;

/// Inner-joins a dataset against [`ReferenceTables`]
#[derive(Debug, Clone, Copy)]
pub struct DatasetEnricher<'a> {
    tables: &'a ReferenceTables,
}

impl<'a> DatasetEnricher<'a> {
    /// Enricher over borrowed reference tables
    pub fn new(tables: &'a ReferenceTables) -> Self {
        Self { tables }
    }

    /// Attach `is_sat`, `dec_opt` and `family` to every row
    ///
    /// A row survives only when its name has a baseline status, an instance
    /// kind and a family. Unmatched rows are dropped.
    pub fn enrich(&self, dataset: Dataset) -> Dataset {
        let before = dataset.len();
        let mut unlabelled = 0usize;
        let mut no_family = 0usize;

        let enriched = dataset.filter_map_rows(|mut row| {
            let key = normalize_instance_name(&row.name);
            let (Some(&status), Some(&kind)) =
                (self.tables.baseline.get(&key), self.tables.dec_opt.get(&key))
            else {
                unlabelled += 1;
                return None;
            };
            let Some(family) = self.tables.family.get(&key) else {
                no_family += 1;
                return None;
            };
            row.name = key;
            row.is_sat = Some(status);
            row.dec_opt = Some(kind);
            row.family = Some(family.clone());
            Some(row)
        });

        tracing::debug!(before, kept = enriched.len(), unlabelled, no_family, "enriched dataset");
        enriched
    }
}
