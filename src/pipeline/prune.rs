use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use crate::types::{CleanRecord, Ranked};

/// Row accounting for the prune stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneStats {
    pub rows_pruned: usize,
    /// Records that only became identical once standardized
    pub duplicates_collapsed: usize,
}

/// Whether a record says nothing about the size of the layoff
pub fn is_uninformative(record: &CleanRecord) -> bool {
    record.total_laid_off.is_none() && record.percentage_laid_off.is_none()
}

/// Delete uninformative records, drop the dedup ordinal so the result has
/// the persisted shape, then keep the first of any records that are now
/// identical across all nine fields.
pub fn prune(rows: Vec<Ranked<CleanRecord>>) -> (Vec<CleanRecord>, PruneStats) {
    let rows_in = rows.len();
    let informative: Vec<CleanRecord> = rows
        .into_iter()
        .filter(|r| !is_uninformative(&r.record))
        .map(|r| r.record)
        .collect();
    let rows_pruned = rows_in - informative.len();

    let mut seen: HashSet<CleanRecord> = HashSet::with_capacity(informative.len());
    let mut kept = Vec::with_capacity(informative.len());
    for record in informative {
        if !seen.contains(&record) {
            seen.insert(record.clone());
            kept.push(record);
        }
    }

    let stats = PruneStats {
        rows_pruned,
        duplicates_collapsed: rows_in - rows_pruned - kept.len(),
    };
    info!(
        pruned = stats.rows_pruned,
        collapsed = stats.duplicates_collapsed,
        rows = kept.len(),
        "pruned uninformative records"
    );
    (kept, stats)
}
