use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::types::{RawRecord, Ranked};

/// Row accounting for the dedup stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    pub rows_in: usize,
    pub duplicates_removed: usize,
}

/// Number each record within its business-key group, in input order
/// starting at 1.
pub fn rank(records: Vec<RawRecord>) -> Vec<Ranked<RawRecord>> {
    let mut seen: HashMap<_, usize> = HashMap::with_capacity(records.len());
    let mut ranks = Vec::with_capacity(records.len());
    for record in &records {
        let n = seen.entry(record.business_key()).or_insert(0);
        *n += 1;
        ranks.push(*n);
    }
    drop(seen);

    records
        .into_iter()
        .zip(ranks)
        .map(|(record, row_num)| Ranked { row_num, record })
        .collect()
}

/// Keep the first record of every business-key group. Records differing in
/// any one of the nine fields are distinct events and all survive.
pub fn deduplicate(records: Vec<RawRecord>) -> (Vec<Ranked<RawRecord>>, DedupStats) {
    let rows_in = records.len();
    let mut ranked = rank(records);
    ranked.retain(|r| r.row_num == 1);

    let stats = DedupStats {
        rows_in,
        duplicates_removed: rows_in - ranked.len(),
    };
    info!(
        rows_in,
        removed = stats.duplicates_removed,
        "removed duplicate records"
    );
    (ranked, stats)
}
