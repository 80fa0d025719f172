// Aggregator: campaign facets derived from a fetched batch.

use std::collections::BTreeSet;

use crate::model::NpcRecord;

/// Distinct non-blank campaigns across `records`, sorted ascending.
pub fn distinct_campaigns(records: &[NpcRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.campaign.as_str())
        .filter(|c| !c.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
