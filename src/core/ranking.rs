use crate::domain::model::{PackageRecord, ScoredRecord};

/// Orders records by descending score and drops the score value.
/// The sort is stable, so equal scores keep the order they were processed in.
pub fn rank(mut records: Vec<ScoredRecord>) -> Vec<PackageRecord> {
    records.sort_by(|a, b| b.score_value.cmp(&a.score_value));
    records.into_iter().map(|scored| scored.record).collect()
}
