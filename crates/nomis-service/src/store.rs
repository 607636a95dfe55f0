//! In-memory historical snapshot store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use nomis_core::ScoringCalculationModel;
use nomis_core::error::StoreError;
use nomis_core::traits::SnapshotStore;
use parking_lot::RwLock;

type SnapshotKey = (String, u64, ScoringCalculationModel);

/// [`SnapshotStore`] holding JSON blobs per (wallet, chain, model), newest first.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<SnapshotKey, Vec<(DateTime<Utc>, String)>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key(wallet: &str, chain_id: u64, model: ScoringCalculationModel) -> SnapshotKey {
    (wallet.to_ascii_lowercase(), chain_id, model)
}

impl SnapshotStore for MemorySnapshotStore {
    fn fetch(
        &self,
        wallet: &str,
        chain_id: u64,
        model: ScoringCalculationModel,
        since: DateTime<Utc>,
    ) -> Result<Vec<String>, StoreError> {
        let snapshots = self.snapshots.read();
        Ok(snapshots
            .get(&key(wallet, chain_id, model))
            .map(|list| {
                list.iter()
                    .filter(|(created_at, _)| *created_at >= since)
                    .map(|(_, json)| json.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn save(
        &self,
        wallet: &str,
        chain_id: u64,
        model: ScoringCalculationModel,
        stats_json: String,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write();
        let list = snapshots.entry(key(wallet, chain_id, model)).or_default();
        let pos = list.partition_point(|(t, _)| *t > created_at);
        list.insert(pos, (created_at, stats_json));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn fetch_is_newest_first() {
        let store = MemorySnapshotStore::new();
        let m = ScoringCalculationModel::CommonV1;
        store.save("0xabc", 1, m, "a".into(), at(1)).unwrap();
        store.save("0xabc", 1, m, "c".into(), at(3)).unwrap();
        store.save("0xabc", 1, m, "b".into(), at(2)).unwrap();
        assert_eq!(store.fetch("0xabc", 1, m, at(1)).unwrap(), vec!["c", "b", "a"]);
    }

    #[test]
    fn fetch_respects_since() {
        let store = MemorySnapshotStore::new();
        let m = ScoringCalculationModel::CommonV1;
        store.save("0xabc", 1, m, "old".into(), at(1)).unwrap();
        store.save("0xabc", 1, m, "new".into(), at(10)).unwrap();
        assert_eq!(store.fetch("0xabc", 1, m, at(5)).unwrap(), vec!["new"]);
    }

    #[test]
    fn keys_are_scoped_by_chain_and_model() {
        let store = MemorySnapshotStore::new();
        store.save("0xABC", 1, ScoringCalculationModel::CommonV1, "x".into(), at(1)).unwrap();
        assert_eq!(store.fetch("0xabc", 1, ScoringCalculationModel::CommonV1, at(1)).unwrap().len(), 1);
        assert!(store.fetch("0xabc", 137, ScoringCalculationModel::CommonV1, at(1)).unwrap().is_empty());
        assert!(store.fetch("0xabc", 1, ScoringCalculationModel::Base, at(1)).unwrap().is_empty());
        assert_eq!(store.len(), 1);
    }
}
