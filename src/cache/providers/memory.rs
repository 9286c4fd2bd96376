//! In-memory cache store provider.
//!
//! Keeps the same expiry semantics as the distributed backend (per-record
//! deadlines, index deadline refreshed on every write) so single-instance
//! deployments and tests exercise identical cursor cache behavior. Expired
//! entries are treated as absent on read and reaped lazily on write.

use crate::cache::errors::CacheResult;
use crate::cache::traits::{IndexedRecord, OrderedCacheStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Shelf {
    /// record key -> (payload, expiry deadline)
    records: HashMap<String, (String, Instant)>,

    /// index key -> (members sorted by (score, member), expiry deadline)
    indexes: HashMap<String, (Vec<(f64, String)>, Instant)>,
}

/// Ordered cache store held entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    shelf: RwLock<Shelf>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a single record without touching any index. Exists to simulate
    /// TTL skew between a record and the index that still lists it.
    pub fn evict_record(&self, record_key: &str) {
        self.shelf.write().records.remove(record_key);
    }

    /// Drop a whole ordered index, leaving its member records behind.
    pub fn evict_index(&self, index_key: &str) {
        self.shelf.write().indexes.remove(index_key);
    }

    fn live_members(shelf: &Shelf, index_key: &str) -> Option<Vec<String>> {
        let (members, deadline) = shelf.indexes.get(index_key)?;
        if *deadline <= Instant::now() {
            return None;
        }
        Some(members.iter().map(|(_, m)| m.clone()).collect())
    }
}

impl OrderedCacheStore for InMemoryCacheStore {
    async fn rank_of(&self, index_key: &str, member: &str) -> CacheResult<Option<u64>> {
        let shelf = self.shelf.read();
        let Some(members) = Self::live_members(&shelf, index_key) else {
            return Ok(None);
        };
        Ok(members
            .iter()
            .position(|m| m == member)
            .map(|rank| rank as u64))
    }

    async fn range_by_rank(
        &self,
        index_key: &str,
        start: u64,
        stop: u64,
    ) -> CacheResult<Vec<String>> {
        let shelf = self.shelf.read();
        let Some(members) = Self::live_members(&shelf, index_key) else {
            return Ok(Vec::new());
        };

        let start = start as usize;
        if start >= members.len() {
            return Ok(Vec::new());
        }
        // stop is inclusive, clamped to the index
        let stop = (stop as usize).min(members.len().saturating_sub(1));
        Ok(members[start..=stop].to_vec())
    }

    async fn get_many(&self, keys: &[String]) -> CacheResult<Vec<Option<String>>> {
        let now = Instant::now();
        let shelf = self.shelf.read();
        Ok(keys
            .iter()
            .map(|key| {
                shelf
                    .records
                    .get(key)
                    .filter(|(_, deadline)| *deadline > now)
                    .map(|(payload, _)| payload.clone())
            })
            .collect())
    }

    async fn put_many(
        &self,
        index_key: &str,
        records: &[IndexedRecord],
        ttl: Duration,
    ) -> CacheResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let now = Instant::now();
        let deadline = now + ttl;
        let mut shelf = self.shelf.write();

        for record in records {
            shelf
                .records
                .insert(record.record_key.clone(), (record.payload.clone(), deadline));
        }

        let entry = shelf
            .indexes
            .entry(index_key.to_string())
            .or_insert_with(|| (Vec::new(), deadline));
        let (members, index_deadline) = entry;
        if *index_deadline <= now {
            members.clear();
        }
        for record in records {
            members.retain(|(_, m)| *m != record.member);
            members.push((record.score, record.member.clone()));
        }
        members.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        *index_deadline = deadline;

        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
