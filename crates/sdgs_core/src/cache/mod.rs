//! In-process collection cache.
//!
//! # Responsibility
//! - Hold a full copy of the snapshot store sorted by `(region_name, year)`.
//! - Derive the region option set and year span from the loaded copy.
//!
//! # Invariants
//! - The copy is replaced wholesale by `reload`; it is never patched in
//!   place, so every mutation costs one full `find_all`.
//! - A failed reload leaves the previous copy untouched.
//! - `regions` is exactly the distinct `region_name` set of the copy.

use crate::model::record::{Record, RecordId};
use crate::store::snapshot_store::{SnapshotStore, StoreResult};
use log::{debug, error};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct CollectionCache {
    records: Arc<[Record]>,
    regions: Vec<String>,
    generation: u64,
}

impl Default for CollectionCache {
    fn default() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            regions: Vec::new(),
            generation: 0,
        }
    }
}

impl CollectionCache {
    /// Loads the initial copy from `store`.
    pub fn load<S: SnapshotStore + ?Sized>(store: &S) -> StoreResult<Self> {
        let mut cache = Self::default();
        cache.reload(store)?;
        Ok(cache)
    }

    /// Re-reads the full store and swaps the copy in one assignment.
    pub fn reload<S: SnapshotStore + ?Sized>(&mut self, store: &S) -> StoreResult<Arc<[Record]>> {
        let started_at = Instant::now();
        let mut records = match store.find_all() {
            Ok(records) => records,
            Err(err) => {
                error!(
                    "event=cache_reload module=cache status=error generation={} duration_ms={} error={err}",
                    self.generation,
                    started_at.elapsed().as_millis()
                );
                return Err(err);
            }
        };
        records.sort_by(|left, right| {
            left.region_name
                .cmp(&right.region_name)
                .then(left.year.cmp(&right.year))
        });

        let regions = records
            .iter()
            .map(|record| record.region_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        self.records = records.into();
        self.regions = regions;
        self.generation += 1;

        debug!(
            "event=cache_reload module=cache status=ok generation={} records={} regions={} duration_ms={}",
            self.generation,
            self.records.len(),
            self.regions.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Arc::clone(&self.records))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Shared handle to the current copy; stays valid across later reloads.
    pub fn snapshot(&self) -> Arc<[Record]> {
        Arc::clone(&self.records)
    }

    /// Distinct region names, ascending.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn has_region(&self, region_name: &str) -> bool {
        self.regions
            .binary_search_by(|candidate| candidate.as_str().cmp(region_name))
            .is_ok()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// `(min_year, max_year)` over the copy, `None` when empty.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|record| record.year).min()?;
        let max = self.records.iter().map(|record| record.year).max()?;
        Some((min, max))
    }

    /// Number of completed reloads.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
