use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::models::{EnrichedApplication, JobPosting};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    HrJobs,
    HrApplications,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: QueryKind,
    pub hr_id: Uuid,
}

impl QueryKey {
    pub fn jobs(hr_id: Uuid) -> Self {
        Self {
            kind: QueryKind::HrJobs,
            hr_id,
        }
    }

    pub fn applications(hr_id: Uuid) -> Self {
        Self {
            kind: QueryKind::HrApplications,
            hr_id,
        }
    }

    /// Keys whose results are computed from this key's result.
    fn dependents(&self) -> Vec<QueryKey> {
        match self.kind {
            QueryKind::HrJobs => vec![QueryKey::applications(self.hr_id)],
            QueryKind::HrApplications => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CachedResult {
    Jobs(Arc<Vec<JobPosting>>),
    Applications(Arc<Vec<EnrichedApplication>>),
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    value: Option<CachedResult>,
}

/// Last fetched result per `(query, principal)`, scoped to one dashboard
/// session. Every invalidation bumps the key's generation; a fetch that
/// started before an invalidation cannot store its (possibly stale) result.
#[derive(Debug, Default)]
pub struct QueryCache {
    slots: Mutex<HashMap<QueryKey, Slot>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: QueryKey) -> Option<CachedResult> {
        self.slots().get(&key).and_then(|slot| slot.value.clone())
    }

    pub fn jobs(&self, hr_id: Uuid) -> Option<Arc<Vec<JobPosting>>> {
        match self.get(QueryKey::jobs(hr_id)) {
            Some(CachedResult::Jobs(jobs)) => Some(jobs),
            _ => None,
        }
    }

    pub fn applications(&self, hr_id: Uuid) -> Option<Arc<Vec<EnrichedApplication>>> {
        match self.get(QueryKey::applications(hr_id)) {
            Some(CachedResult::Applications(apps)) => Some(apps),
            _ => None,
        }
    }

    /// Generation to pass back to [`QueryCache::store`] once the fetch completes.
    pub fn begin_fetch(&self, key: QueryKey) -> u64 {
        self.slots().entry(key).or_default().generation
    }

    /// Returns `false` (and keeps nothing) when `key` was invalidated after
    /// `generation` was taken.
    pub fn store(&self, key: QueryKey, generation: u64, value: CachedResult) -> bool {
        let mut slots = self.slots();
        let slot = slots.entry(key).or_default();
        if slot.generation != generation {
            return false;
        }
        slot.value = Some(value);
        true
    }

    pub fn invalidate(&self, key: QueryKey) {
        let mut slots = self.slots();
        let mut pending = vec![key];
        while let Some(key) = pending.pop() {
            let slot = slots.entry(key).or_default();
            slot.generation += 1;
            slot.value = None;
            pending.extend(key.dependents());
        }
    }

    pub fn clear(&self) {
        let mut slots = self.slots();
        for slot in slots.values_mut() {
            slot.generation += 1;
            slot.value = None;
        }
    }
}
