//! Bounded LRU cache of translated plans, keyed on a 64-bit hash of the raw
//! bytecode.
//!
//! The hash is non-cryptographic, so a hit re-verifies the stored code
//! bytes before the plan is reused; a colliding entry reads as a miss and is
//! replaced. Recency is a monotonic use tick per entry; inserting at
//! capacity evicts the entry with the smallest tick. Plans are handed out as
//! `Arc` clones, so an evicted plan stays alive for frames still running it.
//!
//! The key covers only the code bytes, so one cache serves one planner
//! configuration; keep separate caches for fused and unfused plans.

use crate::{code::Code, errors::VMError, plan::Plan, planner::Planner};
use bytes::Bytes;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::Hasher;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct CacheEntry {
    plan: Arc<Plan>,
    last_used: u64,
}

#[derive(Debug)]
pub struct PlanCache {
    entries: FxHashMap<u64, CacheEntry>,
    capacity: usize,
    tick: u64,
}

/// 64-bit bytecode fingerprint used as the cache key.
pub fn hash_code(code: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(code);
    hasher.finish()
}

impl PlanCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            capacity,
            tick: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a plan for `code`, refreshing its recency on a hit.
    pub fn get(&mut self, code: &[u8]) -> Option<Arc<Plan>> {
        self.tick += 1;
        let entry = self.entries.get_mut(&hash_code(code))?;
        // Collision policy: the stored bytes must match before reuse.
        if entry.plan.code().bytes().as_ref() != code {
            return None;
        }
        entry.last_used = self.tick;
        Some(Arc::clone(&entry.plan))
    }

    /// Cached plan for `code`, translating and inserting on a miss.
    pub fn get_or_insert(
        &mut self,
        code: Bytes,
        planner: &Planner<'_>,
        max_bytecode_size: usize,
    ) -> Result<Arc<Plan>, VMError> {
        if let Some(plan) = self.get(&code) {
            debug!(code_len = code.len(), "plan cache hit");
            return Ok(plan);
        }

        debug!(code_len = code.len(), "plan cache miss");
        let hash = hash_code(&code);
        let analyzed = Code::analyze(code, max_bytecode_size)?;
        let plan = Arc::new(planner.plan(analyzed)?);
        self.insert(hash, Arc::clone(&plan));
        Ok(plan)
    }

    fn insert(&mut self, hash: u64, plan: Arc<Plan>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&hash) {
            self.evict_least_recently_used();
        }
        self.tick += 1;
        self.entries.insert(
            hash,
            CacheEntry {
                plan,
                last_used: self.tick,
            },
        );
    }

    fn evict_least_recently_used(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(hash, _)| *hash);
        if let Some(hash) = oldest {
            debug!(hash, "plan cache eviction");
            self.entries.remove(&hash);
        }
    }
}
