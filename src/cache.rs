//! Query cache for read models served to the dashboard.
//!
//! Entries are keyed by what they describe (a subject's assignments, active
//! plans, plan history, or a user's visible budgets). Mutations mark the keys
//! they affect stale; the next read refetches. Invalidation is advisory: the
//! database stays the source of truth.

use crate::core::subject::SubjectRef;
use crate::errors::Result;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Identifies one cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Budgets visible to a user
    Budgets(String),
    /// A subject's assignments
    Assignments(SubjectRef),
    /// A subject's active plan of every kind
    ActivePlans(SubjectRef),
    /// A subject's plan history
    PlansHistory(SubjectRef),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    stale: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    /// Bumped by every invalidation, including of keys not yet cached
    epoch: u64,
}

/// Shared, clonable query cache.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    state: Arc<RwLock<CacheState>>,
}

impl QueryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fresh cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// Fetch errors are returned and leave the cache unchanged. A result whose
    /// fetch overlapped an invalidation is returned but stored stale.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started_at = {
            let state = self.state.read().await;
            if let Some(entry) = state.entries.get(&key) {
                if !entry.stale {
                    trace!("Cache hit for {:?}", key);
                    return Ok(serde_json::from_value(entry.value.clone())?);
                }
            }
            state.epoch
        };

        debug!("Cache miss for {:?}, fetching", key);
        let fresh = fetch().await?;
        let value = serde_json::to_value(&fresh)?;

        let mut state = self.state.write().await;
        let stale = state.epoch != started_at;
        if stale {
            debug!("Invalidated while fetching {:?}, storing stale", key);
        }
        state.entries.insert(key, CacheEntry { value, stale });
        Ok(fresh)
    }

    /// Marks `key` stale. Returns whether an entry existed.
    pub async fn invalidate(&self, key: &QueryKey) -> bool {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.entries.get_mut(key).is_some_and(|entry| {
            entry.stale = true;
            true
        })
    }

    /// Marks the assignment, active-plan and history entries of a subject stale.
    ///
    /// Returns how many entries were marked.
    pub async fn invalidate_subject(&self, subject: SubjectRef) -> usize {
        let keys = [
            QueryKey::Assignments(subject),
            QueryKey::ActivePlans(subject),
            QueryKey::PlansHistory(subject),
        ];
        let mut marked = 0;
        for key in &keys {
            if self.invalidate(key).await {
                marked += 1;
            }
        }
        debug!("Invalidated {} cache entries for {}", marked, subject);
        marked
    }

    /// Marks every user's budget list stale.
    pub async fn invalidate_budgets(&self) -> usize {
        let mut state = self.state.write().await;
        state.epoch += 1;
        let mut marked = 0;
        for (key, entry) in &mut state.entries {
            if matches!(key, QueryKey::Budgets(_)) {
                entry.stale = true;
                marked += 1;
            }
        }
        marked
    }

    /// Whether `key` holds a fresh value.
    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        self.state
            .read()
            .await
            .entries
            .get(key)
            .is_some_and(|entry| !entry.stale)
    }
}
