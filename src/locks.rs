//! Per-campaign write locks
//!
//! Every operation is a read-modify-write over a campaign's documents. One
//! async mutex per campaign id keeps those cycles from interleaving. The
//! campaign list has its own mutex, outside the per-campaign namespace.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard, OwnedMutexGuard};

/// Lock registry keyed by campaign id
#[derive(Default)]
pub struct CampaignLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    list: AsyncMutex<()>,
}

/// Exclusive access to one campaign. Dropping it releases the lock and
/// forgets the campaign's entry once nobody else is holding or waiting.
pub struct CampaignGuard<'a> {
    locks: &'a CampaignLocks,
    campaign_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl CampaignLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the lock for a campaign
    fn lock_for(&self, campaign_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(campaign_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Wait for exclusive access to a campaign
    pub async fn acquire(&self, campaign_id: &str) -> CampaignGuard<'_> {
        let guard = self.lock_for(campaign_id).lock_owned().await;
        CampaignGuard {
            locks: self,
            campaign_id: campaign_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Wait for exclusive access to the campaign list
    pub async fn acquire_list(&self) -> MutexGuard<'_, ()> {
        self.list.lock().await
    }

    /// Drop the entry for a campaign if only the registry refers to it.
    /// Clones are only made under the map lock, so a count of one cannot race.
    fn prune(&self, campaign_id: &str) {
        let mut locks = self.locks.lock();
        if locks
            .get(campaign_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(campaign_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

impl Drop for CampaignGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.prune(&self.campaign_id);
    }
}
