//! Draining the pending-deletion log against object storage.
//!
//! Database deletes queue the object keys they orphan in the same
//! transaction. This module removes those objects afterwards. Removal is
//! idempotent: a key whose delete fails stays queued with its attempt count
//! bumped and is retried on the next drain.

use async_trait::async_trait;
use eyre::Result;
use sqlx::PgPool;
use studio_db::repositories::deletion;
use studio_storage::ObjectStore;
use tracing::{debug, info, warn};

/// How many queued keys one drain handles.
pub const PURGE_BATCH: i64 = 500;

/// Access to the pending-deletion log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeletionLog: Send + Sync {
    async fn enqueue(&self, object_key: &str) -> Result<()>;
    async fn pending(&self, limit: i64) -> Result<Vec<String>>;
    /// Whether a live row still points at the object.
    async fn in_use(&self, object_key: &str) -> Result<bool>;
    async fn complete(&self, object_key: &str) -> Result<()>;
    async fn record_failure(&self, object_key: &str, error: &str) -> Result<()>;
    async fn remaining(&self) -> Result<i64>;
}

#[async_trait]
impl DeletionLog for PgPool {
    async fn enqueue(&self, object_key: &str) -> Result<()> {
        deletion::enqueue_deletion(self, object_key).await
    }

    async fn pending(&self, limit: i64) -> Result<Vec<String>> {
        let rows = deletion::list_pending_deletions(self, limit).await?;
        Ok(rows.into_iter().map(|row| row.object_key).collect())
    }

    async fn in_use(&self, object_key: &str) -> Result<bool> {
        deletion::is_object_referenced(self, object_key).await
    }

    async fn complete(&self, object_key: &str) -> Result<()> {
        deletion::complete_deletion(self, object_key).await
    }

    async fn record_failure(&self, object_key: &str, error: &str) -> Result<()> {
        deletion::record_deletion_failure(self, object_key, error).await
    }

    async fn remaining(&self) -> Result<i64> {
        deletion::count_pending_deletions(self).await
    }
}

/// Outcome of one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub removed: usize,
    pub failed: usize,
    /// Entries dropped without touching storage because a row still uses
    /// the object.
    pub retained: usize,
}

/// Removes up to `limit` queued objects, one at a time.
///
/// Keys that a row references again (a re-upload under the same name) are
/// taken off the log and their objects left alone. Storage failures are
/// recorded on the log entry and do not stop the drain. Errors reading or
/// updating the log itself are returned.
pub async fn purge_pending_deletions(
    log: &dyn DeletionLog,
    store: &dyn ObjectStore,
    limit: i64,
) -> Result<PurgeReport> {
    let keys = log.pending(limit).await?;
    let mut report = PurgeReport::default();

    for key in keys {
        if log.in_use(&key).await? {
            log.complete(&key).await?;
            report.retained += 1;
            debug!("Kept queued object {}, it is still referenced", key);
            continue;
        }

        match store.delete(&key).await {
            Ok(()) => {
                log.complete(&key).await?;
                report.removed += 1;
                debug!("Removed queued object {}", key);
            }
            Err(e) => {
                warn!("Failed to remove queued object {}: {:#}", key, e);
                log.record_failure(&key, &format!("{:#}", e)).await?;
                report.failed += 1;
            }
        }
    }

    if report != PurgeReport::default() {
        info!(
            "Pending deletions drained: removed={}, failed={}, retained={}",
            report.removed, report.failed, report.retained
        );
    }

    Ok(report)
}

/// Drains the log and returns how many entries are still queued.
///
/// Used after a delete request. The rows are already gone at this point,
/// so drain errors are logged and never fail the request.
pub async fn drain_after_delete(log: &dyn DeletionLog, store: &dyn ObjectStore) -> u64 {
    if let Err(e) = purge_pending_deletions(log, store, PURGE_BATCH).await {
        warn!("Could not drain pending deletions: {:#}", e);
    }

    match log.remaining().await {
        Ok(count) => count.max(0) as u64,
        Err(e) => {
            warn!("Could not count pending deletions: {:#}", e);
            0
        }
    }
}

/// Removes an object that has no database row pointing at it.
///
/// If the storage delete fails the key is queued instead, so the object is
/// still removed by a later drain.
pub async fn discard_object(log: &dyn DeletionLog, store: &dyn ObjectStore, object_key: &str) -> Result<()> {
    match store.delete(object_key).await {
        Ok(()) => {
            debug!("Discarded object {}", object_key);
            Ok(())
        }
        Err(e) => {
            warn!(
                "Failed to discard object {}, queueing it for removal: {:#}",
                object_key, e
            );
            log.enqueue(object_key).await
        }
    }
}
