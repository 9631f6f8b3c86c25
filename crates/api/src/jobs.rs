//! Background upload jobs for event galleries.
//!
//! An upload request hands its files to a job that runs on its own task and
//! processes one file at a time: optional compression, storage put, then the
//! `event_images` row. Progress is kept in [`UploadJobs`] so the admin
//! portal can poll it. Cancellation is cooperative and only observed between
//! files, never in the middle of a transfer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use sqlx::PgPool;
use studio_core::compress::{CompressOptions, compress_image};
use studio_core::models::gallery::{UploadProgress, UploadState};
use studio_core::naming::{compressed_image_key, content_type_for, event_image_key};
use studio_storage::ObjectStore;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Finished jobs stay pollable for this long.
const FINISHED_JOB_RETENTION: Duration = Duration::from_secs(60 * 60);

/// One file received by an upload request.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Everything a job needs to know about its batch.
#[derive(Debug, Clone)]
pub struct UploadPlan {
    pub event_id: Uuid,
    pub event_name: String,
    pub files: Vec<UploadFile>,
    /// Files dropped before the batch started.
    pub skipped: usize,
    /// Re-encode each file before upload when set.
    pub compress: Option<CompressOptions>,
}

/// Where a job records the images it uploaded.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GalleryWriter: Send + Sync {
    async fn record_image(&self, event_id: Uuid, image_url: &str, object_key: &str) -> Result<()>;

    /// Whether an existing row already points at the object, as happens when
    /// a file is uploaded again under the same name.
    async fn object_in_use(&self, object_key: &str) -> Result<bool>;

    /// Queues an object for removal when it could not be deleted directly.
    async fn enqueue_cleanup(&self, object_key: &str) -> Result<()>;
}

#[async_trait]
impl GalleryWriter for PgPool {
    async fn record_image(&self, event_id: Uuid, image_url: &str, object_key: &str) -> Result<()> {
        studio_db::repositories::image::insert_event_image(self, event_id, image_url, object_key)
            .await?;
        Ok(())
    }

    async fn object_in_use(&self, object_key: &str) -> Result<bool> {
        studio_db::repositories::deletion::is_object_referenced(self, object_key).await
    }

    async fn enqueue_cleanup(&self, object_key: &str) -> Result<()> {
        studio_db::repositories::deletion::enqueue_deletion(self, object_key).await
    }
}

struct JobEntry {
    progress: UploadProgress,
    cancel: CancellationToken,
    finished_at: Option<Instant>,
}

/// Registry of upload jobs, shared between handlers and job tasks.
#[derive(Clone, Default)]
pub struct UploadJobs {
    inner: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
}

impl UploadJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a running job and returns its initial progress together
    /// with the token the job must watch.
    pub async fn register(&self, event_id: Uuid, total: usize, skipped: usize) -> (UploadProgress, CancellationToken) {
        let progress = UploadProgress {
            id: Uuid::new_v4(),
            event_id,
            state: UploadState::Running,
            completed: 0,
            total,
            skipped,
            current_file: None,
            message: None,
        };
        let cancel = CancellationToken::new();

        let mut jobs = self.inner.write().await;
        jobs.retain(|_, entry| {
            entry
                .finished_at
                .is_none_or(|finished| finished.elapsed() < FINISHED_JOB_RETENTION)
        });
        jobs.insert(
            progress.id,
            JobEntry {
                progress: progress.clone(),
                cancel: cancel.clone(),
                finished_at: None,
            },
        );

        (progress, cancel)
    }

    pub async fn progress(&self, id: Uuid) -> Option<UploadProgress> {
        self.inner
            .read()
            .await
            .get(&id)
            .map(|entry| entry.progress.clone())
    }

    /// Asks a job to stop before its next file. Returns the progress as it
    /// stands; the state turns `cancelled` once the job notices.
    pub async fn cancel(&self, id: Uuid) -> Option<UploadProgress> {
        let jobs = self.inner.read().await;
        let entry = jobs.get(&id)?;
        if !entry.progress.state.is_finished() {
            entry.cancel.cancel();
            info!("Cancellation requested for upload job {}", id);
        }
        Some(entry.progress.clone())
    }

    async fn update(&self, id: Uuid, apply: impl FnOnce(&mut UploadProgress)) {
        if let Some(entry) = self.inner.write().await.get_mut(&id) {
            apply(&mut entry.progress);
            if entry.progress.state.is_finished() && entry.finished_at.is_none() {
                entry.finished_at = Some(Instant::now());
            }
        }
    }
}

/// Registers a job for `plan` and starts it on a new task.
pub async fn spawn_upload(
    jobs: &UploadJobs,
    plan: UploadPlan,
    store: Arc<dyn ObjectStore>,
    writer: Arc<dyn GalleryWriter>,
) -> UploadProgress {
    let (progress, cancel) = jobs.register(plan.event_id, plan.files.len(), plan.skipped).await;

    let jobs = jobs.clone();
    let job_id = progress.id;
    tokio::spawn(async move {
        run_upload_job(&jobs, job_id, cancel, plan, store.as_ref(), writer.as_ref()).await;
    });

    progress
}

/// Processes the batch sequentially and returns the final progress.
///
/// The first failing file stops the batch. Files uploaded before it stay in
/// place.
pub async fn run_upload_job(
    jobs: &UploadJobs,
    job_id: Uuid,
    cancel: CancellationToken,
    plan: UploadPlan,
    store: &dyn ObjectStore,
    writer: &dyn GalleryWriter,
) -> UploadProgress {
    let total = plan.files.len();
    info!(
        "Upload job {} started: event={}, files={}, skipped={}, compress={}",
        job_id,
        plan.event_id,
        total,
        plan.skipped,
        plan.compress.is_some()
    );

    let mut completed = 0;
    for file in plan.files {
        if cancel.is_cancelled() {
            info!("Upload job {} cancelled after {}/{} files", job_id, completed, total);
            return finish(
                jobs,
                job_id,
                UploadState::Cancelled,
                format!("Cancelled after {} of {} files", completed, total),
            )
            .await;
        }

        let file_name = file.file_name.clone();
        jobs.update(job_id, |p| p.current_file = Some(file_name.clone()))
            .await;

        match upload_one(plan.event_id, &plan.event_name, plan.compress, file, store, writer).await {
            Ok(key) => {
                completed += 1;
                jobs.update(job_id, |p| p.completed = completed).await;
                debug!("Upload job {}: {}/{} stored {}", job_id, completed, total, key);
            }
            Err(e) => {
                error!("Upload job {} failed on {}: {:#}", job_id, file_name, e);
                return finish(
                    jobs,
                    job_id,
                    UploadState::Failed,
                    format!(
                        "Upload stopped after {} of {} files. {} failed: {:#}",
                        completed, total, file_name, e
                    ),
                )
                .await;
            }
        }
    }

    info!("Upload job {} completed: {} files", job_id, completed);
    finish(
        jobs,
        job_id,
        UploadState::Completed,
        format!("Uploaded {} of {} files", completed, total),
    )
    .await
}

async fn finish(jobs: &UploadJobs, job_id: Uuid, state: UploadState, message: String) -> UploadProgress {
    jobs.update(job_id, |p| {
        p.state = state;
        p.current_file = None;
        p.message = Some(message);
    })
    .await;

    // The registry entry only disappears through pruning, well after this.
    jobs.progress(job_id).await.unwrap_or_else(|| UploadProgress {
        id: job_id,
        event_id: Uuid::nil(),
        state,
        completed: 0,
        total: 0,
        skipped: 0,
        current_file: None,
        message: None,
    })
}

/// Stores one file and records it. Returns the object key.
async fn upload_one(
    event_id: Uuid,
    event_name: &str,
    compress: Option<CompressOptions>,
    file: UploadFile,
    store: &dyn ObjectStore,
    writer: &dyn GalleryWriter,
) -> Result<String> {
    let UploadFile { file_name, data } = file;

    let (key, bytes, content_type) = match compress {
        Some(options) => {
            let name = file_name.clone();
            let compressed = tokio::task::spawn_blocking(move || compress_image(&name, &data, &options))
                .await
                .wrap_err("Compression task panicked")??;
            (
                compressed_image_key(event_name, &file_name),
                compressed.bytes,
                "image/jpeg",
            )
        }
        None => (
            event_image_key(event_name, &file_name),
            data,
            content_type_for(&file_name),
        ),
    };

    store
        .put(&key, bytes, content_type)
        .await
        .wrap_err_with(|| format!("Failed to store {}", key))?;
    let url = store.public_url(&key);

    if let Err(e) = writer.record_image(event_id, &url, &key).await {
        compensate(&key, store, writer).await;
        return Err(e.wrap_err(format!("Failed to record {}", key)));
    }

    Ok(key)
}

/// Undoes a put whose row could not be written. An object another row
/// already uses is left in place. When the check or the delete fails the
/// key goes to the pending-deletion log, whose drain repeats the check.
async fn compensate(key: &str, store: &dyn ObjectStore, writer: &dyn GalleryWriter) {
    match writer.object_in_use(key).await {
        Ok(true) => {
            warn!("Recording {} failed, keeping the object an earlier upload uses", key);
            return;
        }
        Ok(false) => {
            warn!("Recording {} failed, removing the stored object", key);
            match store.delete(key).await {
                Ok(()) => return,
                Err(delete_err) => warn!("Could not remove {}: {:#}", key, delete_err),
            }
        }
        Err(check_err) => warn!("Could not check whether {} is in use: {:#}", key, check_err),
    }

    if let Err(queue_err) = writer.enqueue_cleanup(key).await {
        error!("Could not queue {} for removal: {:#}", key, queue_err);
    }
}
