use crate::domain::model::{ImportJob, JobStatus};
use crate::domain::ports::{JobStore, Storage};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Job ledger held in memory and persisted as a JSON file through the
/// [`Storage`] port. All mutations happen under one lock, which makes
/// `create`'s check-then-insert a single conditional write — the
/// single-active-job invariant cannot be raced from concurrent submissions.
pub struct FileJobStore<S: Storage> {
    storage: S,
    file_name: String,
    inner: Mutex<Vec<ImportJob>>,
}

impl<S: Storage> FileJobStore<S> {
    /// Opens the ledger, loading existing jobs if the file is present.
    pub async fn open(storage: S, file_name: &str) -> Result<Self> {
        let jobs: Vec<ImportJob> = match storage.read_file(file_name).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(ImportError::Io(e)) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        tracing::debug!("Loaded job ledger: {} jobs", jobs.len());

        Ok(Self {
            storage,
            file_name: file_name.to_string(),
            inner: Mutex::new(jobs),
        })
    }

    /// Startup recovery: any job a previous process left non-terminal is marked
    /// failed. Jobs are never left stuck `in_progress` across restarts.
    pub async fn recover_interrupted(&self) -> Result<u64> {
        let mut jobs = self.inner.lock().await;
        let mut recovered = 0;
        for job in jobs.iter_mut() {
            if !job.status.is_terminal() {
                job.status = JobStatus::Failed;
                job.error = Some("Import interrupted by server restart".to_string());
                job.updated_at = Utc::now();
                recovered += 1;
                tracing::warn!("Recovered interrupted job {}", job.id);
            }
        }
        if recovered > 0 {
            self.persist(&jobs).await?;
        }
        Ok(recovered)
    }

    async fn persist(&self, jobs: &[ImportJob]) -> Result<()> {
        let data = serde_json::to_vec_pretty(jobs)?;
        self.storage.replace_file(&self.file_name, &data).await
    }
}

#[async_trait]
impl<S: Storage + 'static> JobStore for FileJobStore<S> {
    async fn create(&self, job: &ImportJob) -> Result<()> {
        let mut jobs = self.inner.lock().await;

        if jobs.iter().any(|j| !j.status.is_terminal()) {
            return Err(ImportError::Conflict);
        }

        jobs.push(job.clone());
        if let Err(e) = self.persist(&jobs).await {
            jobs.pop();
            return Err(e);
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ImportJob>> {
        let jobs = self.inner.lock().await;
        Ok(jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn latest(&self) -> Result<Option<ImportJob>> {
        let jobs = self.inner.lock().await;
        Ok(jobs.last().cloned())
    }

    async fn claim(&self, id: Uuid) -> Result<bool> {
        let mut jobs = self.inner.lock().await;
        let Some(job) = jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(false);
        };
        if job.status != JobStatus::Pending {
            return Ok(false);
        }
        job.status = JobStatus::InProgress;
        job.updated_at = Utc::now();
        self.persist(&jobs).await?;
        Ok(true)
    }

    async fn update_progress(
        &self,
        id: Uuid,
        processed: u64,
        total: u64,
        skipped: u64,
    ) -> Result<()> {
        let mut jobs = self.inner.lock().await;
        let Some(job) = jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(());
        };
        if job.status.is_terminal() {
            return Ok(());
        }
        // Progress never moves backwards, whatever the caller computed.
        job.processed_entries = job.processed_entries.max(processed);
        job.total_entries = total;
        job.skipped_lines = skipped;
        job.updated_at = Utc::now();
        self.persist(&jobs).await
    }

    async fn mark_completed(&self, id: Uuid) -> Result<()> {
        let mut jobs = self.inner.lock().await;
        let Some(job) = jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(());
        };
        if job.status.is_terminal() {
            return Ok(());
        }
        job.status = JobStatus::Completed;
        // The estimate gives way to the exact written count.
        job.total_entries = job.processed_entries;
        job.updated_at = Utc::now();
        self.persist(&jobs).await
    }

    async fn mark_failed(&self, id: Uuid, message: &str) -> Result<()> {
        let mut jobs = self.inner.lock().await;
        let Some(job) = jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(());
        };
        if job.status.is_terminal() {
            return Ok(());
        }
        job.status = JobStatus::Failed;
        job.error = Some(message.to_string());
        job.updated_at = Utc::now();
        self.persist(&jobs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ImportRequest;
    use crate::store::local::LocalStorage;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn request(source: &str) -> ImportRequest {
        ImportRequest {
            source: source.to_string(),
            replace: false,
            bidirectional: false,
        }
    }

    async fn open_store(dir: &TempDir) -> FileJobStore<LocalStorage> {
        FileJobStore::open(LocalStorage::new(dir.path()), "jobs.json")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn second_create_conflicts_while_a_job_is_active() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let first = ImportJob::new(&request("a.txt"));
        store.create(&first).await.unwrap();

        let second = ImportJob::new(&request("b.txt"));
        assert!(matches!(
            store.create(&second).await,
            Err(ImportError::Conflict)
        ));

        // First job untouched by the rejected submission.
        let stored = store.get(first.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn create_succeeds_after_previous_job_is_terminal() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let first = ImportJob::new(&request("a.txt"));
        store.create(&first).await.unwrap();
        store.claim(first.id).await.unwrap();
        store.mark_completed(first.id).await.unwrap();

        let second = ImportJob::new(&request("b.txt"));
        store.create(&second).await.unwrap();
        assert_eq!(store.latest().await.unwrap().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn only_one_claim_succeeds() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let job = ImportJob::new(&request("a.txt"));
        store.create(&job).await.unwrap();

        assert!(store.claim(job.id).await.unwrap());
        assert!(!store.claim(job.id).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_submissions_accept_exactly_one_job() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(open_store(&dir).await);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let job = ImportJob::new(&request(&format!("{}.txt", i)));
                store.create(&job).await.is_ok()
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
    }

    #[tokio::test]
    async fn progress_is_monotonic() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let job = ImportJob::new(&request("a.txt"));
        store.create(&job).await.unwrap();
        store.claim(job.id).await.unwrap();

        store.update_progress(job.id, 10, 100, 0).await.unwrap();
        store.update_progress(job.id, 5, 100, 0).await.unwrap();

        let stored = store.get(job.id).await.unwrap().unwrap();
        assert_eq!(stored.processed_entries, 10);
    }

    #[tokio::test]
    async fn terminal_states_are_absorbing() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let job = ImportJob::new(&request("a.txt"));
        store.create(&job).await.unwrap();
        store.claim(job.id).await.unwrap();
        store.mark_failed(job.id, "boom").await.unwrap();

        store.mark_completed(job.id).await.unwrap();
        store.update_progress(job.id, 99, 99, 0).await.unwrap();

        let stored = store.get(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
        assert_eq!(stored.processed_entries, 0);
        assert_eq!(stored.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn completion_snaps_total_to_processed() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let job = ImportJob::new(&request("a.txt"));
        store.create(&job).await.unwrap();
        store.claim(job.id).await.unwrap();
        store.update_progress(job.id, 7, 12, 1).await.unwrap();
        store.mark_completed(job.id).await.unwrap();

        let stored = store.get(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Completed);
        assert_eq!(stored.total_entries, 7);
        assert_eq!(stored.skipped_lines, 1);
    }

    #[tokio::test]
    async fn restart_recovery_fails_interrupted_jobs() {
        let dir = TempDir::new().unwrap();
        let job = ImportJob::new(&request("a.txt"));
        {
            let store = open_store(&dir).await;
            store.create(&job).await.unwrap();
            store.claim(job.id).await.unwrap();
        }

        // New process over the same ledger file.
        let store = open_store(&dir).await;
        assert_eq!(store.recover_interrupted().await.unwrap(), 1);

        let stored = store.get(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
        assert_eq!(
            stored.error.as_deref(),
            Some("Import interrupted by server restart")
        );

        // The invariant slot is free again.
        store.create(&ImportJob::new(&request("b.txt"))).await.unwrap();
    }
}
