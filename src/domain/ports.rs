use crate::domain::model::{DictionaryEntry, ImportJob};
use crate::utils::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Byte-level persistence under a data directory. `replace_file` must leave the
/// file as either the old or the new complete content, never a partial write.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn replace_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Durable job ledger. `create` enforces the single-active-job invariant with
/// one conditional write; `claim` is the pending -> in_progress compare-and-set
/// that guards against duplicate execution.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &ImportJob) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<ImportJob>>;

    async fn latest(&self) -> Result<Option<ImportJob>>;

    async fn claim(&self, id: Uuid) -> Result<bool>;

    async fn update_progress(&self, id: Uuid, processed: u64, total: u64, skipped: u64)
        -> Result<()>;

    async fn mark_completed(&self, id: Uuid) -> Result<()>;

    async fn mark_failed(&self, id: Uuid, message: &str) -> Result<()>;
}

/// The dictionary corpus. Inserts are per-batch transactional; `replace_with`
/// swaps the whole corpus atomically so readers never observe an empty store.
#[async_trait]
pub trait DictionaryStore: Send + Sync {
    /// Inserts entries, skipping keys already present. Returns how many were
    /// actually written.
    async fn insert_batch(&self, entries: &[DictionaryEntry]) -> Result<u64>;

    /// Replaces the whole corpus with `entries` in one swap. Returns how many
    /// were written.
    async fn replace_with(&self, entries: &[DictionaryEntry]) -> Result<u64>;

    async fn len(&self) -> Result<u64>;

    async fn entries(&self) -> Result<Vec<DictionaryEntry>>;
}
