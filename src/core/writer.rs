use crate::domain::model::DictionaryEntry;
use crate::domain::ports::DictionaryStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// Applies parsed entries to the dictionary store in bounded batches.
///
/// With `replace_existing`, the first committed batch replaces the whole
/// corpus in one swap — the store is never observable empty between the old
/// and the new corpus. Later batches are plain per-batch inserts. With
/// `bidirectional`, every entry is expanded with its reversed twin before the
/// batch is committed; key collisions are no-ops.
pub struct EntryWriter {
    store: Arc<dyn DictionaryStore>,
    replace_existing: bool,
    bidirectional: bool,
    first_batch_pending: bool,
}

impl EntryWriter {
    pub fn new(store: Arc<dyn DictionaryStore>, replace_existing: bool, bidirectional: bool) -> Self {
        Self {
            store,
            replace_existing,
            bidirectional,
            first_batch_pending: true,
        }
    }

    /// Commits one batch and returns how many entries were actually written
    /// (synthesized reverse entries included, duplicates excluded).
    pub async fn commit_batch(&mut self, batch: &[DictionaryEntry]) -> Result<u64> {
        let expanded = self.expand(batch);

        let written = if self.replace_existing && self.first_batch_pending {
            self.store.replace_with(&expanded).await?
        } else {
            self.store.insert_batch(&expanded).await?
        };
        self.first_batch_pending = false;

        tracing::debug!("Committed batch: {} entries written", written);
        Ok(written)
    }

    /// Called after the last batch. A `replace` import whose source yielded no
    /// entries still replaces the corpus — with nothing.
    pub async fn finish(&mut self) -> Result<u64> {
        if self.replace_existing && self.first_batch_pending {
            return self.commit_batch(&[]).await;
        }
        Ok(0)
    }

    fn expand(&self, batch: &[DictionaryEntry]) -> Vec<DictionaryEntry> {
        if !self.bidirectional {
            return batch.to_vec();
        }
        let mut expanded = Vec::with_capacity(batch.len() * 2);
        for entry in batch {
            expanded.push(entry.clone());
            expanded.push(entry.reversed());
        }
        expanded
    }
}
