use crate::domain::model::{DictionaryEntry, EntryKey};
use crate::domain::ports::{DictionaryStore, Storage};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use tokio::sync::RwLock;

/// Dictionary corpus held in memory and persisted as a JSON file through the
/// [`Storage`] port. Each committed batch rewrites the file via
/// `replace_file`, so the durable corpus is always either the pre-batch or the
/// post-batch content.
pub struct FileDictionaryStore<S: Storage> {
    storage: S,
    file_name: String,
    inner: RwLock<HashMap<EntryKey, DictionaryEntry>>,
}

impl<S: Storage> FileDictionaryStore<S> {
    /// Opens the store, loading an existing corpus file if present.
    pub async fn open(storage: S, file_name: &str) -> Result<Self> {
        let entries: Vec<DictionaryEntry> = match storage.read_file(file_name).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(ImportError::Io(e)) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };

        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            map.insert(entry.key(), entry);
        }
        tracing::debug!("Loaded dictionary corpus: {} entries", map.len());

        Ok(Self {
            storage,
            file_name: file_name.to_string(),
            inner: RwLock::new(map),
        })
    }

    async fn persist(&self, entries: Vec<&DictionaryEntry>) -> Result<()> {
        let data = serde_json::to_vec_pretty(&entries)?;
        self.storage
            .replace_file(&self.file_name, &data)
            .await
            .map_err(|e| ImportError::Write {
                message: format!("failed to persist dictionary: {}", e),
            })
    }
}

#[async_trait]
impl<S: Storage + 'static> DictionaryStore for FileDictionaryStore<S> {
    async fn insert_batch(&self, entries: &[DictionaryEntry]) -> Result<u64> {
        let mut map = self.inner.write().await;

        // Deduplicate against the corpus and within the batch itself.
        let mut fresh: Vec<&DictionaryEntry> = Vec::new();
        let mut fresh_keys = std::collections::HashSet::new();
        for entry in entries {
            let key = entry.key();
            if !map.contains_key(&key) && fresh_keys.insert(key) {
                fresh.push(entry);
            }
        }

        if fresh.is_empty() {
            return Ok(0);
        }

        // Persist before mutating memory: a failed write leaves both the file
        // and the in-memory corpus at the pre-batch state.
        let snapshot: Vec<&DictionaryEntry> =
            map.values().chain(fresh.iter().copied()).collect();
        self.persist(snapshot).await?;

        let written = fresh.len() as u64;
        for entry in fresh {
            map.insert(entry.key(), entry.clone());
        }
        Ok(written)
    }

    async fn replace_with(&self, entries: &[DictionaryEntry]) -> Result<u64> {
        let mut next = HashMap::with_capacity(entries.len());
        for entry in entries {
            next.entry(entry.key()).or_insert_with(|| entry.clone());
        }

        // The new corpus is built aside and swapped in under the write lock,
        // so readers see the old corpus right up until the new one is live.
        let mut map = self.inner.write().await;
        self.persist(next.values().collect()).await?;
        let written = next.len() as u64;
        *map = next;
        Ok(written)
    }

    async fn len(&self) -> Result<u64> {
        Ok(self.inner.read().await.len() as u64)
    }

    async fn entries(&self) -> Result<Vec<DictionaryEntry>> {
        Ok(self.inner.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::local::LocalStorage;
    use tempfile::TempDir;

    fn entry(source: &str, target: &str) -> DictionaryEntry {
        DictionaryEntry {
            source_text: source.to_string(),
            target_text: target.to_string(),
            source_lang: "es".to_string(),
            target_lang: "en".to_string(),
            part_of_speech: None,
        }
    }

    async fn open_store(dir: &TempDir) -> FileDictionaryStore<LocalStorage> {
        FileDictionaryStore::open(LocalStorage::new(dir.path()), "dictionary.json")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_batch_skips_duplicates() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let written = store
            .insert_batch(&[entry("perro", "dog"), entry("gato", "cat")])
            .await
            .unwrap();
        assert_eq!(written, 2);

        // Same keys again: nothing written, corpus unchanged.
        let written = store
            .insert_batch(&[entry("perro", "dog"), entry("pez", "fish")])
            .await
            .unwrap();
        assert_eq!(written, 1);
        assert_eq!(store.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn duplicates_within_one_batch_count_once() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let written = store
            .insert_batch(&[entry("perro", "dog"), entry("perro", "dog")])
            .await
            .unwrap();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn replace_with_discards_prior_corpus() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.insert_batch(&[entry("gato", "cat")]).await.unwrap();
        store.replace_with(&[entry("perro", "dog")]).await.unwrap();

        let entries = store.entries().await.unwrap();
        assert_eq!(entries, vec![entry("perro", "dog")]);
    }

    #[tokio::test]
    async fn corpus_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir).await;
            store
                .insert_batch(&[entry("perro", "dog"), entry("gato", "cat")])
                .await
                .unwrap();
        }

        let reopened = open_store(&dir).await;
        assert_eq!(reopened.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn open_with_no_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
