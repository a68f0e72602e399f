use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Submission body for `POST /import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub source: String,
    #[serde(default)]
    pub replace: bool,
    #[serde(default)]
    pub bidirectional: bool,
}

/// One import run, as stored in the job ledger and returned to polling clients.
///
/// `source`, `replace_existing` and `bidirectional` are fixed at submission;
/// everything else is mutated only by the job's own execution. Terminal jobs
/// are never modified again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportJob {
    pub id: Uuid,
    pub source: String,
    pub replace_existing: bool,
    pub bidirectional: bool,
    pub status: JobStatus,
    pub processed_entries: u64,
    pub total_entries: u64,
    pub skipped_lines: u64,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportJob {
    pub fn new(request: &ImportRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            source: request.source.clone(),
            replace_existing: request.replace,
            bidirectional: request.bidirectional,
            status: JobStatus::Pending,
            processed_entries: 0,
            total_entries: 0,
            skipped_lines: 0,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Uniqueness key of a dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub source_text: String,
    pub target_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub source_text: String,
    pub target_text: String,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
}

impl DictionaryEntry {
    pub fn key(&self) -> EntryKey {
        EntryKey {
            source_text: self.source_text.clone(),
            target_text: self.target_text.clone(),
            source_lang: self.source_lang.clone(),
            target_lang: self.target_lang.clone(),
        }
    }

    /// The synthesized reverse-direction twin of this entry.
    pub fn reversed(&self) -> Self {
        Self {
            source_text: self.target_text.clone(),
            target_text: self.source_text.clone(),
            source_lang: self.target_lang.clone(),
            target_lang: self.source_lang.clone(),
            part_of_speech: self.part_of_speech.clone(),
        }
    }
}
