use crate::config::ServerConfig;
use crate::core::fetcher::{LineStream, SourceFetcher};
use crate::core::parser::EntryParser;
use crate::core::writer::EntryWriter;
use crate::domain::model::{ImportJob, ImportRequest};
use crate::domain::ports::{DictionaryStore, JobStore};
use crate::utils::error::Result;
use crate::utils::validation::validate_source;
use std::sync::Arc;
use uuid::Uuid;

/// Drives the import job lifecycle: submission records a `pending` job and
/// spawns the background task; execution claims the job, streams the source
/// through parse and write, advances counters after each committed batch, and
/// lands in `completed` or `failed`.
#[derive(Clone)]
pub struct ImportRunner {
    jobs: Arc<dyn JobStore>,
    dictionary: Arc<dyn DictionaryStore>,
    fetcher: SourceFetcher,
    parser: EntryParser,
    batch_size: usize,
}

impl ImportRunner {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        dictionary: Arc<dyn DictionaryStore>,
        config: &ServerConfig,
    ) -> Result<Self> {
        Ok(Self {
            fetcher: SourceFetcher::new(config.max_source_bytes, config.fetch_timeout_seconds)?,
            parser: EntryParser::new(&config.source_lang, &config.target_lang),
            batch_size: config.batch_size,
            jobs,
            dictionary,
        })
    }

    /// Accepts a submission. The conditional create in the job store enforces
    /// the single-active-job invariant; a conflict surfaces here and no job is
    /// created. On success the caller gets the `pending` job back immediately,
    /// before any I/O.
    pub async fn submit(&self, request: ImportRequest) -> Result<ImportJob> {
        validate_source(&request.source)?;

        let job = ImportJob::new(&request);
        self.jobs.create(&job).await?;
        tracing::info!("Accepted import job {} for {}", job.id, job.source);

        let runner = self.clone();
        let id = job.id;
        tokio::spawn(async move {
            runner.run(id).await;
        });

        Ok(job)
    }

    /// Executes one job to a terminal state. The claim is a compare-and-set on
    /// status, so a duplicate executor for the same job backs off instead of
    /// running twice.
    pub async fn run(&self, id: Uuid) {
        match self.jobs.claim(id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Job {} is not claimable, skipping execution", id);
                return;
            }
            Err(e) => {
                tracing::error!("Failed to claim job {}: {}", id, e);
                return;
            }
        }

        let job = match self.jobs.get(id).await {
            Ok(Some(job)) => job,
            _ => {
                tracing::error!("Claimed job {} disappeared from the ledger", id);
                return;
            }
        };

        match self.execute(&job).await {
            Ok((processed, skipped)) => {
                if let Err(e) = self.jobs.mark_completed(id).await {
                    tracing::error!("Failed to finalize job {}: {}", id, e);
                    return;
                }
                tracing::info!(
                    "Job {} completed: {} entries written, {} lines skipped",
                    id,
                    processed,
                    skipped
                );
            }
            Err(e) => {
                tracing::error!("Job {} failed: {}", id, e);
                if let Err(persist) = self.jobs.mark_failed(id, &e.to_string()).await {
                    tracing::error!("Failed to record failure of job {}: {}", id, persist);
                }
            }
        }
    }

    async fn execute(&self, job: &ImportJob) -> Result<(u64, u64)> {
        let mut lines = self.fetcher.open(&job.source).await?;
        let mut writer = EntryWriter::new(
            Arc::clone(&self.dictionary),
            job.replace_existing,
            job.bidirectional,
        );

        let mut batch = Vec::with_capacity(self.batch_size);
        let mut processed: u64 = 0;
        let mut skipped: u64 = 0;
        let mut total_estimate: u64 = 0;

        while let Some(line) = lines.next_line().await? {
            match self.parser.parse_line(&line) {
                Ok(Some(entry)) => batch.push(entry),
                Ok(None) => {}
                Err(e) => {
                    skipped += 1;
                    tracing::debug!("Skipping line {}: {}", lines.lines_yielded(), e);
                }
            }

            if batch.len() >= self.batch_size {
                processed += writer.commit_batch(&batch).await?;
                batch.clear();
                total_estimate = total_estimate.max(estimate_total(&lines, job.bidirectional));
                self.jobs
                    .update_progress(job.id, processed, total_estimate, skipped)
                    .await?;
            }
        }

        if !batch.is_empty() {
            processed += writer.commit_batch(&batch).await?;
        }
        writer.finish().await?;

        self.jobs
            .update_progress(job.id, processed, total_estimate.max(processed), skipped)
            .await?;

        Ok((processed, skipped))
    }
}

/// Extrapolates a total-entry estimate from how much of the source has been
/// consumed. Zero while the transport reports no length.
fn estimate_total(lines: &LineStream, bidirectional: bool) -> u64 {
    let Some(total_bytes) = lines.total_bytes() else {
        return 0;
    };
    let consumed = lines.bytes_read().max(1);
    let estimated_lines = lines.lines_yielded().saturating_mul(total_bytes) / consumed;
    if bidirectional {
        estimated_lines.saturating_mul(2)
    } else {
        estimated_lines
    }
}
