//! Resumable crawl driver.
//!
//! Owns the walk across the combination space: loads the persisted
//! checkpoint, skips combinations that are already done, checkpoints before
//! entering each one, and marks the job terminally complete at the end. A
//! kill at any point resumes from the last checkpoint; replayed work is made
//! idempotent by the exclusion set, not by checkpoint precision.

use crate::error::Result;
use crate::pipeline::{CombinationOutcome, SearchPipeline};
use crate::sink::OutputSink;
use prospect_db::{CheckpointStore, JobProgress};
use prospect_segments::SearchCombination;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What a finished (or interrupted) run did.
#[derive(Debug, Clone, Copy)]
pub struct CrawlSummary {
    /// Companies emitted across the whole job, including prior runs
    pub company_count: u64,
    /// Contacts emitted across the whole job, including prior runs
    pub contact_count: u64,
    /// Whether the job reached its terminal state
    pub completed: bool,
}

/// Drives the pipeline across the ordered combination space.
pub struct CrawlDriver<S: OutputSink> {
    pipeline: SearchPipeline<S>,
    checkpoints: CheckpointStore,
    combinations: Vec<SearchCombination>,
    progress: Arc<Mutex<JobProgress>>,
    cancel: CancellationToken,
}

impl<S: OutputSink> CrawlDriver<S> {
    /// Create a driver, loading the persisted checkpoint.
    ///
    /// # Errors
    /// Fails if the persisted checkpoint exists but cannot be decoded.
    pub async fn new(
        pipeline: SearchPipeline<S>,
        checkpoints: CheckpointStore,
        combinations: Vec<SearchCombination>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let progress = checkpoints.load().await?;
        Ok(Self {
            pipeline,
            checkpoints,
            combinations,
            progress: Arc::new(Mutex::new(progress)),
            cancel,
        })
    }

    /// Shared handle to the live progress record.
    #[must_use]
    pub fn progress(&self) -> Arc<Mutex<JobProgress>> {
        Arc::clone(&self.progress)
    }

    /// Spawn the periodic checkpoint flush.
    ///
    /// Long combinations would otherwise only checkpoint at their boundary;
    /// the timer bounds how much page progress a kill can lose. Save
    /// failures are logged and retried on the next tick.
    pub fn spawn_autosave_task(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.checkpoints.clone();
        let progress = Arc::clone(&self.progress);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut record = progress.lock().await;
                if let Err(e) = store.save(&mut record).await {
                    tracing::warn!(error = %e, "progress autosave failed, will retry next tick");
                }
            }
        })
    }

    /// Run the job from its checkpoint to completion or cancellation.
    ///
    /// A job already marked completed returns immediately without touching
    /// the remote API.
    ///
    /// # Errors
    /// Propagates pipeline failures: exhausted API retries, persistence
    /// failures, and sink delivery failures. The checkpoint reflects the
    /// last combination boundary (or autosave) in every failure path.
    pub async fn run(&mut self) -> Result<CrawlSummary> {
        let total = self.combinations.len();
        let start = {
            let record = self.progress.lock().await;
            if record.completed {
                tracing::info!("job already completed, nothing to do");
                return Ok(summary_of(&record));
            }
            record.combination_index
        };

        tracing::info!(
            combinations = total,
            start_index = start,
            "starting crawl"
        );

        for idx in start..total {
            if self.cancel.is_cancelled() {
                return self.drain().await;
            }

            {
                let mut record = self.progress.lock().await;
                // The first combination resumes its persisted page; advancing
                // to a later one resets the page pointer.
                if idx != record.combination_index {
                    record.advance_to(idx);
                }
                self.checkpoints.save(&mut record).await?;
            }

            let combination = self.combinations[idx].clone();
            let outcome = self
                .pipeline
                .run_combination(&combination, &self.progress)
                .await?;

            if outcome == CombinationOutcome::Cancelled {
                return self.drain().await;
            }

            tracing::info!(
                combination = idx + 1,
                total,
                percent = percent_complete(idx + 1, total),
                "combination processed"
            );
        }

        let summary = {
            let mut record = self.progress.lock().await;
            record.mark_completed();
            self.checkpoints.save(&mut record).await?;
            summary_of(&record)
        };
        self.pipeline.flush().await?;

        tracing::info!(
            companies = summary.company_count,
            contacts = summary.contact_count,
            excluded = self.pipeline.excluded_count(),
            "crawl completed"
        );
        Ok(summary)
    }

    /// Checkpoint and flush after a cancellation, leaving the job resumable.
    async fn drain(&mut self) -> Result<CrawlSummary> {
        let (summary, index) = {
            let mut record = self.progress.lock().await;
            self.checkpoints.save(&mut record).await?;
            (summary_of(&record), record.combination_index)
        };
        self.pipeline.flush().await?;
        tracing::info!(combination_index = index, "crawl interrupted, checkpoint saved");
        Ok(summary)
    }
}

/// Whole-percent completion after `done` of `total` combinations.
fn percent_complete(done: usize, total: usize) -> usize {
    if total == 0 {
        100
    } else {
        done * 100 / total
    }
}

fn summary_of(progress: &JobProgress) -> CrawlSummary {
    CrawlSummary {
        company_count: progress.processed_company_count,
        contact_count: progress.processed_contact_count,
        completed: progress.completed,
    }
}
