//! Output sink seam.
//!
//! The pipeline hands accepted records to an [`OutputSink`] and treats a
//! delivery failure as fatal for the current combination. Sinks report
//! failures as `anyhow` errors so implementations aren't forced into this
//! crate's error taxonomy.

use async_trait::async_trait;
use prospect_core::{Company, Contact};

/// Receives accepted records from the pipeline.
///
/// Deliveries for one crawl arrive from a single task; implementations don't
/// need to handle concurrent calls.
#[async_trait]
pub trait OutputSink: Send {
    /// Deliver a batch of newly accepted companies.
    async fn deliver_companies(&mut self, companies: &[Company]) -> anyhow::Result<()>;

    /// Deliver a batch of newly accepted contacts.
    async fn deliver_contacts(&mut self, contacts: &[Contact]) -> anyhow::Result<()>;

    /// Flush any buffered output. Called at the end of a run and after
    /// cancellation drain.
    async fn flush(&mut self) -> anyhow::Result<()>;
}
