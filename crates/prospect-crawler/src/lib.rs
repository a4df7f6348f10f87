//! Resumable crawl engine.
//!
//! The driver walks an ordered combination space, checkpointing before each
//! combination and on an autosave timer; the per-combination pipeline pages
//! through company results, deduplicates against the persistent exclusion
//! set, enriches contacts, and hands accepted records to an output sink.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod driver;
pub mod error;
pub mod pipeline;
pub mod sink;

pub use driver::{CrawlDriver, CrawlSummary};
pub use error::{CrawlError, Result};
pub use pipeline::{CombinationOutcome, PipelineOptions, SearchPipeline};
pub use sink::OutputSink;
