//! Prospect Segments - Search-parameter groups and combination space.
//!
//! Loads grouped crawl parameters (locations, role titles, industry codes)
//! from TOML files and expands them into the deterministic, ordered sequence
//! of search combinations the resumable driver walks.
//!
//! # Example
//!
//! ```rust,ignore
//! use prospect_segments::{CombinationSpace, SegmentLoader};
//!
//! let groups = SegmentLoader::new("segments/")?.load()?;
//! let space = CombinationSpace::build(&groups);
//! tracing::info!(combinations = space.len(), "combination space ready");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod combinations;
pub mod definition;
pub mod error;
pub mod loader;

// Re-export commonly used types
pub use combinations::{clean_titles, CombinationSpace, SearchCombination};
pub use definition::{IndustryCode, SegmentFile, SegmentGroup};
pub use error::{Result, SegmentError};
pub use loader::SegmentLoader;
