//! Prospect Core - Foundation crate for the Prospect lead crawler.
//!
//! This crate provides shared domain types, error handling, and configuration
//! management that all other Prospect crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Shared-type and configuration errors using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared domain records (`CompanyId`, `RegionKind`, `Company`, `Contact`)
//!
//! # Example
//!
//! ```rust
//! use prospect_core::{AppConfig, RegionKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(RegionKind::of_location("Colorado"), RegionKind::State);
//! assert_eq!(RegionKind::of_location("Denver - Aurora, CO"), RegionKind::Metro);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, AppConfig, CrawlConfig, ExportConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult, ProspectError, Result};
pub use types::{Company, CompanyId, Contact, RegionKind};
