//! CSV output sink for crawl results.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod csv_sink;
pub mod error;

pub use csv_sink::{CsvSink, COMPANIES_FILE, CONTACTS_FILE};
pub use error::{ExportError, Result};
