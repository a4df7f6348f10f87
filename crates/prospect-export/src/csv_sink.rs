//! Append-only CSV sink.
//!
//! Writes companies and contacts to two CSV files in an output directory.
//! Files are opened in append mode so a resumed run continues the same
//! files; the header row is only written when a file starts empty.

use crate::error::Result;
use async_trait::async_trait;
use csv::{Writer, WriterBuilder};
use prospect_core::{Company, Contact};
use prospect_crawler::OutputSink;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// File name for the company output.
pub const COMPANIES_FILE: &str = "companies.csv";
/// File name for the contact output.
pub const CONTACTS_FILE: &str = "contacts.csv";

/// CSV sink over an output directory.
pub struct CsvSink {
    companies: Writer<File>,
    contacts: Writer<File>,
    companies_path: PathBuf,
    contacts_path: PathBuf,
}

impl CsvSink {
    /// Open (or continue) the output files under `output_dir`.
    ///
    /// # Errors
    /// Fails if the directory cannot be created or the files cannot be
    /// opened for appending.
    pub fn create(output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        let companies_path = output_dir.join(COMPANIES_FILE);
        let contacts_path = output_dir.join(CONTACTS_FILE);

        let companies = open_append(&companies_path)?;
        let contacts = open_append(&contacts_path)?;

        tracing::info!(dir = %output_dir.display(), "csv sink ready");
        Ok(Self {
            companies,
            contacts,
            companies_path,
            contacts_path,
        })
    }

    /// Path of the company output file.
    #[must_use]
    pub fn companies_path(&self) -> &Path {
        &self.companies_path
    }

    /// Path of the contact output file.
    #[must_use]
    pub fn contacts_path(&self) -> &Path {
        &self.contacts_path
    }
}

/// Open a CSV writer in append mode, emitting headers only for a file that
/// starts empty.
fn open_append(path: &Path) -> Result<Writer<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_empty = file.metadata()?.len() == 0;
    Ok(WriterBuilder::new().has_headers(is_empty).from_writer(file))
}

#[async_trait]
impl OutputSink for CsvSink {
    async fn deliver_companies(&mut self, companies: &[Company]) -> anyhow::Result<()> {
        for company in companies {
            self.companies.serialize(company)?;
        }
        // Flush per batch: a kill mid-run should lose at most one page
        self.companies.flush()?;
        tracing::debug!(count = companies.len(), "companies written");
        Ok(())
    }

    async fn deliver_contacts(&mut self, contacts: &[Contact]) -> anyhow::Result<()> {
        for contact in contacts {
            self.contacts.serialize(contact)?;
        }
        self.contacts.flush()?;
        tracing::debug!(count = contacts.len(), "contacts written");
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        self.companies.flush()?;
        self.contacts.flush()?;
        Ok(())
    }
}
