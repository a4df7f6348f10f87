//! Per-combination search pipeline.
//!
//! Walks the paginated company results for one search combination,
//! partitions each page against the exclusion set, pulls and enriches
//! contacts for the new companies, and hands accepted records to the output
//! sink. Pagination terminates on whichever comes first: an empty page, a
//! run of pages yielding nothing new, the provider reporting the page is out
//! of range, the reported result total, or the absolute page ceiling.
//!
//! Progress lives behind a shared lock so the autosave timer can flush the
//! page pointer mid-combination; the lock is only held at page boundaries,
//! never across a remote call.

use crate::error::{CrawlError, Result};
use crate::sink::OutputSink;
use prospect_api::{
    ApiError, CompanySearchRequest, ContactSearchRequest, EnrichContactRequest, LeadApi,
};
use prospect_core::config::CrawlConfig;
use prospect_core::{Company, Contact};
use prospect_db::{ExclusionStore, JobProgress};
use prospect_segments::SearchCombination;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// How a combination's pagination ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinationOutcome {
    /// Pagination ran to one of its normal termination conditions.
    Completed,
    /// Cancellation was requested; the combination stopped at a page
    /// boundary and must be re-entered on the next run.
    Cancelled,
}

/// Pipeline tuning, lifted from [`CrawlConfig`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Page size for company search
    pub page_size: u32,
    /// Absolute per-combination page ceiling
    pub max_pages: u32,
    /// Consecutive pages yielding no new companies before stopping early
    pub stale_page_limit: u32,
    /// Minimum contact-match confidence requested from the provider
    pub min_confidence: u32,
    /// Whether to exclude partial contact profiles
    pub exclude_partial_profiles: bool,
    /// Page size for contact search
    pub contact_page_size: u32,
}

impl From<&CrawlConfig> for PipelineOptions {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            page_size: config.page_size,
            max_pages: config.max_pages,
            stale_page_limit: config.stale_page_limit,
            min_confidence: config.min_confidence,
            exclude_partial_profiles: config.exclude_partial_profiles,
            contact_page_size: config.contact_page_size,
        }
    }
}

/// Processes one combination at a time against the remote API.
pub struct SearchPipeline<S: OutputSink> {
    api: Arc<dyn LeadApi>,
    exclusions: ExclusionStore,
    sink: S,
    options: PipelineOptions,
    cancel: CancellationToken,
}

impl<S: OutputSink> SearchPipeline<S> {
    /// Create a pipeline.
    #[must_use]
    pub fn new(
        api: Arc<dyn LeadApi>,
        exclusions: ExclusionStore,
        sink: S,
        options: PipelineOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            exclusions,
            sink,
            options,
            cancel,
        }
    }

    /// Number of company identifiers excluded so far.
    #[must_use]
    pub fn excluded_count(&self) -> usize {
        self.exclusions.len()
    }

    /// Flush the sink.
    pub async fn flush(&mut self) -> Result<()> {
        self.sink.flush().await.map_err(|e| CrawlError::Sink {
            message: format!("{e:#}"),
        })
    }

    /// Walk the pages of one combination, resuming from the shared
    /// progress record's page pointer.
    ///
    /// Updates the record in memory (page pointer and emitted counts);
    /// persisting it is the driver's and the autosave timer's job.
    ///
    /// # Errors
    /// Propagates exhausted-retry API failures, persistence failures, and
    /// sink delivery failures. A page the provider rejects with a transient
    /// upstream error is logged and skipped instead.
    pub async fn run_combination(
        &mut self,
        combination: &SearchCombination,
        progress: &Mutex<JobProgress>,
    ) -> Result<CombinationOutcome> {
        tracing::info!(
            location = %combination.location,
            industry = %combination.industry_code,
            title = %combination.role_title,
            start_page = progress.lock().await.page,
            "starting combination"
        );

        let mut stale_pages: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("cancellation requested, leaving combination");
                return Ok(CombinationOutcome::Cancelled);
            }

            let page = progress.lock().await.page;
            if page > self.options.max_pages {
                tracing::warn!(
                    max_pages = self.options.max_pages,
                    "page ceiling reached, stopping combination"
                );
                break;
            }

            let request = CompanySearchRequest {
                location: combination.location.clone(),
                region_kind: combination.region_kind,
                industry_code: combination.industry_code.clone(),
                page,
                page_size: self.options.page_size,
            };

            let response = match self.api.search_companies(request).await {
                Ok(response) => response,
                Err(ApiError::PageOutOfRange { .. }) => {
                    tracing::debug!(page, "provider reports page out of range, combination done");
                    break;
                }
                Err(e @ (ApiError::Upstream { .. } | ApiError::Decode { .. })) => {
                    // A failed page is skipped, not counted as stale; only
                    // the absolute page ceiling bounds a persistently
                    // failing endpoint.
                    tracing::warn!(page, error = %e, "page failed, skipping");
                    progress.lock().await.page += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if response.companies.is_empty() {
                tracing::debug!(page, "empty page, combination done");
                break;
            }

            let total_pages = response.total_pages(self.options.page_size);

            let mut fresh = Vec::new();
            let mut excluded = 0usize;
            for record in response.companies {
                if record.id.is_empty() {
                    tracing::warn!(name = %record.name, "company record without id, skipping");
                    continue;
                }
                if self.exclusions.contains(&record.id) {
                    excluded += 1;
                } else {
                    fresh.push(record);
                }
            }

            if fresh.is_empty() {
                stale_pages += 1;
                tracing::debug!(page, excluded, stale_pages, "page yielded nothing new");
                if stale_pages >= self.options.stale_page_limit {
                    tracing::info!(stale_pages, "stale page limit reached, stopping combination");
                    break;
                }
            } else {
                stale_pages = 0;

                let mut companies = Vec::with_capacity(fresh.len());
                for record in fresh {
                    match record.into_company(
                        &combination.location,
                        &combination.industry_code,
                        &combination.industry_name,
                    ) {
                        Ok(company) => companies.push(company),
                        Err(e) => tracing::warn!(error = %e, "invalid company record, skipping"),
                    }
                }

                let mut contacts = Vec::new();
                for company in &companies {
                    contacts
                        .extend(self.collect_contacts(company, &combination.role_title).await);
                }

                // Deliver before excluding: a crash between the two replays
                // the page and produces duplicates, never silent loss.
                self.sink
                    .deliver_companies(&companies)
                    .await
                    .map_err(|e| CrawlError::Sink {
                        message: format!("{e:#}"),
                    })?;
                if !contacts.is_empty() {
                    self.sink
                        .deliver_contacts(&contacts)
                        .await
                        .map_err(|e| CrawlError::Sink {
                            message: format!("{e:#}"),
                        })?;
                }

                self.exclusions
                    .add_all(companies.iter().map(|c| c.id.as_str().to_string()))
                    .await?;

                {
                    let mut record = progress.lock().await;
                    record.processed_company_count += companies.len() as u64;
                    record.processed_contact_count += contacts.len() as u64;
                }

                tracing::info!(
                    page,
                    new_companies = companies.len(),
                    excluded,
                    contacts = contacts.len(),
                    "page processed"
                );
            }

            if total_pages != 0 && page >= total_pages {
                tracing::debug!(page, total_pages, "reported result total reached");
                break;
            }

            progress.lock().await.page += 1;
        }

        Ok(CombinationOutcome::Completed)
    }

    /// Find, enrich, and filter contacts for one company.
    ///
    /// Contact-side failures are logged and skipped; a company with no
    /// reachable contacts is still a valid result.
    async fn collect_contacts(&self, company: &Company, role_title: &str) -> Vec<Contact> {
        let request = ContactSearchRequest {
            company_id: company.id.as_str().to_string(),
            role_title: role_title.to_string(),
            min_confidence: self.options.min_confidence,
            exclude_partial_profiles: self.options.exclude_partial_profiles,
            page_size: self.options.contact_page_size,
        };

        let stubs = match self.api.search_contacts(request).await {
            Ok(response) => response.contacts,
            Err(e) => {
                tracing::warn!(
                    company = company.id.as_str(),
                    error = %e,
                    "contact search failed, skipping company"
                );
                return Vec::new();
            }
        };

        let mut accepted = Vec::new();
        for stub in stubs {
            let enriched = match self
                .api
                .enrich_contact(EnrichContactRequest::for_contact(stub.id.clone()))
                .await
            {
                Ok(response) => response.contact,
                Err(e) => {
                    tracing::warn!(contact = %stub.id, error = %e, "enrichment failed, skipping contact");
                    continue;
                }
            };

            let Some(record) = enriched else {
                tracing::debug!(contact = %stub.id, "provider has no enriched record");
                continue;
            };

            let contact = record.into_contact(company.id.clone());
            if contact.has_contact_channel() {
                accepted.push(contact);
            } else {
                tracing::debug!(contact = %contact.id, "no contact channel, rejected");
            }
        }

        accepted
    }
}
