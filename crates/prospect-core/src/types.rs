//! Shared domain types used across the Prospect crawler.
//!
//! This module defines the value objects that flow between the search
//! pipeline, the exclusion store, and the output sink.

use crate::error::ProspectError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype for company identifiers returned by the remote API.
///
/// Identifiers are opaque strings; the only constraint is non-emptiness,
/// since an empty id would silently break exclusion-set deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(String);

impl CompanyId {
    /// Create a new `CompanyId` from a string.
    ///
    /// # Errors
    /// Returns error if the id is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, ProspectError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ProspectError::Validation(
                "company id cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of geographic region a search location names.
///
/// Derived from the location string's lexical shape: metro areas carry a
/// separator (`" - "` or `", "`), plain state names do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// A whole US state (e.g. "Colorado")
    State,
    /// A metropolitan area (e.g. "Denver - Aurora, CO")
    Metro,
}

impl RegionKind {
    /// Classify a location string.
    #[must_use]
    pub fn of_location(location: &str) -> Self {
        if location.contains(" - ") || location.contains(", ") {
            Self::Metro
        } else {
            Self::State
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => write!(f, "state"),
            Self::Metro => write!(f, "metro"),
        }
    }
}

/// A business record returned by company search.
///
/// Streamed out per combination, never accumulated globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Opaque identifier from the remote API
    pub id: CompanyId,
    /// Company name
    pub name: String,
    /// Location string the company was found under
    pub location: String,
    /// Industry classification code (e.g. NAICS "236118")
    pub industry_code: String,
    /// Human-readable industry name
    pub industry_name: String,
    /// Company website, if reported
    pub website: Option<String>,
    /// City, if reported
    pub city: Option<String>,
    /// State, if reported
    pub state: Option<String>,
    /// Reported employee count, if any
    pub employee_count: Option<u32>,
}

/// A person record associated with a company, after enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Opaque contact identifier from the remote API
    pub id: String,
    /// Identifier of the employing company
    pub company_id: CompanyId,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Job title
    pub title: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Work phone number
    pub phone: Option<String>,
    /// Mobile phone number
    pub mobile_phone: Option<String>,
    /// Match confidence reported by the provider (0-100)
    pub confidence: Option<u32>,
    /// Seniority level reported by the provider
    pub seniority: Option<String>,
}

impl Contact {
    /// Whether the contact carries at least one reachable channel.
    ///
    /// Acceptance is an OR over email, phone, and mobile phone; a contact
    /// with only a name and title is not worth emitting.
    #[must_use]
    pub fn has_contact_channel(&self) -> bool {
        let filled = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.email) || filled(&self.phone) || filled(&self.mobile_phone)
    }
}
