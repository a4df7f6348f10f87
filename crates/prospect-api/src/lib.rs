//! Authenticated client for the remote lead search/enrich API.
//!
//! Covers the credential lifecycle (handshake, durable caching, proactive
//! renewal), the shared call discipline (pacing, 401 re-auth, 429 backoff),
//! and the typed request/response models for the three endpoints the crawl
//! uses.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{Credential, CredentialManager};
pub use client::{ApiClient, ClientOptions, LeadApi};
pub use error::{ApiError, Result};
pub use models::{
    CompanyRecord, CompanySearchRequest, CompanySearchResponse, ContactSearchRequest,
    ContactSearchResponse, ContactStub, EnrichContactRequest, EnrichContactResponse,
    EnrichedRecord,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
