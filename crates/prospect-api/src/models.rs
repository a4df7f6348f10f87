//! Wire models for the remote search/enrich API.
//!
//! Request shapes carry exactly the filters the provider understands;
//! response records convert into the core domain types, attaching the
//! combination context the wire records don't carry themselves.

use prospect_core::{Company, CompanyId, Contact, ProspectError, RegionKind};
use serde::{Deserialize, Serialize};

/// Field set requested from contact enrichment.
pub const ENRICH_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "phone",
    "mobile_phone",
    "title",
    "company_id",
    "confidence",
    "seniority",
];

/// Company search request (one page of one combination).
#[derive(Debug, Clone, Serialize)]
pub struct CompanySearchRequest {
    /// Location filter
    pub location: String,
    /// Region classification of the location
    pub region_kind: RegionKind,
    /// Industry code filter
    pub industry_code: String,
    /// 1-based page index
    pub page: u32,
    /// Page size
    pub page_size: u32,
}

/// One company record as returned on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRecord {
    /// Opaque identifier
    pub id: String,
    /// Company name
    pub name: String,
    /// Website, if reported
    #[serde(default)]
    pub website: Option<String>,
    /// City, if reported
    #[serde(default)]
    pub city: Option<String>,
    /// State, if reported
    #[serde(default)]
    pub state: Option<String>,
    /// Employee count, if reported
    #[serde(default)]
    pub employee_count: Option<u32>,
}

impl CompanyRecord {
    /// Convert into a domain [`Company`], attaching the search context.
    ///
    /// # Errors
    /// Returns error if the wire record carries an empty id.
    pub fn into_company(
        self,
        location: &str,
        industry_code: &str,
        industry_name: &str,
    ) -> Result<Company, ProspectError> {
        Ok(Company {
            id: CompanyId::new(self.id)?,
            name: self.name,
            location: location.to_string(),
            industry_code: industry_code.to_string(),
            industry_name: industry_name.to_string(),
            website: self.website,
            city: self.city,
            state: self.state,
            employee_count: self.employee_count,
        })
    }
}

/// Company search response: one page plus the reported total.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanySearchResponse {
    /// Companies on this page
    #[serde(default)]
    pub companies: Vec<CompanyRecord>,
    /// Total matching results reported by the provider
    #[serde(default)]
    pub total_count: u64,
}

impl CompanySearchResponse {
    /// Total pages implied by the reported total and a page size.
    #[must_use]
    pub fn total_pages(&self, page_size: u32) -> u32 {
        if page_size == 0 {
            return 0;
        }
        let pages = self.total_count.div_ceil(u64::from(page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// Contact search request, scoped to one company and role title.
#[derive(Debug, Clone, Serialize)]
pub struct ContactSearchRequest {
    /// Parent company identifier
    pub company_id: String,
    /// Role title filter
    pub role_title: String,
    /// Minimum match confidence (0-100)
    pub min_confidence: u32,
    /// Whether to exclude partial profiles
    pub exclude_partial_profiles: bool,
    /// Page size
    pub page_size: u32,
}

/// One contact stub from contact search, prior to enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactStub {
    /// Opaque contact identifier
    pub id: String,
    /// First name, if reported
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name, if reported
    #[serde(default)]
    pub last_name: Option<String>,
    /// Title, if reported
    #[serde(default)]
    pub title: Option<String>,
}

/// Contact search response.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactSearchResponse {
    /// Matching contact stubs
    #[serde(default)]
    pub contacts: Vec<ContactStub>,
}

/// Contact enrichment request.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichContactRequest {
    /// Contact identifier to enrich
    pub contact_id: String,
    /// Fields requested from the provider
    pub fields: Vec<String>,
}

impl EnrichContactRequest {
    /// Build a request for the fixed enrichment field set.
    #[must_use]
    pub fn for_contact(contact_id: impl Into<String>) -> Self {
        Self {
            contact_id: contact_id.into(),
            fields: ENRICH_FIELDS.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

/// One enriched contact record as returned on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichedRecord {
    /// Opaque contact identifier
    pub id: String,
    /// First name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Job title
    #[serde(default)]
    pub title: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Work phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Mobile phone
    #[serde(default)]
    pub mobile_phone: Option<String>,
    /// Match confidence (0-100)
    #[serde(default)]
    pub confidence: Option<u32>,
    /// Seniority level
    #[serde(default)]
    pub seniority: Option<String>,
}

impl EnrichedRecord {
    /// Convert into a domain [`Contact`] under its employing company.
    #[must_use]
    pub fn into_contact(self, company_id: CompanyId) -> Contact {
        Contact {
            id: self.id,
            company_id,
            first_name: self.first_name,
            last_name: self.last_name,
            title: self.title,
            email: self.email,
            phone: self.phone,
            mobile_phone: self.mobile_phone,
            confidence: self.confidence,
            seniority: self.seniority,
        }
    }
}

/// Contact enrichment response; `contact` is absent when the provider has
/// nothing for the id.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichContactResponse {
    /// The enriched record, if found
    #[serde(default)]
    pub contact: Option<EnrichedRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        let response = CompanySearchResponse {
            companies: vec![],
            total_count: 101,
        };
        assert_eq!(response.total_pages(25), 5);

        let exact = CompanySearchResponse {
            companies: vec![],
            total_count: 100,
        };
        assert_eq!(exact.total_pages(25), 4);

        let empty = CompanySearchResponse {
            companies: vec![],
            total_count: 0,
        };
        assert_eq!(empty.total_pages(25), 0);
    }

    #[test]
    fn test_enrich_request_fixed_fields() {
        let request = EnrichContactRequest::for_contact("ct-9");
        assert_eq!(request.contact_id, "ct-9");
        assert_eq!(request.fields.len(), ENRICH_FIELDS.len());
        assert!(request.fields.iter().any(|f| f == "mobile_phone"));
    }

    #[test]
    fn test_company_record_conversion() {
        let record = CompanyRecord {
            id: "co-7".to_string(),
            name: "Acme Roofing".to_string(),
            website: None,
            city: Some("Denver".to_string()),
            state: Some("CO".to_string()),
            employee_count: None,
        };

        let company = record
            .into_company("Colorado", "238160", "Roofing Contractors")
            .expect("convert record");
        assert_eq!(company.id.as_str(), "co-7");
        assert_eq!(company.location, "Colorado");
        assert_eq!(company.industry_name, "Roofing Contractors");
    }

    #[test]
    fn test_company_record_empty_id_rejected() {
        let record = CompanyRecord {
            id: String::new(),
            name: "Nameless".to_string(),
            website: None,
            city: None,
            state: None,
            employee_count: None,
        };
        assert!(record.into_company("Colorado", "238160", "Roofing").is_err());
    }

    #[test]
    fn test_response_deserialization_defaults() {
        let response: CompanySearchResponse =
            serde_json::from_str("{}").expect("parse empty object");
        assert!(response.companies.is_empty());
        assert_eq!(response.total_count, 0);

        let enrich: EnrichContactResponse =
            serde_json::from_str("{}").expect("parse empty object");
        assert!(enrich.contact.is_none());
    }
}
