//! Remote API client.
//!
//! [`ApiClient`] wraps a [`Transport`] with the call discipline every remote
//! request shares: a fixed pacing delay, bearer attachment, transparent
//! re-authentication on 401, and bounded retry-after handling on 429. The
//! crawl pipeline depends on the [`LeadApi`] trait rather than the concrete
//! client so its control flow can be tested against canned responses.

use crate::auth::CredentialManager;
use crate::error::{ApiError, Result};
use crate::models::{
    CompanySearchRequest, CompanySearchResponse, ContactSearchRequest, ContactSearchResponse,
    EnrichContactRequest, EnrichContactResponse,
};
use crate::transport::{ApiRequest, Transport};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Company search endpoint path.
pub const COMPANY_SEARCH_ENDPOINT: &str = "companies/search";
/// Contact search endpoint path.
pub const CONTACT_SEARCH_ENDPOINT: &str = "contacts/search";
/// Contact enrichment endpoint path.
pub const CONTACT_ENRICH_ENDPOINT: &str = "contacts/enrich";

/// The three remote operations the crawl needs.
#[async_trait]
pub trait LeadApi: Send + Sync {
    /// Fetch one page of companies for a search combination.
    async fn search_companies(&self, request: CompanySearchRequest)
        -> Result<CompanySearchResponse>;

    /// Find contacts at a company matching a role title.
    async fn search_contacts(&self, request: ContactSearchRequest)
        -> Result<ContactSearchResponse>;

    /// Enrich one contact with its full field set.
    async fn enrich_contact(&self, request: EnrichContactRequest)
        -> Result<EnrichContactResponse>;
}

/// Tuning knobs for the shared call discipline.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Fixed delay applied before every remote call
    pub call_delay: Duration,
    /// Retry budget for 401/429 handling on a single call
    pub max_retries: u32,
    /// Sleep applied when a 429 carries no retry-after header
    pub rate_limit_fallback: Duration,
    /// Warn when the provider's remaining quota drops below this
    pub low_quota_warning: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            call_delay: Duration::from_millis(1200),
            max_retries: 3,
            rate_limit_fallback: Duration::from_secs(60),
            low_quota_warning: 100,
        }
    }
}

/// Production client over a transport and a credential manager.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialManager>,
    options: ClientOptions,
}

impl ApiClient {
    /// Create a client.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialManager>,
        options: ClientOptions,
    ) -> Self {
        Self {
            transport,
            credentials,
            options,
        }
    }

    /// Execute one authenticated call with the shared discipline.
    ///
    /// # Errors
    /// `ApiError::Auth` when 401 responses exhaust the retry budget,
    /// `ApiError::RateLimited` when 429 responses do, and the classified
    /// upstream error for any other non-success status.
    async fn call<Req: Serialize + Sync, Resp: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: &Req,
    ) -> Result<Resp> {
        // Fixed pacing on every call; the provider throttles bursts hard.
        tokio::time::sleep(self.options.call_delay).await;

        let body = serde_json::to_value(request)?;
        let mut auth_attempts: u32 = 0;
        let mut throttle_attempts: u32 = 0;

        loop {
            let credential = self.credentials.get_credential().await?;

            let response = self
                .transport
                .execute(ApiRequest {
                    endpoint: endpoint.to_string(),
                    body: body.clone(),
                    bearer: Some(credential.token),
                })
                .await?;

            if let Some(remaining) = response.quota_remaining {
                if remaining < self.options.low_quota_warning {
                    tracing::warn!(endpoint, remaining, "remaining API quota is low");
                }
            }

            match response.status {
                200..=299 => {
                    return serde_json::from_value(response.body).map_err(|e| ApiError::Decode {
                        endpoint: endpoint.to_string(),
                        message: e.to_string(),
                    });
                }
                401 => {
                    auth_attempts += 1;
                    if auth_attempts > self.options.max_retries {
                        return Err(ApiError::Auth {
                            message: format!(
                                "still unauthorized on {endpoint} after {auth_attempts} attempts"
                            ),
                        });
                    }
                    tracing::info!(endpoint, attempt = auth_attempts, "credential rejected, renewing");
                    self.credentials.invalidate().await?;
                    self.credentials.renew().await?;
                }
                429 => {
                    throttle_attempts += 1;
                    if throttle_attempts > self.options.max_retries {
                        return Err(ApiError::RateLimited {
                            endpoint: endpoint.to_string(),
                            attempts: throttle_attempts,
                        });
                    }
                    let wait = response
                        .retry_after
                        .map_or(self.options.rate_limit_fallback, Duration::from_secs);
                    tracing::warn!(
                        endpoint,
                        attempt = throttle_attempts,
                        wait_secs = wait.as_secs(),
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                status => {
                    return Err(classify_upstream(endpoint, status, &response.body));
                }
            }
        }
    }
}

#[async_trait]
impl LeadApi for ApiClient {
    async fn search_companies(
        &self,
        request: CompanySearchRequest,
    ) -> Result<CompanySearchResponse> {
        self.call(COMPANY_SEARCH_ENDPOINT, &request).await
    }

    async fn search_contacts(
        &self,
        request: ContactSearchRequest,
    ) -> Result<ContactSearchResponse> {
        self.call(CONTACT_SEARCH_ENDPOINT, &request).await
    }

    async fn enrich_contact(
        &self,
        request: EnrichContactRequest,
    ) -> Result<EnrichContactResponse> {
        self.call(CONTACT_ENRICH_ENDPOINT, &request).await
    }
}

/// Map a non-success, non-401/429 response to an error.
///
/// Paging past the end of a result set is reported inconsistently by the
/// provider: newer endpoints carry a structured `code` field, older ones only
/// a free-text message. Both map to [`ApiError::PageOutOfRange`], which
/// callers treat as normal pagination termination.
fn classify_upstream(endpoint: &str, status: u16, body: &Value) -> ApiError {
    let code = body
        .get("error")
        .and_then(|e| e.get("code"))
        .or_else(|| body.get("code"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    if code == "page_out_of_range" {
        return ApiError::PageOutOfRange {
            endpoint: endpoint.to_string(),
        };
    }

    let message = body
        .get("error")
        .and_then(|e| e.get("message"))
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("no error detail")
        .to_string();

    let lower = message.to_lowercase();
    if lower.contains("page")
        && (lower.contains("out of range")
            || lower.contains("too high")
            || lower.contains("exceeds"))
    {
        return ApiError::PageOutOfRange {
            endpoint: endpoint.to_string(),
        };
    }

    ApiError::Upstream {
        endpoint: endpoint.to_string(),
        status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ApiResponse;
    use prospect_core::RegionKind;
    use prospect_db::Database;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Transport that answers the token endpoint and replays a script of
    /// responses for everything else.
    struct ScriptedTransport {
        script: Mutex<VecDeque<ApiResponse>>,
        renewals: AtomicU32,
        calls: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(script: Vec<ApiResponse>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                renewals: AtomicU32::new(0),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
            if request.endpoint == "auth/token" {
                let n = self.renewals.fetch_add(1, Ordering::SeqCst) + 1;
                return Ok(ApiResponse {
                    status: 200,
                    body: serde_json::json!({"token": format!("tok-{n}")}),
                    retry_after: None,
                    quota_remaining: None,
                });
            }

            assert!(request.bearer.is_some(), "call without bearer token");
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .expect("lock script")
                .pop_front()
                .expect("script exhausted");
            Ok(next)
        }
    }

    fn ok_companies(count: usize, total: u64) -> ApiResponse {
        let companies: Vec<_> = (0..count)
            .map(|i| serde_json::json!({"id": format!("co-{i}"), "name": format!("Company {i}")}))
            .collect();
        ApiResponse {
            status: 200,
            body: serde_json::json!({"companies": companies, "total_count": total}),
            retry_after: None,
            quota_remaining: None,
        }
    }

    fn status_response(status: u16, body: Value) -> ApiResponse {
        ApiResponse {
            status,
            body,
            retry_after: None,
            quota_remaining: None,
        }
    }

    async fn build_client(transport: Arc<ScriptedTransport>) -> (ApiClient, Database) {
        let db = Database::new(":memory:").await.expect("create test database");
        db.run_migrations().await.expect("run migrations");

        let credentials = Arc::new(CredentialManager::new(
            transport.clone() as Arc<dyn Transport>,
            db.pool().clone(),
            "user@example.com",
            "secret",
            40,
        ));

        let options = ClientOptions {
            call_delay: Duration::ZERO,
            max_retries: 3,
            rate_limit_fallback: Duration::ZERO,
            low_quota_warning: 100,
        };

        let client = ApiClient::new(transport as Arc<dyn Transport>, credentials, options);
        (client, db)
    }

    fn company_request(page: u32) -> CompanySearchRequest {
        CompanySearchRequest {
            location: "Colorado".to_string(),
            region_kind: RegionKind::State,
            industry_code: "238160".to_string(),
            page,
            page_size: 25,
        }
    }

    #[tokio::test]
    async fn test_successful_search() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok_companies(2, 30)]));
        let (client, _db) = build_client(transport.clone()).await;

        let response = client
            .search_companies(company_request(1))
            .await
            .expect("search companies");
        assert_eq!(response.companies.len(), 2);
        assert_eq!(response.total_count, 30);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_401_renews_and_retries_transparently() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status_response(401, Value::Null),
            ok_companies(1, 1),
        ]));
        let (client, _db) = build_client(transport.clone()).await;

        let response = client
            .search_companies(company_request(1))
            .await
            .expect("search should succeed after renewal");
        assert_eq!(response.companies.len(), 1);
        // Initial handshake plus the forced renewal after the 401
        assert_eq!(transport.renewals.load(Ordering::SeqCst), 2);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persistent_401_exhausts_budget() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status_response(401, Value::Null),
            status_response(401, Value::Null),
            status_response(401, Value::Null),
            status_response(401, Value::Null),
        ]));
        let (client, _db) = build_client(transport).await;

        let result = client.search_companies(company_request(1)).await;
        assert!(matches!(result, Err(ApiError::Auth { .. })));
    }

    #[tokio::test]
    async fn test_429_honors_retry_after_then_succeeds() {
        let throttled = ApiResponse {
            status: 429,
            body: Value::Null,
            retry_after: Some(0),
            quota_remaining: None,
        };
        let transport = Arc::new(ScriptedTransport::new(vec![throttled, ok_companies(1, 1)]));
        let (client, _db) = build_client(transport.clone()).await;

        let response = client
            .search_companies(company_request(1))
            .await
            .expect("search should succeed after backoff");
        assert_eq!(response.companies.len(), 1);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persistent_429_exhausts_budget() {
        let script: Vec<_> = (0..4)
            .map(|_| ApiResponse {
                status: 429,
                body: Value::Null,
                retry_after: Some(0),
                quota_remaining: None,
            })
            .collect();
        let transport = Arc::new(ScriptedTransport::new(script));
        let (client, _db) = build_client(transport).await;

        let result = client.search_companies(company_request(1)).await;
        assert!(matches!(
            result,
            Err(ApiError::RateLimited { attempts: 4, .. })
        ));
    }

    #[tokio::test]
    async fn test_page_out_of_range_structured_code() {
        let transport = Arc::new(ScriptedTransport::new(vec![status_response(
            400,
            serde_json::json!({"error": {"code": "page_out_of_range", "message": "bad page"}}),
        )]));
        let (client, _db) = build_client(transport).await;

        let result = client.search_companies(company_request(99)).await;
        assert!(matches!(result, Err(ApiError::PageOutOfRange { .. })));
    }

    #[tokio::test]
    async fn test_page_out_of_range_free_text() {
        let transport = Arc::new(ScriptedTransport::new(vec![status_response(
            422,
            serde_json::json!({"message": "requested page exceeds available results"}),
        )]));
        let (client, _db) = build_client(transport).await;

        let result = client.search_companies(company_request(51)).await;
        assert!(matches!(result, Err(ApiError::PageOutOfRange { .. })));
    }

    #[tokio::test]
    async fn test_other_upstream_errors_preserved() {
        let transport = Arc::new(ScriptedTransport::new(vec![status_response(
            502,
            serde_json::json!({"message": "bad gateway"}),
        )]));
        let (client, _db) = build_client(transport).await;

        let result = client.search_companies(company_request(1)).await;
        match result {
            Err(ApiError::Upstream { status, message, .. }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decode_error_on_malformed_body() {
        let transport = Arc::new(ScriptedTransport::new(vec![status_response(
            200,
            serde_json::json!({"companies": "not-an-array"}),
        )]));
        let (client, _db) = build_client(transport).await;

        let result = client.search_companies(company_request(1)).await;
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }

    #[test]
    fn test_classify_upstream_variants() {
        let err = classify_upstream(
            "companies/search",
            400,
            &serde_json::json!({"code": "page_out_of_range"}),
        );
        assert!(matches!(err, ApiError::PageOutOfRange { .. }));

        let err = classify_upstream(
            "companies/search",
            400,
            &serde_json::json!({"message": "page number too high"}),
        );
        assert!(matches!(err, ApiError::PageOutOfRange { .. }));

        let err = classify_upstream("companies/search", 500, &Value::Null);
        assert!(matches!(err, ApiError::Upstream { status: 500, .. }));
    }
}
