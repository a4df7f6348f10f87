//! Credential lifecycle management.
//!
//! One `CredentialManager` owns the authoritative bearer credential for the
//! run. Renewal happens three ways: on demand when no valid credential is
//! available, reactively when a call is rejected with 401, and proactively
//! on a background timer so a credential never goes stale merely because no
//! call happened to trigger renewal. The computed expiry is deliberately
//! shorter than the provider's stated token lifetime to keep the proactive
//! and reactive paths from racing.

use crate::error::{ApiError, Result};
use crate::transport::{ApiRequest, Transport};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use prospect_db::kv;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use zeroize::Zeroizing;

/// Key the cached credential lives under in the durable store.
const CREDENTIAL_KEY: &str = "auth/credential";

/// Safety margin applied when checking expiry, so a credential isn't used
/// in the final seconds of its computed lifetime.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Endpoint for the username/password exchange.
const TOKEN_ENDPOINT: &str = "auth/token";

/// A bearer credential with its conservatively computed expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque bearer token
    pub token: String,
    /// Computed expiry, shorter than the provider's stated lifetime
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the credential is expired (or within the safety margin of it).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() + ChronoDuration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// Wire shape of the provider's token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Owns the run's bearer credential: in-memory cache, durable mirror, and
/// the renewal handshake.
pub struct CredentialManager {
    transport: Arc<dyn Transport>,
    pool: SqlitePool,
    username: String,
    password: Zeroizing<String>,
    token_valid: ChronoDuration,
    cached: RwLock<Option<Credential>>,
}

impl CredentialManager {
    /// Create a manager.
    ///
    /// `token_valid_minutes` is how long a freshly issued token is trusted;
    /// configure it well under the provider's stated lifetime (e.g. 40
    /// against 60).
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        pool: SqlitePool,
        username: impl Into<String>,
        password: impl Into<String>,
        token_valid_minutes: i64,
    ) -> Self {
        Self {
            transport,
            pool,
            username: username.into(),
            password: Zeroizing::new(password.into()),
            token_valid: ChronoDuration::minutes(token_valid_minutes),
            cached: RwLock::new(None),
        }
    }

    /// Produce a valid credential: memory cache, then durable cache, then a
    /// fresh renewal.
    pub async fn get_credential(&self) -> Result<Credential> {
        if let Some(cred) = self.cached.read().await.as_ref() {
            if !cred.is_expired() {
                return Ok(cred.clone());
            }
        }

        // A restart can reuse an unexpired credential from the last process.
        if let Some(cred) = self.load_cached().await? {
            if !cred.is_expired() {
                tracing::debug!("reusing durable cached credential");
                *self.cached.write().await = Some(cred.clone());
                return Ok(cred);
            }
        }

        self.renew().await
    }

    /// Perform the authentication handshake and update both caches.
    ///
    /// # Errors
    /// Returns `ApiError::Auth` if the handshake is rejected or the response
    /// is malformed. Persisting the new credential can also fail.
    pub async fn renew(&self) -> Result<Credential> {
        tracing::debug!(username = %self.username, "renewing credential");

        let request = ApiRequest {
            endpoint: TOKEN_ENDPOINT.to_string(),
            body: serde_json::json!({
                "username": self.username,
                "password": &*self.password,
            }),
            bearer: None,
        };

        let response = self.transport.execute(request).await?;

        if !(200..300).contains(&response.status) {
            return Err(ApiError::Auth {
                message: format!(
                    "token handshake rejected with status {}",
                    response.status
                ),
            });
        }

        let token: TokenResponse =
            serde_json::from_value(response.body).map_err(|e| ApiError::Auth {
                message: format!("malformed token response: {e}"),
            })?;

        let credential = Credential {
            token: token.token,
            expires_at: Utc::now() + self.token_valid,
        };

        self.store_cached(&credential).await?;
        *self.cached.write().await = Some(credential.clone());

        tracing::info!(expires_at = %credential.expires_at, "credential renewed");
        Ok(credential)
    }

    /// Drop both the in-memory and durable cached credentials.
    ///
    /// Called when the provider rejects a token with 401 so the next
    /// `get_credential` is forced through a fresh handshake.
    pub async fn invalidate(&self) -> Result<()> {
        *self.cached.write().await = None;
        kv::delete(&self.pool, CREDENTIAL_KEY).await?;
        tracing::debug!("cached credential invalidated");
        Ok(())
    }

    /// Spawn the proactive renewal timer.
    ///
    /// Runs for the life of the process; renewal failures are logged and
    /// retried on the next tick, never propagated.
    pub fn spawn_renewal_task(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Consume the immediate first tick; startup already renews on demand.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = manager.renew().await {
                    tracing::warn!(error = %e, "proactive credential renewal failed, will retry next tick");
                }
            }
        })
    }

    /// Read the durable cached credential, tolerating a corrupt value.
    async fn load_cached(&self) -> Result<Option<Credential>> {
        match kv::get(&self.pool, CREDENTIAL_KEY).await? {
            Some(value) => match serde_json::from_value(value) {
                Ok(cred) => Ok(Some(cred)),
                Err(e) => {
                    tracing::warn!(error = %e, "corrupt cached credential, ignoring");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Mirror a credential to the durable store.
    async fn store_cached(&self, credential: &Credential) -> Result<()> {
        let value = serde_json::to_value(credential)?;
        kv::put(&self.pool, CREDENTIAL_KEY, &value).await?;
        Ok(())
    }
}
