//! Credential provider for the Vertex AI approval endpoint
//!
//! The classifier is reached with delegated cloud credentials. Instead of
//! refreshing ambient credentials on every call, the provider is an explicit
//! trait injected into the approval client, with a defined refresh policy:
//! tokens are cached and refreshed once they are within a minute of expiry.

use crate::error::PipelineError;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Refresh the cached token once it is this close to expiring.
const EXPIRY_MARGIN_SECS: i64 = 60;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Source of bearer tokens for the approval endpoint.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// Fixed token from the environment; for local development and tests.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(PipelineError::Credential(
                "static token is empty".to_string(),
            ));
        }
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Fetches access tokens from the GCE metadata server and caches them
/// until shortly before expiry.
pub struct MetadataTokenProvider {
    client: Client,
    url: String,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl MetadataTokenProvider {
    pub fn new() -> Self {
        Self::with_url(METADATA_TOKEN_URL.to_string())
    }

    /// Override the metadata URL; used by tests.
    pub fn with_url(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    async fn fetch(&self) -> Result<CachedToken> {
        info!("Refreshing access token from metadata server");

        let response = self
            .client
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| {
                PipelineError::Credential(format!("metadata server unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Credential(format!(
                "metadata server returned {}: {}",
                status, body
            )));
        }

        let parsed: MetadataTokenResponse = response.json().await.map_err(|e| {
            PipelineError::Credential(format!("malformed metadata token response: {}", e))
        })?;

        Ok(CachedToken {
            token: parsed.access_token,
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        })
    }
}

impl Default for MetadataTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenProvider for MetadataTokenProvider {
    async fn token(&self) -> Result<String> {
        let margin = Duration::seconds(EXPIRY_MARGIN_SECS);

        {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.expires_at - margin > Utc::now() {
                    debug!("Using cached access token");
                    return Ok(entry.token.clone());
                }
            }
        }

        let fresh = self.fetch().await?;
        let token = fresh.token.clone();

        let mut cached = self.cached.write().await;
        *cached = Some(fresh);

        Ok(token)
    }
}
