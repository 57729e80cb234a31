//! Graph API provider for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `GRAPH_API_BASE_URL`: page/business-account API root (default: `https://graph.facebook.com/v18.0`)
//! - `INSTAGRAM_API_BASE_URL`: direct-access API root (default: `https://graph.instagram.com`)
//! - `GRAPH_CONNECT_TIMEOUT_SECS`: connect timeout (default: 5)
//! - `GRAPH_REQUEST_TIMEOUT_SECS`: whole-request timeout (default: 10)
//! - `GRAPH_APP_SECRET`: when set, requests carry an `appsecret_proof`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{ContentProvider, ProviderError};
use crate::fingerprint::appsecret_proof;
use crate::types::{AccessToken, AccountLink, CredentialContext, PageRef};

/// Fields requested from the direct endpoint.
const DIRECT_MEDIA_FIELDS: &str =
    "id,caption,media_type,media_url,permalink,thumbnail_url,timestamp,username";

/// Fields requested from the linked business-account endpoint.
const LINKED_MEDIA_FIELDS: &str = "id,caption,media_type,media_product_type,media_url,permalink,\
     thumbnail_url,timestamp,username,children{id,media_type,media_url}";

/// Graph error code for an invalid or expired OAuth token.
const INVALID_TOKEN_CODE: i64 = 190;

/// Configuration for the Graph API transport.
#[derive(Debug, Clone)]
pub struct GraphApiConfig {
    /// Root for page, linked-account and aggregate queries.
    pub graph_base_url: String,
    /// Root for the direct probe.
    pub instagram_base_url: String,
    /// Connect timeout in seconds (default: 5).
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (default: 10).
    pub request_timeout_secs: u64,
    /// App secret used to sign requests with `appsecret_proof`.
    pub app_secret: Option<String>,
}

impl GraphApiConfig {
    /// Configuration with explicit roots and default timeouts.
    pub fn new(graph_base_url: impl Into<String>, instagram_base_url: impl Into<String>) -> Self {
        Self {
            graph_base_url: graph_base_url.into(),
            instagram_base_url: instagram_base_url.into(),
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            app_secret: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            graph_base_url: std::env::var("GRAPH_API_BASE_URL")
                .unwrap_or_else(|_| "https://graph.facebook.com/v18.0".to_string()),
            instagram_base_url: std::env::var("INSTAGRAM_API_BASE_URL")
                .unwrap_or_else(|_| "https://graph.instagram.com".to_string()),
            connect_timeout_secs: std::env::var("GRAPH_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            request_timeout_secs: std::env::var("GRAPH_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            app_secret: std::env::var("GRAPH_APP_SECRET").ok().filter(|s| !s.is_empty()),
        }
    }
}

impl Default for GraphApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[derive(Debug, Deserialize)]
struct Paged<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct IdRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PageWithLink {
    id: String,
    #[serde(default)]
    instagram_business_account: Option<IdRef>,
}

impl From<PageWithLink> for AccountLink {
    fn from(page: PageWithLink) -> Self {
        Self {
            page_id: page.id,
            linked_account_id: page.instagram_business_account.map(|account| account.id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AggregateIdentity {
    #[serde(default)]
    accounts: Option<Paged<PageWithLink>>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    message: Option<String>,
    code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

/// Turn a non-2xx response into a [`ProviderError`].
fn decode_error(status: StatusCode, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<GraphErrorEnvelope>(body).ok();
    let code = parsed.as_ref().and_then(|e| e.error.code);
    let message = parsed
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.chars().take(200).collect());

    let unauthorized = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || code == Some(INVALID_TOKEN_CODE);

    if unauthorized {
        ProviderError::Unauthorized { status: status.as_u16(), message }
    } else {
        ProviderError::Api { status: status.as_u16(), message }
    }
}

/// Graph API content provider.
pub struct GraphApiProvider {
    client: Client,
    config: GraphApiConfig,
}

impl GraphApiProvider {
    /// Create a provider with the given configuration.
    pub fn new(config: GraphApiConfig) -> Result<Self, ProviderError> {
        tracing::info!(
            graph_base_url = %config.graph_base_url,
            instagram_base_url = %config.instagram_base_url,
            connect_timeout_secs = config.connect_timeout_secs,
            request_timeout_secs = config.request_timeout_secs,
            signed = config.app_secret.is_some(),
            "Initializing Graph API client"
        );

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(GraphApiConfig::from_env())
    }

    /// Active configuration.
    pub fn config(&self) -> &GraphApiConfig {
        &self.config
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.config.request_timeout_secs * 1000)
        } else {
            ProviderError::Network(err.without_url().to_string())
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &AccessToken,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<T, ProviderError> {
        if let Some(secret) = &self.config.app_secret {
            query.push(("appsecret_proof", appsecret_proof(secret.as_bytes(), token.expose())));
        }

        let resp = self
            .client
            .get(url)
            .bearer_auth(token.expose())
            .query(&query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.map_err(|e| self.transport_error(e))?;
            let err = decode_error(status, &body);
            tracing::debug!(status = status.as_u16(), error = %err, "Graph API call failed");
            return Err(err);
        }

        let bytes = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ContentProvider for GraphApiProvider {
    async fn fetch_direct_media(&self, ctx: &CredentialContext) -> Result<Vec<Value>, ProviderError> {
        let url = format!("{}/{}/media", self.config.instagram_base_url, ctx.subject_id());
        let page: Paged<Value> = self
            .get_json(
                &url,
                ctx.access_token(),
                vec![("fields", DIRECT_MEDIA_FIELDS.to_string()), ("limit", ctx.limit().to_string())],
            )
            .await?;
        Ok(page.data)
    }

    async fn fetch_account_media(
        &self,
        account_id: &str,
        ctx: &CredentialContext,
    ) -> Result<Vec<Value>, ProviderError> {
        let url = format!("{}/{}/media", self.config.graph_base_url, account_id);
        let page: Paged<Value> = self
            .get_json(
                &url,
                ctx.access_token(),
                vec![("fields", LINKED_MEDIA_FIELDS.to_string()), ("limit", ctx.limit().to_string())],
            )
            .await?;
        Ok(page.data)
    }

    async fn list_pages(&self, ctx: &CredentialContext) -> Result<Vec<PageRef>, ProviderError> {
        let url = format!("{}/{}/accounts", self.config.graph_base_url, ctx.subject_id());
        let page: Paged<PageRef> = self
            .get_json(&url, ctx.access_token(), vec![("fields", "id,name".to_string())])
            .await?;
        Ok(page.data)
    }

    async fn linked_account(
        &self,
        page_id: &str,
        ctx: &CredentialContext,
    ) -> Result<AccountLink, ProviderError> {
        let url = format!("{}/{}", self.config.graph_base_url, page_id);
        let page: PageWithLink = self
            .get_json(
                &url,
                ctx.access_token(),
                vec![("fields", "id,instagram_business_account".to_string())],
            )
            .await?;
        Ok(page.into())
    }

    async fn aggregate_links(&self, ctx: &CredentialContext) -> Result<Vec<AccountLink>, ProviderError> {
        let url = format!("{}/me", self.config.graph_base_url);
        let identity: AggregateIdentity = self
            .get_json(
                &url,
                ctx.access_token(),
                vec![("fields", "id,accounts{id,instagram_business_account}".to_string())],
            )
            .await?;
        Ok(identity
            .accounts
            .map(|accounts| accounts.data.into_iter().map(AccountLink::from).collect())
            .unwrap_or_default())
    }
}
