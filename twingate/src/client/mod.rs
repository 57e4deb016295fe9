//! GraphQL client for the admin API
//!
//! One request at a time per call; retries with exponential backoff on
//! transient failures. Per-entity operations live in the submodules.

pub mod connectors;
pub mod groups;
pub mod remote_networks;
pub mod resources;
pub mod security_policies;
pub mod service_accounts;
pub mod users;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PAGE_LIMIT: usize = 50;

const PAGE_LIMIT_ENV: &str = "TWINGATE_PAGE_LIMIT";
const INITIAL_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid provider configuration: {0}")]
    InvalidConfiguration(String),

    #[error("authentication failed, check the api_token")]
    Authentication,

    #[error("too many requests, rate limited by the API")]
    RateLimited,

    #[error("API unavailable (HTTP {0}), retries exhausted")]
    Unavailable(u16),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("API returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("{operation} failed: {message}")]
    Graphql { operation: String, message: String },

    #[error("failed to parse {operation} response: {message}")]
    Parse {
        operation: String,
        message: String,
    },
}

/// Admin API client. Cheap to clone, shares one HTTP pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    endpoint: url::Url,
    api_token: String,
    timeout_secs: u64,
    max_retry: u32,
    page_limit: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
    operation_name: &'a str,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

impl Client {
    /// Build a client for a tenant: `https://{network}.{url}/api/graphql/`
    pub fn new(
        network: &str,
        url: &str,
        api_token: &str,
        timeout_secs: u64,
        max_retry: u32,
    ) -> Result<Self, ApiError> {
        if network.trim().is_empty() {
            return Err(ApiError::InvalidConfiguration(
                "network must not be empty".to_string(),
            ));
        }

        let endpoint = format!("https://{}.{}/api/graphql/", network.trim(), url.trim());
        Self::from_endpoint(&endpoint, api_token, timeout_secs, max_retry)
    }

    /// Build a client against an explicit endpoint URL
    pub fn from_endpoint(
        endpoint: &str,
        api_token: &str,
        timeout_secs: u64,
        max_retry: u32,
    ) -> Result<Self, ApiError> {
        let endpoint = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidConfiguration(format!("invalid endpoint: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let page_limit = std::env::var(PAGE_LIMIT_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoint,
                api_token: api_token.to_string(),
                timeout_secs,
                max_retry,
                page_limit,
            }),
        })
    }

    /// Page size used when draining cursor-paginated connections
    pub fn page_limit(&self) -> usize {
        self.inner.page_limit
    }

    /// Execute one GraphQL operation, retrying transient failures
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.max_retry {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    INITIAL_BACKOFF_MS * 2_u64.pow(attempt - 1),
                    MAX_BACKOFF_MS,
                );
                tracing::debug!(%operation, attempt, backoff_ms = backoff, "retrying request");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let request = GraphqlRequest {
                query,
                variables: variables.clone(),
                operation_name: operation,
            };

            let result = self
                .inner
                .http
                .post(self.inner.endpoint.clone())
                .header("X-API-KEY", &self.inner.api_token)
                .json(&request)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return self.parse_response(operation, response).await;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::Authentication);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::Unavailable(status.as_u16()));
                    } else {
                        let message = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "unknown error".to_string());
                        return Err(ApiError::Http {
                            status: status.as_u16(),
                            message,
                        });
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(ApiError::Timeout(self.inner.timeout_secs));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(ApiError::Unavailable(0));
                    } else {
                        return Err(ApiError::Request(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::Unavailable(0)))
    }

    async fn parse_response<T: DeserializeOwned>(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!(%operation, body = %text, "API response");

        let parsed: GraphqlResponse<T> =
            serde_json::from_str(&text).map_err(|e| ApiError::Parse {
                operation: operation.to_string(),
                message: e.to_string(),
            })?;

        if let Some(errors) = parsed.errors {
            if !errors.is_empty() {
                return Err(ApiError::Graphql {
                    operation: operation.to_string(),
                    message: errors
                        .into_iter()
                        .map(|e| e.message)
                        .collect::<Vec<_>>()
                        .join("; "),
                });
            }
        }

        parsed.data.ok_or_else(|| ApiError::Parse {
            operation: operation.to_string(),
            message: "response has no data".to_string(),
        })
    }
}

// Shared response building blocks

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    pub fn nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|edge| edge.node).collect()
    }
}

/// Mutation payload: `ok`/`error` plus the affected entity
#[derive(Debug, Deserialize)]
pub(crate) struct Payload<T> {
    pub ok: bool,
    pub error: Option<String>,
    pub entity: Option<T>,
}

impl<T> Payload<T> {
    pub fn check(self, operation: &str) -> Result<Option<T>, ApiError> {
        if !self.ok {
            return Err(ApiError::Graphql {
                operation: operation.to_string(),
                message: self.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(self.entity)
    }

    pub fn into_entity(self, operation: &str) -> Result<T, ApiError> {
        self.check(operation)?.ok_or_else(|| ApiError::Parse {
            operation: operation.to_string(),
            message: "mutation returned no entity".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdName {
    pub id: String,
    pub name: String,
}
