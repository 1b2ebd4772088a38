//! Provider API client
//!
//! A typed HTTP client shared by every provider adapter: authentication,
//! bounded retries, status-to-error mapping and `Link`-header pagination.

use crate::auth::BoxedAuthProvider;
use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Upper bound on pages followed for one listing
pub(crate) const MAX_PAGES: usize = 50;

/// Longest wait between two attempts
const MAX_BACKOFF_MILLIS: u64 = 30_000;

/// Provider API client
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth: BoxedAuthProvider,
    max_retries: u32,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a new API client from configuration
    pub fn new(config: &ProviderConfig, auth: BoxedAuthProvider) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(format!("trigger-gate/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProviderError::Request)?;

        debug!(
            base_url = %config.api_url(),
            auth = auth.auth_type(),
            "Created provider API client"
        );

        Ok(Self {
            http,
            base_url: config.api_url(),
            auth,
            max_retries: config.max_retries,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL for an API endpoint; absolute URLs (pagination links) pass through
    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }

    /// Add authentication to a request
    async fn authenticate(&self, request: RequestBuilder) -> ProviderResult<RequestBuilder> {
        let header = self
            .auth
            .get_auth_header()
            .await
            .map_err(|e| ProviderError::Api {
                status: 401,
                message: e.to_string(),
            })?;

        Ok(request.header(header.header_name(), header.header_value()))
    }

    /// Send a request with retries, returning the response whatever its status
    async fn send(&self, request: RequestBuilder) -> ProviderResult<Response> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff
                let delay = Duration::from_millis(backoff_millis(attempt));
                tokio::time::sleep(delay).await;
                debug!("Retrying request (attempt {})", attempt + 1);
            }

            let req = request
                .try_clone()
                .ok_or_else(|| ProviderError::InvalidResponse("Cannot clone request".to_string()))?;

            match req.send().await {
                Ok(response) if is_retryable_status(response.status()) && attempt < self.max_retries => {
                    warn!(status = %response.status(), "Provider returned a retryable status");
                    last_error = Some(ProviderError::from_response(
                        response.status().as_u16(),
                        "",
                    ));
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!("Request failed: {}", e);
                    let retryable = e.is_timeout() || e.is_connect();
                    last_error = Some(if e.is_timeout() {
                        ProviderError::Timeout {
                            timeout_secs: self.timeout_secs,
                        }
                    } else {
                        ProviderError::Request(e)
                    });

                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::InvalidResponse("Unknown error".to_string())))
    }

    /// Send a request and turn non-success statuses into errors
    async fn execute(&self, request: RequestBuilder) -> ProviderResult<Response> {
        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let retry_after = retry_after_secs(&response);
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after: retry_after.unwrap_or(60),
            });
        }

        Err(ProviderError::from_response(status.as_u16(), &body))
    }

    /// Make a GET request and decode the JSON response
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ProviderResult<T> {
        let request = self.authenticate(self.http.get(self.url(endpoint))).await?;
        let response = self.execute(request).await?;

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Make a GET request returning the raw body
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get_bytes(&self, endpoint: &str) -> ProviderResult<Vec<u8>> {
        let request = self.authenticate(self.http.get(self.url(endpoint))).await?;
        let response = self.execute(request).await?;

        let bytes = response.bytes().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to read response body: {}", e))
        })?;
        Ok(bytes.to_vec())
    }

    /// Make a GET request and report the status code without interpreting it
    ///
    /// Used by membership probes where the status itself is the answer.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get_status(&self, endpoint: &str) -> ProviderResult<StatusCode> {
        let request = self.authenticate(self.http.get(self.url(endpoint))).await?;
        let response = self.send(request).await?;
        Ok(response.status())
    }

    /// GET a JSON array, following `Link: <...>; rel="next"` headers
    ///
    /// Items are returned in server order across pages.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get_paged<T: DeserializeOwned>(&self, endpoint: &str) -> ProviderResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(self.url(endpoint));

        for page in 1..=MAX_PAGES {
            let Some(url) = next.take() else {
                return Ok(items);
            };

            let request = self.authenticate(self.http.get(&url)).await?;
            let response = self.execute(request).await?;
            next = response
                .headers()
                .get(header::LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_link);

            let batch: Vec<T> = response.json().await.map_err(|e| {
                ProviderError::InvalidResponse(format!("Failed to parse page {}: {}", page, e))
            })?;
            items.extend(batch);
        }

        match next {
            Some(_) => Err(ProviderError::InvalidResponse(format!(
                "More than {} pages at {}",
                MAX_PAGES, endpoint
            ))),
            None => Ok(items),
        }
    }
}

/// Delay before retry `attempt` (1-based): 100ms doubling, capped
fn backoff_millis(attempt: u32) -> u64 {
    2u64.saturating_pow(attempt.saturating_sub(1))
        .saturating_mul(100)
        .min(MAX_BACKOFF_MILLIS)
}

/// Statuses worth another attempt before giving up
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header
pub(crate) fn next_link(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == r#"rel="next""# || p == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
