//! Retrying Spotify Web API client.
//!
//! All outbound calls go through [`ApiClient`], which wraps a pluggable
//! [`Transport`] with the retry/backoff policy the Spotify API expects.
//! Keeping the transport behind a trait (composition instead of subclassing
//! an HTTP client) means the whole policy is exercisable in tests with
//! canned responses and no network.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::time::sleep;

/// Default retry budget: how many times one logical call is attempted.
const MAX_RETRIES: u32 = 4;

/// Default initial backoff delay in seconds; grows by one per retry.
const BACKOFF_START_SECS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One logical outbound call, before authentication is applied.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

/// The transport-level view of a response: status, rate-limit hint and the
/// raw body, decoded later by the client.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub retry_after: Option<u64>,
    pub body: String,
}

/// Transport-level failure, before any HTTP status exists.
#[derive(Debug)]
pub enum TransportError {
    /// The request timed out; retried on the shared budget.
    Timeout,
    /// Connection-level failure (DNS, refused, TLS); not retried.
    Failed(String),
}

/// A way to execute one [`ApiRequest`] and obtain a raw [`ApiResponse`].
///
/// The returned future must be `Send` so units of work built on the client
/// can be spawned by the task runner.
pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        token: &str,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

/// Production transport backed by a shared reqwest client.
///
/// reqwest pools connections per host without an artificial cap, so the pool
/// never undercuts the task runner's concurrency budgets (see
/// [`crate::tasks`]).
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Failed(err.to_string())
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        token: &str,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send {
        let builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };
        let builder = builder.bearer_auth(token);

        async move {
            let response = builder.send().await.map_err(transport_error)?;
            let status = response.status().as_u16();
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.map_err(transport_error)?;
            Ok(ApiResponse {
                status,
                retry_after,
                body,
            })
        }
    }
}

/// Failure of one logical API call, after the retry budget has been applied.
#[derive(Debug)]
pub enum ApiError {
    /// HTTP 401. Never retried here - the caller holds the refresh token
    /// and must re-authenticate and retry the outer operation.
    Unauthorized { url: String },
    /// Terminal HTTP error status, either fatal on sight (4xx) or a
    /// transient status (429/5xx) that exhausted the budget.
    Status {
        status: u16,
        url: String,
        message: String,
    },
    /// Request timed out on every attempt.
    Timeout { url: String },
    /// Connection-level failure; not retried.
    Transport { url: String, message: String },
    /// Response body failed to decode on every attempt.
    Decode { url: String, message: String },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized { url } => write!(f, "unauthorized (401) for {}", url),
            ApiError::Status {
                status,
                url,
                message,
            } => write!(f, "http {} for {}: {}", status, url, message),
            ApiError::Timeout { url } => write!(f, "timed out for {}", url),
            ApiError::Transport { url, message } => {
                write!(f, "transport failure for {}: {}", url, message)
            }
            ApiError::Decode { url, message } => {
                write!(f, "undecodable response for {}: {}", url, message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// True when refreshing credentials and retrying the outer operation
    /// could help.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Spotify Web API client with bounded retries.
///
/// Performs one logical call per [`ApiClient::get`]/[`ApiClient::post`] and
/// returns the decoded result, or fails after exhausting the retry budget.
///
/// # Retry policy
///
/// - 401: immediate [`ApiError::Unauthorized`], zero retries.
/// - 429 and any 5xx: sleep `max(Retry-After, delay) + 1` seconds, bump the
///   delay by one, and retry, up to the budget.
/// - Any other error status: fatal immediately.
/// - Transport timeout or decode failure: retried on the same budget with
///   `delay + 1` sleeps.
///
/// Sleeps suspend only the calling task; sibling units of work in the task
/// runner keep progressing.
pub struct ApiClient<C: Transport> {
    transport: Arc<C>,
    token: String,
    max_retries: u32,
    backoff_start: u64,
}

impl<C: Transport> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            token: self.token.clone(),
            max_retries: self.max_retries,
            backoff_start: self.backoff_start,
        }
    }
}

impl<C: Transport> ApiClient<C> {
    pub fn new(transport: Arc<C>, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
            max_retries: MAX_RETRIES,
            backoff_start: BACKOFF_START_SECS,
        }
    }

    /// Overrides the retry budget and initial delay. A budget below one
    /// attempt makes no sense and is clamped.
    pub fn with_budget(mut self, max_retries: u32, backoff_start: u64) -> Self {
        self.max_retries = max_retries.max(1);
        self.backoff_start = backoff_start;
        self
    }

    /// The bearer token this client authenticates with. Used as the cache
    /// key by [`crate::spotify::auth::ClientCache`].
    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        self.request(Method::Get, url, None).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        self.request(Method::Post, url, Some(body)).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let request = ApiRequest {
            method,
            url: url.to_string(),
            body,
        };
        let mut retries = self.max_retries;
        let mut delay = self.backoff_start;

        loop {
            match self.transport.execute(&self.token, &request).await {
                Err(TransportError::Timeout) => {
                    retries -= 1;
                    if retries == 0 {
                        return Err(ApiError::Timeout {
                            url: request.url.clone(),
                        });
                    }
                    sleep(Duration::from_secs(delay + 1)).await;
                    delay += 1;
                }
                Err(TransportError::Failed(message)) => {
                    return Err(ApiError::Transport {
                        url: request.url.clone(),
                        message,
                    });
                }
                Ok(response) => match response.status {
                    401 => {
                        return Err(ApiError::Unauthorized {
                            url: request.url.clone(),
                        });
                    }
                    status if status == 429 || (500..600).contains(&status) => {
                        retries -= 1;
                        if retries == 0 {
                            return Err(ApiError::Status {
                                status,
                                url: request.url.clone(),
                                message: excerpt(&response.body),
                            });
                        }
                        // Honor the server hint but never sleep less than the
                        // growing local delay.
                        let wait = response.retry_after.unwrap_or(0).max(delay) + 1;
                        sleep(Duration::from_secs(wait)).await;
                        delay += 1;
                    }
                    status if (200..300).contains(&status) => {
                        match serde_json::from_str::<T>(&response.body) {
                            Ok(decoded) => return Ok(decoded),
                            Err(err) => {
                                retries -= 1;
                                if retries == 0 {
                                    return Err(ApiError::Decode {
                                        url: request.url.clone(),
                                        message: err.to_string(),
                                    });
                                }
                                sleep(Duration::from_secs(delay + 1)).await;
                                delay += 1;
                            }
                        }
                    }
                    status => {
                        return Err(ApiError::Status {
                            status,
                            url: request.url.clone(),
                            message: excerpt(&response.body),
                        });
                    }
                },
            }
        }
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > 200 {
        let head: String = trimmed.chars().take(200).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}
