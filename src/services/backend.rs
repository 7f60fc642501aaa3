use crate::models::{ContactResponse, MatchResultResponse, ProfileStatusResponse, StatusResponse};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the matching API
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: session missing or expired")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// True for transport-level failures (offline, timeout, DNS).
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::RequestError(_))
    }

    /// Text shown to the user in a transient notification.
    ///
    /// Transport failures get a generic "cannot reach server" line; for
    /// application-level failures the server-provided message is used.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::RequestError(_) => {
                "Cannot reach the server. Please try again shortly.".to_string()
            }
            BackendError::ApiError(message) => message.clone(),
            BackendError::Unauthorized => {
                "Your session has expired. Please sign in again.".to_string()
            }
            BackendError::InvalidResponse(_) => {
                "An unexpected error occurred. Please try again shortly.".to_string()
            }
        }
    }
}

/// Success-flag envelope shared by all matching API responses.
pub trait ApiEnvelope {
    fn success(&self) -> bool;
    fn server_message(&self) -> Option<&str>;
}

impl ApiEnvelope for StatusResponse {
    fn success(&self) -> bool {
        self.success
    }
    fn server_message(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}

impl ApiEnvelope for MatchResultResponse {
    fn success(&self) -> bool {
        self.success
    }
    fn server_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl ApiEnvelope for ContactResponse {
    fn success(&self) -> bool {
        self.success
    }
    fn server_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl ApiEnvelope for ProfileStatusResponse {
    fn success(&self) -> bool {
        self.success
    }
    fn server_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Matching API client
///
/// Wraps the handful of endpoints the match flow consumes:
/// - status fetch (mount, poll ticks, refresh)
/// - queue entry/exit and approval actions
/// - match result and contact payloads
///
/// Responses with `success: false` surface as `BackendError::ApiError`
/// carrying the server's message, so callers handle one error path for
/// both transport and application failures.
pub struct BackendClient {
    base_url: String,
    session_token: Option<String>,
    client: Client,
}

impl BackendClient {
    /// Create a new client for the given API base URL.
    pub fn new(base_url: String, session_token: Option<String>) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, session_token, Duration::from_secs(30))
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: String,
        session_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            session_token,
            client,
        })
    }

    /// Fetch the current match status.
    pub async fn get_status(&self) -> Result<StatusResponse, BackendError> {
        self.send(Method::GET, "/match/matching/").await
    }

    /// Enter the matching queue.
    pub async fn start_matching(&self) -> Result<StatusResponse, BackendError> {
        self.send(Method::POST, "/match/matching/start/").await
    }

    /// Leave the queue, or withdraw an approval while waiting on the
    /// counterparty.
    pub async fn cancel_matching(&self) -> Result<StatusResponse, BackendError> {
        self.send(Method::POST, "/match/matching/cancel/").await
    }

    /// Fetch the current match result (candidate profile + score).
    pub async fn get_match_result(&self) -> Result<MatchResultResponse, BackendError> {
        self.send(Method::GET, "/match/matching/result/").await
    }

    /// Approve the current match candidate.
    pub async fn approve_match(&self) -> Result<StatusResponse, BackendError> {
        self.send(Method::POST, "/match/matching/agree/").await
    }

    /// Reject the current match candidate.
    pub async fn reject_match(&self) -> Result<StatusResponse, BackendError> {
        self.send(Method::POST, "/match/matching/reject/").await
    }

    /// Fetch the counterparty's contact. The server only grants this once
    /// both sides have approved.
    pub async fn get_contact(&self) -> Result<ContactResponse, BackendError> {
        self.send(Method::GET, "/match/matching/contact/").await
    }

    /// Request a rematch after a concluded or failed match.
    pub async fn request_rematch(&self) -> Result<StatusResponse, BackendError> {
        self.send(Method::POST, "/match/matching/rematch/").await
    }

    /// Fetch profile completeness (property/survey written or not).
    pub async fn get_profile_status(&self) -> Result<ProfileStatusResponse, BackendError> {
        self.send(Method::GET, "/match/profile/").await
    }

    async fn send<T>(&self, method: Method, path: &str) -> Result<T, BackendError>
    where
        T: DeserializeOwned + ApiEnvelope,
    {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let request_id = uuid::Uuid::new_v4();

        tracing::debug!("{} {} (request {})", method, url, request_id);

        let mut request = self
            .client
            .request(method, &url)
            .header("X-Request-Id", request_id.to_string());

        if let Some(token) = &self.session_token {
            request = request.header(reqwest::header::COOKIE, format!("sessionid={}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::ApiError(extract_error_message(&body, status)));
        }

        let parsed: T = serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if !parsed.success() {
            let message = parsed
                .server_message()
                .unwrap_or("The request was rejected. Please try again shortly.")
                .to_string();
            return Err(BackendError::ApiError(message));
        }

        Ok(parsed)
    }
}

/// Pull a human-readable message out of an error body, falling back to the
/// HTTP status line when the body is not the expected JSON shape.
fn extract_error_message(body: &str, status: StatusCode) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(text) = json.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    format!("Request failed: {}", status)
}
