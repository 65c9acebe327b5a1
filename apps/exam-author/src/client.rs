//! # Exam API Client
//!
//! HTTP implementation of the engine's create/update collaborator.
//!
//! ```text
//! ┌─────────────────────┐          HTTP           ┌─────────────────────┐
//! │   exam-author       │ ◄───────────────────►   │   Exam service      │
//! │                     │                         │                     │
//! │  WizardController   │  POST /exams            │                     │
//! │   └─ ExamApiClient  │  PUT  /exams/{examId}   │                     │
//! └─────────────────────┘                         └─────────────────────┘
//! ```
//!
//! Every response carries a `{ statusCode, message }` envelope. A non-2xx
//! HTTP status, or an envelope status other than 200/201, is an error.

use exam_author_core::{ExamId, ExamPayload, ExamSubmitter, OnSaved, SaveRequest};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Header carrying the auth token.
pub const TOKEN_HEADER: &str = "access-token";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors from the exam service client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with an error status.
    #[error("Server error: {0}")]
    Server(String),
}

// =============================================================================
// RESPONSE TYPE
// =============================================================================

/// Envelope returned by every exam endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    #[serde(default)]
    pub message: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.status_code, 200 | 201)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for the exam service.
#[derive(Debug, Clone)]
pub struct ExamApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ExamApiClient {
    /// Client with the default 30-second timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST {base}/exams`
    pub async fn create_exam(
        &self,
        payload: &ExamPayload,
        token: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}/exams", self.base_url);
        self.send(self.client.post(&url).json(payload), token).await
    }

    /// `PUT {base}/exams/{examId}`
    pub async fn update_exam(
        &self,
        exam_id: &ExamId,
        payload: &ExamPayload,
        token: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}/exams/{}", self.base_url, exam_id);
        self.send(self.client.put(&url).json(payload), token).await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let request = match token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        };

        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "exam service replied");

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse>(&body)
                .map(|envelope| envelope.message)
                .ok()
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::Server(message));
        }

        let envelope: ApiResponse = serde_json::from_str(&body)?;
        if !envelope.is_success() {
            return Err(ApiError::Server(envelope.message));
        }
        Ok(envelope)
    }
}

impl ExamSubmitter for ExamApiClient {
    type Error = ApiError;

    async fn save_exam(&self, request: SaveRequest<'_>, on_saved: OnSaved) -> Result<(), ApiError> {
        let result = match request.exam_id {
            Some(id) => self.update_exam(id, request.payload, request.token).await,
            None => self.create_exam(request.payload, request.token).await,
        };

        match result {
            Ok(envelope) => {
                info!(update = request.is_update(), message = %envelope.message, "exam saved");
                on_saved();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "exam service rejected the exam");
                Err(err)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_codes() {
        let ok: Result<ApiResponse, _> =
            serde_json::from_str(r#"{"statusCode":201,"message":"Exam created"}"#);
        assert!(ok.map(|r| r.is_success()).unwrap_or(false));

        let denied = ApiResponse {
            status_code: 401,
            message: "Unauthorized".to_string(),
        };
        assert!(!denied.is_success());
    }

    #[test]
    fn missing_message_defaults_to_empty() {
        let resp: Result<ApiResponse, _> = serde_json::from_str(r#"{"statusCode":200}"#);
        assert_eq!(resp.map(|r| r.message).unwrap_or_default(), "");
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = ExamApiClient::new("http://localhost:8080/api/");
        assert_eq!(
            client.map(|c| c.base_url().to_string()).unwrap_or_default(),
            "http://localhost:8080/api"
        );
    }
}
