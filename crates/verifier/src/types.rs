use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Everything needed to ask the verifier for a presentation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub config_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OfferRequest<'a> {
    pub response_type: &'a str,
    #[serde(rename = "requestId")]
    pub request_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OfferResponse {
    pub uri: String,
    pub session: String,
}

/// The wallet-facing request URI and the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationOffer {
    pub uri: String,
    pub session_id: String,
}

impl From<OfferResponse> for PresentationOffer {
    fn from(response: OfferResponse) -> Self {
        Self {
            uri: response.uri,
            session_id: response.session,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Fetched,
    Completed,
    Expired,
    Failed,
    #[serde(other)]
    Unknown,
}

impl SessionStatus {
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            SessionStatus::Active | SessionStatus::Fetched | SessionStatus::Unknown
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Fetched => "fetched",
            SessionStatus::Completed => "completed",
            SessionStatus::Expired => "expired",
            SessionStatus::Failed => "failed",
            SessionStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SessionResponse {
    pub id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub credentials: Option<Vec<serde_json::Value>>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A finished session. Credential records are opaque to this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub session_id: String,
    pub status: SessionStatus,
    pub credentials: Vec<serde_json::Value>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<SessionResponse> for SessionResult {
    fn from(response: SessionResponse) -> Self {
        Self {
            session_id: response.id,
            status: response.status,
            credentials: response.credentials.unwrap_or_default(),
            completed_at: response.updated_at,
        }
    }
}

/// Bounds for [`crate::VerificationClient::wait_for_completion`].
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn describe(&self) -> Option<String> {
        match &self.message {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_completed_session_with_credentials() {
        let body = r#"{
            "id": "s-1",
            "status": "completed",
            "credentials": [{"given_name": "Alex", "age_over_18": true}],
            "updatedAt": "2026-10-17T12:00:00Z"
        }"#;
        let response: SessionResponse = serde_json::from_str(body).expect("parse session");
        let result = SessionResult::from(response);

        assert_eq!(result.status, SessionStatus::Completed);
        assert_eq!(result.credentials.len(), 1);
        assert!(result.completed_at.is_some());
    }

    #[test]
    fn unknown_status_keeps_polling() {
        let response: SessionResponse =
            serde_json::from_str(r#"{"id": "s-2", "status": "processing"}"#).expect("parse");
        assert_eq!(response.status, SessionStatus::Unknown);
        assert!(response.status.is_pending());
        assert!(SessionResult::from(response).credentials.is_empty());
    }

    #[test]
    fn error_body_joins_validation_messages() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message": ["requestId must be a string", "bad"]}"#)
                .expect("parse");
        assert_eq!(
            body.describe().as_deref(),
            Some("requestId must be a string, bad")
        );
    }
}
