use crate::client::{check_status, endpoint};
use crate::error::VerifyResult;
use crate::types::{TokenResponse, VerifyRequest};
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(300);
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Client-credentials tokens keyed by verifier and client id.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    entries: HashMap<(String, String), CachedToken>,
}

impl TokenCache {
    pub fn get(&self, request: &VerifyRequest) -> Option<String> {
        self.entries
            .get(&Self::key(request))
            .filter(|t| t.expires_at > Instant::now())
            .map(|t| t.access_token.clone())
    }

    pub fn insert(&mut self, request: &VerifyRequest, token: &TokenResponse) {
        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL)
            .saturating_sub(EXPIRY_MARGIN);
        self.entries.insert(
            Self::key(request),
            CachedToken {
                access_token: token.access_token.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn invalidate(&mut self, request: &VerifyRequest) {
        self.entries.remove(&Self::key(request));
    }

    fn key(request: &VerifyRequest) -> (String, String) {
        (
            request.base_url.trim_end_matches('/').to_string(),
            request.client_id.clone(),
        )
    }
}

pub(crate) async fn request_token(http: &Client, request: &VerifyRequest) -> VerifyResult<TokenResponse> {
    let url = endpoint(&request.base_url, "oauth2/token")?;
    debug!("Requesting access token for client {}", request.client_id);

    let response = http
        .post(url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", request.client_id.as_str()),
            ("client_secret", request.client_secret.as_str()),
        ])
        .send()
        .await?;

    let token: TokenResponse = check_status(response).await?.json().await?;
    Ok(token)
}
