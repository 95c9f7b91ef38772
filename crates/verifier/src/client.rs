use crate::auth::{request_token, TokenCache};
use crate::error::{VerifyError, VerifyResult};
use crate::types::{
    ErrorBody, OfferRequest, OfferResponse, PresentationOffer, SessionResponse, SessionResult,
    SessionStatus, VerifyRequest, WaitOptions,
};
use reqwest::{Client, Response, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

const MAX_POLL_FAILURES: u32 = 3;

/// The verifier as seen by the shop: open a presentation request, then wait
/// for the wallet to answer it.
pub trait VerificationClient: Send + Sync {
    fn start(
        &self,
        request: &VerifyRequest,
    ) -> impl Future<Output = VerifyResult<PresentationOffer>> + Send;

    /// Resolves once the session completes, fails, times out, or
    /// `options.cancel` fires (`VerifyError::Cancelled`).
    fn wait_for_completion(
        &self,
        request: &VerifyRequest,
        session_id: &str,
        options: WaitOptions,
    ) -> impl Future<Output = VerifyResult<SessionResult>> + Send;
}

#[derive(Clone)]
pub struct EudiploClient {
    http: Client,
    tokens: Arc<RwLock<TokenCache>>,
}

impl Default for EudiploClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EudiploClient {
    pub fn new() -> Self {
        let http = Client::builder()
            .user_agent("eudiplo-shop/0.2")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self {
            http,
            tokens: Arc::new(RwLock::new(TokenCache::default())),
        }
    }

    async fn bearer(&self, request: &VerifyRequest) -> VerifyResult<String> {
        if let Some(token) = self.tokens.read().await.get(request) {
            return Ok(token);
        }

        let token = request_token(&self.http, request).await?;
        self.tokens.write().await.insert(request, &token);
        Ok(token.access_token)
    }

    async fn authorized(&self, request: &VerifyRequest, response: Response) -> VerifyResult<Response> {
        if response.status() == StatusCode::UNAUTHORIZED {
            self.tokens.write().await.invalidate(request);
        }
        check_status(response).await
    }

    pub async fn session(
        &self,
        request: &VerifyRequest,
        session_id: &str,
    ) -> VerifyResult<SessionResult> {
        let bearer = self.bearer(request).await?;
        let mut url = endpoint(&request.base_url, "session/")?;
        url.path_segments_mut()
            .map_err(|_| VerifyError::InvalidResponse("verifier URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(session_id);

        let response = self.http.get(url).bearer_auth(bearer).send().await?;
        let session: SessionResponse = self.authorized(request, response).await?.json().await?;
        Ok(session.into())
    }

    async fn poll_session(
        &self,
        request: &VerifyRequest,
        session_id: &str,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> VerifyResult<SessionResult> {
        let mut failures = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(VerifyError::Cancelled);
            }

            match self.session(request, session_id).await {
                Ok(session) if session.status == SessionStatus::Completed => {
                    info!("Session {} completed", session_id);
                    return Ok(session);
                }
                Ok(session) if session.status.is_pending() => {
                    failures = 0;
                    debug!("Session {} is {}", session_id, session.status.as_str());
                }
                Ok(session) => {
                    return Err(VerifyError::Session {
                        session_id: session.session_id,
                        status: session.status.as_str().to_string(),
                    });
                }
                Err(e) if e.is_transient() && failures < MAX_POLL_FAILURES => {
                    failures += 1;
                    warn!(
                        "Polling session {} failed ({}/{}): {}",
                        session_id, failures, MAX_POLL_FAILURES, e
                    );
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(interval).await;
        }
    }
}

impl VerificationClient for EudiploClient {
    async fn start(&self, request: &VerifyRequest) -> VerifyResult<PresentationOffer> {
        let bearer = self.bearer(request).await?;
        let url = endpoint(&request.base_url, "verifier/offer")?;

        let response = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .json(&OfferRequest {
                response_type: "uri",
                request_id: &request.config_id,
            })
            .send()
            .await?;

        let offer: OfferResponse = self.authorized(request, response).await?.json().await?;
        if offer.uri.is_empty() {
            return Err(VerifyError::InvalidResponse(
                "offer did not contain a request URI".to_string(),
            ));
        }

        info!("Presentation request created for session {}", offer.session);
        Ok(offer.into())
    }

    async fn wait_for_completion(
        &self,
        request: &VerifyRequest,
        session_id: &str,
        options: WaitOptions,
    ) -> VerifyResult<SessionResult> {
        let cancel = options.cancel.clone();
        let poll = self.poll_session(request, session_id, options.interval, &cancel);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(VerifyError::Cancelled),
            outcome = tokio::time::timeout(options.timeout, poll) => match outcome {
                Ok(result) => result,
                Err(_) => Err(VerifyError::Timeout(format!(
                    "Verification timed out after {} seconds",
                    options.timeout.as_secs()
                ))),
            },
        }
    }
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> VerifyResult<Url> {
    let mut base = Url::parse(base_url.trim())?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path)?)
}

pub(crate) async fn check_status(response: Response) -> VerifyResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.describe())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            }
        });

    Err(VerifyError::Http {
        status: status.as_u16(),
        message,
    })
}
