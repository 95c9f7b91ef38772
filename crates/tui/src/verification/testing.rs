use eudiplo_shop_verifier::{
    PresentationOffer, SessionResult, VerificationClient, VerifyError, VerifyRequest,
    VerifyResult, WaitOptions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type Completion = oneshot::Receiver<VerifyResult<SessionResult>>;

/// In-memory verifier. Completion is delivered by the test through
/// [`FakeClient::completion`]; cancellation tokens are ignored on purpose so
/// callers have to enforce them.
#[derive(Clone)]
pub(crate) struct FakeClient {
    uri: String,
    start_status: Option<u16>,
    starts: Arc<AtomicUsize>,
    completion: Arc<Mutex<Option<Completion>>>,
}

impl FakeClient {
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            start_status: None,
            starts: Arc::new(AtomicUsize::new(0)),
            completion: Arc::new(Mutex::new(None)),
        }
    }

    pub fn failing_start(status: u16) -> Self {
        Self {
            start_status: Some(status),
            ..Self::new("")
        }
    }

    pub fn completion(&self) -> oneshot::Sender<VerifyResult<SessionResult>> {
        let (tx, rx) = oneshot::channel();
        *self.completion.lock().expect("completion lock") = Some(rx);
        tx
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl VerificationClient for FakeClient {
    async fn start(&self, _request: &VerifyRequest) -> VerifyResult<PresentationOffer> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.start_status {
            return Err(VerifyError::Http {
                status,
                message: "rejected by fake verifier".to_string(),
            });
        }
        Ok(PresentationOffer {
            uri: self.uri.clone(),
            session_id: "s-1".to_string(),
        })
    }

    async fn wait_for_completion(
        &self,
        _request: &VerifyRequest,
        _session_id: &str,
        _options: WaitOptions,
    ) -> VerifyResult<SessionResult> {
        let completion = self.completion.lock().expect("completion lock").take();
        match completion {
            Some(rx) => match rx.await {
                Ok(result) => result,
                Err(_) => std::future::pending().await,
            },
            None => std::future::pending().await,
        }
    }
}
