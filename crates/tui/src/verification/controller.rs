use super::classify::{classify, FailureKind};
use crate::config::{Config, ConfigReport};
use crate::qr::QrArt;
use chrono::{DateTime, Utc};
use eudiplo_shop_verifier::{PresentationOffer, SessionResult, VerifyError, VerifyResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const STATUS_REQUESTING: &str = "Creating verification request...";
pub const STATUS_WAITING: &str = "Waiting for verification...";

/// Credential field shown in the welcome message.
const DISPLAY_NAME_FIELD: &str = "given_name";

pub type FlowId = u64;

/// Handle for the one verification flow allowed to change the UI.
#[derive(Debug, Clone)]
pub struct FlowTicket {
    pub id: FlowId,
    pub cancel: CancellationToken,
}

/// How an awaited completion ended.
#[derive(Debug)]
pub enum Settled {
    Success(SessionResult),
    Error(VerifyError),
    Cancelled,
}

impl Settled {
    pub fn from_error(error: VerifyError) -> Self {
        if error.is_cancelled() {
            Settled::Cancelled
        } else {
            Settled::Error(error)
        }
    }

    pub fn from_result(result: VerifyResult<SessionResult>) -> Self {
        match result {
            Ok(session) => Settled::Success(session),
            Err(e) => Self::from_error(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanPhase {
    Requesting,
    Scanning {
        uri: String,
        session_id: String,
        qr: QrArt,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AwaitingScan {
    pub phase: ScanPhase,
    pub status_text: &'static str,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiState {
    Idle,
    AwaitingScan(AwaitingScan),
    Succeeded {
        name: Option<String>,
        verified_at: DateTime<Utc>,
    },
    Failed { kind: FailureKind },
    Cancelled,
}

impl UiState {
    pub fn modal_visible(&self) -> bool {
        matches!(
            self,
            UiState::AwaitingScan(_) | UiState::Succeeded { .. } | UiState::Failed { .. }
        )
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, UiState::AwaitingScan(_))
    }
}

pub fn success_message(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Welcome, {name}! You can now purchase alcohol."),
        None => "Age verified. You can now purchase alcohol.".to_string(),
    }
}

/// First credential record only; anything but a non-empty string is anonymous.
pub fn display_name(session: &SessionResult) -> Option<String> {
    session
        .credentials
        .first()?
        .get(DISPLAY_NAME_FIELD)?
        .as_str()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

pub struct VerificationController {
    state: UiState,
    active: Option<FlowTicket>,
    next_id: FlowId,
}

impl Default for VerificationController {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationController {
    pub fn new() -> Self {
        Self {
            state: UiState::Idle,
            active: None,
            next_id: 1,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn active_flow(&self) -> Option<FlowId> {
        self.active.as_ref().map(|t| t.id)
    }

    /// Opens a new flow. Any previous flow is cancelled before the new ticket
    /// exists; an incomplete config leaves the state untouched.
    pub fn begin(&mut self, config: &Config) -> Result<FlowTicket, ConfigReport> {
        let report = config.validate();
        if !report.is_ready() {
            warn!("Verification not started, missing {:?}", report.missing);
            return Err(report);
        }

        self.invalidate();

        let ticket = FlowTicket {
            id: self.next_id,
            cancel: CancellationToken::new(),
        };
        self.next_id += 1;
        self.active = Some(ticket.clone());
        self.state = UiState::AwaitingScan(AwaitingScan {
            phase: ScanPhase::Requesting,
            status_text: STATUS_REQUESTING,
            started_at: Utc::now(),
        });

        info!("Verification flow {} started", ticket.id);
        Ok(ticket)
    }

    pub fn on_offer(&mut self, flow: FlowId, offer: PresentationOffer, qr: QrArt) -> bool {
        if !self.is_current(flow) {
            debug!("Dropping offer for stale flow {}", flow);
            return false;
        }

        if let UiState::AwaitingScan(ref mut awaiting) = self.state {
            awaiting.phase = ScanPhase::Scanning {
                uri: offer.uri,
                session_id: offer.session_id,
                qr,
            };
            awaiting.status_text = STATUS_WAITING;
            true
        } else {
            false
        }
    }

    /// Applies the outcome of a flow. Returns whether the UI changed.
    pub fn on_settled(&mut self, flow: FlowId, settled: Settled) -> bool {
        if !self.is_current(flow) {
            debug!("Dropping settlement for stale or cancelled flow {}", flow);
            return false;
        }

        match settled {
            Settled::Cancelled => false,
            Settled::Success(session) => {
                let name = display_name(&session);
                let verified_at = session.completed_at.unwrap_or_else(Utc::now);
                info!(
                    "Verification flow {} succeeded (session {})",
                    flow, session.session_id
                );
                self.active = None;
                self.state = UiState::Succeeded { name, verified_at };
                true
            }
            Settled::Error(e) => {
                let kind = classify(&e);
                if kind == FailureKind::Unclassified {
                    error!("Verification error: {}", e);
                } else {
                    warn!("Verification flow {} failed: {:?}", flow, kind);
                }
                self.active = None;
                self.state = UiState::Failed { kind };
                true
            }
        }
    }

    /// Modal closed by the user.
    pub fn close(&mut self) {
        let was_awaiting = self.state.is_awaiting();
        self.invalidate();
        self.state = if was_awaiting {
            UiState::Cancelled
        } else {
            UiState::Idle
        };
    }

    pub fn retry(&mut self, config: &Config) -> Result<FlowTicket, ConfigReport> {
        self.close();
        self.begin(config)
    }

    /// Leaves a finished flow without restarting it.
    pub fn dismiss(&mut self) {
        if !self.state.is_awaiting() {
            self.state = UiState::Idle;
        }
    }

    fn invalidate(&mut self) {
        if let Some(ticket) = self.active.take() {
            ticket.cancel.cancel();
            debug!("Verification flow {} cancelled", ticket.id);
        }
    }

    fn is_current(&self, flow: FlowId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|t| t.id == flow && !t.cancel.is_cancelled())
    }
}

impl Drop for VerificationController {
    fn drop(&mut self) {
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::{self, QrOptions};
    use eudiplo_shop_verifier::SessionStatus;
    use serde_json::json;

    fn completed(credentials: Vec<serde_json::Value>) -> SessionResult {
        SessionResult {
            session_id: "s-1".to_string(),
            status: SessionStatus::Completed,
            credentials,
            completed_at: None,
        }
    }

    fn offer() -> (PresentationOffer, QrArt) {
        let offer = PresentationOffer {
            uri: "openid4vp://?request_uri=https%3A%2F%2Fdemo.eudiplo.dev%2Fs-1".to_string(),
            session_id: "s-1".to_string(),
        };
        let qr = qr::render(&offer.uri, &QrOptions::default()).expect("encode offer");
        (offer, qr)
    }

    fn http(status: u16) -> VerifyError {
        VerifyError::Http {
            status,
            message: "rejected".to_string(),
        }
    }

    #[test]
    fn incomplete_config_never_opens_a_flow() {
        let mut controller = VerificationController::new();
        let mut config = Config::demo();
        config.verifier.client_secret.clear();

        let report = controller.begin(&config).expect_err("missing secret");

        assert!(!report.is_ready());
        assert_eq!(controller.state(), &UiState::Idle);
        assert_eq!(controller.active_flow(), None);
    }

    #[test]
    fn starting_again_cancels_the_previous_token() {
        let mut controller = VerificationController::new();
        let first = controller.begin(&Config::demo()).expect("first flow");
        let second = controller.begin(&Config::demo()).expect("second flow");

        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());
        assert_eq!(controller.active_flow(), Some(second.id));
        assert!(!controller.on_settled(first.id, Settled::Error(http(500))));
        assert!(controller.state().is_awaiting());
    }

    #[test]
    fn welcomes_the_presented_name() {
        let mut controller = VerificationController::new();
        let ticket = controller.begin(&Config::demo()).expect("flow");
        let (offer, qr) = offer();

        assert!(controller.on_offer(ticket.id, offer.clone(), qr.clone()));
        match controller.state() {
            UiState::AwaitingScan(awaiting) => {
                assert_eq!(awaiting.status_text, STATUS_WAITING);
                assert_eq!(
                    awaiting.phase,
                    ScanPhase::Scanning {
                        uri: offer.uri,
                        session_id: offer.session_id,
                        qr,
                    }
                );
            }
            other => panic!("unexpected state {other:?}"),
        }

        let session = completed(vec![json!({"given_name": "Alex"})]);
        assert!(controller.on_settled(ticket.id, Settled::Success(session)));
        let UiState::Succeeded { name, .. } = controller.state() else {
            panic!("expected success");
        };
        assert_eq!(
            success_message(name.as_deref()),
            "Welcome, Alex! You can now purchase alcohol."
        );
    }

    #[test]
    fn anonymous_success_without_name_field() {
        assert_eq!(display_name(&completed(Vec::new())), None);
        assert_eq!(
            display_name(&completed(vec![json!({"age_over_18": true})])),
            None
        );
        assert_eq!(display_name(&completed(vec![json!({"given_name": 42})])), None);
        assert_eq!(display_name(&completed(vec![json!({"given_name": "  "})])), None);
        assert_eq!(
            display_name(&completed(vec![
                json!({"age_over_18": true}),
                json!({"given_name": "Sam"})
            ])),
            None
        );
        assert_eq!(
            success_message(None),
            "Age verified. You can now purchase alcohol."
        );
    }

    #[test]
    fn success_keeps_verifier_completion_time() {
        let mut controller = VerificationController::new();
        let ticket = controller.begin(&Config::demo()).expect("flow");
        let completed_at = DateTime::parse_from_rfc3339("2024-05-01T18:30:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let session = SessionResult {
            completed_at: Some(completed_at),
            ..completed(Vec::new())
        };

        assert!(controller.on_settled(ticket.id, Settled::Success(session)));
        assert_eq!(
            controller.state(),
            &UiState::Succeeded {
                name: None,
                verified_at: completed_at,
            }
        );
    }

    #[test]
    fn closing_makes_late_rejection_a_no_op() {
        let mut controller = VerificationController::new();
        let ticket = controller.begin(&Config::demo()).expect("flow");

        controller.close();

        assert!(ticket.cancel.is_cancelled());
        assert_eq!(controller.state(), &UiState::Cancelled);
        assert!(!controller.on_settled(ticket.id, Settled::Error(http(500))));
        assert!(!controller.on_settled(
            ticket.id,
            Settled::Success(completed(Vec::new()))
        ));
        assert!(!controller.state().modal_visible());
    }

    #[test]
    fn cancelled_settlement_changes_nothing() {
        let mut controller = VerificationController::new();
        let ticket = controller.begin(&Config::demo()).expect("flow");
        let before = controller.state().clone();

        assert!(!controller.on_settled(
            ticket.id,
            Settled::from_error(VerifyError::Cancelled)
        ));
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn not_found_shows_config_message() {
        let mut controller = VerificationController::new();
        let ticket = controller.begin(&Config::demo()).expect("flow");

        assert!(controller.on_settled(ticket.id, Settled::Error(http(404))));
        let UiState::Failed { kind } = controller.state() else {
            panic!("expected failure");
        };
        assert_eq!(kind.message(), "Presentation config not found.");
        assert_eq!(controller.active_flow(), None);
    }

    #[test]
    fn retry_restarts_and_dismiss_returns_to_idle() {
        let mut controller = VerificationController::new();
        let ticket = controller.begin(&Config::demo()).expect("flow");
        controller.on_settled(ticket.id, Settled::Error(http(401)));

        let retried = controller.retry(&Config::demo()).expect("retry");
        assert!(retried.id > ticket.id);
        assert!(controller.state().is_awaiting());

        controller.dismiss();
        assert!(controller.state().is_awaiting());

        controller.on_settled(retried.id, Settled::Success(completed(Vec::new())));
        controller.dismiss();
        assert_eq!(controller.state(), &UiState::Idle);
    }

    #[test]
    fn dropping_the_controller_cancels_the_flow() {
        let mut controller = VerificationController::new();
        let ticket = controller.begin(&Config::demo()).expect("flow");
        drop(controller);
        assert!(ticket.cancel.is_cancelled());
    }
}
