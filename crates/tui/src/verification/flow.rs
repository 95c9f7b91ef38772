use super::controller::{FlowId, FlowTicket, Settled};
use crate::qr::{self, QrArt, QrOptions};
use eudiplo_shop_verifier::{
    PresentationOffer, VerificationClient, VerifyError, VerifyRequest, WaitOptions,
};
use std::time::Duration;
use tracing::debug;

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum FlowEvent {
    Offered {
        flow: FlowId,
        offer: PresentationOffer,
        qr: QrArt,
    },
    Settled {
        flow: FlowId,
        settled: Settled,
    },
}

/// Drives one flow: request a session, encode its URI, then wait for the
/// wallet. Always ends with exactly one `FlowEvent::Settled`.
pub async fn run_flow<C, F>(
    client: C,
    request: VerifyRequest,
    ticket: FlowTicket,
    qr_options: QrOptions,
    emit: F,
) where
    C: VerificationClient + 'static,
    F: Fn(FlowEvent) + Send + Sync + 'static,
{
    let flow = ticket.id;
    let cancel = ticket.cancel;
    let settle = |settled: Settled| emit(FlowEvent::Settled { flow, settled });

    let offer = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            settle(Settled::Cancelled);
            return;
        }
        result = client.start(&request) => match result {
            Ok(offer) => offer,
            Err(e) => {
                settle(Settled::from_error(e));
                return;
            }
        },
    };

    let qr = match qr::render(&offer.uri, &qr_options) {
        Ok(qr) => qr,
        Err(e) => {
            settle(Settled::Error(VerifyError::InvalidResponse(e.to_string())));
            return;
        }
    };

    let session_id = offer.session_id.clone();
    debug!("Flow {} waiting on session {}", flow, session_id);
    emit(FlowEvent::Offered { flow, offer, qr });

    let options = WaitOptions {
        timeout: WAIT_TIMEOUT,
        interval: POLL_INTERVAL,
        cancel: cancel.clone(),
    };

    let settled = tokio::select! {
        biased;
        _ = cancel.cancelled() => Settled::Cancelled,
        result = client.wait_for_completion(&request, &session_id, options) => Settled::from_result(result),
    };
    settle(settled);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::verification::controller::{success_message, UiState, VerificationController};
    use crate::verification::testing::FakeClient;
    use crate::verification::FailureKind;
    use eudiplo_shop_verifier::{SessionResult, SessionStatus};
    use serde_json::json;
    use tokio::sync::mpsc;

    fn spawn_flow(
        client: &FakeClient,
        controller: &mut VerificationController,
    ) -> (FlowTicket, mpsc::UnboundedReceiver<FlowEvent>) {
        let config = Config::demo();
        let ticket = controller.begin(&config).expect("config is ready");
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_flow(
            client.clone(),
            config.verify_request(),
            ticket.clone(),
            QrOptions::default(),
            move |event| {
                let _ = tx.send(event);
            },
        ));
        (ticket, rx)
    }

    fn apply(controller: &mut VerificationController, event: FlowEvent) -> bool {
        match event {
            FlowEvent::Offered { flow, offer, qr } => controller.on_offer(flow, offer, qr),
            FlowEvent::Settled { flow, settled } => controller.on_settled(flow, settled),
        }
    }

    #[tokio::test]
    async fn scanned_wallet_yields_personal_welcome() {
        let client = FakeClient::new("openid4vp://?request_uri=abc");
        let completion = client.completion();
        let mut controller = VerificationController::new();
        let (ticket, mut rx) = spawn_flow(&client, &mut controller);

        let offered = rx.recv().await.expect("offer event");
        let FlowEvent::Offered {
            ref offer,
            qr: ref art,
            ..
        } = offered
        else {
            panic!("expected offer first");
        };
        assert_eq!(offer.uri, "openid4vp://?request_uri=abc");
        assert_eq!(
            art,
            &qr::render("openid4vp://?request_uri=abc", &QrOptions::default()).expect("qr")
        );
        assert!(apply(&mut controller, offered));

        completion
            .send(Ok(SessionResult {
                session_id: "s-1".to_string(),
                status: SessionStatus::Completed,
                credentials: vec![json!({"given_name": "Alex"})],
                completed_at: None,
            }))
            .expect("deliver completion");

        let settled = rx.recv().await.expect("settled event");
        assert!(apply(&mut controller, settled));
        assert_eq!(client.starts(), 1);
        assert_eq!(controller.active_flow(), None);
        let UiState::Succeeded { name, .. } = controller.state() else {
            panic!("expected success for flow {}", ticket.id);
        };
        assert_eq!(
            success_message(name.as_deref()),
            "Welcome, Alex! You can now purchase alcohol."
        );
    }

    #[tokio::test]
    async fn closing_before_completion_hides_late_errors() {
        let client = FakeClient::new("openid4vp://?request_uri=abc");
        let completion = client.completion();
        let mut controller = VerificationController::new();
        let (ticket, mut rx) = spawn_flow(&client, &mut controller);

        let offered = rx.recv().await.expect("offer event");
        apply(&mut controller, offered);

        controller.close();
        let _ = completion.send(Err(VerifyError::Http {
            status: 500,
            message: "late failure".to_string(),
        }));

        let settled = rx.recv().await.expect("settled event");
        assert!(matches!(
            settled,
            FlowEvent::Settled {
                settled: Settled::Cancelled,
                ..
            }
        ));
        assert!(!apply(&mut controller, settled));
        assert!(ticket.cancel.is_cancelled());
        assert!(!controller.state().modal_visible());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn rejected_offer_is_classified() {
        let client = FakeClient::failing_start(404);
        let mut controller = VerificationController::new();
        let (_ticket, mut rx) = spawn_flow(&client, &mut controller);

        let settled = rx.recv().await.expect("settled event");
        assert!(apply(&mut controller, settled));
        assert_eq!(
            controller.state(),
            &UiState::Failed {
                kind: FailureKind::ConfigNotFound
            }
        );
    }

    #[tokio::test]
    async fn timeout_from_client_shows_retry_hint() {
        let client = FakeClient::new("openid4vp://?request_uri=abc");
        let completion = client.completion();
        let mut controller = VerificationController::new();
        let (_ticket, mut rx) = spawn_flow(&client, &mut controller);

        apply(&mut controller, rx.recv().await.expect("offer"));
        completion
            .send(Err(VerifyError::Timeout(
                "Verification timed out after 300 seconds".to_string(),
            )))
            .expect("deliver timeout");

        apply(&mut controller, rx.recv().await.expect("settled"));
        let UiState::Failed { kind } = controller.state() else {
            panic!("expected failure");
        };
        assert_eq!(
            kind.message(),
            "Verification timed out. Please scan the QR code within 5 minutes."
        );
    }

    #[tokio::test]
    async fn new_flow_supersedes_running_one() {
        let client = FakeClient::new("openid4vp://?request_uri=abc");
        let mut controller = VerificationController::new();
        let (first, mut first_rx) = spawn_flow(&client, &mut controller);
        let (second, _second_rx) = spawn_flow(&client, &mut controller);

        assert!(first.cancel.is_cancelled());
        while let Some(event) = first_rx.recv().await {
            assert!(!apply(&mut controller, event));
        }
        assert_eq!(controller.active_flow(), Some(second.id));
    }
}
