use crate::config::{default_config_path, Config, ConfigReport};
use crate::keybinds::Keybinds;
use crate::qr::QrOptions;
use crate::setup::SetupForm;
use crate::ui::layout::{centered_rect, LayoutState};
use crate::ui::panel::PanelType;
use crate::verification::{
    run_flow, success_message, FlowEvent, FlowTicket, ScanPhase, UiState, VerificationController,
    WAIT_TIMEOUT,
};
use anyhow::Result;
use chrono::Utc;
use eudiplo_shop_verifier::EudiploClient;
use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::Frame;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::sync::mpsc;

mod actions;
mod effects;
mod input;
mod render;
mod state;
mod types;

pub use state::App;
pub use types::{AppAsyncEvent, Product, ShopView, FEATURED};

fn bearer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Bearer\s+\S+").expect("valid bearer pattern"))
}

impl App {
    pub(super) fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        let message = format!("{context}: {}", self.redact_sensitive(&error.to_string()));
        self.last_error = Some(message.clone());
        tracing::warn!("{message}");
    }

    pub(super) fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn redact_sensitive(&self, input: &str) -> String {
        let secret = self.config.verifier.client_secret.trim();
        let redacted = if secret.is_empty() {
            input.to_string()
        } else {
            input.replace(secret, "[REDACTED]")
        };
        bearer_pattern()
            .replace_all(&redacted, "Bearer [REDACTED]")
            .into_owned()
    }

    pub(super) fn spawn_flow(&self, ticket: FlowTicket) {
        if let Some(tx) = self.app_async_tx.clone() {
            let client = self.client.clone();
            let request = self.config.verify_request();
            let qr_options = self.qr_options.clone();
            tokio::spawn(run_flow(client, request, ticket, qr_options, move |event| {
                let _ = tx.send(AppAsyncEvent::Flow(event));
            }));
        }
    }
}
