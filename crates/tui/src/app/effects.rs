use super::*;

impl App {
    pub fn init(&mut self) {
        self.config_report = self.config.validate();
        match self.config_report.notice() {
            None => tracing::info!(
                "Verifier configured: {} (config {})",
                self.config.verifier.base_url,
                self.config.verifier.config_id
            ),
            Some(notice) => tracing::warn!("{notice}"),
        }
    }

    pub fn process_async_events(&mut self) {
        let mut async_events = Vec::new();
        if let Some(ref mut rx) = self.app_async_rx {
            while let Ok(event) = rx.try_recv() {
                async_events.push(event);
            }
        }

        for event in async_events {
            match event {
                AppAsyncEvent::Flow(FlowEvent::Offered { flow, offer, qr }) => {
                    self.verification.on_offer(flow, offer, qr);
                }
                AppAsyncEvent::Flow(FlowEvent::Settled { flow, settled }) => {
                    self.verification.on_settled(flow, settled);
                }
            }
        }
    }

    pub(super) fn save_setup(&mut self) {
        let Some(form) = self.setup.as_mut() else {
            return;
        };
        let Some(config) = form.submit() else {
            return;
        };

        if let Err(e) = config.save(&self.config_path) {
            let message = format!("Could not save {}: {e}", self.config_path.display());
            form.error_message = Some(message.clone());
            self.report_error("Failed to save configuration", message);
            return;
        }

        tracing::info!("Configuration saved to {}", self.config_path.display());
        self.config = config;
        self.setup = None;
        self.init();
        self.clear_error();
    }
}
