use super::*;

impl App {
    pub fn buy_enabled(&self) -> bool {
        self.config_report.is_ready() && self.view == ShopView::Catalog
    }

    pub fn start_verification(&mut self) {
        if self.view != ShopView::Catalog {
            return;
        }
        match self.verification.begin(&self.config) {
            Ok(ticket) => {
                self.clear_error();
                self.spawn_flow(ticket);
            }
            Err(report) => self.config_report = report,
        }
    }

    pub fn retry_verification(&mut self) {
        if !matches!(self.verification.state(), UiState::Failed { .. }) {
            return;
        }
        match self.verification.retry(&self.config) {
            Ok(ticket) => self.spawn_flow(ticket),
            Err(report) => self.config_report = report,
        }
    }

    pub fn close_modal(&mut self) {
        self.verification.close();
        self.layout.clear_modal();
    }

    pub fn continue_to_checkout(&mut self) {
        if !matches!(self.verification.state(), UiState::Succeeded { .. }) {
            return;
        }
        self.close_modal();
        self.verification.dismiss();
        self.view = ShopView::Checkout;
    }

    pub fn new_order(&mut self) {
        if self.view == ShopView::Checkout {
            self.verification.dismiss();
            self.view = ShopView::Catalog;
        }
    }

    pub fn open_setup(&mut self) {
        if self.verification.state().is_awaiting() {
            return;
        }
        self.setup = Some(SetupForm::new(&self.config));
    }

    /// Text of the success or error section, if one is showing.
    pub fn modal_message(&self) -> Option<String> {
        match self.verification.state() {
            UiState::Succeeded { name, .. } => Some(success_message(name.as_deref())),
            UiState::Failed { kind } => Some(kind.message().to_string()),
            _ => None,
        }
    }
}
