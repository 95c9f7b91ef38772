use super::*;
use chrono::Local;
use crate::config::ConfigField;
use crate::qr::WINE;
use crate::ui::layout::{modal_fits, modal_size};
use crate::verification::AwaitingScan;
use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Modal contents; headings and key hints sit in the border.
#[derive(Default)]
struct ModalView {
    title: Line<'static>,
    body: Text<'static>,
    hint: Line<'static>,
}

impl ModalView {
    fn content_size(&self) -> (u16, u16) {
        let width = self
            .body
            .lines
            .iter()
            .map(Line::width)
            .chain([self.title.width(), self.hint.width()])
            .max()
            .unwrap_or(0);
        (width as u16, self.body.lines.len() as u16)
    }
}

impl App {
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if let Some(ref setup) = self.setup {
            self.render_setup(frame, area, setup);
            return;
        }

        self.layout.calculate_layout(area);
        let panels = self.layout.get_panels().to_vec();

        for panel in panels {
            match panel.panel_type {
                PanelType::Topbar => self.render_topbar(frame, panel.rect),
                PanelType::Shop => match self.view {
                    ShopView::Catalog => self.render_catalog(frame, panel.rect),
                    ShopView::Checkout => self.render_checkout(frame, panel.rect),
                },
                PanelType::Footer => self.render_footer(frame, panel.rect),
            }
        }

        if self.verification.state().modal_visible() {
            self.render_modal(frame, area);
        } else {
            self.layout.clear_modal();
        }

        if self.show_help {
            self.render_help(frame, area);
        }
    }

    fn render_topbar(&self, frame: &mut Frame, area: Rect) {
        let status = if self.config_report.is_ready() {
            Span::styled(
                format!(" verifier: {} ", self.config.verifier.base_url),
                Style::default().fg(Color::Gray),
            )
        } else {
            Span::styled(" verifier: not configured ", Style::default().fg(Color::Yellow))
        };
        let line = Line::from(vec![
            Span::styled(
                " Vinothek ",
                Style::default()
                    .fg(Color::White)
                    .bg(WINE)
                    .add_modifier(Modifier::BOLD),
            ),
            status,
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let text = match &self.last_error {
            Some(error) => Span::styled(format!(" {error} "), Style::default().fg(Color::Red)),
            None => Span::styled(
                self.keybinds.footer_hint(),
                Style::default().fg(Color::DarkGray),
            ),
        };
        frame.render_widget(Paragraph::new(Line::from(text)), area);
    }

    fn render_catalog(&self, frame: &mut Frame, area: Rect) {
        let product = FEATURED;
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{} {}", product.name, product.vintage),
                Style::default().fg(WINE).add_modifier(Modifier::BOLD),
            )),
            Line::from(product.region),
            Line::from(""),
            Line::from(product.description),
            Line::from(""),
            Line::from(Span::styled(
                product.price_label(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        if self.buy_enabled() {
            lines.push(Line::from(Span::styled(
                "[b] Buy now",
                Style::default().fg(Color::White).bg(WINE),
            )));
            lines.push(Line::from(Span::styled(
                "Age verification with your EUDI wallet is required.",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "[b] Buy now (unavailable)",
                Style::default().fg(Color::DarkGray),
            )));
            if let Some(notice) = self.config_report.notice() {
                lines.push(Line::from(Span::styled(
                    notice,
                    Style::default().fg(Color::Yellow),
                )));
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Wine of the month "))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_checkout(&self, frame: &mut Frame, area: Rect) {
        let product = FEATURED;
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Order confirmed",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(
                "1 x {} {}  {}",
                product.name,
                product.vintage,
                product.price_label()
            )),
            Line::from(""),
            Line::from("Thank you for your purchase."),
            Line::from(""),
            Line::from("[n] New order"),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Checkout "))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_modal(&mut self, frame: &mut Frame, area: Rect) {
        let view = self.modal_view(area);
        let modal = self.layout.place_modal(area, view.content_size());

        frame.render_widget(Clear, modal);
        frame.render_widget(
            Paragraph::new(view.body).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(WINE))
                    .title_top(view.title.centered())
                    .title_bottom(view.hint.centered()),
            ),
            modal,
        );
    }

    fn modal_view(&self, area: Rect) -> ModalView {
        match self.verification.state() {
            UiState::AwaitingScan(awaiting) => Self::scan_view(awaiting, area),
            UiState::Succeeded { verified_at, .. } => ModalView {
                title: Line::from(" Age Verification "),
                body: Text::from(vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "✓ Verified",
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(self.modal_message().unwrap_or_default()),
                    Line::from(Span::styled(
                        format!(
                            "Verified at {}",
                            verified_at.with_timezone(&Local).format("%H:%M:%S")
                        ),
                        Style::default().fg(Color::DarkGray),
                    )),
                ]),
                hint: Line::from(" [c] Continue to checkout   [Esc] Close "),
            },
            UiState::Failed { .. } => ModalView {
                title: Line::from(" Age Verification "),
                body: Text::from(vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "✗ Verification failed",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(self.modal_message().unwrap_or_default()),
                ]),
                hint: Line::from(" [r] Retry   [Esc] Close "),
            },
            UiState::Idle | UiState::Cancelled => ModalView::default(),
        }
    }

    fn scan_view(awaiting: &AwaitingScan, area: Rect) -> ModalView {
        let elapsed = (Utc::now() - awaiting.started_at).num_seconds().max(0) as u64;
        let limit = WAIT_TIMEOUT.as_secs();
        let hint = Line::from(format!(
            " {}  {}:{:02} / {}:{:02}  [Esc] Cancel ",
            awaiting.status_text,
            elapsed / 60,
            elapsed % 60,
            limit / 60,
            limit % 60
        ));

        let ScanPhase::Scanning { qr, .. } = &awaiting.phase else {
            return ModalView {
                title: Line::from(" Age Verification "),
                body: Text::from(vec![Line::from(""), Line::from("Preparing your QR code...")]),
                hint,
            };
        };

        let mut view = ModalView {
            title: Line::from(" Scan with your EUDI wallet to prove you are over 18 "),
            body: qr.to_text(),
            hint,
        };
        let content = view.content_size();
        if !modal_fits(area, content) {
            let (width, height) = modal_size(content);
            view.body = Text::from(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Terminal too small to show the QR code.",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("Enlarge it to at least {width}x{height} to scan.")),
            ]);
        }
        view
    }

    fn render_setup(&self, frame: &mut Frame, area: Rect, form: &SetupForm) {
        let mut lines = vec![
            Line::from(""),
            Line::from("  Connect the shop to your verifier."),
            Line::from("  The client needs permission to create presentation offers."),
            Line::from(""),
        ];

        for (idx, field) in ConfigField::ALL.iter().enumerate() {
            let selected = idx == form.selected_field;
            let marker = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::raw(format!("  {marker}{:<20}", field.label())),
                Span::styled(form.display_value(*field), style),
            ]));
        }

        lines.push(Line::from(""));
        if let Some(ref error) = form.error_message {
            lines.push(Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(Color::Red),
            )));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(format!(
            "  Saved to {}",
            self.config_path.display()
        )));
        lines.push(Line::from(
            "  [Tab] Next field  [Enter] Save  [Esc] Cancel",
        ));

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Setup - Verifier "),
            ),
            area,
        );
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help_text = self.keybinds.help_text();
        let popup_area = centered_rect(60, 70, area);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(help_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help - Press ? to close "),
            ),
            popup_area,
        );
    }
}
