use super::*;

impl App {
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            Event::Resize(_, _) => Ok(false),
            _ => Ok(false),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<bool> {
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }

        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        if self.setup.is_some() {
            self.handle_setup_key(key);
            return Ok(false);
        }

        if key.code == KeyCode::Char('?') {
            self.show_help = !self.show_help;
            return Ok(false);
        }

        if self.show_help {
            if key.code == KeyCode::Esc {
                self.show_help = false;
            }
            return Ok(false);
        }

        match self.verification.state() {
            UiState::AwaitingScan(_) => {
                if key.code == KeyCode::Esc {
                    self.close_modal();
                }
            }
            UiState::Succeeded { .. } => match key.code {
                KeyCode::Char('c') | KeyCode::Enter => self.continue_to_checkout(),
                KeyCode::Esc => self.close_modal(),
                _ => {}
            },
            UiState::Failed { .. } => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.retry_verification(),
                KeyCode::Esc => self.close_modal(),
                _ => {}
            },
            UiState::Idle | UiState::Cancelled => match key.code {
                KeyCode::Char('b') | KeyCode::Enter => {
                    if self.buy_enabled() {
                        self.start_verification();
                    }
                }
                KeyCode::Char('n') => self.new_order(),
                KeyCode::Char('s') => self.open_setup(),
                _ => {}
            },
        }

        Ok(false)
    }

    fn handle_setup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.setup = None,
            KeyCode::Enter => self.save_setup(),
            code => {
                let Some(form) = self.setup.as_mut() else {
                    return;
                };
                match code {
                    KeyCode::Tab | KeyCode::Down => form.next_field(),
                    KeyCode::BackTab | KeyCode::Up => form.previous_field(),
                    KeyCode::Backspace => form.backspace(),
                    KeyCode::Char(c) => form.push_char(c),
                    _ => {}
                }
            }
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<bool> {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if self.verification.state().modal_visible()
                && self.layout.is_backdrop(mouse.column, mouse.row)
            {
                self.close_modal();
            }
        }
        Ok(false)
    }
}
