use crate::config::{Config, ConfigField};

/// Editable copy of the verifier settings shown in the setup screen.
pub struct SetupForm {
    pub draft: Config,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl SetupForm {
    pub fn new(config: &Config) -> Self {
        let mut form = Self {
            draft: config.clone(),
            selected_field: 0,
            error_message: None,
        };
        if let Some(first_missing) = config.validate().missing.first() {
            form.select(*first_missing);
        }
        form
    }

    pub fn current_field(&self) -> ConfigField {
        ConfigField::ALL[self.selected_field]
    }

    pub fn select(&mut self, field: ConfigField) {
        if let Some(idx) = ConfigField::ALL.iter().position(|f| *f == field) {
            self.selected_field = idx;
        }
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % ConfigField::ALL.len();
    }

    pub fn previous_field(&mut self) {
        self.selected_field =
            (self.selected_field + ConfigField::ALL.len() - 1) % ConfigField::ALL.len();
    }

    pub fn current_field_value(&mut self) -> &mut String {
        self.draft.field_mut(self.current_field())
    }

    pub fn push_char(&mut self, c: char) {
        self.current_field_value().push(c);
        self.error_message = None;
    }

    pub fn backspace(&mut self) {
        self.current_field_value().pop();
    }

    pub fn display_value(&self, field: ConfigField) -> String {
        let value = self.draft.field(field);
        if value.is_empty() {
            "[not set]".to_string()
        } else if field.is_secret() {
            "*".repeat(value.chars().count().min(16))
        } else {
            value.to_string()
        }
    }

    /// The draft if every field is filled in, otherwise records why not.
    pub fn submit(&mut self) -> Option<Config> {
        let report = self.draft.validate();
        if report.is_ready() {
            return Some(self.draft.clone());
        }

        let missing = report
            .missing
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(", ");
        self.error_message = Some(format!("Still missing: {missing}"));
        None
    }
}
