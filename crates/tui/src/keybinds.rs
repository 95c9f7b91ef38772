pub struct Keybinds;

impl Default for Keybinds {
    fn default() -> Self {
        Self
    }
}

impl Keybinds {
    pub fn help_text(&self) -> String {
        r#"Keyboard Shortcuts:

Shop:
  b / Enter     Buy (starts age verification)
  n             New order (from checkout)
  s             Verifier setup

Verification:
  Esc           Close and cancel
  r             Retry after an error
  c             Continue to checkout after success

Setup:
  Tab / ↓       Next field
  Shift+Tab / ↑ Previous field
  Enter         Save
  Esc           Discard changes

General:
  ?             Toggle this help
  Ctrl + Q      Quit

Mouse:
  Click outside the dialog to close it
"#
        .to_string()
    }

    pub fn footer_hint(&self) -> &'static str {
        " [b] Buy  [s] Setup  [?] Help  [Ctrl+Q] Quit "
    }
}
