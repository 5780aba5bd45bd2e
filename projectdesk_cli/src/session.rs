use std::sync::Mutex;

use projectdesk_lib::projectdesk_api::Navigator;

/// Navigator for a one-shot command: there is no screen to leave, so a
/// forced redirect to the login page becomes a prompt to sign in again.
pub struct TerminalNavigator {
    current: Mutex<String>,
}

impl TerminalNavigator {
    pub fn new(path: &str) -> Self {
        Self {
            current: Mutex::new(path.to_string()),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn navigate(&self, path: &str) {
        tracing::warn!("Session expired or invalid. Run `projectdesk login` to sign in again.");
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = path.to_string();
    }
}
