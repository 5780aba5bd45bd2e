//! Collaborators the transport client depends on: where credentials live and
//! how to send the user back to the login screen.

use std::sync::Mutex;

use dashmap::DashMap;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the serialized user profile.
pub const USER_KEY: &str = "user";

/// A string key-value store holding the session credentials.
///
/// Implementations must treat `clear` on an empty store as a no-op.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
    fn clear(&self);

    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }
}

/// Navigation boundary used for the forced login redirect.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// In-process credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: DashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

/// Navigator that only remembers where it has been sent.
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    /// Starts at `path`.
    pub fn new(path: &str) -> Self {
        Self {
            history: Mutex::new(vec![path.to_string()]),
        }
    }

    /// Every path visited after the starting one.
    pub fn redirects(&self) -> Vec<String> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.iter().skip(1).cloned().collect()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.last().cloned().unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.token(), None);
        store.set(TOKEN_KEY, "abc".to_string());
        assert_eq!(store.token().as_deref(), Some("abc"));
        store.remove(TOKEN_KEY);
        assert_eq!(store.get(TOKEN_KEY), None);
    }

    #[test]
    fn empty_token_is_no_token() {
        let store = MemoryCredentialStore::new();
        store.set(TOKEN_KEY, String::new());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let store = MemoryCredentialStore::new();
        store.set(USER_KEY, "{}".to_string());
        store.clear();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn navigator_tracks_redirects() {
        let nav = MemoryNavigator::new("/projects");
        assert_eq!(nav.current_path(), "/projects");
        nav.navigate("/login");
        assert_eq!(nav.current_path(), "/login");
        assert_eq!(nav.redirects(), vec!["/login".to_string()]);
    }
}
