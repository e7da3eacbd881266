use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::Storage;
use crate::auth::User;
use crate::constants::languages;

/// Storage key of the persisted snapshot
pub const STORE_NAME: &str = "app-store";

const STORE_VERSION: u32 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
            Self::System => write!(f, "system"),
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => bail!("Unknown theme: {}", other),
        }
    }
}

/// Full client state
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub sidebar_open: bool,
    pub theme: Theme,
    pub language: String,
    pub is_loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            sidebar_open: false,
            theme: Theme::System,
            language: languages::ZH.to_string(),
            is_loading: false,
        }
    }
}

/// The subset of `AppState` that survives restarts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub theme: Theme,
    pub language: String,
    pub sidebar_open: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredBlob {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

/// Flat state object with setter actions.
///
/// Every action that touches a persisted field writes the snapshot through
/// to storage. Persistence failures are logged and never fail the action.
pub struct AppStore {
    state: AppState,
    storage: Option<Arc<dyn Storage>>,
}

impl AppStore {
    /// In-memory store with default state
    pub fn new() -> Self {
        Self {
            state: AppState::default(),
            storage: None,
        }
    }

    /// Rehydrate from storage; a missing or unreadable snapshot yields defaults
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let mut state = AppState::default();

        match storage.get_item(STORE_NAME) {
            Ok(Some(raw)) => match serde_json::from_str::<StoredBlob>(&raw) {
                Ok(blob) => {
                    debug!(version = blob.version, "Rehydrated app store");
                    state.theme = blob.state.theme;
                    state.language = blob.state.language;
                    state.sidebar_open = blob.state.sidebar_open;
                }
                Err(e) => warn!("Ignoring malformed {} snapshot: {}", STORE_NAME, e),
            },
            Ok(None) => debug!("No persisted {} snapshot, using defaults", STORE_NAME),
            Err(e) => warn!("Failed to read {} snapshot: {}", STORE_NAME, e),
        }

        Self {
            state,
            storage: Some(storage),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn language(&self) -> &str {
        &self.state.language
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn sidebar_open(&self) -> bool {
        self.state.sidebar_open
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            theme: self.state.theme,
            language: self.state.language.clone(),
            sidebar_open: self.state.sidebar_open,
        }
    }

    pub fn set_user(&mut self, user: Option<User>) {
        debug!(action = "setUser", present = user.is_some(), "Store action");
        self.state.is_authenticated = user.is_some();
        self.state.user = user;
    }

    pub fn logout(&mut self) {
        debug!(action = "logout", "Store action");
        self.state.user = None;
        self.state.is_authenticated = false;
    }

    pub fn toggle_sidebar(&mut self) {
        self.state.sidebar_open = !self.state.sidebar_open;
        debug!(action = "toggleSidebar", open = self.state.sidebar_open, "Store action");
        self.persist();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        debug!(action = "setTheme", theme = %theme, "Store action");
        self.state.theme = theme;
        self.persist();
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.state.language = language.into();
        debug!(action = "setLanguage", language = %self.state.language, "Store action");
        self.persist();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };

        let blob = StoredBlob {
            state: self.persisted(),
            version: STORE_VERSION,
        };

        let result = serde_json::to_string(&blob)
            .map_err(anyhow::Error::from)
            .and_then(|raw| storage.set_item(STORE_NAME, &raw));

        if let Err(e) = result {
            warn!("Failed to persist {}: {}", STORE_NAME, e);
        }
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use serde_json::Value;

    fn user() -> User {
        User {
            id: "1".to_string(),
            name: "demo".to_string(),
            email: "demo@example.com".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_initial_state() {
        let store = AppStore::new();
        assert_eq!(store.state(), &AppState::default());
        assert_eq!(store.theme(), Theme::System);
        assert_eq!(store.language(), "zh");
        assert!(!store.sidebar_open());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_set_user_tracks_authentication() {
        let mut store = AppStore::new();
        store.set_user(Some(user()));
        assert!(store.is_authenticated());
        assert_eq!(store.user().unwrap().email, "demo@example.com");

        store.set_user(None);
        assert!(!store.is_authenticated());

        store.set_user(Some(user()));
        store.logout();
        assert!(store.user().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_persists_only_preferences() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = AppStore::load(storage.clone());

        store.set_user(Some(user()));
        store.set_loading(true);
        assert_eq!(storage.get_item(STORE_NAME).unwrap(), None);

        store.set_theme(Theme::Dark);
        store.toggle_sidebar();
        store.set_language("en");

        let raw = storage.get_item(STORE_NAME).unwrap().unwrap();
        let blob: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            blob,
            serde_json::json!({
                "state": {"theme": "dark", "language": "en", "sidebarOpen": true},
                "version": 0
            })
        );
    }

    #[test]
    fn test_rehydrate() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut store = AppStore::load(storage.clone());
            store.set_theme(Theme::Light);
            store.toggle_sidebar();
            store.set_user(Some(user()));
        }

        let store = AppStore::load(storage);
        assert_eq!(store.theme(), Theme::Light);
        assert!(store.sidebar_open());
        assert_eq!(store.language(), "zh");
        assert!(store.user().is_none());
    }

    #[test]
    fn test_malformed_snapshot_uses_defaults() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(STORE_NAME, "not json").unwrap();

        let store = AppStore::load(storage);
        assert_eq!(store.state(), &AppState::default());
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("SYSTEM".parse::<Theme>().unwrap(), Theme::System);
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.to_string(), "light");
    }
}
