//! Process-wide UI session: signed-in user, preferences, notification queue.
//!
//! A `SessionStore` is constructed once by the composition root and cloned
//! into every consumer. Writes go through a single lock and are visible to all
//! clones as soon as the call returns.

pub mod seed;
pub mod storage;
pub mod theme;

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::{Config, Environment};
use crate::models::{NewNotification, Notification, User};

pub use storage::{DurableStorage, FileStorage, MemoryStorage};
pub use theme::{RootClasses, ThemeSink};

/// Record name of the persisted session subset.
pub const STORAGE_KEY: &str = "ingenieria-copilot-storage";

pub const NOTIFICATION_LIMIT: usize = 50;

const PERSIST_VERSION: u32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub company_name: String,
    pub version: String,
    pub environment: Environment,
}

impl AppConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            company_name: config.company_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: config.environment,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    is_dark_mode: bool,
    is_sidebar_collapsed: bool,
    user: Option<User>,
    is_authenticated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord {
    state: PersistedSession,
    version: u32,
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    is_authenticated: bool,
    is_dark_mode: bool,
    is_sidebar_collapsed: bool,
    is_loading: bool,
    notifications: VecDeque<Notification>,
}

impl SessionState {
    fn persisted(&self) -> PersistedSession {
        PersistedSession {
            is_dark_mode: self.is_dark_mode,
            is_sidebar_collapsed: self.is_sidebar_collapsed,
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_dark_mode: bool,
    pub is_sidebar_collapsed: bool,
    pub is_loading: bool,
    pub unread_notifications: usize,
    pub app_config: AppConfig,
}

#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    app_config: Arc<AppConfig>,
    storage: Arc<dyn DurableStorage>,
    theme: Arc<dyn ThemeSink>,
}

impl SessionStore {
    /// Rehydrate from `storage` and replay the theme marker.
    ///
    /// A missing record starts a fresh session; an unreadable one is logged
    /// and replaced on the next persisted mutation.
    pub fn open(
        storage: Arc<dyn DurableStorage>,
        theme: Arc<dyn ThemeSink>,
        app_config: AppConfig,
    ) -> Self {
        let restored = match storage.read(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedRecord>(&raw) {
                Ok(record) => {
                    if record.version != PERSIST_VERSION {
                        tracing::warn!(
                            "Persisted session has version {}, expected {PERSIST_VERSION}",
                            record.version
                        );
                    }
                    record.state
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable persisted session: {e}");
                    PersistedSession::default()
                }
            },
            Ok(None) => PersistedSession::default(),
            Err(e) => {
                tracing::warn!("Failed to read persisted session: {e}");
                PersistedSession::default()
            }
        };

        let state = SessionState {
            is_authenticated: restored.user.is_some(),
            user: restored.user,
            is_dark_mode: restored.is_dark_mode,
            is_sidebar_collapsed: restored.is_sidebar_collapsed,
            ..SessionState::default()
        };

        theme.apply(state.is_dark_mode);

        if let Some(user) = &state.user {
            tracing::debug!(user_id = %user.id, "Session rehydrated");
        }

        Self {
            state: Arc::new(RwLock::new(state)),
            app_config: Arc::new(app_config),
            storage,
            theme,
        }
    }

    fn persist(&self, state: &SessionState) {
        let record = PersistedRecord {
            state: state.persisted(),
            version: PERSIST_VERSION,
        };
        let result = serde_json::to_string(&record)
            .map_err(|e| format!("Failed to serialize session: {e}"))
            .and_then(|raw| self.storage.write(STORAGE_KEY, &raw));
        if let Err(e) = result {
            tracing::warn!("Failed to persist session: {e}");
        }
    }

    /// Run `f` under the write lock, then persist while still holding it so
    /// stored records follow mutation order.
    fn mutate_persisted<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.write();
        let result = f(&mut state);
        self.persist(&state);
        result
    }

    // ── User ────────────────────────────────────────────────────────

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
    }

    pub fn set_user(&self, user: Option<User>) {
        self.mutate_persisted(|s| {
            s.is_authenticated = user.is_some();
            s.user = user;
        });
    }

    pub fn logout(&self) {
        self.set_user(None);
    }

    // ── Preferences ─────────────────────────────────────────────────

    pub fn is_dark_mode(&self) -> bool {
        self.state.read().is_dark_mode
    }

    pub fn toggle_dark_mode(&self) -> bool {
        self.mutate_persisted(|s| {
            s.is_dark_mode = !s.is_dark_mode;
            self.theme.apply(s.is_dark_mode);
            s.is_dark_mode
        })
    }

    pub fn is_sidebar_collapsed(&self) -> bool {
        self.state.read().is_sidebar_collapsed
    }

    pub fn toggle_sidebar(&self) -> bool {
        self.mutate_persisted(|s| {
            s.is_sidebar_collapsed = !s.is_sidebar_collapsed;
            s.is_sidebar_collapsed
        })
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) {
        self.mutate_persisted(|s| s.is_sidebar_collapsed = collapsed);
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.write().is_loading = loading;
    }

    // ── Notifications ───────────────────────────────────────────────

    /// Newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.state.read().notifications.iter().cloned().collect()
    }

    pub fn add_notification(&self, new: NewNotification) -> Notification {
        let mut state = self.state.write();

        let mut id = notification_id();
        while state.notifications.iter().any(|n| n.id == id) {
            id = notification_id();
        }

        let notification = Notification {
            id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            timestamp: Utc::now(),
            read: false,
        };

        state.notifications.push_front(notification.clone());
        state.notifications.truncate(NOTIFICATION_LIMIT);
        notification
    }

    /// Returns false when no queued notification has `id`.
    pub fn mark_notification_read(&self, id: &str) -> bool {
        let mut state = self.state.write();
        match state.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn clear_notifications(&self) {
        self.state.write().notifications.clear();
    }

    // ── Config & snapshots ──────────────────────────────────────────

    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            user: state.user.clone(),
            is_authenticated: state.is_authenticated,
            is_dark_mode: state.is_dark_mode,
            is_sidebar_collapsed: state.is_sidebar_collapsed,
            is_loading: state.is_loading,
            unread_notifications: state.notifications.iter().filter(|n| !n.read).count(),
            app_config: (*self.app_config).clone(),
        }
    }
}

/// `notif-<unix millis>-<9 random base36 chars>`.
fn notification_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut bits: u64 = rand::random();
    let mut suffix = String::with_capacity(9);
    for _ in 0..9 {
        let digit = (bits % 36) as u32;
        suffix.push(std::char::from_digit(digit, 36).unwrap_or('0'));
        bits /= 36;
    }
    format!("notif-{millis}-{suffix}")
}
