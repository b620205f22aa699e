//! One-way sync from the identity provider into the session store, plus the
//! account operations the portal exposes.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::{AuthError, AuthEvent, AuthProvider, ProfileUpdate, SignUpMetadata, UserChanges};
use crate::models::User;
use crate::session::SessionStore;

/// `{success, data?, error?}` result of an account operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> AuthOutcome<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Default)]
struct BridgeStatus {
    in_flight: usize,
    error: Option<String>,
}

/// Marks an operation in flight until dropped.
struct InFlight<'a>(&'a Mutex<BridgeStatus>);

impl<'a> InFlight<'a> {
    fn start(status: &'a Mutex<BridgeStatus>) -> Self {
        let mut s = status.lock();
        s.in_flight += 1;
        s.error = None;
        InFlight(status)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut s = self.0.lock();
        s.in_flight = s.in_flight.saturating_sub(1);
    }
}

/// Live provider subscription. Release it with [`AuthSubscription::unsubscribe`];
/// dropping it also stops the listener.
#[must_use = "dropping the subscription stops session sync"]
pub struct AuthSubscription {
    handle: Option<JoinHandle<()>>,
}

impl AuthSubscription {
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the listener and wait until it can no longer touch the session.
    pub async fn unsubscribe(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            tracing::debug!("Auth subscription released");
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[derive(Clone)]
pub struct AuthBridge {
    provider: Arc<dyn AuthProvider>,
    session: SessionStore,
    status: Arc<Mutex<BridgeStatus>>,
}

impl AuthBridge {
    pub fn new(provider: Arc<dyn AuthProvider>, session: SessionStore) -> Self {
        Self {
            provider,
            session,
            status: Arc::new(Mutex::new(BridgeStatus::default())),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status.lock().in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.status.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.status.lock().error = None;
    }

    /// Load the current provider session once, then follow the provider's
    /// event stream until the returned subscription is released.
    pub async fn mount(&self) -> AuthSubscription {
        // Subscribe first so events raised while fetching are not lost.
        let mut events = self.provider.subscribe();

        {
            let _flight = InFlight::start(&self.status);
            match self.provider.get_session().await {
                Ok(Some(session)) => self.session.set_user(Some(session.user.to_user())),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Error fetching session: {e}");
                    self.status.lock().error = Some(e.message);
                }
            }
        }

        let session = self.session.clone();
        let status = Arc::clone(&self.status);
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => apply_event(&session, &status, event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Auth listener lagged, skipped {skipped} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        AuthSubscription {
            handle: Some(handle),
        }
    }

    async fn run<T, F>(&self, operation: &'static str, fallback: &'static str, fut: F) -> AuthOutcome<T>
    where
        F: Future<Output = Result<Option<T>, AuthError>>,
    {
        let _flight = InFlight::start(&self.status);
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(data)) => AuthOutcome::ok(data),
            Ok(Err(e)) => {
                tracing::error!(operation, "{e}");
                self.status.lock().error = Some(e.message.clone());
                AuthOutcome::failed(e.message)
            }
            Err(_) => {
                tracing::error!(operation, "Auth operation panicked");
                self.status.lock().error = Some(fallback.to_string());
                AuthOutcome::failed(fallback)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthOutcome<User> {
        self.run("sign_in", "Sign-in failed", async {
            let session = self.provider.sign_in(email, password).await?;
            let user = session.user.to_user();
            self.session.set_user(Some(user.clone()));
            Ok(Some(user))
        })
        .await
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> AuthOutcome<User> {
        self.run("sign_up", "Sign-up failed", async {
            let result = self.provider.sign_up(email, password, metadata).await?;
            let user = result.user.to_user();
            // Without a session the account still awaits email confirmation.
            if result.session.is_some() {
                self.session.set_user(Some(user.clone()));
            }
            Ok(Some(user))
        })
        .await
    }

    pub async fn sign_out(&self) -> AuthOutcome<()> {
        self.run("sign_out", "Sign-out failed", async {
            self.provider.sign_out().await?;
            Ok(None)
        })
        .await
    }

    pub async fn reset_password(&self, email: &str) -> AuthOutcome<()> {
        self.run("reset_password", "Password reset failed", async {
            self.provider.reset_password(email).await?;
            Ok(None)
        })
        .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> AuthOutcome<User> {
        self.run("update_profile", "Profile update failed", async {
            let changes = UserChanges {
                password: None,
                data: Some(update.clone()),
            };
            let user = self.provider.update_user(&changes).await?;
            Ok(Some(user.to_user()))
        })
        .await
    }

    pub async fn update_password(&self, new_password: &str) -> AuthOutcome<()> {
        self.run("update_password", "Password update failed", async {
            let changes = UserChanges {
                password: Some(new_password.to_string()),
                data: None,
            };
            self.provider.update_user(&changes).await?;
            Ok(None)
        })
        .await
    }
}

fn apply_event(session: &SessionStore, status: &Mutex<BridgeStatus>, event: AuthEvent) {
    tracing::info!(kind = ?event.kind, "Auth state changed");
    match event.session {
        Some(provider_session) => session.set_user(Some(provider_session.user.to_user())),
        None => session.logout(),
    }
    status.lock().error = None;
}
