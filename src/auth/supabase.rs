use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::broadcast;

use super::{
    AuthError, AuthEvent, AuthEventKind, AuthProvider, ProviderSession, ProviderUser,
    SignUpMetadata, SignUpResult, UserChanges,
};
use crate::session::DurableStorage;
use crate::supabase::{SupabaseClient, error_message};

/// Record name of the provider's own persisted session.
pub const SESSION_KEY: &str = "sb-auth-token";

/// Refresh this many seconds before the access token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 10;

const EVENT_CAPACITY: usize = 16;

/// Hosted email/password identity provider.
pub struct SupabaseAuth {
    client: Arc<SupabaseClient>,
    session: RwLock<Option<ProviderSession>>,
    events: broadcast::Sender<AuthEvent>,
    storage: Option<Arc<dyn DurableStorage>>,
    reset_redirect: Option<String>,
}

impl SupabaseAuth {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            session: RwLock::new(None),
            events,
            storage: None,
            reset_redirect: None,
        }
    }

    /// Persist the session in `storage` and restore any session saved there.
    pub fn with_storage(mut self, storage: Arc<dyn DurableStorage>) -> Self {
        match storage.read(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<ProviderSession>(&raw) {
                Ok(session) => {
                    self.client.set_access_token(Some(session.access_token.clone()));
                    *self.session.get_mut() = Some(session);
                }
                Err(e) => tracing::warn!("Discarding unreadable auth session: {e}"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read auth session: {e}"),
        }
        self.storage = Some(storage);
        self
    }

    /// Where password-reset emails send the user back to.
    pub fn with_reset_redirect(mut self, url: impl Into<String>) -> Self {
        self.reset_redirect = Some(url.into());
        self
    }

    fn current(&self) -> Option<ProviderSession> {
        self.session.read().clone()
    }

    fn store_session(&self, session: Option<ProviderSession>) {
        self.client
            .set_access_token(session.as_ref().map(|s| s.access_token.clone()));

        if let Some(storage) = &self.storage {
            let result = match &session {
                Some(s) => serde_json::to_string(s)
                    .map_err(|e| format!("Failed to serialize auth session: {e}"))
                    .and_then(|raw| storage.write(SESSION_KEY, &raw)),
                None => storage.remove(SESSION_KEY),
            };
            if let Err(e) = result {
                tracing::warn!("Failed to persist auth session: {e}");
            }
        }

        *self.session.write() = session;
    }

    fn emit(&self, kind: AuthEventKind, session: Option<ProviderSession>) {
        tracing::debug!(?kind, "Auth state changed");
        // No receivers is fine; nobody is listening yet.
        let _ = self.events.send(AuthEvent { kind, session });
    }

    fn signed_in(&self, kind: AuthEventKind, session: ProviderSession) -> ProviderSession {
        let session = with_expiry(session);
        self.store_session(Some(session.clone()));
        self.emit(kind, Some(session.clone()));
        session
    }

    fn signed_out(&self) {
        self.store_session(None);
        self.emit(AuthEventKind::SignedOut, None);
    }

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, AuthError> {
        let resp = self
            .client
            .request(Method::POST, &self.client.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        parse(resp).await
    }
}

fn with_expiry(mut session: ProviderSession) -> ProviderSession {
    if session.expires_at.is_none() {
        session.expires_at = Some(Utc::now().timestamp() + session.expires_in);
    }
    session
}

async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, AuthError> {
    let resp = check(resp).await?;
    resp.json::<T>()
        .await
        .map_err(|e| AuthError::new(format!("Invalid auth response: {e}")))
}

async fn check(resp: Response) -> Result<Response, AuthError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AuthError::with_status(
        error_message(status, &body),
        status.as_u16(),
    ))
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<SignUpResult, AuthError> {
        let resp = self
            .client
            .request(Method::POST, &self.client.auth_url("signup"))
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;
        let body: Value = parse(resp).await?;

        if body.get("access_token").is_some() {
            let session: ProviderSession = serde_json::from_value(body)
                .map_err(|e| AuthError::new(format!("Invalid sign-up session: {e}")))?;
            let session = self.signed_in(AuthEventKind::SignedIn, session);
            return Ok(SignUpResult {
                user: session.user.clone(),
                session: Some(session),
            });
        }

        // Confirmation pending: the body is the user itself, or wraps it.
        let user_value = match body.get("user") {
            Some(user) if user.is_object() => user.clone(),
            _ => body,
        };
        let user: ProviderUser = serde_json::from_value(user_value)
            .map_err(|e| AuthError::new(format!("Invalid sign-up user: {e}")))?;
        Ok(SignUpResult {
            user,
            session: None,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, AuthError> {
        let resp = self
            .client
            .request(Method::POST, &self.client.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let session: ProviderSession = parse(resp).await?;
        Ok(self.signed_in(AuthEventKind::SignedIn, session))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.current() else {
            self.signed_out();
            return Ok(());
        };

        let resp = self
            .client
            .request_with_token(
                Method::POST,
                &self.client.auth_url("logout"),
                &session.access_token,
            )
            .send()
            .await?;

        // Already revoked or unknown on the server side still means signed out here.
        match resp.status().as_u16() {
            200..=299 | 401 | 403 | 404 => {
                self.signed_out();
                Ok(())
            }
            _ => check(resp).await.map(|_| ()),
        }
    }

    async fn get_session(&self) -> Result<Option<ProviderSession>, AuthError> {
        let Some(session) = self.current() else {
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        if session
            .expires_at
            .is_some_and(|exp| exp > now + EXPIRY_MARGIN_SECS)
        {
            return Ok(Some(session));
        }

        match self.refresh(&session.refresh_token).await {
            Ok(refreshed) => Ok(Some(self.signed_in(AuthEventKind::TokenRefreshed, refreshed))),
            Err(e) => {
                tracing::warn!("Session refresh failed: {e}");
                self.signed_out();
                Err(e)
            }
        }
    }

    async fn get_user(&self) -> Result<Option<ProviderUser>, AuthError> {
        let Some(session) = self.current() else {
            return Ok(None);
        };
        let resp = self
            .client
            .request_with_token(Method::GET, &self.client.auth_url("user"), &session.access_token)
            .send()
            .await?;
        parse(resp).await.map(Some)
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let mut req = self
            .client
            .request(Method::POST, &self.client.auth_url("recover"))
            .json(&json!({ "email": email }));
        if let Some(redirect) = &self.reset_redirect {
            req = req.query(&[("redirect_to", format!("{redirect}/reset-password"))]);
        }
        check(req.send().await?).await.map(|_| ())
    }

    async fn update_user(&self, changes: &UserChanges) -> Result<ProviderUser, AuthError> {
        let session = self
            .current()
            .ok_or_else(|| AuthError::with_status("Auth session missing", 401))?;

        let resp = self
            .client
            .request_with_token(Method::PUT, &self.client.auth_url("user"), &session.access_token)
            .json(changes)
            .send()
            .await?;
        let user: ProviderUser = parse(resp).await?;

        let updated = ProviderSession {
            user: user.clone(),
            ..session
        };
        self.store_session(Some(updated.clone()));
        self.emit(AuthEventKind::UserUpdated, Some(updated));
        Ok(user)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
