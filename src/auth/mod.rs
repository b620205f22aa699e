pub mod bridge;
pub mod extractor;
pub mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{Role, User};

pub use bridge::{AuthBridge, AuthOutcome, AuthSubscription};
pub use supabase::SupabaseAuth;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthError {
    pub message: String,
    pub status: Option<u16>,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::new(format!("Auth request failed: {err}"))
    }
}

/// User as the identity provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl ProviderUser {
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Project onto the portal's user: name falls back to email, then to
    /// "User"; a missing or unknown role becomes engineer.
    pub fn to_user(&self) -> User {
        let email = self.email.clone().unwrap_or_default();
        let name = self
            .metadata_str("name")
            .map(str::to_string)
            .or_else(|| Some(email.clone()).filter(|e| !e.is_empty()))
            .unwrap_or_else(|| "User".to_string());
        let role = self
            .metadata_str("role")
            .and_then(Role::parse)
            .unwrap_or(Role::Engineer);

        User {
            id: self.id,
            name,
            email,
            role,
            department: self.metadata_str("department").map(str::to_string),
            avatar: self.metadata_str("avatar_url").map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: ProviderUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<ProviderSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ProfileUpdate>,
}

/// Sign-up yields a session right away unless the provider requires email
/// confirmation first.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpResult {
    pub user: ProviderUser,
    pub session: Option<ProviderSession>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<SignUpResult, AuthError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    async fn get_session(&self) -> Result<Option<ProviderSession>, AuthError>;
    async fn get_user(&self) -> Result<Option<ProviderUser>, AuthError>;
    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;
    async fn update_user(&self, changes: &UserChanges) -> Result<ProviderUser, AuthError>;
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
