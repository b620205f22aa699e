use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Portal roles. Provider metadata stores them with their Spanish wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "ingeniero", alias = "engineer")]
    Engineer,
    #[serde(rename = "compras", alias = "purchasing")]
    Purchasing,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Engineer, Role::Purchasing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Engineer => "ingeniero",
            Role::Purchasing => "compras",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "ingeniero" | "engineer" => Some(Role::Engineer),
            "compras" | "purchasing" => Some(Role::Purchasing),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denormalized projection of the provider's user, cached in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
