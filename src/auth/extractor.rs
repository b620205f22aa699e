use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Role, User};
use crate::permissions::RolePermissions;
use crate::state::SharedState;

/// The signed-in user as cached in the session store.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn permissions(&self) -> RolePermissions {
        RolePermissions::for_user(Some(&self.user))
    }

    pub fn require(&self, roles: &[Role]) -> Result<(), AppError> {
        if self.permissions().can_access(roles) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Your role does not allow this operation".to_string(),
            ))
        }
    }

    /// Record owner to query: admins may look at another user's records,
    /// everyone else is pinned to their own.
    pub fn scope(&self, requested: Option<Uuid>) -> Result<Uuid, AppError> {
        match requested {
            Some(id) if id != self.id() => {
                if self.permissions().is_admin() {
                    Ok(id)
                } else {
                    Err(AppError::Forbidden(
                        "Only admins can view other users' records".to_string(),
                    ))
                }
            }
            _ => Ok(self.id()),
        }
    }
}

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        state
            .session
            .user()
            .map(|user| CurrentUser { user })
            .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))
    }
}
