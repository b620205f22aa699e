//! Role checks for the signed-in user. All role-based decisions go through here.

use crate::models::{Role, User};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePermissions {
    role: Option<Role>,
}

impl RolePermissions {
    pub fn for_user(user: Option<&User>) -> Self {
        Self {
            role: user.map(|u| u.role),
        }
    }

    pub fn from_session(session: &SessionStore) -> Self {
        Self::for_user(session.user().as_ref())
    }

    pub fn current_role(&self) -> Option<Role> {
        self.role
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role.is_some_and(|r| roles.contains(&r))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn is_engineer(&self) -> bool {
        self.has_role(Role::Engineer)
    }

    pub fn is_purchasing(&self) -> bool {
        self.has_role(Role::Purchasing)
    }

    /// Admins pass every check, whatever `required` lists.
    pub fn can_access(&self, required: &[Role]) -> bool {
        self.is_admin() || self.has_any_role(required)
    }
}
