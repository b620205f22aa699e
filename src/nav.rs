use serde::Serialize;

use crate::models::Role;
use crate::permissions::RolePermissions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: &'static str,
    pub target: &'static str,
    pub required_roles: &'static [Role],
}

const EVERYONE: &[Role] = &[Role::Admin, Role::Engineer, Role::Purchasing];

pub const NAVIGATION: &[NavEntry] = &[
    NavEntry {
        label: "Panel",
        target: "/",
        required_roles: EVERYONE,
    },
    NavEntry {
        label: "Chat",
        target: "/chat",
        required_roles: EVERYONE,
    },
    NavEntry {
        label: "Documentos",
        target: "/documentos",
        required_roles: EVERYONE,
    },
    NavEntry {
        label: "Proyectos",
        target: "/proyectos",
        required_roles: &[Role::Admin, Role::Engineer],
    },
    NavEntry {
        label: "Admin",
        target: "/admin",
        required_roles: &[Role::Admin],
    },
];

/// Entries the user may see, in declaration order.
pub fn filter_navigation<'a>(
    entries: &'a [NavEntry],
    permissions: &RolePermissions,
) -> Vec<&'a NavEntry> {
    entries
        .iter()
        .filter(|entry| permissions.can_access(entry.required_roles))
        .collect()
}

pub fn find_entry(target: &str) -> Option<&'static NavEntry> {
    NAVIGATION.iter().find(|entry| entry.target == target)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestrictedNotice {
    pub title: &'static str,
    pub message: &'static str,
}

pub const RESTRICTED: RestrictedNotice = RestrictedNotice {
    title: "Access restricted",
    message: "You do not have permission to view this section.",
};

/// Outcome of a render-time role check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "content", rename_all = "lowercase")]
pub enum Guarded<T> {
    Granted(T),
    Restricted(RestrictedNotice),
}

impl<T> Guarded<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Guarded::Granted(_))
    }
}

/// Build page content only when the user passes `required`; otherwise the
/// fixed restricted notice stands in for it.
pub fn guard<T>(
    permissions: &RolePermissions,
    required: &[Role],
    content: impl FnOnce() -> T,
) -> Guarded<T> {
    if permissions.can_access(required) {
        Guarded::Granted(content())
    } else {
        Guarded::Restricted(RESTRICTED)
    }
}

pub async fn guard_async<T, F>(
    permissions: &RolePermissions,
    required: &[Role],
    content: impl FnOnce() -> F,
) -> Guarded<T>
where
    F: std::future::Future<Output = T>,
{
    if permissions.can_access(required) {
        Guarded::Granted(content().await)
    } else {
        Guarded::Restricted(RESTRICTED)
    }
}
