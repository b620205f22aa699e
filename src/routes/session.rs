use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{NewNotification, Notification, Role, User};
use crate::nav::{self, NavEntry};
use crate::permissions::RolePermissions;
use crate::session::SessionSnapshot;
use crate::session::seed::seed_user;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: SessionSnapshot,
    pub root_classes: Vec<String>,
}

#[derive(Serialize)]
pub struct ThemeState {
    pub dark_mode: bool,
}

#[derive(Serialize)]
pub struct SidebarState {
    pub collapsed: bool,
}

#[derive(Deserialize)]
pub struct SetSidebar {
    pub collapsed: bool,
}

pub async fn snapshot(State(state): State<SharedState>) -> Json<SessionView> {
    Json(SessionView {
        session: state.session.snapshot(),
        root_classes: state.theme.list(),
    })
}

/// Local sign-out only; the identity provider is left alone.
pub async fn logout(State(state): State<SharedState>) -> StatusCode {
    state.session.logout();
    StatusCode::NO_CONTENT
}

pub async fn toggle_theme(State(state): State<SharedState>) -> Json<ThemeState> {
    Json(ThemeState {
        dark_mode: state.session.toggle_dark_mode(),
    })
}

pub async fn toggle_sidebar(State(state): State<SharedState>) -> Json<SidebarState> {
    Json(SidebarState {
        collapsed: state.session.toggle_sidebar(),
    })
}

pub async fn set_sidebar(
    State(state): State<SharedState>,
    Json(req): Json<SetSidebar>,
) -> Json<SidebarState> {
    state.session.set_sidebar_collapsed(req.collapsed);
    Json(SidebarState {
        collapsed: req.collapsed,
    })
}

pub async fn navigation(State(state): State<SharedState>) -> Json<Vec<NavEntry>> {
    let permissions = RolePermissions::from_session(&state.session);
    let visible = nav::filter_navigation(nav::NAVIGATION, &permissions)
        .into_iter()
        .copied()
        .collect();
    Json(visible)
}

pub async fn list_notifications(State(state): State<SharedState>) -> Json<Vec<Notification>> {
    Json(state.session.notifications())
}

pub async fn add_notification(
    State(state): State<SharedState>,
    Json(new): Json<NewNotification>,
) -> (StatusCode, Json<Notification>) {
    let notification = state.session.add_notification(new);
    (StatusCode::CREATED, Json(notification))
}

pub async fn mark_notification_read(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.session.mark_notification_read(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Notification not found".to_string()))
    }
}

pub async fn clear_notifications(State(state): State<SharedState>) -> StatusCode {
    state.session.clear_notifications();
    StatusCode::NO_CONTENT
}

/// Sign in as one of the fixed demo users without touching the identity
/// provider.
pub async fn login_as(
    State(state): State<SharedState>,
    Path(role): Path<String>,
) -> Result<Json<User>, AppError> {
    let role = Role::parse(&role)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown role: {role}")))?;
    let user = seed_user(role);
    tracing::info!(role = %role, "Quick login as demo user");
    state.session.set_user(Some(user.clone()));
    Ok(Json(user))
}
