use axum::extract::State;
use axum::Json;
use futures_util::future::try_join;
use serde::Serialize;

use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::db::summary::DashboardSummary;
use crate::models::{Email, Invoice, Role, Task, TaskPhase, User};
use crate::nav::{self, Guarded, NavEntry, guard, guard_async};
use crate::permissions::RolePermissions;
use crate::routes::Envelope;
use crate::session::AppConfig;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct Page<T> {
    pub title: &'static str,
    pub path: &'static str,
    pub navigation: Vec<NavEntry>,
    pub body: Guarded<T>,
}

#[derive(Serialize)]
pub struct QuickAction {
    pub label: &'static str,
    pub target: &'static str,
}

#[derive(Serialize)]
pub struct PanelContent {
    pub greeting: String,
    pub quick_actions: Vec<QuickAction>,
    pub summary: Envelope<DashboardSummary>,
}

#[derive(Serialize)]
pub struct ChatContent {
    pub assistant: String,
    pub suggestions: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct DocumentsContent {
    pub emails: Vec<Email>,
    pub invoices: Vec<Invoice>,
}

#[derive(Serialize)]
pub struct PhaseColumn {
    pub phase: TaskPhase,
    pub tasks: Vec<Task>,
}

#[derive(Serialize)]
pub struct RoleSummary {
    pub role: Role,
    pub sections: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct AdminContent {
    pub app_config: AppConfig,
    pub signed_in_as: User,
    pub roles: Vec<RoleSummary>,
}

/// Quick actions on the panel, each gated like the section it opens.
const QUICK_ACTIONS: &[QuickAction] = &[
    QuickAction {
        label: "Ask the assistant",
        target: "/chat",
    },
    QuickAction {
        label: "Review documents",
        target: "/documentos",
    },
    QuickAction {
        label: "Open projects",
        target: "/proyectos",
    },
    QuickAction {
        label: "Manage users",
        target: "/admin",
    },
];

fn page<T>(
    target: &'static str,
    permissions: &RolePermissions,
    body: Guarded<T>,
) -> Json<Page<T>> {
    let entry = nav::find_entry(target);
    Json(Page {
        title: entry.map(|e| e.label).unwrap_or_default(),
        path: target,
        navigation: nav::filter_navigation(nav::NAVIGATION, permissions)
            .into_iter()
            .copied()
            .collect(),
        body,
    })
}

fn required(target: &str) -> &'static [Role] {
    nav::find_entry(target)
        .map(|e| e.required_roles)
        .unwrap_or(&[Role::Admin])
}

pub async fn panel(
    auth: CurrentUser,
    State(state): State<SharedState>,
) -> Json<Page<PanelContent>> {
    let permissions = auth.permissions();
    let body = guard_async(&permissions, required("/"), || async {
        let quick_actions = QUICK_ACTIONS
            .iter()
            .filter(|action| permissions.can_access(required(action.target)))
            .map(|action| QuickAction {
                label: action.label,
                target: action.target,
            })
            .collect();
        PanelContent {
            greeting: format!("Welcome back, {}", auth.user.name),
            quick_actions,
            summary: db::summary::load(state.records.as_ref(), auth.id())
                .await
                .into(),
        }
    })
    .await;
    page("/", &permissions, body)
}

pub async fn chat(auth: CurrentUser, State(state): State<SharedState>) -> Json<Page<ChatContent>> {
    let permissions = auth.permissions();
    let company = &state.session.app_config().company_name;
    let body = guard(&permissions, required("/chat"), || ChatContent {
        assistant: format!("{company} assistant"),
        suggestions: match permissions.current_role() {
            Some(Role::Purchasing) => vec![
                "Which invoices are still pending?",
                "Summarise this month's supplier spend",
            ],
            _ => vec![
                "Which tasks are due this week?",
                "Find the latest supplier emails",
            ],
        },
    });
    page("/chat", &permissions, body)
}

pub async fn documents(
    auth: CurrentUser,
    State(state): State<SharedState>,
) -> Json<Page<Envelope<DocumentsContent>>> {
    let permissions = auth.permissions();
    let store = state.records.as_ref();
    let body: Guarded<Envelope<DocumentsContent>> =
        guard_async(&permissions, required("/documentos"), || async {
            try_join(
                db::emails::list(store, Some(auth.id())),
                db::invoices::list(store, Some(auth.id()), None),
            )
            .await
            .map(|(emails, invoices)| DocumentsContent { emails, invoices })
            .into()
        })
        .await;
    page("/documentos", &permissions, body)
}

fn phase_columns(tasks: Vec<Task>) -> Vec<PhaseColumn> {
    [TaskPhase::Design, TaskPhase::Purchase, TaskPhase::Installation]
        .into_iter()
        .map(|phase| PhaseColumn {
            phase,
            tasks: tasks.iter().filter(|t| t.phase == phase).cloned().collect(),
        })
        .collect()
}

pub async fn projects(
    auth: CurrentUser,
    State(state): State<SharedState>,
) -> Json<Page<Envelope<Vec<PhaseColumn>>>> {
    let permissions = auth.permissions();
    let store = state.records.as_ref();
    let body: Guarded<Envelope<Vec<PhaseColumn>>> =
        guard_async(&permissions, required("/proyectos"), || async {
            db::tasks::list(store, Some(auth.id()), None)
                .await
                .map(phase_columns)
                .into()
        })
        .await;
    page("/proyectos", &permissions, body)
}

pub async fn admin(auth: CurrentUser, State(state): State<SharedState>) -> Json<Page<AdminContent>> {
    let permissions = auth.permissions();
    let body = guard(&permissions, required("/admin"), || AdminContent {
        app_config: state.session.app_config().clone(),
        signed_in_as: auth.user.clone(),
        roles: Role::ALL
            .into_iter()
            .map(|role| {
                let as_role = RolePermissions::for_user(Some(&User {
                    role,
                    ..auth.user.clone()
                }));
                RoleSummary {
                    role,
                    sections: nav::filter_navigation(nav::NAVIGATION, &as_role)
                        .into_iter()
                        .map(|entry| entry.label)
                        .collect(),
                }
            })
            .collect(),
    });
    page("/admin", &permissions, body)
}
