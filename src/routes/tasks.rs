use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::Envelope;
use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges, TaskPhase};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListTasks {
    pub user_id: Option<Uuid>,
    pub fase: Option<TaskPhase>,
}

pub async fn list(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Query(params): Query<ListTasks>,
) -> Result<Envelope<Vec<Task>>, AppError> {
    let owner = auth.scope(params.user_id)?;
    Ok(db::tasks::list(state.records.as_ref(), Some(owner), params.fase)
        .await
        .into())
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub titulo: String,
    pub fase: TaskPhase,
    pub vencimiento: NaiveDate,
    pub responsable: String,
    pub user_id: Option<Uuid>,
}

pub async fn create(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Json(body): Json<CreateTask>,
) -> Result<Envelope<Task>, AppError> {
    let task = NewTask {
        title: body.titulo,
        phase: body.fase,
        due: body.vencimiento,
        assignee: body.responsable,
        user_id: auth.scope(body.user_id)?,
    };
    Ok(db::tasks::create(state.records.as_ref(), &task).await.into())
}

pub async fn update(
    _auth: CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<TaskChanges>,
) -> Envelope<Task> {
    db::tasks::update(state.records.as_ref(), id, &changes)
        .await
        .into()
}

pub async fn delete(
    _auth: CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Envelope<()> {
    db::tasks::delete(state.records.as_ref(), id).await.into()
}
