use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::Envelope;
use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::db::search::Document;
use crate::db::summary::DashboardSummary;
use crate::error::AppError;
use crate::models::Task;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub user_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct OwnerParams {
    pub user_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpcomingParams {
    pub user_id: Option<Uuid>,
    pub days: Option<u32>,
}

pub async fn search(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Envelope<Vec<Document>>, AppError> {
    let term = params.q.trim();
    if term.is_empty() {
        return Err(AppError::BadRequest("Search term is required".to_string()));
    }
    let owner = auth.scope(params.user_id)?;
    Ok(db::search::documents(state.records.as_ref(), term, Some(owner))
        .await
        .into())
}

pub async fn stats(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Query(params): Query<OwnerParams>,
) -> Result<Envelope<Value>, AppError> {
    let owner = auth.scope(params.user_id)?;
    Ok(db::stats::user_stats(state.records.as_ref(), owner)
        .await
        .into())
}

pub async fn upcoming_tasks(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Query(params): Query<UpcomingParams>,
) -> Result<Envelope<Vec<Task>>, AppError> {
    let owner = auth.scope(params.user_id)?;
    let days = params.days.unwrap_or(db::stats::DEFAULT_DAYS_AHEAD);
    Ok(db::stats::upcoming_tasks(state.records.as_ref(), owner, days)
        .await
        .into())
}

pub async fn summary(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Query(params): Query<OwnerParams>,
) -> Result<Envelope<DashboardSummary>, AppError> {
    let owner = auth.scope(params.user_id)?;
    Ok(db::summary::load(state.records.as_ref(), owner).await.into())
}
