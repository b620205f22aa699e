use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::Envelope;
use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Email, EmailChanges, NewEmail};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListEmails {
    pub user_id: Option<Uuid>,
}

pub async fn list(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Query(params): Query<ListEmails>,
) -> Result<Envelope<Vec<Email>>, AppError> {
    let owner = auth.scope(params.user_id)?;
    Ok(db::emails::list(state.records.as_ref(), Some(owner)).await.into())
}

#[derive(Deserialize)]
pub struct CreateEmail {
    pub asunto: String,
    pub remitente: String,
    pub fecha: DateTime<Utc>,
    pub pdf_url: Option<String>,
    pub user_id: Option<Uuid>,
}

pub async fn create(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Json(body): Json<CreateEmail>,
) -> Result<Envelope<Email>, AppError> {
    let email = NewEmail {
        subject: body.asunto,
        sender: body.remitente,
        date: body.fecha,
        pdf_url: body.pdf_url,
        user_id: auth.scope(body.user_id)?,
    };
    Ok(db::emails::create(state.records.as_ref(), &email).await.into())
}

pub async fn update(
    _auth: CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<EmailChanges>,
) -> Envelope<Email> {
    db::emails::update(state.records.as_ref(), id, &changes)
        .await
        .into()
}

pub async fn delete(
    _auth: CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Envelope<()> {
    db::emails::delete(state.records.as_ref(), id).await.into()
}
