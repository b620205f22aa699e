use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::Envelope;
use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Invoice, InvoiceChanges, InvoiceState, NewInvoice};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListInvoices {
    pub user_id: Option<Uuid>,
    pub estado: Option<InvoiceState>,
}

pub async fn list(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Query(params): Query<ListInvoices>,
) -> Result<Envelope<Vec<Invoice>>, AppError> {
    let owner = auth.scope(params.user_id)?;
    Ok(
        db::invoices::list(state.records.as_ref(), Some(owner), params.estado)
            .await
            .into(),
    )
}

/// Create body; `user_id` defaults to the caller.
#[derive(Deserialize)]
pub struct CreateInvoice {
    pub num_factura: String,
    pub proveedor: String,
    pub importe: f64,
    pub pdf_url: Option<String>,
    pub estado: Option<InvoiceState>,
    pub user_id: Option<Uuid>,
}

pub async fn create(
    auth: CurrentUser,
    State(state): State<SharedState>,
    Json(body): Json<CreateInvoice>,
) -> Result<Envelope<Invoice>, AppError> {
    let invoice = NewInvoice {
        number: body.num_factura,
        supplier: body.proveedor,
        amount: body.importe,
        pdf_url: body.pdf_url,
        state: body.estado.unwrap_or(InvoiceState::Pending),
        user_id: auth.scope(body.user_id)?,
    };
    Ok(db::invoices::create(state.records.as_ref(), &invoice)
        .await
        .into())
}

pub async fn update(
    _auth: CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<InvoiceChanges>,
) -> Result<Envelope<Invoice>, AppError> {
    // Checked here too so the caller gets a 400 rather than a store error.
    if changes.state == Some(InvoiceState::Pending) {
        return Err(AppError::BadRequest(
            "Invoices cannot return to the pending state".to_string(),
        ));
    }
    Ok(db::invoices::update(state.records.as_ref(), id, &changes)
        .await
        .into())
}

pub async fn classify(
    _auth: CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Envelope<Invoice> {
    db::invoices::classify(state.records.as_ref(), id).await.into()
}

pub async fn delete(
    _auth: CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Envelope<()> {
    db::invoices::delete(state.records.as_ref(), id).await.into()
}
