use uuid::Uuid;

use super::{INVOICES, Query, StoreError, TableStore, decode_row, decode_rows, encode};
use crate::models::{Invoice, InvoiceChanges, InvoiceState, NewInvoice};

/// Newest first by creation time, optionally narrowed to one owner and state.
pub async fn list(
    store: &dyn TableStore,
    user_id: Option<Uuid>,
    state: Option<InvoiceState>,
) -> Result<Vec<Invoice>, StoreError> {
    let query = Query::table(INVOICES)
        .eq_opt("user_id", user_id)
        .eq_opt("estado", state.map(|s| s.as_str()))
        .order("created_at", false);
    let rows = store
        .select(&query)
        .await
        .inspect_err(|e| tracing::error!("Error fetching invoices: {e}"))?;
    decode_rows(rows)
}

pub async fn create(store: &dyn TableStore, invoice: &NewInvoice) -> Result<Invoice, StoreError> {
    let row = store
        .insert(INVOICES, encode(invoice)?)
        .await
        .inspect_err(|e| tracing::error!("Error creating invoice: {e}"))?;
    decode_row(row)
}

/// Partial update. Moving an invoice back to pending is rejected before any
/// request is made.
pub async fn update(
    store: &dyn TableStore,
    id: Uuid,
    changes: &InvoiceChanges,
) -> Result<Invoice, StoreError> {
    if changes.state == Some(InvoiceState::Pending) {
        tracing::warn!("Rejected transition of invoice {id} back to pending");
        return Err(StoreError::new(
            "Invoices cannot return to the pending state",
        ));
    }

    let row = store
        .update(INVOICES, id, encode(changes)?)
        .await
        .inspect_err(|e| tracing::error!("Error updating invoice {id}: {e}"))?;
    decode_row(row)
}

pub async fn classify(store: &dyn TableStore, id: Uuid) -> Result<Invoice, StoreError> {
    let changes = InvoiceChanges {
        state: Some(InvoiceState::Classified),
        ..InvoiceChanges::default()
    };
    update(store, id, &changes).await
}

pub async fn delete(store: &dyn TableStore, id: Uuid) -> Result<(), StoreError> {
    store
        .delete(INVOICES, id)
        .await
        .inspect_err(|e| tracing::error!("Error deleting invoice {id}: {e}"))
}
