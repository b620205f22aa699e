use uuid::Uuid;

use super::{EMAILS, Query, StoreError, TableStore, decode_row, decode_rows, encode};
use crate::models::{Email, EmailChanges, NewEmail};

/// Newest first by message date.
pub async fn list(store: &dyn TableStore, user_id: Option<Uuid>) -> Result<Vec<Email>, StoreError> {
    let query = Query::table(EMAILS)
        .eq_opt("user_id", user_id)
        .order("fecha", false);
    let rows = store
        .select(&query)
        .await
        .inspect_err(|e| tracing::error!("Error fetching emails: {e}"))?;
    decode_rows(rows)
}

pub async fn create(store: &dyn TableStore, email: &NewEmail) -> Result<Email, StoreError> {
    let row = store
        .insert(EMAILS, encode(email)?)
        .await
        .inspect_err(|e| tracing::error!("Error creating email: {e}"))?;
    decode_row(row)
}

pub async fn update(
    store: &dyn TableStore,
    id: Uuid,
    changes: &EmailChanges,
) -> Result<Email, StoreError> {
    let row = store
        .update(EMAILS, id, encode(changes)?)
        .await
        .inspect_err(|e| tracing::error!("Error updating email {id}: {e}"))?;
    decode_row(row)
}

pub async fn delete(store: &dyn TableStore, id: Uuid) -> Result<(), StoreError> {
    store
        .delete(EMAILS, id)
        .await
        .inspect_err(|e| tracing::error!("Error deleting email {id}: {e}"))
}
