use serde_json::{Value, json};
use uuid::Uuid;

use super::{StoreError, TableStore, decode_rows};
use crate::models::Task;

pub const DEFAULT_DAYS_AHEAD: u32 = 7;

/// Server-computed statistics; the shape is owned by `get_user_stats`.
pub async fn user_stats(store: &dyn TableStore, user_id: Uuid) -> Result<Value, StoreError> {
    store
        .rpc("get_user_stats", json!({ "user_uuid": user_id }))
        .await
        .inspect_err(|e| tracing::error!("Error fetching stats for {user_id}: {e}"))
}

pub async fn upcoming_tasks(
    store: &dyn TableStore,
    user_id: Uuid,
    days_ahead: u32,
) -> Result<Vec<Task>, StoreError> {
    let result = store
        .rpc(
            "get_upcoming_tasks",
            json!({ "user_uuid": user_id, "days_ahead": days_ahead }),
        )
        .await
        .inspect_err(|e| tracing::error!("Error fetching upcoming tasks for {user_id}: {e}"))?;

    match result {
        Value::Array(rows) => decode_rows(rows),
        Value::Null => Ok(Vec::new()),
        other => Err(StoreError::new(format!(
            "get_upcoming_tasks returned a non-list result: {other}"
        ))),
    }
}
