use uuid::Uuid;

use super::{Query, StoreError, TASKS, TableStore, decode_row, decode_rows, encode};
use crate::models::{NewTask, Task, TaskChanges, TaskPhase};

/// Soonest due first.
pub async fn list(
    store: &dyn TableStore,
    user_id: Option<Uuid>,
    phase: Option<TaskPhase>,
) -> Result<Vec<Task>, StoreError> {
    let query = Query::table(TASKS)
        .eq_opt("user_id", user_id)
        .eq_opt("fase", phase.map(|p| p.as_str()))
        .order("vencimiento", true);
    let rows = store
        .select(&query)
        .await
        .inspect_err(|e| tracing::error!("Error fetching tasks: {e}"))?;
    decode_rows(rows)
}

pub async fn create(store: &dyn TableStore, task: &NewTask) -> Result<Task, StoreError> {
    let row = store
        .insert(TASKS, encode(task)?)
        .await
        .inspect_err(|e| tracing::error!("Error creating task: {e}"))?;
    decode_row(row)
}

pub async fn update(
    store: &dyn TableStore,
    id: Uuid,
    changes: &TaskChanges,
) -> Result<Task, StoreError> {
    let row = store
        .update(TASKS, id, encode(changes)?)
        .await
        .inspect_err(|e| tracing::error!("Error updating task {id}: {e}"))?;
    decode_row(row)
}

pub async fn delete(store: &dyn TableStore, id: Uuid) -> Result<(), StoreError> {
    store
        .delete(TASKS, id)
        .await
        .inspect_err(|e| tracing::error!("Error deleting task {id}: {e}"))
}
