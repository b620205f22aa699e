use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPhase {
    #[serde(rename = "diseño")]
    Design,
    #[serde(rename = "compra")]
    Purchase,
    #[serde(rename = "instalación")]
    Installation,
}

impl TaskPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPhase::Design => "diseño",
            TaskPhase::Purchase => "compra",
            TaskPhase::Installation => "instalación",
        }
    }
}

/// Row of the `tareas` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "fase")]
    pub phase: TaskPhase,
    #[serde(rename = "vencimiento")]
    pub due: NaiveDate,
    #[serde(rename = "responsable")]
    pub assignee: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whole days from `today` until the due date; negative once overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due - today).num_days()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "fase")]
    pub phase: TaskPhase,
    #[serde(rename = "vencimiento")]
    pub due: NaiveDate,
    #[serde(rename = "responsable")]
    pub assignee: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskChanges {
    #[serde(rename = "titulo", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "fase", default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<TaskPhase>,
    #[serde(rename = "vencimiento", default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(rename = "responsable", default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}
