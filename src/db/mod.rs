//! Data access for the portal's record collections.
//!
//! Every operation returns `Result<T, StoreError>`: transport and backend
//! failures come back as values, are traced at the call site, and are never
//! retried.

pub mod emails;
pub mod invoices;
pub mod memory;
pub mod rest;
pub mod search;
pub mod stats;
pub mod summary;
pub mod tasks;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use rest::RestStore;

pub const EMAILS: &str = "correos";
pub const INVOICES: &str = "facturas";
pub const TASKS: &str = "tareas";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::new(format!("Store request failed: {err}"))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::new(format!("Unexpected row shape: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },
    /// Case-insensitive substring match on at least one of `columns`.
    MatchesAny { columns: Vec<String>, term: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Read request against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn eq_opt(self, column: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn matches_any(mut self, columns: &[&str], term: &str) -> Self {
        self.filters.push(Filter::MatchesAny {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            term: term.to_string(),
        });
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }
}

/// Table-oriented backend: rows keyed by a generated `id`, with
/// store-assigned `created_at`/`updated_at`, plus server-side procedures.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError>;
    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;
    async fn update(&self, table: &str, id: Uuid, changes: Value) -> Result<Value, StoreError>;
    async fn delete(&self, table: &str, id: Uuid) -> Result<(), StoreError>;
    async fn rpc(&self, function: &str, args: Value) -> Result<Value, StoreError>;
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

pub(crate) fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(StoreError::from)
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(StoreError::from)
}
