use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Filter, Query, StoreError, TableStore};

type Procedure = Arc<dyn Fn(Value) -> Result<Value, StoreError> + Send + Sync>;

/// In-process table store with the same contract as the hosted one.
///
/// Timestamps are strictly increasing across all writes, so creation order
/// is always recoverable from `created_at`.
pub struct MemoryStore {
    tables: DashMap<String, Vec<Value>>,
    procedures: DashMap<String, Procedure>,
    failures: DashMap<String, String>,
    clock: Mutex<DateTime<Utc>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            procedures: DashMap::new(),
            failures: DashMap::new(),
            clock: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub fn register_procedure<F>(&self, name: &str, procedure: F)
    where
        F: Fn(Value) -> Result<Value, StoreError> + Send + Sync + 'static,
    {
        self.procedures.insert(name.to_string(), Arc::new(procedure));
    }

    /// Make every call against `table` (or `rpc/<name>`) fail with `message`.
    pub fn fail(&self, target: &str, message: &str) {
        self.failures.insert(target.to_string(), message.to_string());
    }

    pub fn recover(&self, target: &str) {
        self.failures.remove(target);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .get(table)
            .map(|rows| rows.value().clone())
            .unwrap_or_default()
    }

    fn check_failure(&self, target: &str) -> Result<(), StoreError> {
        match self.failures.get(target) {
            Some(message) => Err(StoreError::new(message.value().clone())),
            None => Ok(()),
        }
    }

    fn next_timestamp(&self) -> String {
        let mut last = self.clock.lock();
        let now = Utc::now();
        let next = if now > *last {
            now
        } else {
            *last + Duration::microseconds(1)
        };
        *last = next;
        next.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

fn matches_eq(cell: Option<&Value>, expected: &str) -> bool {
    match cell {
        Some(Value::String(s)) => s == expected,
        Some(Value::Null) | None => expected == "null",
        Some(other) => other.to_string() == expected,
    }
}

fn matches_term(row: &Value, columns: &[String], term: &str) -> bool {
    let term = term.to_lowercase();
    columns.iter().any(|column| {
        row.get(column)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains(&term))
    })
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq { column, value } => matches_eq(row.get(column), value),
        Filter::MatchesAny { columns, term } => matches_term(row, columns, term),
    })
}

/// Nulls sort after every value. Timestamps compare as instants.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn not_found(table: &str, id: Uuid) -> StoreError {
    StoreError {
        message: format!("No row in {table} with id {id}"),
        code: Some("PGRST116".to_string()),
        details: Some("The result contains 0 rows".to_string()),
        hint: None,
    }
}

fn as_object(value: Value, what: &str) -> Result<Map<String, Value>, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::new(format!("{what} must be a JSON object"))),
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.check_failure(&query.table)?;

        let mut rows: Vec<Value> = self
            .rows(&query.table)
            .into_iter()
            .filter(|row| row_matches(row, &query.filters))
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_cells(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        self.check_failure(table)?;

        let mut row = as_object(row, "Inserted row")?;
        let now = self.next_timestamp();
        row.insert("id".to_string(), Value::String(Uuid::now_v7().to_string()));
        row.insert("created_at".to_string(), Value::String(now.clone()));
        row.insert("updated_at".to_string(), Value::String(now));

        let row = Value::Object(row);
        self.tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: Uuid, changes: Value) -> Result<Value, StoreError> {
        self.check_failure(table)?;

        let changes = as_object(changes, "Update")?;
        let now = self.next_timestamp();
        let id_str = id.to_string();

        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| not_found(table, id))?;
        let row = rows
            .iter_mut()
            .find(|row| row.get("id").and_then(Value::as_str) == Some(id_str.as_str()))
            .ok_or_else(|| not_found(table, id))?;

        if let Value::Object(fields) = row {
            for (key, value) in changes {
                if matches!(key.as_str(), "id" | "created_at" | "updated_at") {
                    continue;
                }
                fields.insert(key, value);
            }
            fields.insert("updated_at".to_string(), Value::String(now));
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<(), StoreError> {
        self.check_failure(table)?;

        let id_str = id.to_string();
        if let Some(mut rows) = self.tables.get_mut(table) {
            rows.retain(|row| row.get("id").and_then(Value::as_str) != Some(id_str.as_str()));
        }
        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, StoreError> {
        self.check_failure(&format!("rpc/{function}"))?;

        let procedure = self
            .procedures
            .get(function)
            .map(|p| Arc::clone(p.value()))
            .ok_or_else(|| StoreError {
                message: format!("Could not find the function public.{function}"),
                code: Some("PGRST202".to_string()),
                details: None,
                hint: None,
            })?;
        procedure(args)
    }
}
