use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{Filter, Query, StoreError, TableStore};
use crate::supabase::{SupabaseClient, error_message};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// PostgREST-style hosted table API.
pub struct RestStore {
    client: Arc<SupabaseClient>,
}

#[derive(Deserialize)]
struct RestErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl RestStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    fn table_request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client.request(method, &self.client.rest_url(table))
    }
}

/// Query-string pairs for a read.
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for filter in &query.filters {
        match filter {
            Filter::Eq { column, value } => {
                params.push((column.clone(), format!("eq.{value}")));
            }
            Filter::MatchesAny { columns, term } => {
                let pattern = quote(&format!("*{term}*"));
                let clauses: Vec<String> = columns
                    .iter()
                    .map(|c| format!("{c}.ilike.{pattern}"))
                    .collect();
                params.push(("or".to_string(), format!("({})", clauses.join(","))));
            }
        }
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    params
}

/// Double-quote a value so commas and parentheses survive inside `or=(...)`.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

async fn check(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let err = match serde_json::from_str::<RestErrorBody>(&body) {
        Ok(parsed) if parsed.message.is_some() => StoreError {
            message: parsed.message.unwrap_or_default(),
            code: parsed.code,
            details: parsed.details,
            hint: parsed.hint,
        },
        _ => StoreError::new(error_message(status, &body)),
    };
    Err(err)
}

#[async_trait]
impl TableStore for RestStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let resp = self
            .table_request(Method::GET, &query.table)
            .query(&query_params(query))
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let resp = self
            .table_request(Method::POST, table)
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(&[row])
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn update(&self, table: &str, id: Uuid, changes: Value) -> Result<Value, StoreError> {
        let resp = self
            .table_request(Method::PATCH, table)
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())])
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(&changes)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<(), StoreError> {
        let resp = self
            .table_request(Method::DELETE, table)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, StoreError> {
        let resp = self
            .table_request(Method::POST, &format!("rpc/{function}"))
            .json(&args)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }
}
