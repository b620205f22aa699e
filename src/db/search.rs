use futures_util::future::try_join;
use serde::Serialize;
use uuid::Uuid;

use super::{EMAILS, INVOICES, Query, StoreError, TableStore, decode_rows};
use crate::models::{Email, Invoice};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Document {
    #[serde(rename = "correo")]
    Email(Email),
    #[serde(rename = "factura")]
    Invoice(Invoice),
}

/// Emails matching on subject or sender, then invoices matching on number or
/// supplier. Both lookups run concurrently; either failing fails the search.
pub async fn documents(
    store: &dyn TableStore,
    term: &str,
    user_id: Option<Uuid>,
) -> Result<Vec<Document>, StoreError> {
    let emails_query = Query::table(EMAILS)
        .matches_any(&["asunto", "remitente"], term)
        .eq_opt("user_id", user_id);
    let invoices_query = Query::table(INVOICES)
        .matches_any(&["num_factura", "proveedor"], term)
        .eq_opt("user_id", user_id);

    let (email_rows, invoice_rows) =
        try_join(store.select(&emails_query), store.select(&invoices_query))
            .await
            .inspect_err(|e| tracing::error!("Error searching documents: {e}"))?;

    let emails: Vec<Email> = decode_rows(email_rows)?;
    let invoices: Vec<Invoice> = decode_rows(invoice_rows)?;

    Ok(emails
        .into_iter()
        .map(Document::Email)
        .chain(invoices.into_iter().map(Document::Invoice))
        .collect())
}
