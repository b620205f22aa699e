use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceState {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "clasificada")]
    Classified,
}

impl InvoiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceState::Pending => "pendiente",
            InvoiceState::Classified => "clasificada",
        }
    }

    /// Invoices only ever move forward: pending -> classified.
    pub fn can_transition_to(&self, next: InvoiceState) -> bool {
        matches!(
            (self, next),
            (InvoiceState::Pending, InvoiceState::Classified)
                | (InvoiceState::Classified, InvoiceState::Classified)
        )
    }
}

/// Row of the `facturas` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    #[serde(rename = "num_factura")]
    pub number: String,
    #[serde(rename = "proveedor")]
    pub supplier: String,
    #[serde(rename = "importe")]
    pub amount: f64,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(rename = "estado")]
    pub state: InvoiceState,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    #[serde(rename = "num_factura")]
    pub number: String,
    #[serde(rename = "proveedor")]
    pub supplier: String,
    #[serde(rename = "importe")]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(rename = "estado", default = "pending")]
    pub state: InvoiceState,
    pub user_id: Uuid,
}

fn pending() -> InvoiceState {
    InvoiceState::Pending
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceChanges {
    #[serde(rename = "num_factura", default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(rename = "proveedor", default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(rename = "importe", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(rename = "estado", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<InvoiceState>,
}
