mod common;

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use copilot_portal::db::{RestStore, emails, invoices, search, stats, tasks};
use copilot_portal::models::{InvoiceChanges, InvoiceState, NewInvoice, TaskPhase};
use copilot_portal::supabase::SupabaseClient;

fn store(backend: &MockServer) -> (RestStore, Arc<SupabaseClient>) {
    let client = Arc::new(SupabaseClient::new(&backend.uri(), common::ANON_KEY).unwrap());
    (RestStore::new(client.clone()), client)
}

fn invoice_row(id: Uuid, user_id: Uuid, state: &str) -> serde_json::Value {
    json!({
        "id": id,
        "num_factura": "F-9",
        "proveedor": "Acme",
        "importe": 99.5,
        "pdf_url": null,
        "estado": state,
        "user_id": user_id,
        "created_at": "2026-10-01T08:00:00Z",
        "updated_at": "2026-10-01T08:00:00Z",
    })
}

#[tokio::test]
async fn list_sends_filters_and_order() {
    let backend = MockServer::start().await;
    let user = Uuid::now_v7();

    Mock::given(method("GET"))
        .and(path("/rest/v1/facturas"))
        .and(query_param("select", "*"))
        .and(query_param("user_id", format!("eq.{user}")))
        .and(query_param("estado", "eq.pendiente"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", common::ANON_KEY))
        .and(header("authorization", format!("Bearer {}", common::ANON_KEY).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([invoice_row(Uuid::now_v7(), user, "pendiente")])),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let (store, _) = store(&backend);
    let listed = invoices::list(&store, Some(user), Some(InvoiceState::Pending))
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].amount, 99.5);
}

#[tokio::test]
async fn signed_in_token_is_forwarded() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tareas"))
        .and(query_param("order", "vencimiento.asc"))
        .and(query_param("fase", "eq.diseño"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&backend)
        .await;

    let (store, client) = store(&backend);
    client.set_access_token(Some("user-token".to_string()));

    let listed = tasks::list(&store, None, Some(TaskPhase::Design)).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn search_uses_case_insensitive_or_filters() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/correos"))
        .and(query_param("or", r#"(asunto.ilike."*acme*",remitente.ilike."*acme*")"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/facturas"))
        .and(query_param("or", r#"(num_factura.ilike."*acme*",proveedor.ilike."*acme*")"#))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([invoice_row(Uuid::now_v7(), Uuid::now_v7(), "clasificada")])),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let (store, _) = store(&backend);
    let results = search::documents(&store, "acme", None).await.unwrap();

    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn insert_asks_for_the_created_row() {
    let backend = MockServer::start().await;
    let user = Uuid::now_v7();
    let id = Uuid::now_v7();

    Mock::given(method("POST"))
        .and(path("/rest/v1/facturas"))
        .and(header("prefer", "return=representation"))
        .and(header("accept", "application/vnd.pgrst.object+json"))
        .and(body_json(json!([{
            "num_factura": "F-9",
            "proveedor": "Acme",
            "importe": 99.5,
            "estado": "pendiente",
            "user_id": user,
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(invoice_row(id, user, "pendiente")))
        .expect(1)
        .mount(&backend)
        .await;

    let (store, _) = store(&backend);
    let created = invoices::create(
        &store,
        &NewInvoice {
            number: "F-9".to_string(),
            supplier: "Acme".to_string(),
            amount: 99.5,
            pdf_url: None,
            state: InvoiceState::Pending,
            user_id: user,
        },
    )
    .await
    .unwrap();

    assert_eq!(created.id, id);
}

#[tokio::test]
async fn update_patches_by_id() {
    let backend = MockServer::start().await;
    let id = Uuid::now_v7();
    let user = Uuid::now_v7();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/facturas"))
        .and(query_param("id", format!("eq.{id}")))
        .and(body_json(json!({ "estado": "clasificada" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(invoice_row(id, user, "clasificada")))
        .expect(1)
        .mount(&backend)
        .await;

    let (store, _) = store(&backend);
    let updated = invoices::classify(&store, id).await.unwrap();

    assert_eq!(updated.state, InvoiceState::Classified);
}

#[tokio::test]
async fn back_to_pending_never_reaches_the_backend() {
    let backend = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let (store, _) = store(&backend);
    let changes = InvoiceChanges {
        state: Some(InvoiceState::Pending),
        ..InvoiceChanges::default()
    };

    assert!(invoices::update(&store, Uuid::now_v7(), &changes).await.is_err());
}

#[tokio::test]
async fn delete_by_id() {
    let backend = MockServer::start().await;
    let id = Uuid::now_v7();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/correos"))
        .and(query_param("id", format!("eq.{id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&backend)
        .await;

    let (store, _) = store(&backend);
    emails::delete(&store, id).await.unwrap();
}

#[tokio::test]
async fn rpc_posts_arguments() {
    let backend = MockServer::start().await;
    let user = Uuid::now_v7();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/get_upcoming_tasks"))
        .and(body_json(json!({ "user_uuid": user, "days_ahead": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&backend)
        .await;

    let (store, _) = store(&backend);
    let upcoming = stats::upcoming_tasks(&store, user, stats::DEFAULT_DAYS_AHEAD)
        .await
        .unwrap();

    assert!(upcoming.is_empty());
}

#[tokio::test]
async fn error_body_becomes_store_error() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/correos"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "column correos.fecha does not exist",
            "code": "42703",
            "details": null,
            "hint": "Perhaps you meant to reference the column \"correos.date\".",
        })))
        .mount(&backend)
        .await;

    let (store, _) = store(&backend);
    let err = emails::list(&store, None).await.unwrap_err();

    assert_eq!(err.message, "column correos.fecha does not exist");
    assert_eq!(err.code.as_deref(), Some("42703"));
    assert!(err.hint.is_some());
}

#[tokio::test]
async fn non_json_error_keeps_status() {
    let backend = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/get_user_stats"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&backend)
        .await;

    let (store, _) = store(&backend);
    let err = stats::user_stats(&store, Uuid::now_v7()).await.unwrap_err();

    assert!(!err.message.is_empty());
    assert_eq!(err.code, None);
}
