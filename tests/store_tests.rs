use chrono::{Days, NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use copilot_portal::db::search::Document;
use copilot_portal::db::summary::DashboardSummary;
use copilot_portal::db::{
    EMAILS, INVOICES, MemoryStore, Query, StoreError, TASKS, TableStore, emails, invoices,
    search, stats, summary, tasks,
};
use copilot_portal::models::{
    EmailChanges, InvoiceChanges, InvoiceState, NewEmail, NewInvoice, NewTask, TaskChanges,
    TaskPhase,
};

fn new_invoice(user_id: Uuid, number: &str, supplier: &str, amount: f64) -> NewInvoice {
    NewInvoice {
        number: number.to_string(),
        supplier: supplier.to_string(),
        amount,
        pdf_url: None,
        state: InvoiceState::Pending,
        user_id,
    }
}

fn new_task(user_id: Uuid, title: &str, phase: TaskPhase, due: NaiveDate) -> NewTask {
    NewTask {
        title: title.to_string(),
        phase,
        due,
        assignee: "Juan Pérez".to_string(),
        user_id,
    }
}

fn new_email(user_id: Uuid, subject: &str, sender: &str, day: u32) -> NewEmail {
    NewEmail {
        subject: subject.to_string(),
        sender: sender.to_string(),
        date: Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
        pdf_url: None,
        user_id,
    }
}

// ── Memory store contract ───────────────────────────────────────

#[tokio::test]
async fn insert_assigns_identity_and_increasing_timestamps() {
    let store = MemoryStore::new();

    let a = store.insert(TASKS, json!({ "titulo": "a" })).await.unwrap();
    let b = store.insert(TASKS, json!({ "titulo": "b" })).await.unwrap();

    assert!(a["id"].as_str().unwrap().parse::<Uuid>().is_ok());
    assert_ne!(a["id"], b["id"]);
    assert!(a["created_at"].as_str().unwrap() < b["created_at"].as_str().unwrap());
    assert_eq!(a["created_at"], a["updated_at"]);
}

#[tokio::test]
async fn update_missing_row_is_an_error() {
    let store = MemoryStore::new();

    let err = store
        .update(INVOICES, Uuid::now_v7(), json!({ "estado": "clasificada" }))
        .await
        .unwrap_err();
    assert_eq!(err.code.as_deref(), Some("PGRST116"));
}

#[tokio::test]
async fn update_keeps_identity_columns() {
    let store = MemoryStore::new();
    let row = store.insert(TASKS, json!({ "titulo": "a" })).await.unwrap();
    let id: Uuid = row["id"].as_str().unwrap().parse().unwrap();

    let updated = store
        .update(TASKS, id, json!({ "titulo": "b", "id": "forged", "created_at": "x" }))
        .await
        .unwrap();

    assert_eq!(updated["id"], row["id"]);
    assert_eq!(updated["created_at"], row["created_at"]);
    assert_eq!(updated["titulo"], "b");
    assert!(updated["updated_at"].as_str().unwrap() > row["updated_at"].as_str().unwrap());
}

#[tokio::test]
async fn select_filters_and_orders_with_nulls_last() {
    let store = MemoryStore::new();
    store.insert("t", json!({ "k": "x", "n": 2 })).await.unwrap();
    store.insert("t", json!({ "k": "x", "n": null })).await.unwrap();
    store.insert("t", json!({ "k": "y", "n": 1 })).await.unwrap();
    store.insert("t", json!({ "k": "x", "n": 1 })).await.unwrap();

    let rows = store
        .select(&Query::table("t").eq("k", "x").order("n", true))
        .await
        .unwrap();
    let ns: Vec<&Value> = rows.iter().map(|r| &r["n"]).collect();
    assert_eq!(ns, [&json!(1), &json!(2), &Value::Null]);
}

#[tokio::test]
async fn timestamps_order_as_instants() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();
    for (subject, fecha) in [
        ("older", "2026-10-18T09:00:00Z"),
        ("newer", "2026-10-18T09:00:00.500Z"),
        ("earliest", "2026-10-18T10:30:00+02:00"),
        ("latest", "2026-10-18T08:45:00-01:00"),
    ] {
        store
            .insert(
                EMAILS,
                json!({ "asunto": subject, "remitente": "x@acme.es", "fecha": fecha, "user_id": user }),
            )
            .await
            .unwrap();
    }

    let subjects: Vec<String> = emails::list(&store, Some(user))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.subject)
        .collect();
    assert_eq!(subjects, ["latest", "newer", "older", "earliest"]);
}

#[tokio::test]
async fn failure_injection_and_recovery() {
    let store = MemoryStore::new();
    store.fail(EMAILS, "connection reset");

    let err = emails::list(&store, None).await.unwrap_err();
    assert_eq!(err, StoreError::new("connection reset"));

    store.recover(EMAILS);
    assert!(emails::list(&store, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_procedure() {
    let store = MemoryStore::new();

    let err = store.rpc("missing_fn", json!({})).await.unwrap_err();
    assert_eq!(err.code.as_deref(), Some("PGRST202"));
}

// ── Emails ──────────────────────────────────────────────────────

#[tokio::test]
async fn emails_crud_newest_first() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();
    let other = Uuid::now_v7();

    emails::create(&store, &new_email(user, "Pedido 12", "compras@acme.es", 3)).await.unwrap();
    let latest = emails::create(&store, &new_email(user, "Pedido 13", "compras@acme.es", 9))
        .await
        .unwrap();
    emails::create(&store, &new_email(other, "Otro", "x@y.es", 20)).await.unwrap();

    let listed = emails::list(&store, Some(user)).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, latest.id);
    assert_eq!(emails::list(&store, None).await.unwrap().len(), 3);

    let changes = EmailChanges {
        subject: Some("Pedido 13 (revisado)".to_string()),
        ..EmailChanges::default()
    };
    let updated = emails::update(&store, latest.id, &changes).await.unwrap();
    assert_eq!(updated.subject, "Pedido 13 (revisado)");
    assert_eq!(updated.sender, "compras@acme.es");

    emails::delete(&store, latest.id).await.unwrap();
    assert_eq!(emails::list(&store, Some(user)).await.unwrap().len(), 1);
}

// ── Invoices ────────────────────────────────────────────────────

#[tokio::test]
async fn pending_invoices_newest_first() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();

    let mut pending_ids = Vec::new();
    for (i, state) in ["pendiente", "clasificada", "pendiente", "clasificada", "pendiente"]
        .into_iter()
        .enumerate()
    {
        let mut invoice = new_invoice(user, &format!("F-00{i}"), "Acme", 100.0);
        invoice.state = if state == "pendiente" {
            InvoiceState::Pending
        } else {
            InvoiceState::Classified
        };
        let created = invoices::create(&store, &invoice).await.unwrap();
        if created.state == InvoiceState::Pending {
            pending_ids.push(created.id);
        }
    }

    let pending = invoices::list(&store, Some(user), Some(InvoiceState::Pending))
        .await
        .unwrap();
    let ids: Vec<Uuid> = pending.iter().map(|i| i.id).collect();
    pending_ids.reverse();
    assert_eq!(ids, pending_ids);
    assert!(pending.windows(2).all(|w| w[0].created_at > w[1].created_at));
}

#[tokio::test]
async fn new_invoice_defaults_to_pending() {
    let invoice: NewInvoice = serde_json::from_value(json!({
        "num_factura": "F-100",
        "proveedor": "Acme",
        "importe": 12.5,
        "user_id": Uuid::now_v7(),
    }))
    .unwrap();

    assert_eq!(invoice.state, InvoiceState::Pending);
}

#[tokio::test]
async fn classify_and_reject_back_to_pending() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();
    let invoice = invoices::create(&store, &new_invoice(user, "F-1", "Acme", 50.0))
        .await
        .unwrap();

    let classified = invoices::classify(&store, invoice.id).await.unwrap();
    assert_eq!(classified.state, InvoiceState::Classified);
    assert!(!InvoiceState::Classified.can_transition_to(InvoiceState::Pending));

    let back = InvoiceChanges {
        state: Some(InvoiceState::Pending),
        ..InvoiceChanges::default()
    };
    let err = invoices::update(&store, invoice.id, &back).await.unwrap_err();
    assert!(err.message.contains("pending"));

    let stored = invoices::list(&store, Some(user), None).await.unwrap();
    assert_eq!(stored[0].state, InvoiceState::Classified);
}

#[tokio::test]
async fn invoice_update_keeps_unspecified_fields() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();
    let invoice = invoices::create(&store, &new_invoice(user, "F-2", "Acme", 75.0))
        .await
        .unwrap();

    let changes = InvoiceChanges {
        amount: Some(80.0),
        ..InvoiceChanges::default()
    };
    let updated = invoices::update(&store, invoice.id, &changes).await.unwrap();

    assert_eq!(updated.amount, 80.0);
    assert_eq!(updated.number, "F-2");
    assert_eq!(updated.state, InvoiceState::Pending);
}

// ── Tasks ───────────────────────────────────────────────────────

#[tokio::test]
async fn tasks_by_phase_soonest_first() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();
    let day = |d| NaiveDate::from_ymd_opt(2026, 11, d).unwrap();

    tasks::create(&store, &new_task(user, "Planos", TaskPhase::Design, day(20))).await.unwrap();
    tasks::create(&store, &new_task(user, "Cálculo", TaskPhase::Design, day(5))).await.unwrap();
    tasks::create(&store, &new_task(user, "Pedido", TaskPhase::Purchase, day(1))).await.unwrap();

    let design = tasks::list(&store, Some(user), Some(TaskPhase::Design)).await.unwrap();
    let titles: Vec<&str> = design.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Cálculo", "Planos"]);

    let all = tasks::list(&store, Some(user), None).await.unwrap();
    assert_eq!(all[0].title, "Pedido");

    let changes = TaskChanges {
        phase: Some(TaskPhase::Installation),
        ..TaskChanges::default()
    };
    let moved = tasks::update(&store, all[0].id, &changes).await.unwrap();
    assert_eq!(moved.phase, TaskPhase::Installation);

    tasks::delete(&store, moved.id).await.unwrap();
    assert_eq!(tasks::list(&store, Some(user), None).await.unwrap().len(), 2);
}

// ── Search ──────────────────────────────────────────────────────

#[tokio::test]
async fn search_matches_emails_then_invoices() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();

    emails::create(&store, &new_email(user, "Oferta ACME bombas", "ventas@proveedor.es", 2))
        .await
        .unwrap();
    emails::create(&store, &new_email(user, "Reunión", "jefe@empresa.es", 3)).await.unwrap();
    invoices::create(&store, &new_invoice(user, "F-77", "Acme Industrial", 10.0)).await.unwrap();
    invoices::create(&store, &new_invoice(user, "F-78", "Otro", 10.0)).await.unwrap();

    let results = search::documents(&store, "acme", Some(user)).await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(matches!(&results[0], Document::Email(e) if e.subject == "Oferta ACME bombas"));
    assert!(matches!(&results[1], Document::Invoice(i) if i.number == "F-77"));

    let tagged = serde_json::to_value(&results).unwrap();
    assert_eq!(tagged[0]["type"], "correo");
    assert_eq!(tagged[1]["type"], "factura");
}

#[tokio::test]
async fn search_fails_if_either_lookup_fails() {
    let store = MemoryStore::new();
    store.fail(INVOICES, "timeout");

    let err = search::documents(&store, "x", None).await.unwrap_err();
    assert_eq!(err.message, "timeout");
}

// ── Stats ───────────────────────────────────────────────────────

#[tokio::test]
async fn stats_forward_to_procedures() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();
    store.register_procedure("get_user_stats", |args| {
        Ok(json!({ "for": args["user_uuid"], "facturas_pendientes": 3 }))
    });
    store.register_procedure("get_upcoming_tasks", move |args| {
        assert_eq!(args["days_ahead"], stats::DEFAULT_DAYS_AHEAD);
        Ok(json!([{
            "id": Uuid::now_v7(),
            "titulo": "Montaje",
            "fase": "instalación",
            "vencimiento": "2026-10-21",
            "responsable": "Ana",
            "user_id": args["user_uuid"],
            "created_at": "2026-10-01T00:00:00Z",
            "updated_at": "2026-10-01T00:00:00Z",
        }]))
    });

    let result = stats::user_stats(&store, user).await.unwrap();
    assert_eq!(result["for"], user.to_string());
    assert_eq!(result["facturas_pendientes"], 3);

    let upcoming = stats::upcoming_tasks(&store, user, stats::DEFAULT_DAYS_AHEAD)
        .await
        .unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].phase, TaskPhase::Installation);
    assert_eq!(upcoming[0].user_id, user);
}

#[tokio::test]
async fn upcoming_tasks_null_is_empty() {
    let store = MemoryStore::new();
    store.register_procedure("get_upcoming_tasks", |_| Ok(Value::Null));

    let upcoming = stats::upcoming_tasks(&store, Uuid::now_v7(), 3).await.unwrap();
    assert!(upcoming.is_empty());
}

// ── Dashboard summary ───────────────────────────────────────────

#[tokio::test]
async fn summary_aggregates_all_three_collections() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();
    let today = Utc::now().date_naive();

    for day in 1..=7 {
        emails::create(&store, &new_email(user, &format!("Correo {day}"), "a@b.es", day))
            .await
            .unwrap();
    }
    invoices::create(&store, &new_invoice(user, "F-1", "Acme", 100.0)).await.unwrap();
    let second = invoices::create(&store, &new_invoice(user, "F-2", "Acme", 50.0)).await.unwrap();
    invoices::classify(&store, second.id).await.unwrap();

    let in_days = |d: u64| today.checked_add_days(Days::new(d)).unwrap();
    tasks::create(&store, &new_task(user, "Hoy", TaskPhase::Design, today)).await.unwrap();
    tasks::create(&store, &new_task(user, "Semana", TaskPhase::Purchase, in_days(7))).await.unwrap();
    tasks::create(&store, &new_task(user, "Luego", TaskPhase::Purchase, in_days(30))).await.unwrap();
    tasks::create(
        &store,
        &new_task(user, "Vencida", TaskPhase::Installation, today.pred_opt().unwrap()),
    )
    .await
    .unwrap();

    let summary = summary::load(&store, user).await.unwrap();

    assert_eq!(summary.emails.total, 7);
    assert_eq!(summary.emails.recent.len(), 5);
    assert_eq!(summary.emails.recent[0].subject, "Correo 7");

    assert_eq!(summary.invoices.total, 2);
    assert_eq!(summary.invoices.pending, 1);
    assert_eq!(summary.invoices.classified, 1);
    assert_eq!(summary.invoices.total_amount, 150.0);
    assert_eq!(summary.invoices.pending_amount, 100.0);

    assert_eq!(summary.tasks.total, 4);
    assert_eq!(summary.tasks.by_phase.design, 1);
    assert_eq!(summary.tasks.by_phase.purchase, 2);
    assert_eq!(summary.tasks.by_phase.installation, 1);
    assert_eq!(summary.tasks.due_soon, 2);
}

#[tokio::test]
async fn summary_fails_when_task_listing_fails() {
    let store = MemoryStore::new();
    let user = Uuid::now_v7();
    invoices::create(&store, &new_invoice(user, "F-1", "Acme", 100.0)).await.unwrap();
    store.fail(TASKS, "tareas unavailable");

    let err = summary::load(&store, user).await.unwrap_err();

    assert_eq!(err.message, "tareas unavailable");
}

#[test]
fn summary_of_nothing_is_zero() {
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let summary = DashboardSummary::from_records(Vec::new(), &[], &[], today);

    assert_eq!(summary.emails.total, 0);
    assert!(summary.emails.recent.is_empty());
    assert_eq!(summary.invoices.total_amount, 0.0);
    assert_eq!(summary.tasks.due_soon, 0);
}
