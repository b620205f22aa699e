#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use copilot_portal::auth::{AuthProvider, AuthSubscription, SupabaseAuth};
use copilot_portal::config::{Config, Environment};
use copilot_portal::db::{MemoryStore, TableStore};
use copilot_portal::models::Role;
use copilot_portal::session::{DurableStorage, MemoryStorage};
use copilot_portal::state::SharedState;
use copilot_portal::supabase::SupabaseClient;
use copilot_portal::{Backends, build_app};

pub const ANON_KEY: &str = "test-anon-key";

/// A running portal wired to a mocked hosted auth API and an in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    pub records: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorage>,
    pub backend: MockServer,
    pub subscription: AuthSubscription,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        read(resp).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        read(resp).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("put request failed");
        read(resp).await
    }

    pub async fn delete(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("delete request failed");
        read(resp).await
    }

    /// Development quick login; returns the demo user's id.
    pub async fn login_as(&self, role: &str) -> Uuid {
        let (body, status) = self
            .post(&format!("/api/v1/dev/login-as/{role}"), &json!({}))
            .await;
        assert_eq!(status, StatusCode::OK, "quick login failed: {body}");
        body["id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn seed_invoice(&self, user_id: Uuid, number: &str, amount: f64, state: &str) -> Value {
        self.records
            .insert(
                "facturas",
                json!({
                    "num_factura": number,
                    "proveedor": "Suministros Norte",
                    "importe": amount,
                    "pdf_url": null,
                    "estado": state,
                    "user_id": user_id,
                }),
            )
            .await
            .unwrap()
    }

    pub async fn seed_task(&self, user_id: Uuid, title: &str, phase: &str, due: &str) -> Value {
        self.records
            .insert(
                "tareas",
                json!({
                    "titulo": title,
                    "fase": phase,
                    "vencimiento": due,
                    "responsable": "Juan",
                    "user_id": user_id,
                }),
            )
            .await
            .unwrap()
    }

    pub async fn seed_email(&self, user_id: Uuid, subject: &str, sender: &str, date: &str) -> Value {
        self.records
            .insert(
                "correos",
                json!({
                    "asunto": subject,
                    "remitente": sender,
                    "fecha": date,
                    "pdf_url": null,
                    "user_id": user_id,
                }),
            )
            .await
            .unwrap()
    }
}

async fn read(resp: reqwest::Response) -> (Value, StatusCode) {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(json!(null));
    (body, status)
}

pub fn test_config(backend_url: &str, storage_dir: PathBuf) -> Config {
    Config {
        supabase_url: backend_url.to_string(),
        supabase_anon_key: ANON_KEY.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        site_url: "http://portal.test".to_string(),
        storage_dir,
        environment: Environment::Development,
        company_name: "IngenieríaCopilot".to_string(),
        log_level: "warn".to_string(),
    }
}

/// Hosted auth provider pointed at `backend`.
pub fn hosted_auth(backend: &MockServer, storage: Arc<dyn DurableStorage>) -> SupabaseAuth {
    let client = Arc::new(SupabaseClient::new(&backend.uri(), ANON_KEY).unwrap());
    SupabaseAuth::new(client)
        .with_storage(storage)
        .with_reset_redirect("http://portal.test")
}

pub fn provider_user(id: Uuid, email: &str, name: &str, role: Role) -> Value {
    json!({
        "id": id,
        "email": email,
        "user_metadata": { "name": name, "role": role.as_str() },
    })
}

pub fn provider_session(user: Value) -> Value {
    json!({
        "access_token": format!("access-{}", Uuid::now_v7()),
        "refresh_token": "refresh-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "user": user,
    })
}

/// Accept `email`/`password` on the password grant and answer with a session
/// for `user`.
pub async fn mock_sign_in(backend: &MockServer, user: Value) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_session(user)))
        .mount(backend)
        .await;
}

pub async fn spawn_app() -> TestApp {
    let backend = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let records = Arc::new(MemoryStore::new());

    let auth: Arc<dyn AuthProvider> = Arc::new(hosted_auth(&backend, storage.clone()));
    let backends = Backends {
        auth,
        records: records.clone(),
        storage: storage.clone(),
    };

    let config = test_config(&backend.uri(), std::env::temp_dir());
    let (app, state) = build_app(config, backends);
    let subscription = state.auth.mount().await;

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        state,
        records,
        storage,
        backend,
        subscription,
    }
}

/// Release the auth subscription and stop the mock backend.
pub async fn cleanup(app: TestApp) {
    app.subscription.unsubscribe().await;
}
