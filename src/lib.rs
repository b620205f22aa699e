pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod nav;
pub mod permissions;
pub mod routes;
pub mod session;
pub mod state;
pub mod supabase;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthBridge, AuthProvider, SupabaseAuth};
use crate::config::{Config, Environment};
use crate::db::{RestStore, TableStore};
use crate::session::{AppConfig, DurableStorage, FileStorage, RootClasses, SessionStore};
use crate::state::{AppState, SharedState};
use crate::supabase::SupabaseClient;

/// External collaborators the portal is wired to.
pub struct Backends {
    pub auth: Arc<dyn AuthProvider>,
    pub records: Arc<dyn TableStore>,
    pub storage: Arc<dyn DurableStorage>,
}

impl Backends {
    /// Hosted auth + REST store sharing one connection, with sessions kept
    /// under the configured storage directory.
    pub fn hosted(config: &Config) -> Result<Self, String> {
        let client = Arc::new(SupabaseClient::new(
            &config.supabase_url,
            &config.supabase_anon_key,
        )?);
        let storage: Arc<dyn DurableStorage> = Arc::new(FileStorage::new(&config.storage_dir)?);

        let auth = SupabaseAuth::new(Arc::clone(&client))
            .with_storage(Arc::clone(&storage))
            .with_reset_redirect(config.site_url.clone());

        Ok(Backends {
            auth: Arc::new(auth),
            records: Arc::new(RestStore::new(client)),
            storage,
        })
    }
}

/// Compose the session store, auth bridge and router. The caller owns the
/// lifecycle: mount `state.auth` before serving and release the returned
/// subscription on shutdown.
pub fn build_app(config: Config, backends: Backends) -> (Router, SharedState) {
    let theme = Arc::new(RootClasses::new());
    let session = SessionStore::open(
        backends.storage,
        theme.clone(),
        AppConfig::from_config(&config),
    );
    let auth = AuthBridge::new(backends.auth, session.clone());

    let dev_routes = config.environment == Environment::Development;

    let state: SharedState = Arc::new(AppState {
        config,
        session,
        auth,
        records: backends.records,
        theme,
    });

    let mut router = Router::new()
        .merge(routes::api_routes())
        .merge(views::page_routes())
        .route("/health", axum::routing::get(health));

    if dev_routes {
        tracing::info!("Development quick-login enabled");
        router = router.merge(routes::dev_routes());
    }

    let app = router
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state.clone());

    (app, state)
}

async fn health() -> &'static str {
    "ok"
}
