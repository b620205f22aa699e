pub mod pages;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

/// Page models for each navigation target, guarded by role at render time.
pub fn page_routes() -> Router<SharedState> {
    Router::new()
        .route("/pages", get(pages::panel))
        .route("/pages/chat", get(pages::chat))
        .route("/pages/documentos", get(pages::documents))
        .route("/pages/proyectos", get(pages::projects))
        .route("/pages/admin", get(pages::admin))
}
