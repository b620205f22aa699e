use std::sync::Arc;

use crate::auth::AuthBridge;
use crate::config::Config;
use crate::db::TableStore;
use crate::session::{RootClasses, SessionStore};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub session: SessionStore,
    pub auth: AuthBridge,
    pub records: Arc<dyn TableStore>,
    pub theme: Arc<RootClasses>,
}
