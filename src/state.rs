use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::session::SessionStore;
use crate::config::AppConfig;
use crate::external::quote_provider::QuoteProvider;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: SessionStore,
    pub quotes: Arc<dyn QuoteProvider>,
    pub config: Arc<AppConfig>,
}
