use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use papertrade_backend::app;
use papertrade_backend::auth::session::SessionStore;
use papertrade_backend::config::AppConfig;
use papertrade_backend::external::finnhub::FinnhubProvider;
use papertrade_backend::external::quote_provider::QuoteProvider;
use papertrade_backend::logging::{init_logging, LoggingConfig};
use papertrade_backend::services::job_scheduler_service::JobSchedulerService;
use papertrade_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    tracing::info!("🗄️ Connected to Postgres");

    let quotes: Arc<dyn QuoteProvider> = Arc::new(
        FinnhubProvider::from_env()
            .expect("Failed to create FinnhubProvider (check FINNHUB_API_KEY)"),
    );

    let sessions = SessionStore::new(config.session_ttl_hours);

    let mut scheduler = JobSchedulerService::new(sessions.clone()).await?;
    scheduler.start().await?;

    let port = config.port;
    let state = AppState {
        pool,
        sessions,
        quotes,
        config: Arc::new(config),
    };
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Papertrade backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
