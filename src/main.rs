use std::process;
use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tutorme::config::{AppEnv, Config, StoreBackend};
use tutorme::services::mailer::Mailer;
use tutorme::store::{InMemoryTutorRequestStore, PgTutorRequestStore, TutorRequestStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tutorme=info".into()))
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new("tutorme".into(), std::io::stdout))
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Server terminated");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    info!(app_env = ?config.app_env, store = ?config.store_backend, "Configuration loaded");

    let store: Arc<dyn TutorRequestStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_ref()
                .ok_or("DATABASE_URL is required for the postgres store")?;
            let db_pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url.expose_secret())
                .await?;
            sqlx::migrate!("./migrations").run(&db_pool).await?;
            info!("Database migrations applied");
            Arc::new(PgTutorRequestStore::new(db_pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store, data is lost on restart");
            let store = InMemoryTutorRequestStore::new();
            store.seed_sample_catalog();
            Arc::new(store)
        }
    };

    let email_service = config.email_service()?;
    if config.app_env != AppEnv::Test {
        match Mailer::new(Arc::clone(&email_service)).verify().await {
            Ok(()) => info!("Connected to email server"),
            Err(e) => warn!(
                error = %e,
                "Unable to connect to email server. Make sure you have configured the SMTP options"
            ),
        }
    }

    let app = tutorme::app_with_services(store, email_service);

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("Server starting at http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
