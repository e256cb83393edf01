use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use consent_api::config::AppConfig;
use consent_api::database::DatabaseManager;
use consent_api::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "consent-api", version, about = "Consent capture API for ground-handling reservations")]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DATABASE_URL, AZURE_TENANT_ID, etc.
    let _ = dotenvy::dotenv();

    init_tracing();
    let args = Args::parse();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting consent API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    }

    let state = AppState::from_config(pool, config).context("failed to build HTTP client")?;
    let app = app(state);

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Consent API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Consent API stopped");
    Ok(())
}

/// `LOG_FORMAT=json` switches to structured output; `RUST_LOG` sets levels.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("consent_api=info,tower_http=info"));

    let json = std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
