// src/main.rs

use dotenvy::dotenv;
use question_wizard_admin::config::Config;
use question_wizard_admin::routes;
use question_wizard_admin::state::AppState;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let activity_pool = connect_with_retry("activity", &config.activity_database_url, &config).await;
    let book_pool = connect_with_retry("book", &config.book_database_url, &config).await;

    // Create AppState
    let state = AppState {
        activity_pool,
        book_pool,
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}

/// Initialize a Database Pool with Retry.
async fn connect_with_retry(name: &str, url: &str, config: &Config) -> PgPool {
    let mut retry_count = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(config.db_connection_limit)
            .acquire_timeout(Duration::from_secs(3))
            .connect(url)
            .await
        {
            Ok(pool) => {
                tracing::info!("{} database connected...", name);
                break pool;
            }
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to {} database after 5 retries: {}", name, e);
                }
                tracing::warn!(
                    "{} database not ready, retrying in 2s... (Attempt {})",
                    name,
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}
