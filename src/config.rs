// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Roles allowed to edit wizard questions.
pub const EDITOR_ROLES: [&str; 2] = ["admin", "ogretmen"];

pub const DEFAULT_PORT: u16 = 3010;

#[derive(Debug, Clone)]
pub struct Config {
    /// Activity wizard database (activities, their questions, options, stages).
    pub activity_database_url: String,
    /// Unit wizard database (books, their questions, options, stages).
    pub book_database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    /// Allowed origins; empty means any origin.
    pub cors_origins: Vec<String>,
    pub db_connection_limit: u32,
    pub body_size_limit_mb: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let activity_database_url = env::var("ACTIVITY_DATABASE_URL")
            .expect("ACTIVITY_DATABASE_URL must be set");

        let book_database_url = env::var("BOOK_DATABASE_URL")
            .expect("BOOK_DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = parse_origins(&env::var("CORS_ORIGIN").unwrap_or_default());

        let db_connection_limit = env::var("DB_CONNECTION_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let body_size_limit_mb = env::var("BODY_SIZE_LIMIT_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            activity_database_url,
            book_database_url,
            jwt_secret,
            rust_log,
            port,
            cors_origins,
            db_connection_limit,
            body_size_limit_mb,
        }
    }
}

/// `*` or an empty value allows any origin.
pub fn parse_origins(raw: &str) -> Vec<String> {
    if raw.trim() == "*" {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
