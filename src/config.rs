// src/config.rs

use std::env;

use crate::models::question::Difficulty;

/// Number of questions a session is built from.
pub const SESSION_QUESTION_LIMIT: usize = 10;

/// Total answering time a session may require, in seconds (15 minutes).
pub const SESSION_TIME_BUDGET_SECS: i64 = 900;

/// Largest accepted `time_required` for a single question, in seconds.
pub const MAX_TIME_REQUIRED_SECS: i64 = i32::MAX as i64;

/// Row-level errors reported back from a bulk import before truncation.
pub const MAX_IMPORT_ERRORS: usize = 10;

/// Desired question count per (topic, difficulty) bucket.
/// Order matters: buckets are filled front to back.
pub const TARGET_DISTRIBUTION: [(&str, Difficulty, usize); 7] = [
    ("Personal", Difficulty::Easy, 2),
    ("Technical", Difficulty::Easy, 2),
    ("Technical", Difficulty::Medium, 2),
    ("Problem Solving", Difficulty::Medium, 1),
    ("Teamwork", Difficulty::Medium, 1),
    ("Learning", Difficulty::Medium, 1),
    ("Architecture", Difficulty::Hard, 1),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    /// Fixed seed for question selection. Unset means OS entropy per session.
    pub selection_seed: Option<u64>,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://interview.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;

        let jwt_expiration = match env::var("JWT_EXPIRATION") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| format!("JWT_EXPIRATION must be a number of seconds: {}", e))?,
            Err(_) => 86_400,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let selection_seed = match env::var("SELECTION_SEED") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|e| format!("SELECTION_SEED must be an unsigned integer: {}", e))?,
            ),
            Err(_) => None,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            selection_seed,
            bind_addr,
        })
    }
}
