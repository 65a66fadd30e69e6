// tests/common/mod.rs

#![allow(dead_code)]

use interview_backend::{config::Config, db, routes, state::AppState};
use sqlx::SqlitePool;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
    pub admin_token: String,
}

/// Spawns the app on a random port over a fresh SQLite file.
pub async fn spawn_app() -> TestApp {
    let db_path = std::env::temp_dir().join(format!("interview-test-{}.db", uuid::Uuid::new_v4()));
    let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let pool = db::connect(&database_url, 5)
        .await
        .expect("Failed to open test database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to migrate database");

    let admin_username = format!("admin_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let config = Config {
        database_url,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: Some(admin_username.clone()),
        admin_password: Some(PASSWORD.to_string()),
        selection_seed: Some(2024),
        bind_addr: "127.0.0.1:0".to_string(),
    };

    db::seed_admin_user(&pool, &config)
        .await
        .expect("Failed to seed admin");

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let admin_token = login(&client, &address, &admin_username).await;

    TestApp {
        address,
        pool,
        client,
        admin_token,
    }
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

pub async fn login(client: &reqwest::Client, address: &str, username: &str) -> String {
    let resp = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"username": username, "password": PASSWORD}))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    resp["token"].as_str().expect("Token not found").to_string()
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a candidate and returns (user id, token).
    pub async fn candidate(&self) -> (i64, String) {
        let username = unique_name("cand");
        let user: serde_json::Value = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({"username": username, "password": PASSWORD}))
            .send()
            .await
            .expect("Register failed")
            .json()
            .await
            .unwrap();

        let id = user["id"].as_i64().expect("user id");
        let token = login(&self.client, &self.address, &username).await;
        (id, token)
    }

    pub async fn insert_question(&self, topic: &str, difficulty: &str, time_required: i64) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO questions (text, topic, difficulty, time_required) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(format!("{} {} question", topic, difficulty))
        .bind(topic)
        .bind(difficulty)
        .bind(time_required)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    /// `per_key` questions for each bucket of the session distribution.
    pub async fn seed_distribution(&self, per_key: usize, time_required: i64) {
        let keys = [
            ("Personal", "easy"),
            ("Technical", "easy"),
            ("Technical", "medium"),
            ("Problem Solving", "medium"),
            ("Teamwork", "medium"),
            ("Learning", "medium"),
            ("Architecture", "hard"),
        ];
        for (topic, difficulty) in keys {
            for _ in 0..per_key {
                self.insert_question(topic, difficulty, time_required).await;
            }
        }
    }

    pub async fn post(&self, path: &str, token: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
