use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use bestie::config::Config;
use bestie::sinks::{Sink, SinkError, SinkSet};
use bestie::submission::record::Envelope;

/// A running test server instance.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON body, return (body, status).
    pub async fn post_json(&self, path: &str, data: &Value) -> (Value, reqwest::StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(data)
            .send()
            .await
            .expect("post json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST form-urlencoded data, return (body, status).
    #[allow(dead_code)]
    pub async fn post_form(&self, path: &str, data: &[(&str, &str)]) -> (Value, reqwest::StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .form(data)
            .send()
            .await
            .expect("post form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn contact(&self, data: &Value) -> (Value, reqwest::StatusCode) {
        self.post_json("/api/contact", data).await
    }

    pub async fn booking(&self, data: &Value) -> (Value, reqwest::StatusCode) {
        self.post_json("/api/booking", data).await
    }
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        max_body_size: 65_536,
        static_dir: "public".to_string(),
        cors_origins: vec![],
        trusted_proxies: vec![],
        rate_limit: 1_000,
        rate_limit_window: Duration::from_secs(60),
        webhook_url: None,
        sink_timeout: Duration::from_secs(2),
        dispatch_deadline: None,
        notify_email: "ops@bestie.test".to_string(),
        smtp: None,
        database_url: None,
    }
}

/// Spawn the app with the given sinks on a random port.
pub async fn spawn_app(config: Config, sinks: SinkSet) -> TestApp {
    let (app, _state) = bestie::build_app(config, sinks);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
    }
}

/// In-memory sink that records what it was asked to deliver.
pub struct RecordingSink {
    name: &'static str,
    succeed: bool,
    delay: Duration,
    pub started: AtomicUsize,
    pub completed: AtomicUsize,
    pub payloads: Mutex<Vec<Value>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn ok(name: &'static str) -> Arc<Self> {
        Self::build(name, true, Duration::ZERO)
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Self::build(name, false, Duration::ZERO)
    }

    pub fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
        Self::build(name, true, delay)
    }

    fn build(name: &'static str, succeed: bool, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            succeed,
            delay,
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completions(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<Value> {
        self.payloads.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    fn name(&self) -> &str {
        self.name
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<String, SinkError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.payloads.lock().unwrap().push(envelope.payload.clone());
        self.completed.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok("recorded".to_string())
        } else {
            Err(SinkError::Transport("simulated outage".to_string()))
        }
    }
}

/// A local stand-in for the spreadsheet webhook.
#[allow(dead_code)]
pub struct MockWebhook {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Value>>>,
}

#[allow(dead_code)]
impl MockWebhook {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn hook(State(state): State<MockState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.received.lock().unwrap().push(body);
    (state.status, Json(json!({ "result": "ok" })))
}

async fn moved() -> (StatusCode, [(header::HeaderName, &'static str); 1]) {
    (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, "/hook")])
}

/// Spawn a mock webhook answering `POST /hook` with `status`; `POST /moved` redirects there.
#[allow(dead_code)]
pub async fn spawn_webhook(status: StatusCode) -> MockWebhook {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/hook", post(hook))
        .route("/moved", post(moved))
        .with_state(MockState {
            status,
            received: received.clone(),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock webhook");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock webhook failed");
    });

    MockWebhook { addr, received }
}

// ── Postgres ────────────────────────────────────────────────────

#[allow(dead_code)]
static DB_SEQ: AtomicUsize = AtomicUsize::new(0);

/// A freshly migrated database, dropped by [`TestDb::cleanup`].
#[allow(dead_code)]
pub struct TestDb {
    pub pool: PgPool,
    db_name: String,
    admin_url: String,
}

/// Create a unique test database, or `None` when `DATABASE_URL` is unset.
#[allow(dead_code)]
pub async fn spawn_db() -> Option<TestDb> {
    let _ = dotenvy::dotenv();
    let base_url = std::env::var("DATABASE_URL").ok()?;

    let db_name = format!(
        "bestie_test_{}_{}_{}",
        std::process::id(),
        chrono::Utc::now().timestamp_micros(),
        DB_SEQ.fetch_add(1, Ordering::SeqCst)
    );

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    Some(TestDb {
        pool,
        db_name,
        admin_url,
    })
}

#[allow(dead_code)]
impl TestDb {
    /// Drop the test database.
    pub async fn cleanup(self) {
        self.pool.close().await;

        if let Ok(admin_pool) = PgPoolOptions::new()
            .max_connections(2)
            .connect(&self.admin_url)
            .await
        {
            let _ = sqlx::query(&format!(
                "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                self.db_name
            ))
            .execute(&admin_pool)
            .await;
            admin_pool.close().await;
        }
    }
}
