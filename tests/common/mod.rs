#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use report_desk::auth::jwt::{encode_token, Claims};
use report_desk::config::Config;
use report_desk::storage::{BlobStore, StorageError};

pub const JWT_SECRET: &str = "test-identity-secret-that-is-long-enough";
pub const PAGE_SIZE: i64 = 10;

/// In-memory blob store that records calls and can be told to fail.
#[derive(Default)]
pub struct RecordingBlobStore {
    pub blobs: Mutex<HashMap<String, Bytes>>,
    pub removed: Mutex<Vec<String>>,
    pub fail_store: AtomicBool,
    pub fail_remove: AtomicBool,
}

impl RecordingBlobStore {
    pub fn contains(&self, path: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(path)
    }

    pub fn stored_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn removed_paths(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn store(&self, path: &str, bytes: Bytes) -> Result<(), StorageError> {
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(StorageError::from("store unavailable"));
        }
        self.blobs.lock().unwrap().insert(path.to_string(), bytes);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        self.removed.lock().unwrap().push(path.to_string());
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(StorageError::from("remove unavailable"));
        }
        self.blobs.lock().unwrap().remove(path);
        Ok(())
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, StorageError> {
        Ok(format!("https://blobs.test/{path}?ttl={}", ttl.as_secs()))
    }
}

/// A person known to the identity provider.
#[derive(Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub token: String,
}

impl TestUser {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        let id = Uuid::now_v7();
        let email = format!("{}.{}@test.com", first_name.to_lowercase(), id.simple());
        let claims = Claims::new(id, &email, first_name, last_name);
        let token = encode_token(&claims, JWT_SECRET).unwrap();
        Self {
            id,
            email,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            token,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub storage: Arc<RecordingBlobStore>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// First authenticated request creates the profile; returns `/users/me`.
    pub async fn sign_in(&self, user: &TestUser) -> Value {
        let (body, status) = self.get_auth("/api/v1/users/me", &user.token).await;
        assert_eq!(status, StatusCode::OK, "sign in failed: {body}");
        body
    }

    /// Creates an employee profile and promotes it, as the organization's
    /// directory administrators would outside this service.
    pub async fn manager(&self, first_name: &str, last_name: &str) -> TestUser {
        let user = TestUser::new(first_name, last_name);
        self.sign_in(&user).await;
        sqlx::query("UPDATE users SET role = 'manager' WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await
            .expect("promote manager failed");
        user
    }

    pub async fn employee(&self, first_name: &str, last_name: &str) -> TestUser {
        let user = TestUser::new(first_name, last_name);
        self.sign_in(&user).await;
        user
    }

    /// Upload a report as multipart, return (body, status).
    pub async fn upload(&self, user: &TestUser, file_name: &str, notes: &str) -> (Value, StatusCode) {
        let form = Form::new()
            .part(
                "file",
                Part::bytes(b"quarterly numbers".to_vec()).file_name(file_name.to_string()),
            )
            .text("notes", notes.to_string());

        let resp = self
            .client
            .post(self.url("/api/v1/reports"))
            .bearer_auth(&user.token)
            .multipart(form)
            .send()
            .await
            .expect("upload request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Upload and return the created report JSON.
    pub async fn create_report(&self, user: &TestUser, notes: &str) -> Value {
        let (body, status) = self.upload(user, "report.pdf", notes).await;
        assert_eq!(status, StatusCode::CREATED, "create report failed: {body}");
        body
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated PUT request with JSON body.
    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn change_status(&self, report_id: &str, token: &str, status: &str) -> (Value, StatusCode) {
        self.put_auth(
            &format!("/api/v1/reports/{report_id}/status"),
            token,
            &json!({ "status": status }),
        )
        .await
    }

    pub async fn edit_notes(&self, report_id: &str, token: &str, notes: &str) -> (Value, StatusCode) {
        self.put_auth(
            &format!("/api/v1/reports/{report_id}"),
            token,
            &json!({ "notes": notes }),
        )
        .await
    }

    pub async fn report_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub fn test_config(database_url: String) -> Config {
    Config {
        database_url,
        identity_jwt_secret: JWT_SECRET.to_string(),
        storage_signing_key: "test-storage-signing-key".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        storage_dir: std::env::temp_dir().join("report-desk-test"),
        max_upload_bytes: 1_048_576,
        page_size: PAGE_SIZE,
        signed_url_ttl: Duration::from_secs(300),
        storage_timeout: Duration::from_secs(5),
        log_level: "warn".to_string(),
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let db_name = format!("report_desk_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
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
        .max_connections(10)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let storage = Arc::new(RecordingBlobStore::default());
    let (app, _state) =
        report_desk::build_app_with_storage(pool.clone(), test_config(test_url), storage.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
        storage,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
