// tests/common/mod.rs

#![allow(dead_code)]

use axum::{Json, Router, routing::get};
use econnect::{config::Config, db, routes, state::AppState};
use reqwest::{Client, Response, multipart, redirect};
use sqlx::SqlitePool;

pub const ADMIN_EMAIL: &str = "admin@econnect.test";
pub const ADMIN_PASSWORD: &str = "admin-pass";
pub const PASSWORD: &str = "password123";
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n% test document\n";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
}

/// Serves a fixed quote in the shape of the public quote API.
async fn spawn_quote_stub() -> String {
    let app = Router::new().route(
        "/quote",
        get(|| async {
            Json(serde_json::json!({
                "data": { "content": "Keep in touch.", "author": "Alumni Office" }
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}/quote", port)
}

pub fn test_config(quote_api_url: String) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        session_secret: "test_secret_for_integration_tests".to_string(),
        session_ttl: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        admin_name: "Test Admin".to_string(),
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        quote_api_url,
        max_upload_bytes: 1024 * 1024,
        static_dir: "static".to_string(),
    }
}

/// Spawns the app on a random port with a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    let quote_url = spawn_quote_stub().await;
    spawn_app_with(test_config(quote_url)).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    // One connection: every connection to sqlite::memory: is its own database.
    let pool = db::connect(&config.database_url, 1)
        .await
        .expect("Failed to open in-memory database");

    db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    db::seed_admin(&pool, &config).await.expect("Failed to seed admin");

    let state = AppState::new(pool.clone(), config).expect("Failed to build state");
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
    }
}

/// A browser-like client: keeps cookies, does not follow redirects.
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, client: &Client, path: &str) -> Response {
        client.get(self.url(path)).send().await.expect("request failed")
    }

    pub async fn post(&self, client: &Client, path: &str) -> Response {
        client.post(self.url(path)).send().await.expect("request failed")
    }

    /// Renders the login page, which drains pending flash messages.
    pub async fn flashes(&self, client: &Client) -> String {
        self.get(client, "/").await.text().await.unwrap()
    }

    pub async fn register_with(
        &self,
        client: &Client,
        name: &str,
        email: &str,
        enrollment_no: &str,
        document: &[u8],
        mime: &str,
    ) -> Response {
        let form = multipart::Form::new()
            .text("name", name.to_string())
            .text("email", email.to_string())
            .text("password", PASSWORD)
            .text("enrollment_no", enrollment_no.to_string())
            .text("faculty_no", "")
            .part(
                "id_proof",
                multipart::Part::bytes(document.to_vec())
                    .file_name("id_proof")
                    .mime_str(mime)
                    .unwrap(),
            );

        client
            .post(self.url("/register"))
            .multipart(form)
            .send()
            .await
            .expect("register failed")
    }

    pub async fn register(&self, client: &Client, name: &str, email: &str) -> Response {
        self.register_with(client, name, email, "", PDF_BYTES, "application/pdf")
            .await
    }

    pub async fn login(&self, client: &Client, email: &str, password: &str) -> Response {
        client
            .post(self.url("/"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("login failed")
    }

    pub async fn admin_client(&self) -> Client {
        let admin = client();
        let response = self.login(&admin, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(location(&response), "/admindashboard");
        admin
    }

    pub async fn user_id(&self, email: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM user WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Registers, verifies and logs a user in. Returns their client and id.
    pub async fn verified_user(&self, admin: &Client, name: &str, email: &str) -> (Client, i64) {
        let user = client();
        self.register(&user, name, email).await;
        let id = self.user_id(email).await;
        let response = self.post(admin, &format!("/verify/{}", id)).await;
        assert_eq!(response.status().as_u16(), 303);

        let response = self.login(&user, email, PASSWORD).await;
        assert_eq!(location(&response), "/home");
        (user, id)
    }

    pub async fn upload_profile(
        &self,
        client: &Client,
        fields: &[(&str, &str)],
        image: Option<(&[u8], &str)>,
    ) -> Response {
        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }
        form = match image {
            Some((bytes, mime)) => form.part(
                "user_image",
                multipart::Part::bytes(bytes.to_vec())
                    .file_name("avatar")
                    .mime_str(mime)
                    .unwrap(),
            ),
            // What a browser sends when no file was chosen.
            None => form.part(
                "user_image",
                multipart::Part::bytes(Vec::new())
                    .file_name("")
                    .mime_str("application/octet-stream")
                    .unwrap(),
            ),
        };

        client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .expect("upload failed")
    }

    pub async fn filter(&self, client: &Client, body: serde_json::Value) -> Vec<serde_json::Value> {
        let response = client
            .post(self.url("/filter_cards"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.unwrap()
    }
}
