#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use waysbucks_api::auth::{generate_jwt, Claims};
use waysbucks_api::config::AppConfig;
use waysbucks_api::database::MemoryProfileRepository;
use waysbucks_api::upload::{ImageFile, ImageUploader, UploadError, UploadedImage};
use waysbucks_api::{app, AppState};

pub const BOUNDARY: &str = "waysbucks-test-boundary";
pub const SERVER_SECRET: &str = "spawned-server-secret";

/// Uploader that records files instead of calling the image host
#[derive(Default)]
pub struct StubUploader {
    pub uploads: Mutex<Vec<ImageFile>>,
    pub fail: bool,
}

#[async_trait]
impl ImageUploader for StubUploader {
    async fn upload(&self, file: ImageFile) -> Result<UploadedImage, UploadError> {
        if self.fail {
            return Err(UploadError::Rejected("stub failure".to_string()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(file);
        let public_id = format!("WaysBucks/test-{}", uploads.len());
        Ok(UploadedImage {
            secure_url: format!("https://res.cloudinary.test/{}.png", public_id),
            public_id,
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryProfileRepository>,
    pub uploader: Arc<StubUploader>,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_uploader(StubUploader::default())
    }

    pub fn with_uploader(uploader: StubUploader) -> Self {
        Self::build(Self::config(), uploader)
    }

    pub fn with_body_limit(max_request_size_bytes: usize) -> Self {
        let mut config = Self::config();
        config.api.max_request_size_bytes = max_request_size_bytes;
        Self::build(config, StubUploader::default())
    }

    pub fn config() -> AppConfig {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        config.upload.max_upload_bytes = 1024;
        config
    }

    fn build(config: AppConfig, uploader: StubUploader) -> Self {
        let repo = Arc::new(MemoryProfileRepository::new());
        let uploader = Arc::new(uploader);
        let state = AppState::new(config.clone(), repo.clone(), uploader.clone());

        Self {
            router: app(state),
            repo,
            uploader,
            config,
        }
    }

    pub fn token_for(&self, user_id: i32) -> String {
        generate_jwt(&Claims::new(user_id, 1).unwrap(), &self.config.security.jwt_secret).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(&self.router, request).await
    }
}

/// Drive a router once; non-JSON bodies come back as `Value::Null`
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn authed(method: Method, uri: &str, token: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
}

pub fn json_request(method: Method, uri: &str, token: &str, body: &Value) -> Request<Body> {
    authed(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One part of a multipart form: (name, file name + content type, bytes)
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

pub fn multipart_request(uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value).as_bytes(),
                );
            }
            Part::File(name, file_name, content_type, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    authed(Method::PATCH, uri, token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// The real server binary on a free port, killed when dropped
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_waysbucks-api"))
            .env("WAYSBUCKS_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("DATABASE_IN_MEMORY", "true")
            .env("DATABASE_SEED_USERS", "Seeded Dev:dev@waysbucks.test")
            .env("JWT_SECRET", SERVER_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK
                    || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl TestServer {
    pub fn token_for(&self, user_id: i32) -> String {
        generate_jwt(&Claims::new(user_id, 1).unwrap(), SERVER_SECRET).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
