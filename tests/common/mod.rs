//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::connect_info::MockConnectInfo,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use resume_gateway::clock::ManualClock;
use resume_gateway::config::GatewayConfig;
use resume_gateway::http::{AppState, HttpServer};

pub const INDEX_HTML: &str = "<h1>Resume builder</h1>";
pub const START_MS: u64 = 1_700_000_000_000;

/// An in-process gateway over a throwaway static root, driven by a manual clock.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    root: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(true, |_| {})
    }

    pub fn build(with_index: bool, configure: impl FnOnce(&mut GatewayConfig)) -> Self {
        let root = tempfile::tempdir().unwrap();
        if with_index {
            std::fs::write(root.path().join("index.html"), INDEX_HTML).unwrap();
        }
        std::fs::create_dir(root.path().join("css")).unwrap();
        std::fs::write(root.path().join("css/site.css"), "body{}").unwrap();

        let mut config = test_config(root.path());
        configure(&mut config);

        let clock = Arc::new(ManualClock::new(START_MS));
        let server = HttpServer::with_clock(config, clock.clone()).unwrap();
        let peer: SocketAddr = "198.51.100.10:41000".parse().unwrap();

        Self {
            router: server.router().layer(MockConnectInfo(peer)),
            state: server.state().clone(),
            clock,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, client: &str, body: &Value) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", client)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Submit a resume through `/api/ats-analyze` as a single `file` part.
    pub async fn post_file(
        &self,
        client: &str,
        file_name: &str,
        content_type: &str,
        content: &[u8],
    ) -> TestResponse {
        let body = multipart_body(&[Part::File {
            name: "file",
            file_name,
            content_type,
            content,
        }]);
        self.send(multipart_request(client, body)).await
    }
}

pub fn test_config(root: &Path) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.static_files.root = root.to_string_lossy().into_owned();
    // tests stand in for the fronting proxy and name clients via X-Forwarded-For
    config.rate_limit.trust_forwarded_for = true;
    config
}

pub fn valid_cv() -> Value {
    json!({
        "nome": "Ana Lima",
        "cargo": "Desenvolvedora Backend",
        "email": "ana.lima@example.com",
        "telefone": "+55 (81) 99876-5432",
        "cidade": "Recife",
        "experiencia": "Seis anos construindo APIs",
        "formacao": "Engenharia da Computação",
        "habilidades": "Rust\nTokio\nPostgreSQL",
    })
}

pub const BOUNDARY: &str = "gateway-test-boundary";

pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        content: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                content_type,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(client: &str, body: Vec<u8>) -> Request<Body> {
    Request::post("/api/ats-analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("x-forwarded-for", client)
        .body(Body::from(body))
        .unwrap()
}
