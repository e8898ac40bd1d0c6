use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ht_cli::api::ApiConfig;


pub const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.test-token";
pub const API_PREFIX: &str = "/api";

/// A stand-in for the health tracker backend, mounted under `/api`.
pub struct MockBackend {
    server: MockServer,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> ApiConfig {
        ApiConfig {
            base_url: format!("{}{}", self.server.uri(), API_PREFIX),
            ..ApiConfig::default()
        }
    }

    pub async fn healthy(&self) {
        self.respond("GET", "/health", 200, health_body(), 1).await;
    }

    pub async fn respond(&self, verb: &str, route: &str, status: u16, body: Value, times: u64) {
        Mock::given(method(verb))
            .and(path(format!("{}{}", API_PREFIX, route)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Like `respond`, but only matches requests carrying the bearer token.
    pub async fn respond_authorized(
        &self,
        verb: &str,
        route: &str,
        status: u16,
        body: Value,
        times: u64,
    ) {
        Mock::given(method(verb))
            .and(path(format!("{}{}", API_PREFIX, route)))
            .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    pub async fn respond_raw(&self, verb: &str, route: &str, status: u16, body: &str) {
        Mock::given(method(verb))
            .and(path(format!("{}{}", API_PREFIX, route)))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts every authenticated endpoint with a successful response,
    /// expecting each to be called `times` times.
    pub async fn authenticated_endpoints(&self, times: u64) {
        self.respond_authorized("GET", "/health-records", 200, records_body(), times)
            .await;
        self.respond_authorized("GET", "/users/profile", 200, profile_body(), times)
            .await;
        self.respond_authorized("POST", "/health-records", 201, created_body(), times)
            .await;
    }

    pub async fn received_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }
}

/// Base URL of a local port nothing listens on.
pub fn unreachable_base_url() -> String {
    let port = TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("no port available");
    format!("http://127.0.0.1:{}{}", port, API_PREFIX)
}

pub fn health_body() -> Value {
    json!({
        "status": "OK",
        "database": "connected",
        "timestamp": "2025-07-24T10:00:00.000Z"
    })
}

pub fn auth_body() -> Value {
    json!({
        "message": "Login successful",
        "user": { "id": 1, "email": "test@healthtracker.com", "name": "Test User" },
        "token": TOKEN
    })
}

pub fn records_body() -> Value {
    json!({
        "records": [
            { "id": 7, "date": "2025-07-24", "weight": "87.90", "bmi": "28.70" },
            { "id": 6, "date": "2025-07-23", "weight": "88.10", "bmi": "28.77" }
        ]
    })
}

pub fn profile_body() -> Value {
    json!({
        "user": {
            "id": 1,
            "email": "test@healthtracker.com",
            "name": "Test User",
            "created_at": "2025-07-01T09:00:00.000Z"
        }
    })
}

pub fn created_body() -> Value {
    json!({
        "message": "Health record created successfully",
        "record": { "id": 8, "date": "2025-07-25" }
    })
}
