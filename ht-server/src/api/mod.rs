use axum::{
    handler::Handler,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

use crate::storage::{ReportStore, StorageError};

pub mod files;
pub mod reports;

pub use files::Site;

pub const SAVE_REPORT_URI: &str = "/save-report";

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("No report file provided")]
    #[diagnostic(code(ht::error::bad_request))]
    MissingReport,
    #[error("report field has no filename")]
    #[diagnostic(code(ht::error::bad_request))]
    MissingFilename,
    #[error("invalid multipart body: {0}")]
    #[diagnostic(code(ht::error::bad_request))]
    InvalidMultipart(String),
    #[error("Error saving report: {0}")]
    #[diagnostic(code(ht::error::storage))]
    Storage(#[from] StorageError),
    #[error("Not found")]
    #[diagnostic(code(ht::error::not_found))]
    NotFound,
    #[error("Unsupported method ({0})")]
    #[diagnostic(code(ht::error::method))]
    UnsupportedMethod(Method),
    #[error("failed to read {0}")]
    #[diagnostic(code(ht::error::io))]
    Read(String, #[source] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingReport | ApiError::MissingFilename | ApiError::InvalidMultipart(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Storage(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Read(_, _) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(err = format!("{:?}", self), "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }

        (
            status,
            Json(json!({
                "status": "error",
                "message": self.to_string()
            })),
        )
            .into_response()
    }
}

/// Builds the router. Layers are added after the fallback so that they also wrap
/// it, which is what puts CORS headers on every response.
pub fn build(store: ReportStore, site: Site) -> Router {
    Router::new()
        .route(
            SAVE_REPORT_URI,
            post(reports::save_report)
                .options(preflight_handler)
                .get(files::site_handler)
                .fallback(files::site_handler.into_service()),
        )
        .fallback(files::site_handler.into_service())
        .layer(Extension(store))
        .layer(Extension(site))
        .layer(middleware::from_fn(cors_middleware))
}

pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn cors_middleware<B>(req: Request<B>, next: Next<B>) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}
