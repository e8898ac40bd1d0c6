use std::time::Duration;

use ht_core::mask;
use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::Level;
use url::Url;

use crate::{probe::ProbeError, CliError};

type Result<T> = std::result::Result<T, ProbeError>;

/// HTTP client for the backend under test. Holds the bearer token obtained by
/// login or registration for the rest of the run.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str) -> std::result::Result<Self, CliError> {
        Url::parse(base_url).map_err(|source| CliError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(CliError::ClientBuildError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: String) {
        tracing::debug!(token = mask::token(&token).as_str(), "using bearer token");
        self.token = Some(token);
    }

    /// Joins `path` onto the base URL by concatenation, so a base URL with a
    /// path prefix such as `/api` keeps it.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    pub async fn get<RS: DeserializeOwned>(
        &self,
        path: &str,
        expected: StatusCode,
        timeout: Option<Duration>,
    ) -> Result<RS> {
        let mut req = self.authorized(Method::GET, path)?;
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }
        self.execute(req, path, expected).await
    }

    pub async fn post<RQ: Serialize, RS: DeserializeOwned>(
        &self,
        path: &str,
        body: &RQ,
        expected: StatusCode,
    ) -> Result<RS> {
        if tracing::event_enabled!(Level::TRACE) {
            if let Ok(json) = serde_json::to_string(body) {
                tracing::trace!(path = path, body = json.as_str(), "sending request");
            }
        }
        let req = self.authorized(Method::POST, path)?.json(body);
        self.execute(req, path, expected).await
    }

    /// Sends an unauthenticated `GET` and returns only the status code.
    pub async fn status_of(&self, path: &str, timeout: Duration) -> Result<StatusCode> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url.as_str(), e))?;
        Ok(response.status())
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let mut req = self
            .client
            .request(method, self.endpoint(path)?)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn execute<RS: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        path: &str,
        expected: StatusCode,
    ) -> Result<RS> {
        let url = self.endpoint(path)?;
        let response = req.send().await.map_err(|e| classify(url.as_str(), e))?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(
            path = path,
            status = status.as_u16(),
            bytes = bytes.len(),
            "received response"
        );

        if status != expected {
            return Err(ProbeError::UnexpectedStatus {
                status,
                body: String::from_utf8_lossy(&bytes).to_string(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| ProbeError::Decode {
            source,
            body: String::from_utf8_lossy(&bytes).to_string(),
        })
    }
}

fn classify(url: &str, e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        ProbeError::Connect {
            url: url.to_string(),
            source: e,
        }
    } else {
        ProbeError::Request(e)
    }
}
