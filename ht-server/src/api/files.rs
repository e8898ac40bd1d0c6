use std::fmt::Write as _;

use axum::{
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Extension,
};
use camino::{Utf8Path, Utf8PathBuf};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::fs;

use crate::api::{preflight_handler, ApiError};

const INDEX_FILE: &str = "index.html";
const TEST_PAGES_DIR: &str = "tests";

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Directory the test pages are served from.
#[derive(Clone, Debug)]
pub struct Site {
    root: Utf8PathBuf,
}

impl Site {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Maps a request path onto the site root. Returns `None` for paths that
    /// are not UTF-8 or that try to climb out of the root.
    pub fn resolve(&self, request_path: &str) -> Option<Utf8PathBuf> {
        let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
        let mut path = self.root.clone();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if s.contains(['\\', '\0']) => return None,
                s => path.push(s),
            }
        }
        Some(path)
    }

    /// URL paths of the HTML test pages under `<root>/tests`, sorted.
    pub fn test_pages(&self) -> Vec<String> {
        let dir = self.root.join(TEST_PAGES_DIR);
        let mut pages: Vec<String> = match dir.read_dir_utf8() {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension() == Some("html"))
                .map(|e| format!("/{}/{}", TEST_PAGES_DIR, e.file_name()))
                .collect(),
            Err(_) => Vec::new(),
        };
        pages.sort();
        pages
    }
}

/// Handles every request that has no dedicated route.
pub async fn site_handler(method: Method, uri: Uri, Extension(site): Extension<Site>) -> Response {
    match method {
        Method::GET | Method::HEAD => match static_file(&site, &uri).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        },
        Method::OPTIONS => preflight_handler().await.into_response(),
        Method::POST => ApiError::NotFound.into_response(),
        other => ApiError::UnsupportedMethod(other).into_response(),
    }
}

async fn static_file(site: &Site, uri: &Uri) -> Result<Response, ApiError> {
    let path = site.resolve(uri.path()).ok_or(ApiError::NotFound)?;
    let metadata = fs::metadata(&path).await.map_err(|_| ApiError::NotFound)?;

    if metadata.is_dir() {
        if !uri.path().ends_with('/') {
            return Ok(redirect(&format!("{}/", uri.path())));
        }
        let index = path.join(INDEX_FILE);
        if fs::metadata(&index).await.map(|m| m.is_file()).unwrap_or(false) {
            return file_response(&index).await;
        }
        return directory_listing(&path, uri.path()).await;
    }

    file_response(&path).await
}

async fn file_response(path: &Utf8Path) -> Result<Response, ApiError> {
    let contents = fs::read(path)
        .await
        .map_err(|e| ApiError::Read(path.to_string(), e))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    tracing::trace!(path = path.as_str(), bytes = contents.len(), "serving file");

    Ok(([(header::CONTENT_TYPE, mime.to_string())], contents).into_response())
}

async fn directory_listing(dir: &Utf8Path, request_path: &str) -> Result<Response, ApiError> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| ApiError::Read(dir.to_string(), e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ApiError::Read(dir.to_string(), e))?
    {
        let mut name = entry.file_name().to_string_lossy().to_string();
        if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    let title = format!("Directory listing for {}", escape_html(request_path));
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{0}</title></head>\n<body>\n<h1>{0}</h1>\n<hr>\n<ul>\n",
        title
    );
    for name in &names {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            utf8_percent_encode(name, PATH_SEGMENT),
            escape_html(name)
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");

    Ok(Html(html).into_response())
}

fn redirect(location: &str) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
