use std::net::SocketAddr;

use argh::FromArgs;
use camino::Utf8PathBuf;
use dotenv::dotenv;
use ht_core::config::{
    env_or, env_parse_or, DEFAULT_REPORTS_DIR, DEFAULT_SERVER_PORT, DEFAULT_SITE_ROOT,
};
use miette::{Diagnostic, Result};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::{self, Site};
use crate::storage::{ReportStore, StorageError};

pub struct App {
    args: Args,
}

#[derive(Error, Diagnostic, Debug)]
pub enum AppError {
    #[error("site root {path} is not a directory")]
    #[diagnostic(code(ht::error::configuration))]
    InvalidRoot { path: Utf8PathBuf },
    #[error("failed to prepare reports directory: {0}")]
    #[diagnostic(code(ht::error::storage))]
    ReportsDirectory(#[from] StorageError),
    #[error("failed to listen on {address}: {source}")]
    #[diagnostic(code(ht::error::bind))]
    Bind {
        address: SocketAddr,
        #[source]
        source: hyper::Error,
    },
    #[error("server error: {0}")]
    #[diagnostic(code(ht::error::server))]
    Serve(#[source] hyper::Error),
}

impl App {
    pub fn new() -> Self {
        dotenv().ok();
        Self::with_args(argh::from_env())
    }

    pub fn with_args(args: Args) -> Self {
        Self { args }
    }

    pub async fn run(&self) -> Result<()> {
        miette::set_panic_hook();

        if std::env::var_os("RUST_BACKTRACE").is_none() {
            std::env::set_var("RUST_BACKTRACE", "1")
        }

        if std::env::var_os("RUST_LOG").is_none() {
            std::env::set_var("RUST_LOG", "ht_server=debug")
        }

        if self.args.json {
            tracing_subscriber::fmt::fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .try_init()
                .ok();
        } else {
            tracing_subscriber::fmt::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .try_init()
                .ok();
        }

        if !self.args.root.is_dir() {
            return Err(AppError::InvalidRoot {
                path: self.args.root.clone(),
            }
            .into());
        }
        let site = Site::new(self.args.root.clone());

        let store = ReportStore::new(self.args.reports_dir.clone());
        if store.ensure_dir().await.map_err(AppError::from)? {
            tracing::info!(path = store.dir().as_str(), "created reports directory");
        }

        let reports_path = store
            .dir()
            .canonicalize_utf8()
            .unwrap_or_else(|_| store.dir().to_path_buf());
        let port = self.args.listen_address.port();
        let test_pages = site.test_pages();

        let router = api::build(store, site);

        let server = axum::Server::try_bind(&self.args.listen_address)
            .map_err(|source| AppError::Bind {
                address: self.args.listen_address,
                source,
            })?
            .serve(router.into_make_service());

        tracing::info!(
            ip = self.args.listen_address.ip().to_string().as_str(),
            port = port,
            url = format!("http://localhost:{}", port),
            root = self.args.root.as_str(),
            reports = reports_path.as_str(),
            "test server started"
        );
        for page in &test_pages {
            tracing::info!(url = format!("http://localhost:{}{}", port, page), "test page");
        }

        server
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(AppError::Serve)?;

        tracing::info!("test server stopped");

        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("ctrl-c received");
}

#[derive(FromArgs)]
/// Serves the frontend test pages and stores uploaded test reports.
pub struct Args {
    /// server address:port to listen on (default: 0.0.0.0:8000, PORT environment variable can override default port 8000)
    #[argh(
        option,
        default = "SocketAddr::from(([0, 0, 0, 0], default_listen_port()))"
    )]
    pub listen_address: SocketAddr,
    /// directory to serve test pages from (default: current directory, or HT_ROOT environment variable)
    #[argh(option, default = "default_root()")]
    pub root: Utf8PathBuf,
    /// directory uploaded reports are written to (default: reports, or HT_REPORTS_DIR environment variable)
    #[argh(option, default = "default_reports_dir()")]
    pub reports_dir: Utf8PathBuf,
    /// use JSON for log messages
    #[argh(switch)]
    pub json: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::from(([127, 0, 0, 1], default_listen_port())),
            root: default_root(),
            reports_dir: default_reports_dir(),
            json: false,
        }
    }
}

fn default_listen_port() -> u16 {
    env_parse_or("PORT", DEFAULT_SERVER_PORT)
}

fn default_root() -> Utf8PathBuf {
    env_or("HT_ROOT", DEFAULT_SITE_ROOT).into()
}

fn default_reports_dir() -> Utf8PathBuf {
    env_or("HT_REPORTS_DIR", DEFAULT_REPORTS_DIR).into()
}
