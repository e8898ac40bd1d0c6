use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener},
    time::Duration,
};

use camino::{Utf8Path, Utf8PathBuf};
use reqwest::multipart::{Form, Part};
use tempfile::TempDir;
use thiserror::Error;
use url::Url;

use ht_server::app::{App, Args};


const PAGE_PATH: &str = "tests/test_frontend_integration.html";
const PAGE_BODY: &str = "<!DOCTYPE html><title>frontend integration</title>";
const SCRIPT_PATH: &str = "js/app.js";
const SCRIPT_BODY: &str = "console.log('ok');";

pub struct TestServer {
    url: Url,
    root: Utf8PathBuf,
    reports_dir: Utf8PathBuf,
    client: reqwest::Client,
    _temp: TempDir,
}

#[derive(Error, Debug)]
pub enum TestError {
    #[error("failed to connect to test server: {0}")]
    ConnectError(#[source] reqwest::Error),
    #[error("test server did not come up")]
    StartupTimeout,
    #[error("failed to parse URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("failed to execute request: {0}")]
    RequestError(#[from] reqwest::Error),
}

pub type TestResult<T> = Result<T, TestError>;

impl TestServer {
    pub async fn start() -> Self {
        let temp = tempfile::tempdir().expect("failed to create temporary site root");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temporary directory is not UTF-8");

        write_fixture(&root, PAGE_PATH, PAGE_BODY);
        write_fixture(&root, SCRIPT_PATH, SCRIPT_BODY);

        let reports_dir = root.join("reports");
        let port = next_available_port();

        let app = App::with_args(Args {
            listen_address: SocketAddr::from(([127, 0, 0, 1], port)),
            root: root.clone(),
            reports_dir: reports_dir.clone(),
            json: false,
        });

        let _ = tokio::spawn(async move { app.run().await });

        let url =
            Url::parse(&format!("http://127.0.0.1:{}", port)).expect("failed to generate URL");

        let server = Self {
            url,
            root,
            reports_dir,
            client: reqwest::Client::new(),
            _temp: temp,
        };
        server
            .wait_until_ready()
            .await
            .expect("test server failed to start");
        server
    }

    async fn wait_until_ready(&self) -> TestResult<()> {
        for _ in 0..50 {
            match self.client.get(self.url.clone()).send().await {
                Ok(_) => return Ok(()),
                Err(e) if e.is_connect() => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                Err(e) => return Err(TestError::ConnectError(e)),
            }
        }
        Err(TestError::StartupTimeout)
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn reports_dir(&self) -> &Utf8Path {
        &self.reports_dir
    }

    pub async fn request(&self, method: reqwest::Method, path: &str) -> TestResult<reqwest::Response> {
        Ok(self
            .client
            .request(method, self.url.join(path)?)
            .send()
            .await?)
    }

    pub async fn get(&self, path: &str) -> TestResult<reqwest::Response> {
        self.request(reqwest::Method::GET, path).await
    }

    pub async fn post_form(&self, path: &str, form: Form) -> TestResult<reqwest::Response> {
        Ok(self
            .client
            .post(self.url.join(path)?)
            .multipart(form)
            .send()
            .await?)
    }

    pub async fn upload(&self, filename: &str, contents: &[u8]) -> TestResult<reqwest::Response> {
        let part = Part::bytes(contents.to_vec()).file_name(filename.to_string());
        let form = Form::new().percent_encode_noop().part("report", part);
        self.post_form("/save-report", form).await
    }
}

fn write_fixture(root: &Utf8Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    std::fs::write(&path, contents).expect("failed to write fixture");
}

pub fn assert_cors_headers(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!("*", headers["access-control-allow-origin"]);
    assert_eq!("GET, POST, OPTIONS", headers["access-control-allow-methods"]);
    assert_eq!("Content-Type", headers["access-control-allow-headers"]);
}

fn next_available_port() -> u16 {
    for _ in 0..10 {
        if let Some(port) = bind_os_available_port() {
            return port;
        }
    }

    panic!("no port available")
}

fn bind_os_available_port() -> Option<u16> {
    TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .ok()
}
