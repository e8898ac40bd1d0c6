use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

use crate::{assert_cors_headers, TestServer};
use ht_server::api::reports::SaveReportResponse;

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn upload_writes_report_and_returns_path() {
    let server = TestServer::start().await;

    let response = server.upload("r1.json", br#"{"x":1}"#).await.unwrap();

    assert_eq!(StatusCode::OK, response.status());
    assert_cors_headers(&response);
    let body: SaveReportResponse = response.json().await.unwrap();
    let expected_path = server.reports_dir().join("r1.json");
    assert_eq!(
        SaveReportResponse {
            status: "success".to_string(),
            file: expected_path.to_string(),
        },
        body
    );
    assert_eq!(
        br#"{"x":1}"#.to_vec(),
        std::fs::read(&expected_path).unwrap()
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn upload_keeps_bytes_verbatim() {
    let server = TestServer::start().await;
    let contents: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    let response = server.upload("report.bin", &contents).await.unwrap();

    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(
        contents,
        std::fs::read(server.reports_dir().join("report.bin")).unwrap()
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn reupload_overwrites_previous_report() {
    let server = TestServer::start().await;

    server
        .upload("r1.json", br#"{"run":1,"padding":"xxxxxxxx"}"#)
        .await
        .unwrap();
    let response = server.upload("r1.json", br#"{"run":2}"#).await.unwrap();

    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(
        br#"{"run":2}"#.to_vec(),
        std::fs::read(server.reports_dir().join("r1.json")).unwrap()
    );
    assert_eq!(1, std::fs::read_dir(server.reports_dir()).unwrap().count());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn upload_without_report_field_is_rejected() {
    let server = TestServer::start().await;
    let form = Form::new().part(
        "summary",
        Part::bytes(b"{}".to_vec()).file_name("summary.json"),
    );

    let response = server.post_form("/save-report", form).await.unwrap();

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_cors_headers(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!("error", body["status"]);
    assert_eq!("No report file provided", body["message"]);
    assert_eq!(0, std::fs::read_dir(server.reports_dir()).unwrap().count());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn upload_without_multipart_body_is_rejected() {
    let server = TestServer::start().await;

    let response = server
        .request(reqwest::Method::POST, "/save-report")
        .await
        .unwrap();

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_cors_headers(&response);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn upload_with_traversal_filename_is_rejected() {
    let server = TestServer::start().await;

    let response = server
        .upload("../escaped.json", br#"{"x":1}"#)
        .await
        .unwrap();

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert!(!server.root().join("escaped.json").exists());
    assert_eq!(0, std::fs::read_dir(server.reports_dir()).unwrap().count());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn write_failure_returns_server_error() {
    let server = TestServer::start().await;
    std::fs::remove_dir_all(server.reports_dir()).unwrap();
    std::fs::write(server.reports_dir(), b"in the way").unwrap();

    let response = server.upload("r1.json", br#"{"x":1}"#).await.unwrap();

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    assert_cors_headers(&response);
    let body: Value = response.json().await.unwrap();
    let message = body["message"].as_str().unwrap();
    assert!(
        message.starts_with("Error saving report: failed to create reports directory"),
        "unexpected message: {}",
        message
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn preflight_succeeds_with_empty_body() {
    let server = TestServer::start().await;

    let response = server
        .request(reqwest::Method::OPTIONS, "/save-report")
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());
    assert_cors_headers(&response);
    assert!(response.bytes().await.unwrap().is_empty());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn unsupported_method_on_upload_path_is_not_implemented() {
    let server = TestServer::start().await;

    let response = server
        .request(reqwest::Method::DELETE, "/save-report")
        .await
        .unwrap();

    assert_eq!(StatusCode::NOT_IMPLEMENTED, response.status());
    assert_cors_headers(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!("error", body["status"]);
}
