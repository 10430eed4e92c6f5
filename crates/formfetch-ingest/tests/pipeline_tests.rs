//! End-to-end pipeline tests against a mock sheet and blob server
//!
//! Each test stands up a wiremock server playing both the spreadsheet API
//! and the download host, runs the driver against temp directories, and
//! asserts on the artifacts and ledger files left behind.

use formfetch_ingest::{IngestConfig, IngestError, IngestionDriver, ResumeStrategy};
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHEET_PATH: &str = "/v4/spreadsheets/sheet1/values/Responses";

fn test_config(server: &MockServer, root: &Path) -> IngestConfig {
    let token_file = root.join("token");
    std::fs::write(&token_file, "test-token").unwrap();

    IngestConfig {
        data_root: root.join("data"),
        state_dir: root.join("state"),
        credentials_source: token_file,
        sheet_identifier: "sheet1".to_string(),
        sheet_range: "Responses".to_string(),
        sheets_base_url: server.uri(),
        drive_base_url: server.uri(),
        retry_delay_secs: 0,
        ..Default::default()
    }
}

async fn mount_sheet(server: &MockServer, values: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "values": values })))
        .mount(server)
        .await;
}

async fn mount_photo(server: &MockServer, photo_path: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(photo_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

fn marker(root: &Path) -> String {
    std::fs::read_to_string(root.join("state").join("last_completed.txt"))
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[tokio::test]
async fn full_run_downloads_new_rows() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sheet(
        &server,
        json!([
            ["Timestamp", "Photo", "Count"],
            ["2024-01-01 10:00:00", format!("{}/photos/a.jpg", server.uri()), "12"],
            ["2024-01-02 11:00:00", format!("{}/photos/b.png", server.uri()), "7"],
        ]),
    )
    .await;
    mount_photo(&server, "/photos/a.jpg", b"jpeg-a").await;
    mount_photo(&server, "/photos/b.png", b"png-b").await;

    let mut driver = IngestionDriver::new(test_config(&server, dir.path())).unwrap();
    let summary = driver.run().await.unwrap();

    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    assert!(summary.is_clean());

    let data = dir.path().join("data");
    assert_eq!(
        std::fs::read(data.join("2024-01-01 10-00-00_12.jpg")).unwrap(),
        b"jpeg-a"
    );
    assert_eq!(
        std::fs::read(data.join("2024-01-02 11-00-00_7.png")).unwrap(),
        b"png-b"
    );

    // Marker is the highest processed timestamp
    assert_eq!(marker(dir.path()), "2024-01-02 11:00:00");
    assert_eq!(summary.last_marker.as_deref(), Some("2024-01-02 11:00:00"));

    // Audit log: header plus one record per success
    let audit = std::fs::read_to_string(data.join("ingest_log.csv")).unwrap();
    assert_eq!(audit.lines().count(), 3);
    assert!(audit.lines().next().unwrap().starts_with("timestamp,filename,label"));
}

#[tokio::test]
async fn second_run_processes_only_newer_rows() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sheet(
        &server,
        json!([
            ["Timestamp", "Photo", "Count"],
            ["2024-01-01 10:00:00", format!("{}/photos/a.jpg", server.uri()), "1"],
            ["2024-01-02 11:00:00", format!("{}/photos/b.jpg", server.uri()), "2"],
        ]),
    )
    .await;
    mount_photo(&server, "/photos/a.jpg", b"a").await;
    mount_photo(&server, "/photos/b.jpg", b"b").await;

    let config = test_config(&server, dir.path());
    let summary = IngestionDriver::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(summary.succeeded, 2);

    // A new row appears; the old download endpoints now fail, which proves
    // completed candidates are never re-fetched.
    server.reset().await;
    mount_sheet(
        &server,
        json!([
            ["Timestamp", "Photo", "Count"],
            ["2024-01-01 10:00:00", format!("{}/photos/a.jpg", server.uri()), "1"],
            ["2024-01-02 11:00:00", format!("{}/photos/b.jpg", server.uri()), "2"],
            ["2024-01-03 09:00:00", format!("{}/photos/c.jpg", server.uri()), "3"],
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/photos/a.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photos/b.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_photo(&server, "/photos/c.jpg", b"c").await;

    let summary = IngestionDriver::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(marker(dir.path()), "2024-01-03 09:00:00");
}

#[tokio::test]
async fn terminal_failure_is_recorded_once_and_run_continues() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let bad_url = format!("{}/photos/bad.jpg", server.uri());
    mount_sheet(
        &server,
        json!([
            ["Timestamp", "Photo", "Count"],
            ["2024-01-01 10:00:00", bad_url, "1"],
            ["2024-01-02 11:00:00", format!("{}/photos/good.jpg", server.uri()), "2"],
        ]),
    )
    .await;
    // Exactly max_retries attempts hit the failing endpoint
    Mock::given(method("GET"))
        .and(path("/photos/bad.jpg"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    mount_photo(&server, "/photos/good.jpg", b"good").await;

    let config = test_config(&server, dir.path());
    let summary = IngestionDriver::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_clean());

    // The failed URL appears exactly once in the failure log
    let failures =
        std::fs::read_to_string(dir.path().join("state").join("failed_urls.txt")).unwrap();
    let bad_lines: Vec<&str> = failures
        .lines()
        .filter(|line| line.contains("/photos/bad.jpg"))
        .collect();
    assert_eq!(bad_lines.len(), 1);

    // No artifact claims to be complete for the failed candidate
    assert!(!dir
        .path()
        .join("data")
        .join("2024-01-01 10-00-00_1.jpg")
        .exists());

    // The marker moved past the recorded failure, so the next run sees
    // nothing new.
    assert_eq!(marker(dir.path()), "2024-01-02 11:00:00");
    let summary = IngestionDriver::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.candidates, 0);
}

#[tokio::test]
async fn metadata_first_strategy_names_from_display_name() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sheet(
        &server,
        json!([
            ["Timestamp", "Photo", "Count"],
            ["2024-01-01 10:00:00", format!("{}/file/d/ABC123/view", server.uri()), "5"],
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/ABC123"))
        .and(query_param("fields", "name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "IMG_0007.png" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uc"))
        .and(query_param("export", "download"))
        .and(query_param("id", "ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
        .mount(&server)
        .await;

    let mut config = test_config(&server, dir.path());
    config.fetch_strategy = formfetch_ingest::FetchStrategy::MetadataFirst;

    let summary = IngestionDriver::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.succeeded, 1);

    assert_eq!(
        std::fs::read(dir.path().join("data").join("IMG_0007_5.png")).unwrap(),
        b"png-bytes"
    );
}

#[tokio::test]
async fn filename_resume_skips_through_stored_name() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sheet(
        &server,
        json!([
            ["Timestamp", "Photo", "Count"],
            ["2024-01-01 10:00:00", format!("{}/photos/a.jpg", server.uri()), "1"],
            ["2024-01-02 11:00:00", format!("{}/photos/b.jpg", server.uri()), "2"],
        ]),
    )
    .await;
    mount_photo(&server, "/photos/a.jpg", b"a").await;
    mount_photo(&server, "/photos/b.jpg", b"b").await;

    let mut config = test_config(&server, dir.path());
    config.resume_strategy = ResumeStrategy::Filename;

    let summary = IngestionDriver::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(summary.succeeded, 2);

    // The stored marker is the last successful filename
    assert_eq!(marker(dir.path()), "2024-01-02 11-00-00_2.jpg");

    server.reset().await;
    mount_sheet(
        &server,
        json!([
            ["Timestamp", "Photo", "Count"],
            ["2024-01-01 10:00:00", format!("{}/photos/a.jpg", server.uri()), "1"],
            ["2024-01-02 11:00:00", format!("{}/photos/b.jpg", server.uri()), "2"],
            ["2024-01-03 09:00:00", format!("{}/photos/c.jpg", server.uri()), "3"],
        ]),
    )
    .await;
    mount_photo(&server, "/photos/c.jpg", b"c").await;

    let summary = IngestionDriver::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(marker(dir.path()), "2024-01-03 09-00-00_3.jpg");
}

#[tokio::test]
async fn unreachable_row_source_aborts_the_run() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut driver = IngestionDriver::new(test_config(&server, dir.path())).unwrap();
    let error = driver.run().await.unwrap_err();
    assert!(matches!(error, IngestError::SourceUnavailable(_)));

    // Nothing was checkpointed
    assert_eq!(marker(dir.path()), "");
}

#[tokio::test]
async fn split_by_format_partitions_outputs() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sheet(
        &server,
        json!([
            ["Timestamp", "Photo", "Count"],
            ["2024-01-01 10:00:00", format!("{}/photos/a.jpg", server.uri()), "1"],
            ["2024-01-02 11:00:00", format!("{}/photos/b.png", server.uri()), "2"],
        ]),
    )
    .await;
    mount_photo(&server, "/photos/a.jpg", b"a").await;
    mount_photo(&server, "/photos/b.png", b"b").await;

    let mut config = test_config(&server, dir.path());
    config.split_by_format = true;

    let summary = IngestionDriver::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.succeeded, 2);

    let data = dir.path().join("data");
    assert!(data.join("JPEG").join("2024-01-01 10-00-00_1.jpg").exists());
    assert!(data.join("PNG").join("2024-01-02 11-00-00_2.png").exists());
}

#[tokio::test]
async fn undecodable_heif_is_kept_and_reported() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sheet(
        &server,
        json!([
            ["Timestamp", "Photo", "Count"],
            ["2024-01-01 10:00:00", format!("{}/photos/shot.heic", server.uri()), "9"],
        ]),
    )
    .await;
    mount_photo(&server, "/photos/shot.heic", b"not-actually-heif").await;

    let summary = IngestionDriver::new(test_config(&server, dir.path()))
        .unwrap()
        .run()
        .await
        .unwrap();

    // The download succeeded; only the conversion degraded.
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.conversion_failures, 1);

    let original = dir.path().join("data").join("2024-01-01 10-00-00_9.heic");
    assert_eq!(std::fs::read(&original).unwrap(), b"not-actually-heif");
    assert!(!dir
        .path()
        .join("data")
        .join("2024-01-01 10-00-00_9.jpg")
        .exists());
}
