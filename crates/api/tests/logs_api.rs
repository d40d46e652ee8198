//! Integration tests for log viewing endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, TestStudio};

#[tokio::test]
async fn missing_generation_log_reads_empty() {
    let studio = TestStudio::new();
    let response = get(studio.app(), "/api/v1/logs/generation").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["content"], "");
}

#[tokio::test]
async fn generation_log_is_tailed() {
    let studio = TestStudio::new();
    let lines: String = (1..=10).map(|i| format!("line {i}\n")).collect();
    std::fs::write(&studio.config.generation_log, lines).unwrap();

    let json = body_json(get(studio.app(), "/api/v1/logs/generation?lines=3").await).await;

    assert_eq!(json["data"]["content"], "line 8\nline 9\nline 10\n");
}

#[tokio::test]
async fn invalid_line_count_is_rejected() {
    let studio = TestStudio::new();
    let response = get(studio.app(), "/api/v1/logs/generation?lines=many").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn telemetry_log_is_returned_in_full() {
    let studio = TestStudio::new();
    let snapshot = "--- 2026-01-02 03:04:05 ---\nGPU[0] 45.0c\n\n\
                    rocm-smi command timed out at 2026-01-02 03:04:16\n";
    std::fs::write(&studio.config.telemetry.log_path, snapshot).unwrap();

    let json = body_json(get(studio.app(), "/api/v1/logs/telemetry").await).await;

    assert_eq!(json["data"]["content"], snapshot);
}
