use axum::body::Body;
use axum::http::{Request, StatusCode};
use bird_domains::ExposeInternalErrors;
use bird_engine::{build_state, EngineRouter, VERSION};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use serde_json::{json, Value};
use tower::ServiceExt;

fn fixture_router(dir: &tempfile::TempDir) -> axum::Router {
    let connection = Connection::open(dir.path().join("superhero.sqlite")).unwrap();
    connection
        .execute_batch("CREATE TABLE superhero (id INTEGER PRIMARY KEY, superhero_name TEXT)")
        .unwrap();
    drop(connection);
    let state = build_state(dir.path(), 1, ExposeInternalErrors::Censor).unwrap();
    EngineRouter::new(state).into_router()
}

#[tokio::test]
async fn health_answers_ok() {
    let dir = tempfile::tempdir().unwrap();
    let response = fixture_router(&dir)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn version_returns_the_release_version() {
    let dir = tempfile::tempdir().unwrap();
    let response = fixture_router(&dir)
        .oneshot(
            Request::builder()
                .uri("/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), VERSION.as_bytes());
}

#[tokio::test]
async fn index_reports_domain_availability() {
    let dir = tempfile::tempdir().unwrap();
    let response = fixture_router(&dir)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["service"], json!("bird-engine"));
    assert_eq!(body["version"], json!(VERSION));
    let domains = body["domains"].as_array().unwrap();
    assert_eq!(domains.len(), 5);
    for entry in domains {
        let expected = entry["domain"] == json!("superhero");
        assert_eq!(entry["available"], json!(expected));
    }
}

#[tokio::test]
async fn build_state_rejects_missing_data_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");
    assert!(build_state(&missing, 1, ExposeInternalErrors::Censor).is_err());
}
