use std::sync::Arc;
use std::time::Duration;

use norikv_lite::replica;
use norikv_lite::wal::Wal;
use norikv_lite::Store;
use serde_json::json;
use tempfile::tempdir;

async fn spawn_replica(port: u16) -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    let wal = Wal::open(dir.path().join("wal.log")).unwrap();
    let store = Store::new(wal);
    store.recover().unwrap();
    let app = replica::router(Arc::new(store));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}"))
        .await
        .unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    dir
}

#[tokio::test]
async fn set_get_delete_round_trip_over_http() {
    let _dir = spawn_replica(18081).await;
    let client = reqwest::Client::new();
    let base = "http://127.0.0.1:18081";

    let resp = client
        .post(format!("{base}/set"))
        .json(&json!({"key": "foo", "value": "bar"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = client
        .get(format!("{base}/get"))
        .query(&[("key", "foo")])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["value"], "bar");

    let resp = client
        .delete(format!("{base}/delete"))
        .query(&[("key", "foo")])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = client
        .get(format!("{base}/get"))
        .query(&[("key", "foo")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_returns_400() {
    let _dir = spawn_replica(18082).await;
    let client = reqwest::Client::new();

    let resp = client
        .post("http://127.0.0.1:18082/set")
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_key_param_returns_400() {
    let _dir = spawn_replica(18083).await;
    let client = reqwest::Client::new();

    let resp = client
        .get("http://127.0.0.1:18083/get")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}
