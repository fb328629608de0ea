use std::sync::Arc;
use std::time::Duration;

use norikv_lite::proxy::{self, Fanout};
use norikv_lite::wal::Wal;
use norikv_lite::{Ring, Store};
use serde_json::json;
use tempfile::TempDir;

async fn spawn_replica(port: u16) -> TempDir {
    let dir = TempDir::new().unwrap();
    let wal = Wal::open(dir.path().join("wal.log")).unwrap();
    let store = Store::new(wal);
    store.recover().unwrap();
    let app = norikv_lite::replica::router(Arc::new(store));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}"))
        .await
        .unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    dir
}

async fn spawn_proxy(proxy_port: u16, replica_ports: &[u16]) {
    let nodes: Vec<String> = replica_ports
        .iter()
        .map(|p| format!("http://127.0.0.1:{p}"))
        .collect();
    let ring = Arc::new(Ring::new(nodes).unwrap());
    let fanout = Arc::new(Fanout::new(ring, reqwest::Client::new()));
    let app = proxy::router(fanout);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{proxy_port}"))
        .await
        .unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

#[tokio::test]
async fn set_replicates_and_get_reads_back_through_proxy() {
    let ports = [19081u16, 19082, 19083];
    let _dirs: Vec<_> = futures_util::future::join_all(ports.iter().map(|p| spawn_replica(*p)))
        .await;
    spawn_proxy(19090, &ports).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let base = "http://127.0.0.1:19090";

    let resp = client
        .post(format!("{base}/set"))
        .json(&json!({"key": "hello", "value": "world"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = client
        .get(format!("{base}/get"))
        .query(&[("key", "hello")])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["value"], "world");

    // Every replica should have received the write independently of the proxy.
    for port in ports {
        let resp = client
            .get(format!("http://127.0.0.1:{port}/get"))
            .query(&[("key", "hello")])
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }
}

#[tokio::test]
async fn delete_removes_key_from_every_replica() {
    let ports = [19181u16, 19182, 19183];
    let _dirs: Vec<_> = futures_util::future::join_all(ports.iter().map(|p| spawn_replica(*p)))
        .await;
    spawn_proxy(19190, &ports).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let base = "http://127.0.0.1:19190";

    client
        .post(format!("{base}/set"))
        .json(&json!({"key": "k", "value": "v"}))
        .send()
        .await
        .unwrap();

    let resp = client
        .delete(format!("{base}/delete"))
        .query(&[("key", "k")])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = client
        .get(format!("{base}/get"))
        .query(&[("key", "k")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quorum_failure_when_fewer_than_w_replicas_are_reachable() {
    // Only one replica is actually running; the ring still names three addresses, so every
    // write can reach at most one of them and quorum (W=2) is never met.
    let live_port = 19281u16;
    let _dir = spawn_replica(live_port).await;
    let ports = [live_port, 19282, 19283];
    spawn_proxy(19290, &ports).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post("http://127.0.0.1:19290/set")
        .json(&json!({"key": "x", "value": "y"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
}
