use std::sync::Arc;

use clap::Parser;
use norikv_lite::config::ReplicaConfig;
use norikv_lite::replica;
use norikv_lite::{Store, Wal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = ReplicaConfig::parse();

    let wal_path = format!("wal-{}.log", config.port);
    let wal = Wal::open(&wal_path)?;
    let store = Store::new(wal);
    let recovered = store.recover()?;
    log::info!("recovered {recovered} keys from {wal_path}");

    let store = Arc::new(store);
    let app = replica::router(store);

    let addr = format!("127.0.0.1:{}", config.port);
    log::info!("replica listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
