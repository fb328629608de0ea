use std::sync::Arc;

use clap::Parser;
use norikv_lite::config::{node_list_from_env, ProxyConfig};
use norikv_lite::proxy::{self, Fanout};
use norikv_lite::Ring;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = ProxyConfig::parse();

    let nodes = node_list_from_env();
    log::info!("ring nodes: {nodes:?}");
    let ring = Arc::new(Ring::new(nodes)?);

    let client = reqwest::Client::new();
    let fanout = Arc::new(Fanout::new(ring, client));
    let app = proxy::router(fanout);

    let addr = format!("127.0.0.1:{}", config.port);
    log::info!("proxy listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
