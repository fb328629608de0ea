//! CLI and environment configuration for the three binaries.

use clap::{Parser, Subcommand};

const DEFAULT_REPLICATION_FACTOR: usize = 3;
const DEFAULT_QUORUM_FLOOR: usize = 2;

/// `replica --port <u16>`
#[derive(Debug, Parser)]
#[command(name = "replica")]
pub struct ReplicaConfig {
    /// Port to listen on. The WAL file is named `wal-<port>.log` in the working directory.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

/// `proxy --port <u16>`, node list from the `NODES` environment variable.
#[derive(Debug, Parser)]
#[command(name = "proxy")]
pub struct ProxyConfig {
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
}

impl ProxyConfig {
    /// Replication factor N: fixed at 3, but never more than the configured node count.
    pub fn replication_factor(node_count: usize) -> usize {
        DEFAULT_REPLICATION_FACTOR.min(node_count)
    }

    /// Quorum W: `min(2, len(ring))`.
    pub fn quorum(node_count: usize) -> usize {
        DEFAULT_QUORUM_FLOOR.min(node_count)
    }
}

/// Reads the `NODES` environment variable (comma-separated `scheme://host:port` entries),
/// falling back to a three-node local loopback default when unset or empty.
pub fn node_list_from_env() -> Vec<String> {
    match std::env::var("NODES") {
        Ok(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => vec![
            "http://127.0.0.1:8081".to_string(),
            "http://127.0.0.1:8082".to_string(),
            "http://127.0.0.1:8083".to_string(),
        ],
    }
}

/// `client --server <url> <command>`
#[derive(Debug, Parser)]
#[command(name = "client")]
pub struct ClientArgs {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    pub server: String,

    #[command(subcommand)]
    pub command: ClientCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientCommand {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}
