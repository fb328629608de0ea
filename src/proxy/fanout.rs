//! Quorum-replicated writes and first-hit reads over a fixed set of replica HTTP endpoints.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use reqwest::Client;

use crate::config::ProxyConfig;
use crate::errors::ProxyError;
use crate::ring::Ring;
use crate::wire::{GetResponse, SetRequest};

/// Bounds a single outbound dispatch so one stuck replica cannot block the client response.
pub const PER_DISPATCH_TIMEOUT: Duration = Duration::from_secs(3);

pub struct Fanout {
    ring: Arc<Ring>,
    client: Client,
    replication_factor: usize,
    quorum: usize,
}

impl Fanout {
    pub fn new(ring: Arc<Ring>, client: Client) -> Self {
        let replication_factor = ProxyConfig::replication_factor(ring.len());
        let quorum = ProxyConfig::quorum(ring.len());
        Self {
            ring,
            client,
            replication_factor,
            quorum,
        }
    }

    fn replicas_for(&self, key: &str) -> Vec<String> {
        self.ring.get_nodes(key, self.replication_factor)
    }

    /// Forwards a `set` to all replicas for `key` concurrently and waits for every outcome
    /// before deciding; acknowledges iff at least `W` dispatches succeeded.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), ProxyError> {
        let replicas = self.replicas_for(key);
        if replicas.is_empty() {
            return Err(ProxyError::NoReplicas);
        }

        let body = SetRequest {
            key: key.to_string(),
            value: value.to_string(),
        };

        let tasks = replicas.into_iter().map(|replica| {
            let client = self.client.clone();
            let body = body.clone();
            tokio::spawn(async move { dispatch_set(&client, &replica, &body).await })
        });

        self.await_quorum(tasks).await
    }

    /// Forwards a `delete` to all replicas for `key` with the same quorum rule as `set`.
    pub async fn delete(&self, key: &str) -> Result<(), ProxyError> {
        let replicas = self.replicas_for(key);
        if replicas.is_empty() {
            return Err(ProxyError::NoReplicas);
        }

        let key = key.to_string();
        let tasks = replicas.into_iter().map(|replica| {
            let client = self.client.clone();
            let key = key.clone();
            tokio::spawn(async move { dispatch_delete(&client, &replica, &key).await })
        });

        self.await_quorum(tasks).await
    }

    async fn await_quorum(
        &self,
        tasks: impl Iterator<Item = tokio::task::JoinHandle<bool>>,
    ) -> Result<(), ProxyError> {
        let results = join_all(tasks).await;
        let successes = results.into_iter().filter(|r| matches!(r, Ok(true))).count();

        if successes >= self.quorum {
            Ok(())
        } else {
            Err(ProxyError::QuorumFailed)
        }
    }

    /// Tries replicas in ring order, sequentially; the first well-formed hit wins.
    pub async fn get(&self, key: &str) -> Result<String, ProxyError> {
        let replicas = self.replicas_for(key);
        if replicas.is_empty() {
            return Err(ProxyError::NoReplicas);
        }

        for replica in replicas {
            if let Some(value) = dispatch_get(&self.client, &replica, key).await {
                return Ok(value);
            }
        }
        Err(ProxyError::NotFound)
    }
}

async fn dispatch_set(client: &Client, replica: &str, body: &SetRequest) -> bool {
    let request = client.post(format!("{replica}/set")).json(body).send();
    matches!(
        tokio::time::timeout(PER_DISPATCH_TIMEOUT, request).await,
        Ok(Ok(resp)) if resp.status().is_success()
    )
}

async fn dispatch_delete(client: &Client, replica: &str, key: &str) -> bool {
    let request = client
        .delete(format!("{replica}/delete"))
        .query(&[("key", key)])
        .send();
    matches!(
        tokio::time::timeout(PER_DISPATCH_TIMEOUT, request).await,
        Ok(Ok(resp)) if resp.status().is_success()
    )
}

async fn dispatch_get(client: &Client, replica: &str, key: &str) -> Option<String> {
    let request = client
        .get(format!("{replica}/get"))
        .query(&[("key", key)])
        .send();

    let response = match tokio::time::timeout(PER_DISPATCH_TIMEOUT, request).await {
        Ok(Ok(resp)) if resp.status().is_success() => resp,
        _ => return None,
    };
    response.json::<GetResponse>().await.ok().map(|r| r.value)
}
