// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Mirrors the cluster node list into the node pool.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use k8s_openapi::api::core::v1::Node;
use kube::runtime::watcher::{self, Event};
use kube::{Api, Client};
use tracing::{debug, info};

use crate::constants::WATCH_BACKOFF;
use crate::error::{BoosterError, Result};
use crate::pools::NodePool;
use crate::types::NodeSnapshot;

pub struct NodeWatcher {
    client: Client,
    pool: Arc<NodePool>,
}

impl NodeWatcher {
    pub fn new(client: Client, pool: Arc<NodePool>) -> Self {
        Self { client, pool }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let api: Api<Node> = Api::all(self.client.clone());

        loop {
            // Whatever we mirrored so far may be stale now
            self.pool.reset();

            match self.watch(&api).await {
                Ok(()) => info!("Node watch stream ended, reconnecting"),
                Err(e) => info!("Node watch interrupted: {}", e),
            }

            tokio::time::sleep(WATCH_BACKOFF).await;
        }
    }

    async fn watch(&self, api: &Api<Node>) -> Result<()> {
        let mut stream = watcher::watcher(api.clone(), watcher::Config::default()).boxed();

        while let Some(event) = stream
            .try_next()
            .await
            .map_err(|e| BoosterError::WatchStream(e.to_string()))?
        {
            match event {
                Event::Init => self.pool.reset(),
                Event::InitApply(node) | Event::Apply(node) => {
                    debug!(
                        "Node change detected on '{}'",
                        node.metadata.name.as_deref().unwrap_or("")
                    );
                    self.pool.upsert(NodeSnapshot::from(&node));
                }
                Event::Delete(node) => {
                    if let Some(name) = node.metadata.name.as_deref() {
                        debug!("Node deleted: '{}'", name);
                        self.pool.remove(name);
                    }
                }
                Event::InitDone => {
                    info!("Node watch synced, {} nodes mirrored", self.pool.len());
                }
            }
        }

        Ok(())
    }
}
