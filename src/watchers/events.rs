// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Mirrors rebalance-recommendation events into the event pool.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use k8s_openapi::api::core::v1::Event;
use kube::runtime::watcher::{self, Event as WatchEvent};
use kube::{Api, Client};
use tracing::{debug, info};

use crate::constants::{EVENTS_NAMESPACE, REBALANCE_EVENT_REASON, WATCH_BACKOFF};
use crate::error::{BoosterError, Result};
use crate::pools::EventPool;
use crate::types::EventSnapshot;

pub struct EventWatcher {
    client: Client,
    pool: Arc<EventPool>,
}

impl EventWatcher {
    pub fn new(client: Client, pool: Arc<EventPool>) -> Self {
        Self { client, pool }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let api: Api<Event> = Api::namespaced(self.client.clone(), EVENTS_NAMESPACE);
        let config =
            watcher::Config::default().fields(&format!("reason={REBALANCE_EVENT_REASON}"));

        loop {
            self.pool.reset();

            match self.watch(&api, &config).await {
                Ok(()) => info!("Event watch stream ended, reconnecting"),
                Err(e) => info!("Event watch interrupted: {}", e),
            }

            tokio::time::sleep(WATCH_BACKOFF).await;
        }
    }

    async fn watch(&self, api: &Api<Event>, config: &watcher::Config) -> Result<()> {
        let mut stream = watcher::watcher(api.clone(), config.clone()).boxed();

        while let Some(event) = stream
            .try_next()
            .await
            .map_err(|e| BoosterError::WatchStream(e.to_string()))?
        {
            match event {
                WatchEvent::Init => self.pool.reset(),
                WatchEvent::InitApply(event) | WatchEvent::Apply(event) => {
                    let snapshot = EventSnapshot::from(&event);
                    if snapshot.node_name.is_empty() {
                        continue;
                    }
                    debug!(
                        "Event change detected on '{}/{}'",
                        snapshot.namespace, snapshot.name
                    );
                    // At most one event per node, the newer one wins
                    self.pool.upsert(snapshot);
                }
                WatchEvent::Delete(event) => {
                    let snapshot = EventSnapshot::from(&event);
                    debug!("Event deleted: '{}/{}'", snapshot.namespace, snapshot.name);
                    self.pool.remove(&snapshot.node_name);
                }
                WatchEvent::InitDone => {
                    info!("Event watch synced, {} events mirrored", self.pool.len());
                }
            }
        }

        Ok(())
    }
}
