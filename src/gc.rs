// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Event garbage collection.
//!
//! Reaps events whose backing node is gone, and events whose
//! recommendation timestamp aged out. Deleting from the cluster is
//! enough: the event watcher observes the delete and removes the pool
//! entry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kube::Client;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::constants::{EVENT_TTL, WATCH_BACKOFF};
use crate::kubernetes::delete_event;
use crate::pools::{EventPool, NodePool};
use crate::queries::{Events, Nodes};
use crate::types::EventSnapshot;

pub struct EventGc {
    client: Client,
    event_pool: Arc<EventPool>,
    node_pool: Arc<NodePool>,
}

impl EventGc {
    pub fn new(client: Client, event_pool: Arc<EventPool>, node_pool: Arc<NodePool>) -> Self {
        Self {
            client,
            event_pool,
            node_pool,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let events = self.event_pool.snapshot();
            let nodes = self.node_pool.snapshot();

            for event in stale_events(&events, &nodes, EVENT_TTL, Utc::now()) {
                info!(
                    "Reaping stale event '{}/{}' for node '{}'",
                    event.namespace, event.name, event.node_name
                );
                if let Err(e) = delete_event(&self.client, &event.namespace, &event.name).await {
                    // Retried on the next sweep
                    warn!(
                        "Failed to delete event '{}/{}': {}",
                        event.namespace, event.name, e
                    );
                }
            }

            sleep(WATCH_BACKOFF).await;
        }
    }
}

/// Events to reap: the backing node disappeared, or the recommendation
/// timestamp is older than `ttl`. Events with unparsable timestamps are
/// kept (and judged on their node only).
pub fn stale_events(
    events: &Events,
    nodes: &Nodes,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Vec<EventSnapshot> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);

    events
        .values()
        .filter(|event| {
            if !nodes.contains_key(&event.node_name) {
                return true;
            }
            match event.recommendation_time() {
                Some(stamp) => now.signed_duration_since(stamp) > ttl,
                None => false,
            }
        })
        .cloned()
        .collect()
}
