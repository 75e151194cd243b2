// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! The reconciliation loop: joins the pools, computes per-ASG desired
//! capacity and applies it to the cloud provider.
//!
//! The formula keeps real capacity constant while pre-provisioning one
//! replacement per at-risk node: ready + events (+ configured margin),
//! clamped to the group's maximum.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cloud::AutoscalingApi;
use crate::config::Config;
use crate::constants::RECONCILE_TICK;
use crate::metrics;
use crate::pools::{AsgPool, EventPool, NodePool};
use crate::queries::event_count_by_nodegroup;
use crate::types::AsgEntry;

pub struct Reconciler {
    cloud: Arc<dyn AutoscalingApi>,
    config: Arc<Config>,
    node_pool: Arc<NodePool>,
    event_pool: Arc<EventPool>,
    asg_pool: Arc<AsgPool>,
}

impl Reconciler {
    pub fn new(
        cloud: Arc<dyn AutoscalingApi>,
        config: Arc<Config>,
        node_pool: Arc<NodePool>,
        event_pool: Arc<EventPool>,
        asg_pool: Arc<AsgPool>,
    ) -> Self {
        Self {
            cloud,
            config,
            node_pool,
            event_pool,
            asg_pool,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            self.tick().await;
            sleep(RECONCILE_TICK).await;
        }
    }

    async fn tick(&self) {
        let nodes = self.node_pool.snapshot();
        let events = self.event_pool.snapshot();
        let asgs = self.asg_pool.snapshot();

        debug!(
            "Reconciling: {} events, {} nodes, {} ASGs",
            events.len(),
            nodes.len(),
            asgs.len()
        );

        let event_counts = event_count_by_nodegroup(&events, &nodes);
        let targets = desired_capacities(
            &asgs,
            &event_counts,
            self.config.extra_nodes_over_calculation,
            &self.config.ignored_asgs(),
        );

        for (group_name, desired) in &targets {
            if self.config.dry_run {
                info!(
                    "Dry-run: would set desired capacity {} on '{}'",
                    desired, group_name
                );
                continue;
            }

            info!("Setting desired capacity {} on '{}'", desired, group_name);
            if let Err(e) = self.cloud.set_desired_capacity(group_name, *desired).await {
                // One failing group must not starve the rest
                warn!("Failed to set capacity on '{}': {}", group_name, e);
            }
        }

        metrics::refresh(&nodes, &events);
    }
}

/// Desired capacity per boostable ASG. Groups without events, without a
/// nodegroup tag, with unparsable health or on the ignore list produce
/// no entry and therefore no cloud call.
pub fn desired_capacities(
    asgs: &[AsgEntry],
    event_counts: &BTreeMap<String, usize>,
    extra_nodes: i32,
    ignored: &HashSet<&str>,
) -> Vec<(String, i32)> {
    let mut targets = Vec::new();

    for asg in asgs {
        let Some(nodegroup) = asg.nodegroup() else {
            continue;
        };
        let count = event_counts.get(nodegroup).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }

        let (Some(ready), Some(max_size)) =
            (asg.health.ready_count(), asg.health.max_size_count())
        else {
            debug!("ASG '{}' has unparsable health counters, skipping", asg.name);
            continue;
        };

        if ignored.contains(asg.name.as_str()) {
            debug!("ASG '{}' is on the ignore list, skipping", asg.name);
            continue;
        }

        let desired = (ready as i32 + count as i32 + extra_nodes).min(max_size as i32);
        targets.push((asg.name.clone(), desired));
    }

    targets
}
