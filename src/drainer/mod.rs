// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Drain scheduling.
//!
//! Every tick, at-risk nodes are paired with recently ready replacement
//! capacity under a per-nodegroup cap. The pairing is the back-pressure
//! that keeps the controller from emptying a nodegroup faster than
//! capacity returns.

pub mod drain;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use kube::Client;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::cloud::AutoscalingApi;
use crate::config::Config;
use crate::constants::NEW_NODE_WINDOW;
use crate::kubernetes::{delete_event, reserve_replacement_node};
use crate::pools::{EventPool, NodePool};
use crate::queries::{events_by_nodegroup, recently_ready_by_nodegroup, Nodes};
use crate::types::{EventSnapshot, NodeSnapshot};

pub use drain::drain_node;

/// One unit of drain work: the at-risk node named by the event, and the
/// replacement node reserved for its pods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainAssignment {
    pub event: EventSnapshot,
    pub replacement: NodeSnapshot,
}

pub struct Drainer {
    client: Client,
    cloud: Arc<dyn AutoscalingApi>,
    config: Arc<Config>,
    node_pool: Arc<NodePool>,
    event_pool: Arc<EventPool>,
}

impl Drainer {
    pub fn new(
        client: Client,
        cloud: Arc<dyn AutoscalingApi>,
        config: Arc<Config>,
        node_pool: Arc<NodePool>,
        event_pool: Arc<EventPool>,
    ) -> Self {
        Self {
            client,
            cloud,
            config,
            node_pool,
            event_pool,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            if self.config.dry_run {
                debug!("Dry-run: drain is not allowed, will be reviewed next loop");
                sleep(self.config.time_between_drains).await;
                continue;
            }

            if self.event_pool.is_empty() {
                sleep(self.config.time_between_drains).await;
                continue;
            }

            let nodes = self.node_pool.snapshot();
            let events = self.event_pool.snapshot();

            let grouped_events = events_by_nodegroup(&events, &nodes);
            let recently_ready =
                recently_ready_by_nodegroup(&nodes, NEW_NODE_WINDOW, Utc::now());

            let assignments = plan_assignments(
                &grouped_events,
                &recently_ready,
                self.config.max_concurrent_drains,
            );

            if assignments.is_empty() {
                debug!("Events pending but no replacement capacity ready yet");
            }

            join_all(
                assignments
                    .into_iter()
                    .map(|assignment| self.dispatch(assignment, &nodes)),
            )
            .await;

            sleep(self.config.time_between_drains).await;
        }
    }

    /// Work one assignment: reserve the replacement, drain the at-risk
    /// node, terminate its instance, delete the consumed event. Steps
    /// log their own failures; the instance is going away regardless,
    /// so later steps still run.
    async fn dispatch(&self, assignment: DrainAssignment, nodes: &Nodes) {
        let node_name = &assignment.event.node_name;
        info!("Worker launched in background: draining node '{}'", node_name);

        if let Err(e) =
            reserve_replacement_node(&self.client, &assignment.replacement.name).await
        {
            warn!(
                "Failed to reserve replacement node '{}': {}",
                assignment.replacement.name, e
            );
        }

        let grace_period = self.config.ignore_pods_grace_period.then_some(0);
        match timeout(
            self.config.drain_timeout,
            drain_node(&self.client, node_name, grace_period),
        )
        .await
        {
            Ok(Ok(())) => debug!("Drained node '{}'", node_name),
            Ok(Err(e)) => warn!("Error draining node '{}': {}", node_name, e),
            Err(_) => warn!(
                "Drain of node '{}' exceeded {:?}, abandoning",
                node_name, self.config.drain_timeout
            ),
        }

        match nodes.get(node_name).and_then(|node| node.instance_id()) {
            Some(instance_id) => {
                if let Err(e) = self.cloud.terminate_instance(instance_id).await {
                    warn!(
                        "Failed to terminate instance '{}' of node '{}': {}",
                        instance_id, node_name, e
                    );
                }
            }
            None => warn!("No instance id found for node '{}'", node_name),
        }

        if let Err(e) = delete_event(
            &self.client,
            &assignment.event.namespace,
            &assignment.event.name,
        )
        .await
        {
            warn!(
                "Failed to delete event '{}/{}': {}",
                assignment.event.namespace, assignment.event.name, e
            );
        }
    }
}

/// Pair each nodegroup's events with its recently ready nodes, bounded
/// by `max_concurrent` drains per nodegroup and by how many replacement
/// nodes actually exist
pub fn plan_assignments(
    events_by_ng: &BTreeMap<String, Vec<EventSnapshot>>,
    recently_ready_by_ng: &BTreeMap<String, Vec<NodeSnapshot>>,
    max_concurrent: usize,
) -> Vec<DrainAssignment> {
    let mut assignments = Vec::new();

    for (nodegroup, events) in events_by_ng {
        if events.is_empty() {
            continue;
        }

        let replacements = recently_ready_by_ng
            .get(nodegroup)
            .map(|nodes| nodes.as_slice())
            .unwrap_or(&[]);

        let cap = max_concurrent.min(replacements.len());
        let batch = &events[..events.len().min(cap)];

        for (event, replacement) in batch.iter().zip(replacements) {
            assignments.push(DrainAssignment {
                event: event.clone(),
                replacement: replacement.clone(),
            });
        }
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(node_name: &str) -> EventSnapshot {
        EventSnapshot {
            namespace: "default".to_string(),
            name: format!("{node_name}.rebalance"),
            node_name: node_name.to_string(),
            message: String::new(),
        }
    }

    fn node(name: &str) -> NodeSnapshot {
        NodeSnapshot {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn grouped<T: Clone>(pairs: &[(&str, Vec<T>)]) -> BTreeMap<String, Vec<T>> {
        pairs
            .iter()
            .map(|(ng, items)| (ng.to_string(), items.clone()))
            .collect()
    }

    #[test]
    fn test_drains_bounded_by_replacement_capacity() {
        // 5 events but only 2 fresh nodes: exactly 2 drains
        let events = grouped(&[(
            "ng1",
            vec![event("n1"), event("n2"), event("n3"), event("n4"), event("n5")],
        )]);
        let ready = grouped(&[("ng1", vec![node("r1"), node("r2")])]);

        let assignments = plan_assignments(&events, &ready, 5);

        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].event.node_name, "n1");
        assert_eq!(assignments[0].replacement.name, "r1");
        assert_eq!(assignments[1].replacement.name, "r2");
    }

    #[test]
    fn test_drains_bounded_by_concurrency_cap() {
        let events = grouped(&[("ng1", vec![event("n1"), event("n2"), event("n3")])]);
        let ready = grouped(&[("ng1", vec![node("r1"), node("r2"), node("r3")])]);

        let assignments = plan_assignments(&events, &ready, 2);

        assert_eq!(assignments.len(), 2);
    }

    #[test]
    fn test_drains_bounded_by_event_count() {
        let events = grouped(&[("ng1", vec![event("n1")])]);
        let ready = grouped(&[("ng1", vec![node("r1"), node("r2")])]);

        let assignments = plan_assignments(&events, &ready, 5);

        assert_eq!(assignments.len(), 1);
    }

    #[test]
    fn test_no_replacements_no_drains() {
        let events = grouped(&[("ng1", vec![event("n1")])]);
        let ready = grouped(&[("ng1", vec![])]);

        assert!(plan_assignments(&events, &ready, 5).is_empty());

        // Nodegroup missing from the ready map entirely
        assert!(plan_assignments(&events, &BTreeMap::new(), 5).is_empty());
    }

    #[test]
    fn test_nodegroups_capped_independently() {
        let events = grouped(&[
            ("ng1", vec![event("n1"), event("n2")]),
            ("ng2", vec![event("m1"), event("m2"), event("m3")]),
        ]);
        let ready = grouped(&[
            ("ng1", vec![node("r1")]),
            ("ng2", vec![node("s1"), node("s2"), node("s3")]),
        ]);

        let assignments = plan_assignments(&events, &ready, 2);

        let ng1: Vec<_> = assignments
            .iter()
            .filter(|a| a.event.node_name.starts_with('n'))
            .collect();
        let ng2: Vec<_> = assignments
            .iter()
            .filter(|a| a.event.node_name.starts_with('m'))
            .collect();

        assert_eq!(ng1.len(), 1);
        assert_eq!(ng2.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_terminates_instance_and_deletes_event() {
        use crate::config::Config;
        use crate::test_utils::{node_json, MockAutoscaling, MockService};

        let client = MockService::new()
            .on_patch("/api/v1/nodes/r1", 200, &node_json("r1", Some("ng1")))
            .on_patch("/api/v1/nodes/n1", 200, &node_json("n1", Some("ng1")))
            .on_get(
                "/api/v1/pods",
                200,
                r#"{"kind":"PodList","apiVersion":"v1","metadata":{},"items":[]}"#,
            )
            .on_delete(
                "/api/v1/namespaces/default/events/n1.rebalance",
                200,
                r#"{"kind":"Status","apiVersion":"v1","status":"Success","code":200}"#,
            )
            .into_client();

        let cloud = Arc::new(MockAutoscaling::default());
        let drainer = Drainer::new(
            client,
            cloud.clone(),
            Arc::new(Config::default()),
            Arc::new(NodePool::default()),
            Arc::new(EventPool::default()),
        );

        let at_risk = NodeSnapshot {
            name: "n1".to_string(),
            provider_id: Some("aws:///eu-central-1a/i-0123456789".to_string()),
            ..Default::default()
        };
        let nodes: Nodes = BTreeMap::from([("n1".to_string(), at_risk)]);

        drainer
            .dispatch(
                DrainAssignment {
                    event: event("n1"),
                    replacement: node("r1"),
                },
                &nodes,
            )
            .await;

        assert_eq!(cloud.terminated(), vec!["i-0123456789"]);
    }

    #[test]
    fn test_each_replacement_used_once() {
        let events = grouped(&[("ng1", vec![event("n1"), event("n2")])]);
        let ready = grouped(&[("ng1", vec![node("r1"), node("r2")])]);

        let assignments = plan_assignments(&events, &ready, 5);

        assert_ne!(assignments[0].replacement.name, assignments[1].replacement.name);
    }
}
