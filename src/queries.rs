// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Joins and groupings over pool snapshots.
//!
//! All functions here are pure: they take the snapshots the caller
//! already holds, so a reconciliation pass works on one consistent view
//! without touching any pool lock.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::{EventSnapshot, NodeSnapshot};

pub type Nodes = BTreeMap<String, NodeSnapshot>;
pub type Events = BTreeMap<String, EventSnapshot>;

/// Distinct nodegroup names present on the labelled nodes
pub fn nodegroup_names(nodes: &Nodes) -> Vec<String> {
    let mut names: Vec<String> = nodes
        .values()
        .filter_map(|node| node.nodegroup())
        .map(|ng| ng.to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Events joined to their node and bucketed by the node's nodegroup.
/// Every known nodegroup gets a bucket; events on label-less or unknown
/// nodes are dropped.
pub fn events_by_nodegroup(
    events: &Events,
    nodes: &Nodes,
) -> BTreeMap<String, Vec<EventSnapshot>> {
    let mut grouped: BTreeMap<String, Vec<EventSnapshot>> = nodegroup_names(nodes)
        .into_iter()
        .map(|ng| (ng, Vec::new()))
        .collect();

    for event in events.values() {
        let Some(node) = nodes.get(&event.node_name) else {
            continue;
        };
        let Some(nodegroup) = node.nodegroup() else {
            continue;
        };
        grouped
            .entry(nodegroup.to_string())
            .or_default()
            .push(event.clone());
    }

    grouped
}

pub fn event_count_by_nodegroup(events: &Events, nodes: &Nodes) -> BTreeMap<String, usize> {
    events_by_nodegroup(events, nodes)
        .into_iter()
        .map(|(ng, events)| (ng, events.len()))
        .collect()
}

/// All labelled nodes bucketed by nodegroup
pub fn nodes_by_nodegroup(nodes: &Nodes) -> BTreeMap<String, Vec<NodeSnapshot>> {
    let mut grouped: BTreeMap<String, Vec<NodeSnapshot>> = nodegroup_names(nodes)
        .into_iter()
        .map(|ng| (ng, Vec::new()))
        .collect();

    for node in nodes.values() {
        if let Some(nodegroup) = node.nodegroup() {
            grouped
                .entry(nodegroup.to_string())
                .or_default()
                .push(node.clone());
        }
    }

    grouped
}

pub fn node_count_by_nodegroup(nodes: &Nodes) -> BTreeMap<String, usize> {
    nodes_by_nodegroup(nodes)
        .into_iter()
        .map(|(ng, nodes)| (ng, nodes.len()))
        .collect()
}

/// Cordoned nodes bucketed by nodegroup
pub fn cordoned_by_nodegroup(nodes: &Nodes) -> BTreeMap<String, Vec<NodeSnapshot>> {
    let mut grouped = nodes_by_nodegroup(nodes);
    for bucket in grouped.values_mut() {
        bucket.retain(|node| node.unschedulable);
    }
    grouped
}

pub fn cordoned_count_by_nodegroup(nodes: &Nodes) -> BTreeMap<String, usize> {
    cordoned_by_nodegroup(nodes)
        .into_iter()
        .map(|(ng, nodes)| (ng, nodes.len()))
        .collect()
}

/// Nodes whose Ready condition transitioned within `window` before
/// `now`, schedulable and not reserved, bucketed by nodegroup and
/// sorted newest first
pub fn recently_ready_by_nodegroup(
    nodes: &Nodes,
    window: Duration,
    now: DateTime<Utc>,
) -> BTreeMap<String, Vec<NodeSnapshot>> {
    let mut grouped = nodes_by_nodegroup(nodes);
    for bucket in grouped.values_mut() {
        bucket.retain(|node| node.recently_ready(window, now));
        bucket.sort_by(|a, b| b.ready_transition.cmp(&a.ready_transition));
    }
    grouped
}

pub fn recently_ready_count_by_nodegroup(
    nodes: &Nodes,
    window: Duration,
    now: DateTime<Utc>,
) -> BTreeMap<String, usize> {
    recently_ready_by_nodegroup(nodes, window, now)
        .into_iter()
        .map(|(ng, nodes)| (ng, nodes.len()))
        .collect()
}
