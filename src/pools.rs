// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! In-memory mirrors of the upstream data sources.
//!
//! Each pool is guarded by one mutex; critical sections are a single
//! insert, replace or remove, or a wholesale clone. Readers work on
//! snapshots and tolerate one-tick staleness. Pools are dropped
//! wholesale whenever their watch stream reconnects.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::types::{AsgEntry, EventSnapshot, NodeSnapshot};

/// Cluster nodes, keyed by node name
#[derive(Debug, Default)]
pub struct NodePool {
    nodes: Mutex<BTreeMap<String, NodeSnapshot>>,
}

impl NodePool {
    pub fn upsert(&self, node: NodeSnapshot) {
        self.nodes.lock().unwrap().insert(node.name.clone(), node);
    }

    pub fn remove(&self, name: &str) {
        self.nodes.lock().unwrap().remove(name);
    }

    pub fn reset(&self) {
        self.nodes.lock().unwrap().clear();
    }

    pub fn snapshot(&self) -> BTreeMap<String, NodeSnapshot> {
        self.nodes.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rebalance events, keyed by the involved node name: at most one event
/// per node, a newer event replaces the older one
#[derive(Debug, Default)]
pub struct EventPool {
    events: Mutex<BTreeMap<String, EventSnapshot>>,
}

impl EventPool {
    pub fn upsert(&self, event: EventSnapshot) {
        self.events
            .lock()
            .unwrap()
            .insert(event.node_name.clone(), event);
    }

    pub fn remove(&self, node_name: &str) {
        self.events.lock().unwrap().remove(node_name);
    }

    pub fn reset(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn snapshot(&self) -> BTreeMap<String, EventSnapshot> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Autoscaling groups, keyed by the cloud-side group name.
///
/// Two writers with disjoint fields: the status watcher owns `health`,
/// the tag synchronizer owns `tags`.
#[derive(Debug, Default)]
pub struct AsgPool {
    groups: Mutex<BTreeMap<String, AsgEntry>>,
}

impl AsgPool {
    /// Merge a freshly parsed status document into the pool.
    ///
    /// An empty pool is overwritten wholesale. Otherwise only the
    /// health of matching entries is replaced; entries the parser did
    /// not mention stay (they may be waiting on the tag synchronizer),
    /// and newly parsed names are added with empty tags.
    pub fn merge_health(&self, parsed: Vec<AsgEntry>) {
        let mut groups = self.groups.lock().unwrap();

        if groups.is_empty() {
            *groups = parsed
                .into_iter()
                .map(|entry| (entry.name.clone(), entry))
                .collect();
            return;
        }

        for entry in parsed {
            match groups.get_mut(&entry.name) {
                Some(existing) => existing.health = entry.health,
                None => {
                    groups.insert(entry.name.clone(), entry);
                }
            }
        }
    }

    /// Replace the tag mapping of every entry. Names absent from
    /// `tags_by_name` get an empty mapping.
    pub fn replace_tags(&self, tags_by_name: &BTreeMap<String, BTreeMap<String, String>>) {
        let mut groups = self.groups.lock().unwrap();
        for entry in groups.values_mut() {
            entry.tags = tags_by_name.get(&entry.name).cloned().unwrap_or_default();
        }
    }

    pub fn reset(&self) {
        self.groups.lock().unwrap().clear();
    }

    pub fn names(&self) -> Vec<String> {
        self.groups.lock().unwrap().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> Vec<AsgEntry> {
        self.groups.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.groups.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
