// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Autoscaling-group entries as mirrored from the cluster-autoscaler
//! status document and the cloud tag API.

use std::collections::BTreeMap;

use crate::constants::labels;

/// Per-nodegroup health counters published by the cluster autoscaler.
///
/// Counters are kept as the strings found in the status document and
/// parsed on use; missing counters stay empty and parse to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthStatus {
    pub ready: String,
    pub unready: String,
    pub not_started: String,
    pub long_not_started: String,
    pub registered: String,
    pub long_unregistered: String,
    pub cloud_provider_target: String,
    pub min_size: String,
    pub max_size: String,
}

impl HealthStatus {
    /// Build from the `key=value` tokens of one health record. Unknown
    /// keys are ignored.
    pub fn from_args(args: &BTreeMap<String, String>) -> Self {
        let field = |key: &str| args.get(key).cloned().unwrap_or_default();

        HealthStatus {
            ready: field("ready"),
            unready: field("unready"),
            not_started: field("notStarted"),
            long_not_started: field("longNotStarted"),
            registered: field("registered"),
            long_unregistered: field("longUnregistered"),
            cloud_provider_target: field("cloudProviderTarget"),
            min_size: field("minSize"),
            max_size: field("maxSize"),
        }
    }

    /// Re-serialise as the `key=value` mapping it was parsed from.
    /// Empty counters are omitted.
    pub fn to_args(&self) -> BTreeMap<String, String> {
        let pairs = [
            ("ready", &self.ready),
            ("unready", &self.unready),
            ("notStarted", &self.not_started),
            ("longNotStarted", &self.long_not_started),
            ("registered", &self.registered),
            ("longUnregistered", &self.long_unregistered),
            ("cloudProviderTarget", &self.cloud_provider_target),
            ("minSize", &self.min_size),
            ("maxSize", &self.max_size),
        ];

        pairs
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    pub fn ready_count(&self) -> Option<u32> {
        self.ready.parse().ok()
    }

    pub fn min_size_count(&self) -> Option<u32> {
        self.min_size.parse().ok()
    }

    pub fn max_size_count(&self) -> Option<u32> {
        self.max_size.parse().ok()
    }
}

/// One autoscaling group: health from the status watcher, tags from the
/// tag synchronizer. Identity is the cloud-side group name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsgEntry {
    pub name: String,
    pub health: HealthStatus,
    pub tags: BTreeMap<String, String>,
}

impl AsgEntry {
    pub fn new(name: &str, health: HealthStatus) -> Self {
        AsgEntry {
            name: name.to_string(),
            health,
            tags: BTreeMap::new(),
        }
    }

    /// The kubernetes nodegroup this group backs, read from its cloud tag
    pub fn nodegroup(&self) -> Option<&str> {
        self.tags.get(labels::NODEGROUP_TAG).map(|s| s.as_str())
    }
}
