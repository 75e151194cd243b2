// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Node mirror reduced to the fields the controller consumes.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Node;

use crate::constants::{annotations, labels};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub provider_id: Option<String>,
    pub unschedulable: bool,
    /// Last transition of the `Ready=True` condition
    pub ready_transition: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
}

impl From<&Node> for NodeSnapshot {
    fn from(node: &Node) -> Self {
        let spec = node.spec.as_ref();

        let ready_transition = node
            .status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .and_then(|conditions| {
                conditions
                    .iter()
                    .find(|c| c.type_ == "Ready" && c.status == "True")
            })
            .and_then(|c| c.last_transition_time.as_ref())
            .map(|t| t.0);

        NodeSnapshot {
            name: node.metadata.name.clone().unwrap_or_default(),
            labels: node.metadata.labels.clone().unwrap_or_default(),
            annotations: node.metadata.annotations.clone().unwrap_or_default(),
            provider_id: spec.and_then(|s| s.provider_id.clone()),
            unschedulable: spec.and_then(|s| s.unschedulable).unwrap_or(false),
            ready_transition,
            created: node.metadata.creation_timestamp.as_ref().map(|t| t.0),
        }
    }
}

impl NodeSnapshot {
    /// The nodegroup this node belongs to, from its well-known label
    pub fn nodegroup(&self) -> Option<&str> {
        self.labels.get(labels::NODEGROUP).map(|s| s.as_str())
    }

    /// Whether the node has been reserved as replacement headroom
    pub fn is_reserved(&self) -> bool {
        self.annotations
            .contains_key(annotations::IGNORE_RECENT_READY)
    }

    /// Cloud instance id, the last `/`-separated segment of the provider
    /// id (e.g. `aws:///eu-central-1a/i-042377dc1ee1257a1`)
    pub fn instance_id(&self) -> Option<&str> {
        self.provider_id
            .as_deref()
            .and_then(|id| id.rsplit('/').next())
            .filter(|segment| !segment.is_empty())
    }

    /// Whether the node became Ready within `window` before `now`, is
    /// schedulable, and is not reserved
    pub fn recently_ready(&self, window: Duration, now: DateTime<Utc>) -> bool {
        if self.unschedulable || self.is_reserved() {
            return false;
        }

        match self.ready_transition {
            Some(transition) => {
                now.signed_duration_since(transition)
                    <= chrono::Duration::from_std(window).unwrap_or(chrono::Duration::zero())
            }
            None => false,
        }
    }
}
