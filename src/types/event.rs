// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Rebalance-recommendation event mirror.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSnapshot {
    pub namespace: String,
    pub name: String,
    /// Name of the node the recommendation points at
    pub node_name: String,
    pub message: String,
}

impl From<&Event> for EventSnapshot {
    fn from(event: &Event) -> Self {
        EventSnapshot {
            namespace: event.metadata.namespace.clone().unwrap_or_default(),
            name: event.metadata.name.clone().unwrap_or_default(),
            node_name: event.involved_object.name.clone().unwrap_or_default(),
            message: event.message.clone().unwrap_or_default(),
        }
    }
}

impl EventSnapshot {
    /// The recommendation instant, encoded upstream as the last
    /// whitespace-separated token of the message in RFC-3339
    pub fn recommendation_time(&self) -> Option<DateTime<Utc>> {
        let token = self.message.split_whitespace().last()?;
        DateTime::parse_from_rfc3339(token)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}
