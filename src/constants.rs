// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Kubernetes annotation keys owned by spots-booster
pub mod annotations {
    /// Marks a node as reserved replacement headroom; excluded from
    /// recently-ready calculations from then on
    pub const IGNORE_RECENT_READY: &str = "asbooster.docplanner.com/ignore-recent-ready";
    pub const IGNORE_RECENT_READY_VALUE: &str = "true";
}

/// Labels and tags that bind cluster objects to cloud objects
pub mod labels {
    /// Node label carrying the name of the nodegroup a node belongs to
    pub const NODEGROUP: &str = "eks.amazonaws.com/nodegroup";
    /// ASG tag carrying the name of the nodegroup an ASG backs
    pub const NODEGROUP_TAG: &str = "eks:nodegroup-name";
}

/// Event reason emitted by the cloud provider for instances at risk
pub const REBALANCE_EVENT_REASON: &str = "RebalanceRecommendation";

/// Namespace the rebalance events are published into
pub const EVENTS_NAMESPACE: &str = "default";

/// Key of the status document inside the cluster-autoscaler configmap
pub const STATUS_CONFIGMAP_KEY: &str = "status";

/// Delay before reopening a broken watch stream, and the cadence of the
/// event garbage collector
pub const WATCH_BACKOFF: Duration = Duration::from_secs(2);

/// Time between reconciliation passes
pub const RECONCILE_TICK: Duration = Duration::from_secs(2);

/// Events whose recommendation timestamp is older than this are reaped
pub const EVENT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Look-back window for considering a node "recently ready"
pub const NEW_NODE_WINDOW: Duration = Duration::from_secs(10 * 60);

/// ASG tag synchronization
pub mod tag_sync {
    use std::time::Duration;

    /// Time between tag refreshes once the ASG pool is populated
    pub const INTERVAL: Duration = Duration::from_secs(5);
    /// Attempts to wait for the status watcher to populate the ASG pool
    pub const RETRIES: u32 = 10;
    /// Delay between those attempts
    pub const RETRY_INTERVAL: Duration = Duration::from_secs(6);
}

/// Prefix for every exported metric
pub const METRICS_PREFIX: &str = "aws_spots_booster_";
