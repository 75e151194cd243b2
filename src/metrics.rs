// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Prometheus gauges over the pool snapshots, and the exposition
//! endpoint. The gauges are refreshed by the reconciler at the end of
//! every pass; the endpoint is a passive read of the registry.

use axum::routing::get;
use axum::Router;
use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::{register_gauge_vec, GaugeVec, TextEncoder};
use tracing::info;

use crate::constants::{METRICS_PREFIX, NEW_NODE_WINDOW};
use crate::queries::{
    cordoned_count_by_nodegroup, event_count_by_nodegroup, node_count_by_nodegroup,
    nodegroup_names, recently_ready_count_by_nodegroup, Events, Nodes,
};

lazy_static! {
    static ref EVENTS_TOTAL: GaugeVec = register_gauge_vec!(
        format!("{METRICS_PREFIX}events_total"),
        "number of rebalance recommendation events per nodegroup",
        &["nodegroup"]
    )
    .unwrap();
    static ref NODES_TOTAL: GaugeVec = register_gauge_vec!(
        format!("{METRICS_PREFIX}nodes_total"),
        "number of nodes per nodegroup",
        &["nodegroup"]
    )
    .unwrap();
    static ref CORDONED_NODES_TOTAL: GaugeVec = register_gauge_vec!(
        format!("{METRICS_PREFIX}cordoned_nodes_total"),
        "number of cordoned nodes per nodegroup",
        &["nodegroup"]
    )
    .unwrap();
    static ref RECENTLY_READY_NODES_TOTAL: GaugeVec = register_gauge_vec!(
        format!("{METRICS_PREFIX}recently_ready_nodes_total"),
        "number of recently ready nodes per nodegroup",
        &["nodegroup"]
    )
    .unwrap();
}

/// Recompute every gauge from the given snapshots
pub fn refresh(nodes: &Nodes, events: &Events) {
    let event_counts = event_count_by_nodegroup(events, nodes);
    let node_counts = node_count_by_nodegroup(nodes);
    let cordoned_counts = cordoned_count_by_nodegroup(nodes);
    let recently_ready_counts =
        recently_ready_count_by_nodegroup(nodes, NEW_NODE_WINDOW, Utc::now());

    for nodegroup in nodegroup_names(nodes) {
        let count = |counts: &std::collections::BTreeMap<String, usize>| {
            counts.get(&nodegroup).copied().unwrap_or(0) as f64
        };

        EVENTS_TOTAL
            .with_label_values(&[nodegroup.as_str()])
            .set(count(&event_counts));
        NODES_TOTAL
            .with_label_values(&[nodegroup.as_str()])
            .set(count(&node_counts));
        CORDONED_NODES_TOTAL
            .with_label_values(&[nodegroup.as_str()])
            .set(count(&cordoned_counts));
        RECENTLY_READY_NODES_TOTAL
            .with_label_values(&[nodegroup.as_str()])
            .set(count(&recently_ready_counts));
    }
}

/// Serve the default registry on `host:port`
pub async fn serve(host: String, port: u16) -> anyhow::Result<()> {
    let app = Router::new().route("/metrics", get(render));
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;

    info!("Metrics exposed on http://{host}:{port}/metrics");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn render() -> String {
    TextEncoder::new()
        .encode_to_string(&prometheus::gather())
        .unwrap_or_default()
}
