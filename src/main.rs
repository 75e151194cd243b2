// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use spots_booster::cloud::{AutoscalingApi, AwsAutoscaling, TagSynchronizer};
use spots_booster::config::Config;
use spots_booster::drainer::Drainer;
use spots_booster::gc::EventGc;
use spots_booster::kubernetes::build_client;
use spots_booster::metrics;
use spots_booster::pools::{AsgPool, EventPool, NodePool};
use spots_booster::reconciler::Reconciler;
use spots_booster::watchers::{EventWatcher, NodeWatcher, StatusWatcher};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::parse());
    info!("Starting spots-booster");

    let client = build_client(config.connection_mode, &config.kubeconfig_path()).await?;
    info!("Connected to Kubernetes cluster");

    let cloud: Arc<dyn AutoscalingApi> = Arc::new(AwsAutoscaling::new().await);

    let node_pool = Arc::new(NodePool::default());
    let event_pool = Arc::new(EventPool::default());
    let asg_pool = Arc::new(AsgPool::default());

    // Mirrors and housekeeping; these retry forever on their own
    tokio::spawn(NodeWatcher::new(client.clone(), node_pool.clone()).run());
    tokio::spawn(EventWatcher::new(client.clone(), event_pool.clone()).run());
    tokio::spawn(EventGc::new(client.clone(), event_pool.clone(), node_pool.clone()).run());

    tokio::spawn(
        Reconciler::new(
            cloud.clone(),
            config.clone(),
            node_pool.clone(),
            event_pool.clone(),
            asg_pool.clone(),
        )
        .run(),
    );

    if config.disable_drain {
        warn!("Drain process disabled (not recommended)");
    } else {
        tokio::spawn(
            Drainer::new(
                client.clone(),
                cloud.clone(),
                config.clone(),
                node_pool.clone(),
                event_pool.clone(),
            )
            .run(),
        );
    }

    let status_watcher = StatusWatcher::new(
        client,
        &config.ca_status_namespace,
        &config.ca_status_name,
        asg_pool.clone(),
    );
    let tag_synchronizer = TagSynchronizer::new(cloud, asg_pool);

    // Fatal-capable tasks: losing the status configmap, running out of
    // ASG names or losing the metrics listener takes the process down
    tokio::try_join!(
        status_watcher.run(),
        tag_synchronizer.run(),
        metrics::serve(config.metrics_host.clone(), config.metrics_port),
    )?;

    warn!("All tasks stopped unexpectedly");
    Ok(())
}
