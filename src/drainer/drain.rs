// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Node drain: cordon, then remove the pods.
//!
//! Drain in Kubernetes is client side. We cordon through the node
//! subresource helper and then evict every drainable pod, respecting
//! PodDisruptionBudgets. DaemonSet pods are skipped (their controller
//! ignores cordons anyway), mirror pods cannot be controlled, and pods
//! with emptyDir volumes are deleted instead of evicted since their
//! data dies with the node.

use futures::{stream, StreamExt};
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::{DeleteParams, EvictParams, ListParams};
use kube::{Api, Client, ResourceExt};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Pods evicted or deleted at once while draining one node
const CONCURRENT_EVICTIONS: usize = 5;

/// Poll interval while waiting for evicted pods to disappear
const DELETION_CHECK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

/// Cordon a node and remove its drainable pods, then wait until they
/// are gone. The caller bounds the whole operation with its drain
/// timeout; on expiry the node is left cordoned and partially drained,
/// and its instance is terminated regardless.
pub async fn drain_node(
    client: &Client,
    node_name: &str,
    grace_period_seconds: Option<u32>,
) -> Result<()> {
    let nodes: Api<Node> = Api::all(client.clone());
    nodes.cordon(node_name).await?;
    info!("Cordoned node '{}'", node_name);

    let targets = drainable_pods(client, node_name).await?;
    debug!("Draining {} pods from node '{}'", targets.len(), node_name);

    stream::iter(targets)
        .for_each_concurrent(CONCURRENT_EVICTIONS, |pod| {
            let client = client.clone();
            async move {
                remove_pod(&client, &pod, grace_period_seconds).await;
            }
        })
        .await;

    // Evictions are asynchronous; the node is only drained once the
    // pods are actually gone
    loop {
        let remaining = drainable_pods(client, node_name).await?;
        if remaining.is_empty() {
            return Ok(());
        }
        debug!(
            "Waiting for {} pods to leave node '{}'",
            remaining.len(),
            node_name
        );
        sleep(DELETION_CHECK_INTERVAL).await;
    }
}

/// All pods on the node that a drain should remove
async fn drainable_pods(client: &Client, node_name: &str) -> Result<Vec<Pod>> {
    let pods: Api<Pod> = Api::all(client.clone());
    let params = ListParams::default().fields(&format!("spec.nodeName={node_name}"));

    let list = pods.list(&params).await?;
    Ok(list.items.into_iter().filter(is_drainable).collect())
}

fn is_drainable(pod: &Pod) -> bool {
    let owned_by_daemonset = pod
        .metadata
        .owner_references
        .as_ref()
        .is_some_and(|owners| owners.iter().any(|owner| owner.kind == "DaemonSet"));

    let is_mirror = pod
        .metadata
        .annotations
        .as_ref()
        .is_some_and(|annotations| annotations.contains_key("kubernetes.io/config.mirror"));

    !owned_by_daemonset && !is_mirror
}

fn has_empty_dir(pod: &Pod) -> bool {
    pod.spec
        .as_ref()
        .and_then(|spec| spec.volumes.as_ref())
        .is_some_and(|volumes| volumes.iter().any(|volume| volume.empty_dir.is_some()))
}

/// Evict one pod, or delete it when it holds emptyDir data. Failures
/// are logged and the drain carries on; the remaining pods still
/// deserve their chance to move.
async fn remove_pod(client: &Client, pod: &Pod, grace_period_seconds: Option<u32>) {
    let name = pod.name_any();
    let namespace = pod.namespace().unwrap_or_default();
    let api: Api<Pod> = Api::namespaced(client.clone(), &namespace);

    let delete_params = DeleteParams {
        grace_period_seconds,
        ..Default::default()
    };

    if has_empty_dir(pod) {
        debug!("Pod '{}/{}' has emptyDir storage, deleting", namespace, name);
        if let Err(e) = api.delete(&name, &delete_params).await {
            warn!("Failed to delete pod '{}/{}': {}", namespace, name, e);
        }
        return;
    }

    let evict_params = EvictParams {
        delete_options: Some(delete_params),
        ..Default::default()
    };
    if let Err(e) = api.evict(&name, &evict_params).await {
        warn!("Failed to evict pod '{}/{}': {}", namespace, name, e);
    }
}
