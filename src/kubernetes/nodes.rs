// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Node mutations: reserving replacement nodes.

use k8s_openapi::api::core::v1::Node;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};

use crate::constants::annotations;
use crate::error::Result;

/// Annotate a node as reserved replacement headroom so following drain
/// ticks do not count it as available again
pub async fn reserve_replacement_node(client: &Client, name: &str) -> Result<()> {
    let api: Api<Node> = Api::all(client.clone());

    let patch = serde_json::json!({
        "metadata": {
            "annotations": {
                annotations::IGNORE_RECENT_READY: annotations::IGNORE_RECENT_READY_VALUE,
            }
        }
    });

    api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}
