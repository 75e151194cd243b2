// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client construction for both connection modes.

use std::path::Path;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::info;

use crate::config::ConnectionMode;
use crate::error::{BoosterError, Result};

/// Build a client from inside the cluster or from a kubeconfig file,
/// depending on the configured connection mode
pub async fn build_client(mode: ConnectionMode, kubeconfig_path: &Path) -> Result<Client> {
    let config = match mode {
        ConnectionMode::Incluster => {
            info!("Connecting with in-cluster service account");
            Config::incluster().map_err(|e| BoosterError::ClientConstruction(e.to_string()))?
        }
        ConnectionMode::Kubectl => {
            info!("Connecting with kubeconfig '{}'", kubeconfig_path.display());
            let kubeconfig = Kubeconfig::read_from(kubeconfig_path)
                .map_err(|e| BoosterError::ClientConstruction(e.to_string()))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| BoosterError::ClientConstruction(e.to_string()))?
        }
    };

    Client::try_from(config).map_err(|e| BoosterError::ClientConstruction(e.to_string()))
}
