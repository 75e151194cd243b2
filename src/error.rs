// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoosterError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to build kubernetes client: {0}")]
    ClientConstruction(String),

    #[error("Cloud provider error: {0}")]
    Cloud(String),

    #[error("Watch stream error: {0}")]
    WatchStream(String),

    #[error("cluster-autoscaler status configmap was deleted")]
    StatusConfigmapDeleted,

    #[error("No autoscaling group names available after {0} retries")]
    NoAutoscalingGroups(u32),
}

pub type Result<T> = std::result::Result<T, BoosterError>;
