// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Watches the cluster-autoscaler status configmap and keeps the ASG
//! pool's health counters current.
//!
//! Deletion of the configmap is fatal: without the autoscaler's report
//! there is no ground truth to boost against.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::runtime::watcher::{self, Event};
use kube::{Api, Client};
use tracing::{debug, error, info};

use crate::constants::{STATUS_CONFIGMAP_KEY, WATCH_BACKOFF};
use crate::error::{BoosterError, Result};
use crate::pools::AsgPool;
use crate::status::parse_status;

pub struct StatusWatcher {
    client: Client,
    namespace: String,
    configmap_name: String,
    pool: Arc<AsgPool>,
}

impl StatusWatcher {
    pub fn new(client: Client, namespace: &str, configmap_name: &str, pool: Arc<AsgPool>) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            configmap_name: configmap_name.to_string(),
            pool,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.namespace);
        let config = watcher::Config::default()
            .fields(&format!("metadata.name={}", self.configmap_name));

        loop {
            self.pool.reset();

            match self.watch(&api, &config).await {
                Err(e @ BoosterError::StatusConfigmapDeleted) => {
                    error!(
                        "Status configmap '{}/{}' deleted, stopping",
                        self.namespace, self.configmap_name
                    );
                    return Err(e.into());
                }
                Err(e) => info!("Status watch interrupted: {}", e),
                Ok(()) => info!("Status watch stream ended, reconnecting"),
            }

            tokio::time::sleep(WATCH_BACKOFF).await;
        }
    }

    async fn watch(&self, api: &Api<ConfigMap>, config: &watcher::Config) -> Result<()> {
        let mut stream = watcher::watcher(api.clone(), config.clone()).boxed();

        while let Some(event) = stream
            .try_next()
            .await
            .map_err(|e| BoosterError::WatchStream(e.to_string()))?
        {
            match event {
                Event::Init => self.pool.reset(),
                Event::InitApply(configmap) | Event::Apply(configmap) => {
                    self.ingest(&configmap);
                }
                Event::Delete(_) => {
                    return Err(BoosterError::StatusConfigmapDeleted);
                }
                Event::InitDone => {
                    debug!("Status watch synced");
                }
            }
        }

        Ok(())
    }

    fn ingest(&self, configmap: &ConfigMap) {
        let Some(document) = configmap
            .data
            .as_ref()
            .and_then(|data| data.get(STATUS_CONFIGMAP_KEY))
        else {
            info!(
                "Status configmap '{}/{}' has no '{}' key",
                self.namespace, self.configmap_name, STATUS_CONFIGMAP_KEY
            );
            return;
        };

        let parsed = parse_status(document);
        debug!("Parsed {} nodegroup records from status", parsed.len());
        self.pool.merge_health(parsed);
    }
}
