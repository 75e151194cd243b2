// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Periodic ASG tag synchronization.
//!
//! The status watcher discovers group names; this task attaches their
//! cloud tags, among them the nodegroup binding tag. It is the only
//! writer of `AsgEntry.tags`.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cloud::AutoscalingApi;
use crate::constants::tag_sync;
use crate::error::{BoosterError, Result};
use crate::pools::AsgPool;

pub struct TagSynchronizer {
    cloud: Arc<dyn AutoscalingApi>,
    asg_pool: Arc<AsgPool>,
}

impl TagSynchronizer {
    pub fn new(cloud: Arc<dyn AutoscalingApi>, asg_pool: Arc<AsgPool>) -> Self {
        Self { cloud, asg_pool }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        self.wait_for_group_names().await?;
        info!("ASG pool populated, starting tag synchronization");

        loop {
            let names = self.asg_pool.names();
            if names.is_empty() {
                // Pool was reset by a status-watch reconnect; the
                // status watcher will repopulate it
                debug!("ASG pool empty, skipping tag sync");
            } else {
                match self.cloud.describe_tags(&names).await {
                    Ok(grouped) => self.asg_pool.replace_tags(&grouped),
                    Err(e) => warn!("Failed to describe ASG tags: {}", e),
                }
            }

            sleep(tag_sync::INTERVAL).await;
        }
    }

    /// Without group names there is nothing to operate on; give the
    /// status watcher a bounded amount of time to deliver them
    async fn wait_for_group_names(&self) -> Result<()> {
        for attempt in 0..tag_sync::RETRIES {
            if !self.asg_pool.is_empty() {
                return Ok(());
            }
            debug!(
                "ASG pool still empty, retry {}/{}",
                attempt + 1,
                tag_sync::RETRIES
            );
            sleep(tag_sync::RETRY_INTERVAL).await;
        }

        if self.asg_pool.is_empty() {
            return Err(BoosterError::NoAutoscalingGroups(tag_sync::RETRIES));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockAutoscaling;
    use crate::types::{AsgEntry, HealthStatus};
    use std::collections::BTreeMap;

    fn pool_with(names: &[&str]) -> Arc<AsgPool> {
        let pool = Arc::new(AsgPool::default());
        pool.merge_health(
            names
                .iter()
                .map(|n| AsgEntry::new(n, HealthStatus::default()))
                .collect(),
        );
        pool
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_group_names_fails_after_retries() {
        let pool = Arc::new(AsgPool::default());
        let cloud = Arc::new(MockAutoscaling::default());
        let sync = TagSynchronizer::new(cloud, pool);

        let result = sync.wait_for_group_names().await;
        assert!(matches!(
            result,
            Err(BoosterError::NoAutoscalingGroups(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_group_names_succeeds_when_populated() {
        let pool = pool_with(&["a1"]);
        let cloud = Arc::new(MockAutoscaling::default());
        let sync = TagSynchronizer::new(cloud, pool);

        assert!(sync.wait_for_group_names().await.is_ok());
    }

    #[tokio::test]
    async fn test_tags_attached_to_pool_entries() {
        let pool = pool_with(&["a1", "a2"]);
        let cloud = Arc::new(MockAutoscaling::default());
        cloud.set_tags(
            "a1",
            BTreeMap::from([("eks:nodegroup-name".to_string(), "ng1".to_string())]),
        );

        // One sync pass by hand: fetch then replace
        let grouped = cloud.describe_tags(&pool.names()).await.unwrap();
        pool.replace_tags(&grouped);

        let snapshot = pool.snapshot();
        let a1 = snapshot.iter().find(|e| e.name == "a1").unwrap();
        let a2 = snapshot.iter().find(|e| e.name == "a2").unwrap();
        assert_eq!(a1.nodegroup(), Some("ng1"));
        assert!(a2.tags.is_empty());
    }
}
