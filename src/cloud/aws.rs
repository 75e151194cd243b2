// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! AWS Auto Scaling implementation of the cloud seam.

use async_trait::async_trait;
use aws_sdk_autoscaling::error::ProvideErrorMetadata;
use aws_sdk_autoscaling::types::Filter;
use tracing::debug;

use crate::cloud::{AutoscalingApi, TagsByGroup};
use crate::error::{BoosterError, Result};

pub struct AwsAutoscaling {
    client: aws_sdk_autoscaling::Client,
}

impl AwsAutoscaling {
    /// Build a client from the ambient AWS environment (profile,
    /// instance role or IRSA)
    pub async fn new() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        AwsAutoscaling {
            client: aws_sdk_autoscaling::Client::new(&config),
        }
    }
}

#[async_trait]
impl AutoscalingApi for AwsAutoscaling {
    async fn describe_tags(&self, group_names: &[String]) -> Result<TagsByGroup> {
        let filter = Filter::builder()
            .name("auto-scaling-group")
            .set_values(Some(group_names.to_vec()))
            .build();

        let mut grouped = TagsByGroup::new();
        let mut pages = self
            .client
            .describe_tags()
            .filters(filter)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| BoosterError::Cloud(e.to_string()))?;
            for tag in page.tags() {
                let (Some(group), Some(key), Some(value)) =
                    (tag.resource_id(), tag.key(), tag.value())
                else {
                    continue;
                };
                grouped
                    .entry(group.to_string())
                    .or_default()
                    .insert(key.to_string(), value.to_string());
            }
        }

        debug!("Described tags for {} groups", grouped.len());
        Ok(grouped)
    }

    async fn set_desired_capacity(&self, group_name: &str, desired: i32) -> Result<()> {
        self.client
            .set_desired_capacity()
            .auto_scaling_group_name(group_name)
            .desired_capacity(desired)
            .honor_cooldown(false)
            .send()
            .await
            .map_err(|e| BoosterError::Cloud(e.to_string()))?;

        Ok(())
    }

    async fn terminate_instance(&self, instance_id: &str) -> Result<()> {
        let result = self
            .client
            .terminate_instance_in_auto_scaling_group()
            .instance_id(instance_id)
            .should_decrement_desired_capacity(true)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_err = err.into_service_error();
                // An already-terminated instance is a success for us
                if service_err
                    .message()
                    .is_some_and(|m| m.contains("not found"))
                {
                    debug!("Instance '{instance_id}' already gone");
                    return Ok(());
                }
                Err(BoosterError::Cloud(service_err.to_string()))
            }
        }
    }
}
