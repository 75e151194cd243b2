// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Cloud-provider seam.
//!
//! Everything the controller asks of the cloud goes through
//! [`AutoscalingApi`], so the reconciler, tag synchronizer and drainer
//! can be exercised against a recording fake.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

pub mod aws;
pub mod tags;

pub use aws::AwsAutoscaling;
pub use tags::TagSynchronizer;

/// Tag mappings grouped by autoscaling-group name
pub type TagsByGroup = BTreeMap<String, BTreeMap<String, String>>;

#[async_trait]
pub trait AutoscalingApi: Send + Sync {
    /// Fetch the tags of all named groups in one batched call
    async fn describe_tags(&self, group_names: &[String]) -> Result<TagsByGroup>;

    /// Set the desired capacity of one group, cooldown ignored
    async fn set_desired_capacity(&self, group_name: &str, desired: i32) -> Result<()>;

    /// Terminate one instance and shrink its group's desired capacity
    /// along with it
    async fn terminate_instance(&self, instance_id: &str) -> Result<()>;
}
