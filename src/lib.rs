// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0
pub mod cloud;
pub mod config;
pub mod constants;
pub mod drainer;
pub mod error;
pub mod gc;
pub mod kubernetes;
pub mod metrics;
pub mod pools;
pub mod queries;
pub mod reconciler;
pub mod status;
pub mod types;
pub mod watchers;

#[cfg(test)]
pub mod test_utils;
