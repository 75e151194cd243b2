// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Controller configuration, built once from command-line flags and
//! shared read-only with every task.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Where to read cluster credentials from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectionMode {
    /// Service-account credentials mounted into the pod
    Incluster,
    /// A kubeconfig file, as kubectl would use
    Kubectl,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "spots-booster", version, about)]
pub struct Config {
    /// What type of connection to use: incluster, kubectl
    #[arg(long, value_enum, default_value = "kubectl")]
    pub connection_mode: ConnectionMode,

    /// Absolute path to the kubeconfig file; defaults to ~/.kube/config
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Skip actual changes: compute and log only
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Namespace of the cluster-autoscaler status configmap
    #[arg(long, default_value = "kube-system")]
    pub ca_status_namespace: String,

    /// Name of the cluster-autoscaler status configmap
    #[arg(long, default_value = "cluster-autoscaler-status")]
    pub ca_status_name: String,

    /// Comma-separated autoscaling-group names to skip when boosting
    #[arg(long, value_delimiter = ',')]
    pub ignored_autoscaling_groups: Vec<String>,

    /// Extra nodes to add on top of the calculated capacity
    #[arg(long, default_value_t = 0)]
    pub extra_nodes_over_calculation: i32,

    /// Disable the drain-and-destroy process for nodes under risk
    /// (not recommended)
    #[arg(long, default_value_t = false)]
    pub disable_drain: bool,

    /// Duration between one batch of drains and the next
    #[arg(long, value_parser = humantime::parse_duration, default_value = "15s")]
    pub time_between_drains: Duration,

    /// Duration after which an unfinished drain is considered done
    #[arg(long, value_parser = humantime::parse_duration, default_value = "120s")]
    pub drain_timeout: Duration,

    /// Maximum number of nodes to drain at once per nodegroup
    #[arg(long, default_value_t = 5)]
    pub max_concurrent_drains: usize,

    /// Evict pods with grace period 0 instead of their own
    #[arg(long, default_value_t = false)]
    pub ignore_pods_grace_period: bool,

    /// Host where the metrics web-server will listen
    #[arg(long, default_value = "0.0.0.0")]
    pub metrics_host: String,

    /// Port where the metrics web-server will listen
    #[arg(long, default_value_t = 2112)]
    pub metrics_port: u16,
}

impl Config {
    /// The kubeconfig to use in kubectl mode
    pub fn kubeconfig_path(&self) -> PathBuf {
        self.kubeconfig.clone().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(".kube")
                .join("config")
        })
    }

    /// The ignored-group names as a set, empty entries dropped
    pub fn ignored_asgs(&self) -> HashSet<&str> {
        self.ignored_autoscaling_groups
            .iter()
            .map(|name| name.as_str())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[cfg(test)]
impl Default for Config {
    /// Flag defaults, for tests
    fn default() -> Self {
        Config::parse_from(["spots-booster"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.connection_mode, ConnectionMode::Kubectl);
        assert!(!config.dry_run);
        assert_eq!(config.ca_status_namespace, "kube-system");
        assert_eq!(config.ca_status_name, "cluster-autoscaler-status");
        assert_eq!(config.extra_nodes_over_calculation, 0);
        assert_eq!(config.time_between_drains, Duration::from_secs(15));
        assert_eq!(config.drain_timeout, Duration::from_secs(120));
        assert_eq!(config.max_concurrent_drains, 5);
        assert_eq!(config.metrics_port, 2112);
        assert!(config.ignored_asgs().is_empty());
    }

    #[test]
    fn test_kubeconfig_flag_overrides_default() {
        let config = Config::parse_from(["spots-booster", "--kubeconfig", "/tmp/kc"]);
        assert_eq!(config.kubeconfig_path(), PathBuf::from("/tmp/kc"));
    }

    #[test]
    fn test_ignored_asgs_csv() {
        let config = Config::parse_from([
            "spots-booster",
            "--ignored-autoscaling-groups",
            "asg-a,asg-b",
        ]);

        let ignored = config.ignored_asgs();
        assert!(ignored.contains("asg-a"));
        assert!(ignored.contains("asg-b"));
        assert_eq!(ignored.len(), 2);
    }

    #[test]
    fn test_duration_flags_parse_humantime() {
        let config = Config::parse_from([
            "spots-booster",
            "--time-between-drains",
            "1m",
            "--drain-timeout",
            "90s",
        ]);

        assert_eq!(config.time_between_drains, Duration::from_secs(60));
        assert_eq!(config.drain_timeout, Duration::from_secs(90));
    }
}
