// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Parser for the cluster-autoscaler status document.
//!
//! The configmap carries a human-readable report. Only two line
//! patterns matter: `Name: <nodegroup>` opens a record and the
//! `Health: <state> (<key>=<int>, ...)` that follows it carries the
//! counters. Records missing `minSize` or `maxSize` are skipped, which
//! also discards the cluster-wide health summary printed before the
//! first nodegroup.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{AsgEntry, HealthStatus};

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"Name:\s*([A-Za-z0-9_-]+)").unwrap();
    static ref HEALTH_RE: Regex = Regex::new(r"Health:\s*[A-Za-z0-9]+\s*\((.*)\)").unwrap();
    static ref DELIMITER_RE: Regex = Regex::new(r"[^A-Za-z0-9_=]").unwrap();
}

/// Parse the status document into one entry per acceptable nodegroup
/// record, in document order. Tags are left empty; the tag synchronizer
/// owns them.
pub fn parse_status(document: &str) -> Vec<AsgEntry> {
    let names: Vec<(usize, &str)> = NAME_RE
        .captures_iter(document)
        .map(|captures| {
            let whole = captures.get(0).unwrap();
            (whole.start(), captures.get(1).unwrap().as_str())
        })
        .collect();

    let healths: Vec<(usize, &str)> = HEALTH_RE
        .captures_iter(document)
        .map(|captures| {
            let whole = captures.get(0).unwrap();
            (whole.start(), captures.get(1).unwrap().as_str())
        })
        .collect();

    let mut entries = Vec::new();

    for (index, (name_start, name)) in names.iter().enumerate() {
        let next_name_start = names
            .get(index + 1)
            .map(|(start, _)| *start)
            .unwrap_or(usize::MAX);

        // The health line belonging to this record sits between this
        // Name: and the next one
        let Some((_, args)) = healths
            .iter()
            .find(|(start, _)| *start > *name_start && *start < next_name_start)
        else {
            continue;
        };

        let tokens = tokenize(args);
        if !tokens.contains_key("minSize") || !tokens.contains_key("maxSize") {
            continue;
        }

        entries.push(AsgEntry::new(name, HealthStatus::from_args(&tokens)));
    }

    entries
}

/// Normalise the argument list: anything outside `[A-Za-z0-9_=]` is a
/// delimiter, the rest splits into `key=value` pairs with integer
/// values. Malformed tokens are dropped.
fn tokenize(args: &str) -> BTreeMap<String, String> {
    DELIMITER_RE
        .replace_all(args, " ")
        .split_whitespace()
        .filter_map(|token| token.split_once('='))
        .filter(|(key, value)| {
            !key.is_empty() && !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
        })
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shaped like the report the stock cluster autoscaler publishes
    const STATUS_DOCUMENT: &str = r#"Cluster-autoscaler status at 2024-03-01 12:00:00 +0000 UTC:
Cluster-wide:
  Health:      Healthy (ready=7 unready=0 notStarted=0 longNotStarted=0 registered=7 longUnregistered=0)
  ScaleUp:     NoActivity (ready=7 registered=7)
  ScaleDown:   NoCandidates (candidates=0)

NodeGroups:
  Name:        ng1
  Health:      Healthy (ready=4 unready=0 notStarted=0 longNotStarted=0 registered=4 longUnregistered=0 cloudProviderTarget=4 (minSize=1, maxSize=10))
  ScaleUp:     NoActivity (ready=4 cloudProviderTarget=4)
  ScaleDown:   NoCandidates (candidates=0)

  Name:        ng2
  Health:      Healthy (ready=3 unready=0 notStarted=0 longNotStarted=0 registered=3 longUnregistered=0 cloudProviderTarget=3 (minSize=1, maxSize=5))
  ScaleUp:     NoActivity (ready=3 cloudProviderTarget=3)
"#;

    #[test]
    fn test_parse_full_document() {
        let entries = parse_status(STATUS_DOCUMENT);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "ng1");
        assert_eq!(entries[0].health.ready, "4");
        assert_eq!(entries[0].health.min_size, "1");
        assert_eq!(entries[0].health.max_size, "10");
        assert_eq!(entries[1].name, "ng2");
        assert_eq!(entries[1].health.max_size, "5");
    }

    #[test]
    fn test_cluster_wide_summary_is_not_a_record() {
        // The cluster-wide Health line carries no minSize/maxSize and
        // precedes any Name:, so nothing of it may leak into results
        let entries = parse_status(STATUS_DOCUMENT);
        assert!(entries.iter().all(|e| !e.name.is_empty()));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_record_missing_max_size_is_skipped() {
        let document = "\
  Name: ng1\n\
  Health: Healthy (ready=3, minSize=1, maxSize=5)\n\
  Name: ng2\n\
  Health: Healthy (ready=2, minSize=1)\n";

        let entries = parse_status(document);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "ng1");
        assert_eq!(entries[0].health.ready, "3");
    }

    #[test]
    fn test_skipped_record_does_not_shift_pairing() {
        // ng2's health is unacceptable; ng3 must still get its own
        let document = "\
  Name: ng1\n\
  Health: Healthy (ready=3, minSize=1, maxSize=5)\n\
  Name: ng2\n\
  Health: Healthy (ready=2)\n\
  Name: ng3\n\
  Health: Healthy (ready=7, minSize=2, maxSize=9)\n";

        let entries = parse_status(document);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name, "ng3");
        assert_eq!(entries[1].health.ready, "7");
    }

    #[test]
    fn test_name_without_health_is_skipped() {
        let document = "Name: ng1\nScaleUp: NoActivity\n";
        assert!(parse_status(document).is_empty());
    }

    #[test]
    fn test_tokenize_symbols_are_delimiters() {
        let tokens = tokenize("ready=3, minSize=1, maxSize=5 (cloudProviderTarget=3)");

        assert_eq!(tokens["ready"], "3");
        assert_eq!(tokens["minSize"], "1");
        assert_eq!(tokens["maxSize"], "5");
        assert_eq!(tokens["cloudProviderTarget"], "3");
    }

    #[test]
    fn test_tokenize_drops_non_integer_values() {
        let tokens = tokenize("ready=three minSize=1 maxSize=5");
        assert!(!tokens.contains_key("ready"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_status("").is_empty());
    }
}
