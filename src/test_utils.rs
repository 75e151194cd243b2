// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API service and a recording cloud
//! provider fake.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use tower::Service;

use crate::cloud::{AutoscalingApi, TagsByGroup};
use crate::error::{BoosterError, Result};

/// A mock HTTP service that returns predefined responses based on
/// request method and path.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.insert("GET", path, status, body);
        self
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.insert("PATCH", path, status, body);
        self
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.insert("DELETE", path, status, body);
        self
    }

    fn insert(&self, method: &str, path: &str, status: u16, body: &str) {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Then a prefix match for subresource paths
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            match response {
                Some((status, body)) => Ok(Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap()),
                None => {
                    // Default 404 for unmatched requests
                    let body = r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#;
                    Ok(Response::builder()
                        .status(404)
                        .header("content-type", "application/json")
                        .body(Body::from(body.as_bytes().to_vec()))
                        .unwrap())
                }
            }
        })
    }
}

/// Create a mock node JSON response
pub fn node_json(name: &str, nodegroup: Option<&str>) -> String {
    let labels = nodegroup
        .map(|ng| serde_json::json!({ crate::constants::labels::NODEGROUP: ng }))
        .unwrap_or_else(|| serde_json::json!({}));

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Node",
        "metadata": {
            "name": name,
            "labels": labels,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Recording fake of the cloud seam. Tags are served from a fixture,
/// capacity and termination calls are recorded, and individual groups
/// can be made to fail.
#[derive(Default)]
pub struct MockAutoscaling {
    tags: Mutex<TagsByGroup>,
    capacity_calls: Mutex<Vec<(String, i32)>>,
    terminated: Mutex<Vec<String>>,
    failing_groups: Mutex<HashSet<String>>,
}

impl MockAutoscaling {
    pub fn set_tags(&self, group: &str, tags: std::collections::BTreeMap<String, String>) {
        self.tags.lock().unwrap().insert(group.to_string(), tags);
    }

    pub fn fail_group(&self, group: &str) {
        self.failing_groups
            .lock()
            .unwrap()
            .insert(group.to_string());
    }

    pub fn capacity_calls(&self) -> Vec<(String, i32)> {
        self.capacity_calls.lock().unwrap().clone()
    }

    pub fn terminated(&self) -> Vec<String> {
        self.terminated.lock().unwrap().clone()
    }
}

#[async_trait]
impl AutoscalingApi for MockAutoscaling {
    async fn describe_tags(&self, group_names: &[String]) -> Result<TagsByGroup> {
        let tags = self.tags.lock().unwrap();
        Ok(group_names
            .iter()
            .filter_map(|name| tags.get(name).map(|t| (name.clone(), t.clone())))
            .collect())
    }

    async fn set_desired_capacity(&self, group_name: &str, desired: i32) -> Result<()> {
        if self.failing_groups.lock().unwrap().contains(group_name) {
            return Err(BoosterError::Cloud(format!(
                "injected failure for '{group_name}'"
            )));
        }
        self.capacity_calls
            .lock()
            .unwrap()
            .push((group_name.to_string(), desired));
        Ok(())
    }

    async fn terminate_instance(&self, instance_id: &str) -> Result<()> {
        self.terminated
            .lock()
            .unwrap()
            .push(instance_id.to_string());
        Ok(())
    }
}
