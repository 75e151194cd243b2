// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0

//! Event deletion against the cluster.

use k8s_openapi::api::core::v1::Event;
use kube::api::DeleteParams;
use kube::{Api, Client};

use crate::error::Result;

/// Delete an event. NotFound counts as success: the event is gone
/// either way.
pub async fn delete_event(client: &Client, namespace: &str, name: &str) -> Result<()> {
    let api: Api<Event> = Api::namespaced(client.clone(), namespace);

    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
        Err(e) => Err(e.into()),
    }
}
