// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed Deployment operations: build, list, create, get, delete, and
//! conflict-retried update.

use crate::error::{DeployError, Result};
use crate::retry::{retry_on_conflict, RetryPolicy};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::{
    api::{DeleteParams, ListParams, ObjectMeta, PostParams},
    Api, Client, ResourceExt,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Typed Deployment API scoped to a namespace
pub fn deployments(client: Client, namespace: &str) -> Api<Deployment> {
    Api::namespaced(client, namespace)
}

/// Build a fully specified Deployment: one `web` container exposing a
/// named HTTP port, with selector and pod template both labeled
/// `app=<name>`.
pub fn build_deployment(name: &str, replicas: i32, image: &str) -> Deployment {
    let labels = BTreeMap::from([("app".to_string(), name.to_string())]);

    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: "web".to_string(),
                        image: Some(image.to_string()),
                        ports: Some(vec![ContainerPort {
                            name: Some("http".to_string()),
                            container_port: 80,
                            protocol: Some("TCP".to_string()),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// List every Deployment in the collection, unfiltered
pub async fn list_deployments(api: &Api<Deployment>) -> Result<Vec<Deployment>> {
    let list = api.list(&ListParams::default()).await?;
    debug!("Listed {} deployments", list.items.len());
    Ok(list.items)
}

/// Create a Deployment. A name collision is an error, never retried;
/// callers that need a repeatable run delete the object first.
pub async fn create_deployment(api: &Api<Deployment>, deployment: &Deployment) -> Result<Deployment> {
    let created = api.create(&PostParams::default(), deployment).await?;
    info!("Created deployment {}", created.name_any());
    Ok(created)
}

/// Fetch a Deployment by name
pub async fn get_deployment(api: &Api<Deployment>, name: &str) -> Result<Deployment> {
    Ok(api.get(name).await?)
}

/// Delete a Deployment by name, treating "not found" as success
pub async fn delete_deployment_if_present(api: &Api<Deployment>, name: &str) -> Result<()> {
    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            info!("Deleted deployment {}", name);
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("Deployment {} not present, nothing to delete", name);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Update the replica count and container image of a Deployment through a
/// read-modify-write cycle. On a version conflict the whole cycle is
/// re-executed from the get, so the mutation always lands on the latest
/// server version. Non-conflict errors abort immediately.
#[instrument(skip(api, policy))]
pub async fn update_deployment(
    api: &Api<Deployment>,
    name: &str,
    replicas: i32,
    image: &str,
    policy: &RetryPolicy,
) -> Result<Deployment> {
    let updated = retry_on_conflict(policy, || {
        let api = api.clone();
        let name = name.to_string();
        let image = image.to_string();
        async move {
            let mut current = api.get(&name).await?;
            set_replicas_and_image(&mut current, replicas, &image)?;
            Ok(api.replace(&name, &PostParams::default(), &current).await?)
        }
    })
    .await?;

    info!("Updated deployment {}", updated.name_any());
    Ok(updated)
}

fn set_replicas_and_image(deployment: &mut Deployment, replicas: i32, image: &str) -> Result<()> {
    let name = deployment.name_any();

    let spec = deployment.spec.as_mut().ok_or_else(|| {
        DeployError::MalformedDeployment(format!("deployment {} has no spec", name))
    })?;
    spec.replicas = Some(replicas);

    let container = spec
        .template
        .spec
        .as_mut()
        .and_then(|pod| pod.containers.first_mut())
        .ok_or_else(|| {
            DeployError::MalformedDeployment(format!("deployment {} has no containers", name))
        })?;
    container.image = Some(image.to_string());

    Ok(())
}
