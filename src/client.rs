// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation and kubeconfig utilities

use crate::error::{DeployError, Result};
use kube::{config::KubeConfigOptions, Client};
use tracing::info;

/// Create a Kubernetes client from the ambient environment: in-cluster
/// config when running inside a pod, otherwise the local kubeconfig.
pub async fn create_client() -> Result<Client> {
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");
    Ok(client)
}

/// Create a Kubernetes client from a kubeconfig string
pub async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    use kube::config::Kubeconfig;

    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| DeployError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                DeployError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| DeployError::KubeconfigError(format!("Failed to create client: {}", e)))
}
