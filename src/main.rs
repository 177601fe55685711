// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use tracing::info;

use kubedeploy::client::create_client;
use kubedeploy::config::Config;
use kubedeploy::deployments::{
    build_deployment, create_deployment, delete_deployment_if_present, deployments,
    list_deployments, update_deployment,
};
use kubedeploy::retry::RetryPolicy;

const DEPLOYMENT_NAME: &str = "demo-deployment";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env();
    info!("Managing deployments in namespace {}", config.namespace);

    // Create Kubernetes client
    let client = create_client().await?;
    let api = deployments(client, &config.namespace);

    // A leftover object from a previous run would make the create fail
    // with a name collision, so clear it first.
    delete_deployment_if_present(&api, DEPLOYMENT_NAME).await?;

    create_deployment(&api, &build_deployment(DEPLOYMENT_NAME, 2, "nginx:1.12")).await?;

    let all = list_deployments(&api).await?;
    info!(
        "Found {} deployments in namespace {}",
        all.len(),
        config.namespace
    );

    update_deployment(&api, DEPLOYMENT_NAME, 1, "nginx:1.13", &RetryPolicy::default()).await?;

    Ok(())
}
