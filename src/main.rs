// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use clusterscan::config::Config;
use clusterscan::kubernetes::wait_for_scan_crd;
use clusterscan::reconcilers::ClusterScanReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting ClusterScan operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, resync_interval={:?}, api_timeout={:?}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.resync_interval,
        config.api_timeout
    );

    // Create Kubernetes client
    let client = Client::try_default()
        .await
        .context("failed to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    // Wait for the ClusterScan CRD before starting the reconciler
    info!("Waiting for ClusterScan CRD to become available...");
    wait_for_scan_crd(&client)
        .await
        .context("failed to discover the ClusterScan CRD")?;

    info!("Starting reconciler...");
    ClusterScanReconciler::new(client, config).run().await?;

    // Only reached after a shutdown signal
    warn!("ClusterScan reconciler stopped");
    Ok(())
}
