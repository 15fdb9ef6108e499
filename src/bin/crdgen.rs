// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Prints the ClusterScan CustomResourceDefinition as YAML.

use clusterscan::types::ClusterScan;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&ClusterScan::crd())?);
    Ok(())
}
