// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reading ClusterScans and writing their status subresource

use crate::constants::conditions::REASON_RECONCILE_ERROR;
use crate::error::{Result, ScanError};
use crate::kubernetes::call::bounded;
use crate::types::conditions::{reconciled, set_condition};
use crate::types::{ClusterScan, ClusterScanStatus};
use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::{
    api::{Patch, PatchParams},
    Api, ResourceExt,
};
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetch a ClusterScan, `None` when it no longer exists
pub async fn fetch_scan(
    api: &Api<ClusterScan>,
    name: &str,
    timeout: Duration,
) -> Result<Option<ClusterScan>> {
    bounded("get ClusterScan", timeout, api.get_opt(name)).await
}

/// Replace the status of a ClusterScan.
///
/// The patch carries the resourceVersion the status was computed from, so a
/// concurrent writer makes the API server answer 409 Conflict.
#[instrument(skip(api, scan, status, timeout), fields(scan = %scan.name_any()))]
pub async fn write_status(
    api: &Api<ClusterScan>,
    scan: &ClusterScan,
    status: &ClusterScanStatus,
    timeout: Duration,
) -> Result<ClusterScan> {
    let resource_version = scan
        .resource_version()
        .ok_or(ScanError::MissingObjectKey("metadata.resourceVersion"))?;

    let patch = serde_json::json!({
        "metadata": { "resourceVersion": resource_version },
        "status": serde_json::to_value(status)?,
    });

    let updated = bounded(
        "update ClusterScan status",
        timeout,
        api.patch_status(&scan.name_any(), &PatchParams::default(), &Patch::Merge(&patch)),
    )
    .await?;
    debug!("ClusterScan status written");
    Ok(updated)
}

/// Record a failed reconcile as a `Reconciled=False` condition, leaving the
/// rest of the status untouched
#[instrument(skip(api, scan, error, timeout), fields(scan = %scan.name_any()))]
pub async fn record_failure(
    api: &Api<ClusterScan>,
    scan: &ClusterScan,
    error: &ScanError,
    timeout: Duration,
) -> Result<()> {
    let now = Time(Utc::now());
    let condition = reconciled(
        false,
        REASON_RECONCILE_ERROR,
        &error.to_string(),
        scan.metadata.generation,
        &now,
    );
    let patch = serde_json::json!({
        "status": { "conditions": set_condition(scan.conditions(), condition) },
    });

    bounded(
        "record ClusterScan failure",
        timeout,
        api.patch_status(&scan.name_any(), &PatchParams::default(), &Patch::Merge(&patch)),
    )
    .await?;
    Ok(())
}
