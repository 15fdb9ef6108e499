// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pure construction of the workload a ClusterScan should own.

use crate::constants::{labels, suffix, OPERATOR_NAME};
use crate::types::{ChildKind, ChildWorkload, ClusterScanSpec, ScanIdentity, ScanMode};
use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, Job, JobTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Name of the CronJob generated for a recurring scan
pub fn cron_job_name(scan_name: &str) -> String {
    format!("{}{}", scan_name, suffix::CRON_JOB)
}

/// Name of the Job generated for a one-off scan
pub fn job_name(scan_name: &str) -> String {
    format!("{}{}", scan_name, suffix::JOB)
}

/// Build the desired child workload for a scan. No ownership is attached here,
/// see [`with_owner`].
pub fn build_child(
    identity: &ScanIdentity,
    mode: &ScanMode,
    spec: &ClusterScanSpec,
) -> ChildWorkload {
    match mode {
        ScanMode::Recurring { schedule } => ChildWorkload::Scheduled(CronJob {
            metadata: child_metadata(cron_job_name(&identity.name), identity),
            spec: Some(CronJobSpec {
                schedule: schedule.clone(),
                job_template: JobTemplateSpec {
                    metadata: None,
                    spec: Some(spec.job_template.clone()),
                },
                ..Default::default()
            }),
            status: None,
        }),
        ScanMode::OneOff => ChildWorkload::Direct(Job {
            metadata: child_metadata(job_name(&identity.name), identity),
            spec: Some(spec.job_template.clone()),
            status: None,
        }),
    }
}

fn child_metadata(name: String, identity: &ScanIdentity) -> ObjectMeta {
    ObjectMeta {
        name: Some(name),
        namespace: Some(identity.namespace.clone()),
        labels: Some(BTreeMap::from([
            (labels::MANAGED_BY.to_string(), OPERATOR_NAME.to_string()),
            (labels::CLUSTER_SCAN.to_string(), identity.name.clone()),
        ])),
        ..Default::default()
    }
}

/// Return a copy of the child with `owner` as its only controlling owner.
/// Non-controller owner references already present are kept.
pub fn with_owner(child: ChildWorkload, owner: OwnerReference) -> ChildWorkload {
    let mut child = child;
    let metadata = child.metadata_mut();

    let mut owners: Vec<OwnerReference> = metadata
        .owner_references
        .take()
        .unwrap_or_default()
        .into_iter()
        .filter(|o| o.controller != Some(true) && o.uid != owner.uid)
        .collect();
    owners.push(owner);
    metadata.owner_references = Some(owners);

    child
}

/// Kind and name of the child the opposite mode would generate
pub fn stale_child(identity: &ScanIdentity, mode: &ScanMode) -> (ChildKind, String) {
    match mode {
        ScanMode::Recurring { .. } => (ChildKind::Job, job_name(&identity.name)),
        ScanMode::OneOff => (ChildKind::CronJob, cron_job_name(&identity.name)),
    }
}

/// Check if the object's controlling owner has the given UID
pub fn is_controlled_by(metadata: &ObjectMeta, owner_uid: &str) -> bool {
    metadata
        .owner_references
        .as_ref()
        .is_some_and(|owners| {
            owners
                .iter()
                .any(|o| o.controller == Some(true) && o.uid == owner_uid)
        })
}
