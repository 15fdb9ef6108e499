// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::workload::UnifiedStatus;
use k8s_openapi::api::batch::v1::JobSpec;
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "scan.example.com", version = "v1", kind = "ClusterScan")]
#[kube(namespaced)]
#[kube(status = "ClusterScanStatus")]
#[kube(shortname = "cscan")]
#[kube(printcolumn = r#"{"name":"Schedule","type":"string","jsonPath":".spec.schedule"}"#)]
#[kube(printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.unifiedStatus"}"#)]
#[kube(printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#)]
#[serde(rename_all = "camelCase")]
pub struct ClusterScanSpec {
    /// Cron expression for recurring scans. Empty or absent runs the scan once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// Job to run for the scan, handed to the generated workload unmodified
    pub job_template: JobSpec,
}

/// Observed state of a ClusterScan. Rewritten completely on every reconcile,
/// so the optional fields serialize as `null` to clear stale values on merge patch.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterScanStatus {
    #[serde(default)]
    pub last_schedule_time: Option<Time>,
    /// Jobs currently started by the CronJob (recurring scans only)
    #[serde(default)]
    pub active: Option<Vec<ObjectReference>>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub unified_status: Option<UnifiedStatus>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub observed_generation: Option<i64>,
}

/// How a ClusterScan executes, decided once per reconcile from `spec.schedule`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanMode {
    Recurring { schedule: String },
    OneOff,
}

impl ScanMode {
    pub fn of(spec: &ClusterScanSpec) -> Self {
        match spec.schedule.as_deref() {
            Some(schedule) if !schedule.trim().is_empty() => ScanMode::Recurring {
                schedule: schedule.to_string(),
            },
            _ => ScanMode::OneOff,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, ScanMode::Recurring { .. })
    }
}

/// Name and namespace of a ClusterScan; child identities are derived from it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanIdentity {
    pub name: String,
    pub namespace: String,
}

impl ClusterScan {
    /// Get the execution mode of this scan
    pub fn mode(&self) -> ScanMode {
        ScanMode::of(&self.spec)
    }

    /// Get the identity of this scan, if it is namespaced
    pub fn identity(&self) -> Option<ScanIdentity> {
        Some(ScanIdentity {
            name: self.name_any(),
            namespace: self.namespace()?,
        })
    }

    /// Check if the scan is being deleted
    pub fn is_terminating(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Current conditions, empty when the scan has no status yet
    pub fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}
