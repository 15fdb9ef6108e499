// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::batch::v1::{CronJob, Job};
use kube::api::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of the child workload's state, recomputed every reconcile
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum UnifiedStatus {
    Suspended,
    Running,
    Scheduled,
    Inactive,
    Succeeded,
    Failed,
    Pending,
}

impl fmt::Display for UnifiedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnifiedStatus::Suspended => "Suspended",
            UnifiedStatus::Running => "Running",
            UnifiedStatus::Scheduled => "Scheduled",
            UnifiedStatus::Inactive => "Inactive",
            UnifiedStatus::Succeeded => "Succeeded",
            UnifiedStatus::Failed => "Failed",
            UnifiedStatus::Pending => "Pending",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildKind {
    CronJob,
    Job,
}

impl ChildKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildKind::CronJob => "CronJob",
            ChildKind::Job => "Job",
        }
    }
}

/// The workload generated for a ClusterScan: a CronJob for recurring scans,
/// a Job for one-off scans
#[derive(Clone, Debug, PartialEq)]
pub enum ChildWorkload {
    Scheduled(CronJob),
    Direct(Job),
}

impl ChildWorkload {
    pub fn kind(&self) -> ChildKind {
        match self {
            ChildWorkload::Scheduled(_) => ChildKind::CronJob,
            ChildWorkload::Direct(_) => ChildKind::Job,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            ChildWorkload::Scheduled(cron_job) => &cron_job.metadata,
            ChildWorkload::Direct(job) => &job.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            ChildWorkload::Scheduled(cron_job) => &mut cron_job.metadata,
            ChildWorkload::Direct(job) => &mut job.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }
}
