// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Derivation of a ClusterScan's unified status from its child's observed state.
//!
//! Derivation is stateless: the same snapshot always yields the same result.

use crate::types::{ChildWorkload, UnifiedStatus};
use k8s_openapi::api::batch::v1::{CronJob, Job};

/// Unified status plus the fixed message that goes with it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedStatus {
    pub unified_status: UnifiedStatus,
    pub message: &'static str,
}

impl DerivedStatus {
    fn new(unified_status: UnifiedStatus, message: &'static str) -> Self {
        Self {
            unified_status,
            message,
        }
    }
}

pub fn derive_status(child: &ChildWorkload) -> DerivedStatus {
    match child {
        ChildWorkload::Scheduled(cron_job) => derive_cron_job_status(cron_job),
        ChildWorkload::Direct(job) => derive_job_status(job),
    }
}

/// Status for a CronJob that was created during this reconcile and has not run yet
pub fn derive_created_status(child: &ChildWorkload) -> DerivedStatus {
    match child {
        ChildWorkload::Scheduled(_) => DerivedStatus::new(
            UnifiedStatus::Scheduled,
            "CronJob is scheduled and awaiting next run.",
        ),
        ChildWorkload::Direct(job) => derive_job_status(job),
    }
}

/// Precedence: suspended, then running, then scheduled, then inactive
pub fn derive_cron_job_status(cron_job: &CronJob) -> DerivedStatus {
    let suspended = cron_job
        .spec
        .as_ref()
        .and_then(|s| s.suspend)
        .unwrap_or(false);
    let status = cron_job.status.as_ref();
    let running = status
        .and_then(|s| s.active.as_ref())
        .is_some_and(|active| !active.is_empty());
    let ever_scheduled = status.and_then(|s| s.last_schedule_time.as_ref()).is_some();

    if suspended {
        DerivedStatus::new(UnifiedStatus::Suspended, "CronJob is suspended.")
    } else if running {
        DerivedStatus::new(UnifiedStatus::Running, "CronJob is currently running.")
    } else if ever_scheduled {
        DerivedStatus::new(
            UnifiedStatus::Scheduled,
            "CronJob is scheduled and awaiting next run.",
        )
    } else {
        DerivedStatus::new(UnifiedStatus::Inactive, "CronJob is inactive.")
    }
}

/// Precedence: running, then succeeded, then failed, then pending
pub fn derive_job_status(job: &Job) -> DerivedStatus {
    let status = job.status.as_ref();
    let active = status.and_then(|s| s.active).unwrap_or(0);
    let succeeded = status.and_then(|s| s.succeeded).unwrap_or(0);
    let failed = status.and_then(|s| s.failed).unwrap_or(0);

    if active > 0 {
        DerivedStatus::new(UnifiedStatus::Running, "Job is currently running.")
    } else if succeeded > 0 {
        DerivedStatus::new(UnifiedStatus::Succeeded, "Job has completed successfully.")
    } else if failed > 0 {
        DerivedStatus::new(UnifiedStatus::Failed, "Job has failed.")
    } else {
        DerivedStatus::new(UnifiedStatus::Pending, "Job is pending.")
    }
}
