// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ClusterScan reconciler - keeps one Job or CronJob per ClusterScan and mirrors
//! its state into the ClusterScan status.

use crate::config::Config;
use crate::constants::conditions::REASON_CHILD_SYNCED;
use crate::constants::requeue::SHORT_SECS;
use crate::error::{Result, ScanError};
use crate::kubernetes::{
    ensure_child, fetch_scan, record_failure, remove_stale_child, write_status, Ensured,
};
use crate::reconcilers::retry::{compute_backoff, RetryTracker};
use crate::types::conditions::{reconciled, set_condition};
use crate::types::{ChildWorkload, ClusterScan, ClusterScanStatus};
use crate::workload::{
    build_child, derive_created_status, derive_status, stale_child, with_owner, DerivedStatus,
};
use chrono::Utc;
use futures::StreamExt;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    runtime::{
        controller::Action,
        reflector::{ObjectRef, Store},
        Controller,
    },
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// What the controller should do after a successful reconcile pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Status written; check again after the resync interval
    Done,
    /// Nothing was written; try again after the delay
    Requeue(Duration),
    /// The ClusterScan is gone or going; wait for the next change
    Noop,
}

impl ReconcileOutcome {
    pub fn into_action(self, resync_interval: Duration) -> Action {
        match self {
            ReconcileOutcome::Done => Action::requeue(resync_interval),
            ReconcileOutcome::Requeue(delay) => Action::requeue(delay),
            ReconcileOutcome::Noop => Action::await_change(),
        }
    }
}

pub struct ClusterScanReconciler {
    client: Client,
    config: Config,
    retries: RetryTracker,
}

impl ClusterScanReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self {
            client,
            config,
            retries: RetryTracker::new(),
        }
    }

    /// Watch ClusterScans and the Jobs and CronJobs they own until shutdown
    pub async fn run(self) -> anyhow::Result<()> {
        let scans: Api<ClusterScan> = self.api();
        let jobs: Api<Job> = self.api();
        let cron_jobs: Api<CronJob> = self.api();
        let context = Arc::new(self);

        let controller = Controller::new(scans, WatcherConfig::default())
            .owns(jobs, WatcherConfig::default())
            .owns(cron_jobs, WatcherConfig::default())
            .shutdown_on_signal();
        let store = controller.store();
        let tracker = context.clone();

        controller
            .run(reconcile, error_policy, context)
            .for_each(|res| {
                // Deleted scans are never reconciled again, drop their failure counts here
                if !tracker.retries.is_empty() {
                    tracker.retries.cleanup(&live_keys(&store));
                }
                async move {
                    match res {
                        Ok(o) => debug!("Reconciled ClusterScan: {:?}", o),
                        Err(e) => warn!("Reconciliation error: {:?}", e),
                    }
                }
            })
            .await;

        Ok(())
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + Debug
            + DeserializeOwned,
    {
        match self.config.watch_namespace.as_deref() {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        }
    }
}

fn live_keys(store: &Store<ClusterScan>) -> Vec<String> {
    store
        .state()
        .iter()
        .map(|scan| retry_key(&ObjectRef::from_obj(scan.as_ref())))
        .collect()
}

fn retry_key(key: &ObjectRef<ClusterScan>) -> String {
    format!("{}/{}", key.namespace.as_deref().unwrap_or_default(), key.name)
}

/// One reconcile pass for the ClusterScan identified by `key`.
///
/// Safe to repeat: the child's name is derived from the scan's name, an
/// existing child is reused and a concurrent create is treated as success.
#[instrument(skip(ctx, key), fields(scan = %retry_key(key)))]
pub async fn reconcile_scan(
    ctx: &ClusterScanReconciler,
    key: &ObjectRef<ClusterScan>,
) -> Result<ReconcileOutcome> {
    let namespace = key
        .namespace
        .as_deref()
        .ok_or(ScanError::MissingObjectKey("metadata.namespace"))?;
    let timeout = ctx.config.api_timeout;
    let scans: Api<ClusterScan> = Api::namespaced(ctx.client.clone(), namespace);

    let Some(scan) = fetch_scan(&scans, &key.name, timeout).await? else {
        debug!("ClusterScan no longer exists, leaving cleanup to garbage collection");
        return Ok(ReconcileOutcome::Noop);
    };
    if scan.is_terminating() {
        debug!("ClusterScan is being deleted, leaving cleanup to garbage collection");
        return Ok(ReconcileOutcome::Noop);
    }

    let identity = scan
        .identity()
        .ok_or(ScanError::MissingObjectKey("metadata.namespace"))?;
    let owner = scan
        .controller_owner_ref(&())
        .ok_or(ScanError::MissingObjectKey("metadata.uid"))?;
    let owner_uid = owner.uid.clone();
    let mode = scan.mode();

    debug!("Reconciling ClusterScan in {:?} mode", mode);

    let (stale_kind, stale_name) = stale_child(&identity, &mode);
    remove_stale_child(
        &ctx.client,
        &identity.namespace,
        stale_kind,
        &stale_name,
        &owner_uid,
        timeout,
    )
    .await?;

    let desired = with_owner(build_child(&identity, &mode, &scan.spec), owner);
    let ensured = ensure_child(&ctx.client, desired, &owner_uid, timeout).await?;
    let (snapshot, derived) = match ensured {
        Ensured::Created(child) => {
            let derived = derive_created_status(&child);
            (child, derived)
        }
        Ensured::Existing(child) => {
            let derived = derive_status(&child);
            (child, derived)
        }
        Ensured::Terminating | Ensured::Vanished => {
            debug!("Child workload is not settled yet, retrying shortly");
            return Ok(ReconcileOutcome::Requeue(Duration::from_secs(SHORT_SECS)));
        }
    };

    let status = next_status(&scan, &snapshot, &derived, Time(Utc::now()));
    write_status(&scans, &scan, &status, timeout).await?;

    info!("ClusterScan status is {}: {}", derived.unified_status, derived.message);
    Ok(ReconcileOutcome::Done)
}

/// Project the observed child into a complete new ClusterScan status
fn next_status(
    scan: &ClusterScan,
    snapshot: &ChildWorkload,
    derived: &DerivedStatus,
    now: Time,
) -> ClusterScanStatus {
    let active = match snapshot {
        ChildWorkload::Scheduled(cron_job) => Some(
            cron_job
                .status
                .as_ref()
                .and_then(|s| s.active.clone())
                .unwrap_or_default(),
        ),
        ChildWorkload::Direct(_) => None,
    };
    let condition = reconciled(
        true,
        REASON_CHILD_SYNCED,
        derived.message,
        scan.metadata.generation,
        &now,
    );

    ClusterScanStatus {
        last_schedule_time: Some(now),
        active,
        conditions: set_condition(scan.conditions(), condition),
        unified_status: Some(derived.unified_status),
        message: Some(derived.message.to_string()),
        observed_generation: scan.metadata.generation,
    }
}

async fn reconcile(scan: Arc<ClusterScan>, ctx: Arc<ClusterScanReconciler>) -> Result<Action> {
    let key = ObjectRef::from_obj(scan.as_ref());

    match reconcile_scan(&ctx, &key).await {
        Ok(outcome) => {
            ctx.retries.reset(&retry_key(&key));
            Ok(outcome.into_action(ctx.config.resync_interval))
        }
        Err(err) => {
            if let Some(namespace) = scan.namespace() {
                let scans: Api<ClusterScan> = Api::namespaced(ctx.client.clone(), &namespace);
                let timeout = ctx.config.api_timeout;
                if let Err(e) = record_failure(&scans, &scan, &err, timeout).await {
                    warn!("Failed to record error on ClusterScan {}: {}", key, e);
                }
            }
            Err(err)
        }
    }
}

fn error_policy(
    scan: Arc<ClusterScan>,
    error: &ScanError,
    ctx: Arc<ClusterScanReconciler>,
) -> Action {
    let key = retry_key(&ObjectRef::from_obj(scan.as_ref()));
    let attempt = ctx.retries.increment(&key);
    let delay = compute_backoff(attempt);
    error!(
        "Reconciliation of ClusterScan {} failed (attempt {}): {}, retrying in {:?}",
        key, attempt, error, delay
    );
    Action::requeue(delay)
}
