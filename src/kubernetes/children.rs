// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Get-or-create of the Job or CronJob owned by a ClusterScan

use crate::constants::OPERATOR_NAME;
use crate::error::{Result, ScanError};
use crate::kubernetes::call::bounded;
use crate::types::{ChildKind, ChildWorkload};
use crate::workload::is_controlled_by;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use kube::{
    api::{DeleteParams, Patch, PatchParams, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Result of making sure a child workload exists
#[derive(Debug, Clone, PartialEq)]
pub enum Ensured<T> {
    /// Created during this call
    Created(T),
    /// Already present; for CronJobs this is the object after applying the desired spec
    Existing(T),
    /// Present but being deleted
    Terminating,
    /// Create reported AlreadyExists but the object was gone by the time it was re-read
    Vanished,
}

impl<T> Ensured<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Ensured<U> {
        match self {
            Ensured::Created(t) => Ensured::Created(f(t)),
            Ensured::Existing(t) => Ensured::Existing(f(t)),
            Ensured::Terminating => Ensured::Terminating,
            Ensured::Vanished => Ensured::Vanished,
        }
    }
}

/// Make sure the desired child exists in the cluster.
///
/// CronJobs are only ever written with server-side apply, on create and on
/// every later pass, so one Apply manager owns their fields and anything
/// dropped from the ClusterScan's job template is dropped from the CronJob.
/// Jobs are created with a plain POST and observed as-is afterwards since
/// their pod template cannot change after creation.
#[instrument(
    skip(client, desired, owner_uid, timeout),
    fields(kind = desired.kind().as_str(), name = %desired.name())
)]
pub async fn ensure_child(
    client: &Client,
    desired: ChildWorkload,
    owner_uid: &str,
    timeout: Duration,
) -> Result<Ensured<ChildWorkload>> {
    let namespace = desired
        .metadata()
        .namespace
        .clone()
        .ok_or(ScanError::MissingObjectKey("metadata.namespace"))?;

    match desired {
        ChildWorkload::Scheduled(cron_job) => {
            let api: Api<CronJob> = Api::namespaced(client.clone(), &namespace);
            let ensured = ensure(&api, cron_job, owner_uid, timeout, true).await?;
            Ok(ensured.map(ChildWorkload::Scheduled))
        }
        ChildWorkload::Direct(job) => {
            let api: Api<Job> = Api::namespaced(client.clone(), &namespace);
            let ensured = ensure(&api, job, owner_uid, timeout, false).await?;
            Ok(ensured.map(ChildWorkload::Direct))
        }
    }
}

async fn ensure<K>(
    api: &Api<K>,
    desired: K,
    owner_uid: &str,
    timeout: Duration,
    server_side: bool,
) -> Result<Ensured<K>>
where
    K: Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned,
{
    let name = desired
        .meta()
        .name
        .clone()
        .ok_or(ScanError::MissingObjectKey("metadata.name"))?;

    if let Some(existing) = bounded("get child", timeout, api.get_opt(&name)).await? {
        return observe_existing(api, existing, &desired, owner_uid, timeout, server_side).await;
    }

    if server_side {
        let created = apply(api, &name, &desired, timeout).await?;
        info!("Created {} {} with server-side apply", K::kind(&()), name);
        return Ok(Ensured::Created(created));
    }

    let pp = PostParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    };
    match bounded("create child", timeout, api.create(&pp, &desired)).await {
        Ok(created) => {
            info!("Created {} {}", K::kind(&()), name);
            Ok(Ensured::Created(created))
        }
        Err(e) if e.is_already_exists() => {
            debug!("{} {} was created concurrently, re-reading it", K::kind(&()), name);
            match bounded("get child", timeout, api.get_opt(&name)).await? {
                Some(existing) => {
                    observe_existing(api, existing, &desired, owner_uid, timeout, false).await
                }
                None => Ok(Ensured::Vanished),
            }
        }
        Err(e) => Err(e),
    }
}

async fn observe_existing<K>(
    api: &Api<K>,
    existing: K,
    desired: &K,
    owner_uid: &str,
    timeout: Duration,
    server_side: bool,
) -> Result<Ensured<K>>
where
    K: Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned,
{
    let name = existing.name_any();

    if existing.meta().deletion_timestamp.is_some() {
        debug!("{} {} is terminating", K::kind(&()), name);
        return Ok(Ensured::Terminating);
    }

    if !is_controlled_by(existing.meta(), owner_uid) {
        return Err(ScanError::ChildNotOwned {
            kind: K::kind(&()).to_string(),
            name,
        });
    }

    if !server_side {
        return Ok(Ensured::Existing(existing));
    }

    let applied = apply(api, &name, desired, timeout).await?;
    debug!("Applied desired spec to {} {}", K::kind(&()), name);
    Ok(Ensured::Existing(applied))
}

async fn apply<K>(api: &Api<K>, name: &str, desired: &K, timeout: Duration) -> Result<K>
where
    K: Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned,
{
    let pp = PatchParams::apply(OPERATOR_NAME).force();
    bounded("apply child", timeout, api.patch(name, &pp, &Patch::Apply(desired))).await
}

/// Delete the child left behind by the other execution mode.
///
/// Only children controlled by `owner_uid` are touched. Returns whether a
/// deletion was issued or already in progress.
#[instrument(skip(client, kind, owner_uid, timeout), fields(kind = kind.as_str()))]
pub async fn remove_stale_child(
    client: &Client,
    namespace: &str,
    kind: ChildKind,
    name: &str,
    owner_uid: &str,
    timeout: Duration,
) -> Result<bool> {
    match kind {
        ChildKind::CronJob => {
            let api: Api<CronJob> = Api::namespaced(client.clone(), namespace);
            delete_if_controlled(&api, name, owner_uid, timeout).await
        }
        ChildKind::Job => {
            let api: Api<Job> = Api::namespaced(client.clone(), namespace);
            delete_if_controlled(&api, name, owner_uid, timeout).await
        }
    }
}

async fn delete_if_controlled<K>(
    api: &Api<K>,
    name: &str,
    owner_uid: &str,
    timeout: Duration,
) -> Result<bool>
where
    K: Resource<DynamicType = ()> + Clone + Debug + DeserializeOwned,
{
    let Some(stale) = bounded("get stale child", timeout, api.get_opt(name)).await? else {
        return Ok(false);
    };

    if !is_controlled_by(stale.meta(), owner_uid) {
        warn!(
            "{} {} is not controlled by this ClusterScan, leaving it in place",
            K::kind(&()),
            name
        );
        return Ok(false);
    }

    if stale.meta().deletion_timestamp.is_some() {
        debug!("Stale {} {} is already terminating", K::kind(&()), name);
        return Ok(true);
    }

    let dp = DeleteParams::background();
    match bounded("delete stale child", timeout, api.delete(name, &dp)).await {
        Ok(_) => {
            info!("Deleted stale {} {} after execution mode change", K::kind(&()), name);
            Ok(true)
        }
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}
