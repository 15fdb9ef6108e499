// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use crate::types::{ClusterScan, ClusterScanSpec};
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, CronJobStatus, Job, JobSpec, JobStatus};
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{OwnerReference, Time};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request seen by the [`MockService`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: Bytes,
}

/// A mock HTTP service that returns predefined responses based on method and exact path.
///
/// Several responses registered for the same route are served in order; the
/// last one is repeated. Unmatched requests get a 404. Every request is recorded.
#[derive(Clone, Default)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests seen for a method and exact path
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// JSON bodies of all requests for a method and exact path, oldest first
    pub fn json_bodies(&self, method: &str, path: &str) -> Vec<serde_json::Value> {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }

    /// JSON body of the most recent request for a method and exact path
    pub fn json_body(&self, method: &str, path: &str) -> Option<serde_json::Value> {
        self.json_bodies(method, path).pop()
    }

    fn next_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&(method.to_string(), path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mock = self.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let method = parts.method.to_string();
            let path = parts.uri.path().to_string();
            let query = parts.uri.query().unwrap_or_default().to_string();
            let body = body.collect().await?.to_bytes();

            let (status, response) = mock
                .next_response(&method, &path)
                .unwrap_or_else(|| (404, not_found_json("resource", &path)));
            mock.requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                query,
                body,
            });

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(response.into_bytes()))?)
        })
    }
}

fn owner_references(owner_uid: Option<&str>) -> Option<Vec<OwnerReference>> {
    owner_uid.map(|uid| {
        vec![OwnerReference {
            api_version: "scan.example.com/v1".to_string(),
            kind: "ClusterScan".to_string(),
            name: "foo".to_string(),
            uid: uid.to_string(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }]
    })
}

/// A ClusterScan as returned by the API server
pub fn scan(name: &str, namespace: &str, schedule: Option<&str>) -> ClusterScan {
    ClusterScan {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{}", name)),
            resource_version: Some("42".to_string()),
            generation: Some(1),
            ..Default::default()
        },
        spec: ClusterScanSpec {
            schedule: schedule.map(str::to_string),
            job_template: JobSpec::default(),
        },
        status: None,
    }
}

pub fn scan_json(scan: &ClusterScan) -> String {
    let mut value = serde_json::to_value(scan).unwrap();
    value["apiVersion"] = serde_json::json!("scan.example.com/v1");
    value["kind"] = serde_json::json!("ClusterScan");
    value.to_string()
}

/// A Job with the given run counters
pub fn job_json(
    name: &str,
    namespace: &str,
    owner_uid: Option<&str>,
    active: i32,
    succeeded: i32,
    failed: i32,
) -> String {
    let job = Job {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            owner_references: owner_references(owner_uid),
            ..Default::default()
        },
        spec: Some(JobSpec::default()),
        status: Some(JobStatus {
            active: Some(active),
            succeeded: Some(succeeded),
            failed: Some(failed),
            ..Default::default()
        }),
    };
    serde_json::to_string(&job).unwrap()
}

/// A CronJob with `active` running jobs and optionally a past schedule time
pub fn cron_job_json(
    name: &str,
    namespace: &str,
    owner_uid: Option<&str>,
    schedule: &str,
    suspend: Option<bool>,
    active: usize,
    last_scheduled: bool,
) -> String {
    let cron_job = CronJob {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            owner_references: owner_references(owner_uid),
            ..Default::default()
        },
        spec: Some(CronJobSpec {
            schedule: schedule.to_string(),
            suspend,
            ..Default::default()
        }),
        status: Some(CronJobStatus {
            active: Some(
                (0..active)
                    .map(|i| ObjectReference {
                        kind: Some("Job".to_string()),
                        name: Some(format!("{}-{}", name, i)),
                        namespace: Some(namespace.to_string()),
                        ..Default::default()
                    })
                    .collect(),
            ),
            last_schedule_time: last_scheduled
                .then(|| Time(Utc.with_ymd_and_hms(2026, 10, 19, 3, 0, 0).unwrap())),
            ..Default::default()
        }),
    };
    serde_json::to_string(&cron_job).unwrap()
}

/// Mark a serialized object as being deleted
pub fn terminating(object_json: &str) -> String {
    let mut value: serde_json::Value = serde_json::from_str(object_json).unwrap();
    value["metadata"]["deletionTimestamp"] = serde_json::json!("2026-10-19T10:00:00Z");
    value.to_string()
}

/// A failure Status response
pub fn status_json(code: u16, reason: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("request failed: {}", reason),
        "reason": reason,
        "code": code
    })
    .to_string()
}

pub fn status_success_json() -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Success",
        "code": 200
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a 409 already exists response
pub fn already_exists_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" already exists", resource, name),
        "reason": "AlreadyExists",
        "code": 409
    })
    .to_string()
}
