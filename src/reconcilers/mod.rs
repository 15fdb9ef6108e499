// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod cluster_scan;
pub mod retry;

pub use cluster_scan::{reconcile_scan, ClusterScanReconciler, ReconcileOutcome};
pub use retry::{compute_backoff, RetryTracker};
