// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ClusterScan custom resource and the workload types derived from it.

pub mod cluster_scan;
pub mod conditions;
pub mod workload;

pub use cluster_scan::{ClusterScan, ClusterScanSpec, ClusterScanStatus, ScanIdentity, ScanMode};
pub use workload::{ChildKind, ChildWorkload, UnifiedStatus};
