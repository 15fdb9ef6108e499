// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API access for CRD discovery, child workloads and ClusterScan status.

pub mod call;
pub mod children;
pub mod crd;
pub mod scans;

pub use children::{ensure_child, remove_stale_child, Ensured};
pub use crd::wait_for_scan_crd;
pub use scans::{fetch_scan, record_failure, write_status};
