// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// API group and version of the ClusterScan custom resource
pub const API_GROUP: &str = "scan.example.com";
pub const API_VERSION: &str = "v1";

/// The operator name used for server-side apply and the managed-by label
pub const OPERATOR_NAME: &str = "clusterscan-operator";

/// Kubernetes label keys stamped on generated workloads
pub mod labels {
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
    /// Name of the ClusterScan that produced the workload
    pub const CLUSTER_SCAN: &str = "scan.example.com/cluster-scan";
}

/// Name suffixes of generated child workloads
pub mod suffix {
    pub const CRON_JOB: &str = "-cron";
    pub const JOB: &str = "-job";
}

/// Condition types and reasons written to ClusterScan status
pub mod conditions {
    pub const RECONCILED: &str = "Reconciled";
    pub const REASON_CHILD_SYNCED: &str = "ChildSynced";
    pub const REASON_RECONCILE_ERROR: &str = "ReconcileError";
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

/// Requeue timing for the reconciler
pub mod requeue {
    /// Short delay used while a child is terminating or a create race is settling
    pub const SHORT_SECS: u64 = 5;
    /// First retry delay after an error
    pub const ERROR_BASE_SECS: u64 = 5;
    /// Upper bound for the error backoff
    pub const ERROR_MAX_SECS: u64 = 300;
}
