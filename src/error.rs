// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

/// Every variant is retryable: the controller requeues with backoff.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Missing object key: {0}")]
    MissingObjectKey(&'static str),

    #[error("{kind} {name} exists but is not controlled by this ClusterScan")]
    ChildNotOwned { kind: String, name: String },

    #[error("Failed to serialize status: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ScanError {
    /// The API server reported the object as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScanError::KubeError(kube::Error::Api(err)) if err.code == 404)
    }

    /// A create lost the race against another writer
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            ScanError::KubeError(kube::Error::Api(err)) if err.reason == "AlreadyExists"
        )
    }

    /// A write carried a stale resourceVersion
    pub fn is_conflict(&self) -> bool {
        matches!(self, ScanError::KubeError(kube::Error::Api(err)) if err.reason == "Conflict")
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kube::error::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> ScanError {
        ScanError::KubeError(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} error", reason),
            reason: reason.to_string(),
            code,
        }))
    }

    #[test]
    fn test_classifies_api_errors() {
        assert!(api_error(404, "NotFound").is_not_found());
        assert!(api_error(409, "AlreadyExists").is_already_exists());
        assert!(api_error(409, "Conflict").is_conflict());
        assert!(!api_error(409, "Conflict").is_already_exists());
        assert!(!api_error(500, "InternalError").is_not_found());
    }

    #[test]
    fn test_timeout_is_not_an_api_error() {
        let err = ScanError::Timeout {
            operation: "get ClusterScan",
            after: Duration::from_secs(30),
        };
        assert!(!err.is_not_found());
        assert!(!err.is_conflict());
        assert_eq!(err.to_string(), "get ClusterScan timed out after 30s");
    }
}
