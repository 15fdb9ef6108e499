// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Time-bounded Kubernetes API calls

use crate::error::{Result, ScanError};
use std::future::Future;
use std::time::Duration;

/// Run a single API round trip, giving up after `timeout`.
/// Dropping the call future aborts the request.
pub async fn bounded<T, F>(operation: &'static str, timeout: Duration, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, kube::Error>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(ScanError::from),
        Err(_) => Err(ScanError::Timeout {
            operation,
            after: timeout,
        }),
    }
}
