// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{ensure, Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Restrict watches to one namespace; `None` watches all namespaces
    pub watch_namespace: Option<String>,
    /// Requeue delay after a successful reconcile
    pub resync_interval: Duration,
    /// Upper bound on a single Kubernetes API round trip
    pub api_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            watch_namespace: None,
            resync_interval: Duration::from_secs(DEFAULT_RESYNC_INTERVAL_SECS),
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());
        let resync_interval =
            seconds(&lookup, "RESYNC_INTERVAL_SECS", DEFAULT_RESYNC_INTERVAL_SECS)?;
        let api_timeout = seconds(&lookup, "API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS)?;

        Ok(Config {
            watch_namespace,
            resync_interval,
            api_timeout,
        })
    }
}

fn seconds<F>(lookup: &F, key: &str, default: u64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{} must be a whole number of seconds, got '{}'", key, raw))?;
    ensure!(secs > 0, "{} must be at least 1 second, got '{}'", key, raw);
    Ok(Duration::from_secs(secs))
}
