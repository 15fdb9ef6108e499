// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes-style condition bookkeeping for ClusterScan status

use crate::constants::conditions::RECONCILED;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};

/// Build a `Reconciled` condition
pub fn reconciled(
    success: bool,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
    now: &Time,
) -> Condition {
    Condition {
        type_: RECONCILED.to_string(),
        status: if success { "True" } else { "False" }.to_string(),
        reason: reason.to_string(),
        message: message.to_string(),
        observed_generation,
        last_transition_time: now.clone(),
    }
}

/// Insert or replace the condition of the same type.
///
/// The previous transition time is kept unless the condition's status changed.
pub fn set_condition(existing: &[Condition], condition: Condition) -> Vec<Condition> {
    let mut conditions = existing.to_vec();

    match conditions.iter_mut().find(|c| c.type_ == condition.type_) {
        Some(current) => {
            let last_transition_time = if current.status == condition.status {
                current.last_transition_time.clone()
            } else {
                condition.last_transition_time.clone()
            };
            *current = Condition {
                last_transition_time,
                ..condition
            };
        }
        None => conditions.push(condition),
    }

    conditions
}
