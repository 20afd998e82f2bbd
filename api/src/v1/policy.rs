/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * p08serverset is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

//! Update strategy, pod management and claim retention types of a P08ServerSet.

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use policy_error::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::values::{DEFAULT_MAX_UNAVAILABLE, DEFAULT_PARTITION};

/// How pods of a server set are created, replaced and removed.
///
/// `OrderedReady` creates pods in strictly increasing ordinal order on scale up and removes them
/// in strictly decreasing order on scale down, waiting for the previous pod to be ready or
/// terminated. `Parallel` creates and deletes pods as soon as the replica count changes.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum PodManagementPolicy {
    #[default]
    OrderedReady,
    Parallel,
}

string_enum!(PodManagementPolicy, "podManagementPolicy", policy_error, {
    OrderedReady => "OrderedReady",
    Parallel => "Parallel",
});

/// Algorithm used to roll a new revision of the pod template out.
///
/// `RollingUpdate` replaces pods from the highest ordinal down to the partition. `OnDelete` only
/// recreates pods from the new revision once they are deleted manually.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum UpdateStrategyType {
    #[default]
    RollingUpdate,
    OnDelete,
}

string_enum!(UpdateStrategyType, "updateStrategy.type", policy_error, {
    RollingUpdate => "RollingUpdate",
    OnDelete => "OnDelete",
});

/// What happens to claims stamped out from the volume claim templates.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum PersistentVolumeClaimRetentionPolicyType {
    #[default]
    Retain,
    Delete,
}

string_enum!(PersistentVolumeClaimRetentionPolicyType, "persistentVolumeClaimRetentionPolicy", policy_error, {
    Retain => "Retain",
    Delete => "Delete",
});

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStrategy {
    #[serde(rename = "type")]
    pub type_: UpdateStrategyType,
    /// Only meaningful when `type_` is `RollingUpdate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_update: Option<RollingUpdateStrategy>,
}

impl UpdateStrategy {
    pub fn rolling(partition: i32) -> Self {
        UpdateStrategy {
            type_: UpdateStrategyType::RollingUpdate,
            rolling_update: Some(RollingUpdateStrategy { partition, max_unavailable: None }),
        }
    }

    pub fn on_delete() -> Self {
        UpdateStrategy { type_: UpdateStrategyType::OnDelete, rolling_update: None }
    }

    pub fn partition_or_default(&self) -> i32 {
        self.rolling_update.as_ref().map_or(DEFAULT_PARTITION, |r| r.partition)
    }
}

#[derive(Clone, Debug, Default, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RollingUpdateStrategy {
    /// Ordinal at which the set is partitioned: pods from `replicas - 1` down to `partition` are
    /// updated, pods below it keep their revision.
    #[serde(default)]
    pub partition: i32,
    /// Absolute number or percentage of pods (ex: 10%) that can be unavailable during the update.
    /// The key keeps the historical `maxUnvailable` spelling on the wire; `maxUnavailable` is
    /// accepted on input and loses to the wire key when a document carries both.
    #[serde(rename = "maxUnvailable", default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RollingUpdateDocument {
    #[serde(default)]
    partition: i32,
    #[serde(rename = "maxUnvailable", default)]
    max_unvailable: Option<IntOrString>,
    #[serde(default)]
    max_unavailable: Option<IntOrString>,
}

impl<'de> Deserialize<'de> for RollingUpdateStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = RollingUpdateDocument::deserialize(deserializer)?;
        Ok(RollingUpdateStrategy {
            partition: document.partition,
            max_unavailable: document.max_unvailable.or(document.max_unavailable),
        })
    }
}

impl RollingUpdateStrategy {
    pub fn max_unavailable_or_default(&self) -> IntOrString {
        self.max_unavailable.clone().unwrap_or(IntOrString::Int(DEFAULT_MAX_UNAVAILABLE))
    }

    /// Number of pods allowed to be unavailable out of `replicas`. Percentages are rounded up and
    /// the result is never below one pod.
    pub fn resolve_max_unavailable(&self, replicas: i32) -> Result<i32, Error> {
        let resolved = match self.max_unavailable_or_default() {
            IntOrString::Int(value) if value < 0 => {
                return Err(Error::InvalidMaxUnavailable { value: value.to_string() });
            },
            IntOrString::Int(value) => value,
            IntOrString::String(value) => scale_percent(&value, replicas)?,
        };
        Ok(resolved.max(1))
    }
}

fn scale_percent(value: &str, replicas: i32) -> Result<i32, Error> {
    let invalid = || Error::InvalidMaxUnavailable { value: value.to_string() };
    let percent: i64 = value.strip_suffix('%').and_then(|p| p.trim().parse().ok()).ok_or_else(invalid)?;
    if percent < 0 {
        return Err(invalid());
    }
    let scaled = (percent * i64::from(replicas.max(0)) + 99) / 100;
    i32::try_from(scaled).map_err(|_| invalid())
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaimRetentionPolicy {
    /// Applies when the server set is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_deleted: Option<PersistentVolumeClaimRetentionPolicyType>,
    /// Applies to claims of pods removed by a scale down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_scaled: Option<PersistentVolumeClaimRetentionPolicyType>,
}

impl PersistentVolumeClaimRetentionPolicy {
    /// Fills unset fields with `Retain`, the behavior clusters had before the policy existed.
    pub fn or_default(&self) -> Self {
        PersistentVolumeClaimRetentionPolicy {
            when_deleted: Some(self.when_deleted.unwrap_or_default()),
            when_scaled: Some(self.when_scaled.unwrap_or_default()),
        }
    }
}

pub mod policy_error {
    use thiserror::Error;
    #[derive(Error, Debug, PartialEq, Eq)]
    pub enum Error {
        #[error("{} value {:?} is not one of the supported values", kind, value)]
        UnknownValue { kind: &'static str, value: String },

        #[error("maxUnavailable {:?} is neither a non-negative integer nor a percentage", value)]
        InvalidMaxUnavailable { value: String },
    }
}
