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

use k8s_openapi::{
    apimachinery::pkg::apis::meta::v1::Time,
    chrono::{SubsecRound, Utc},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tri-state status of a condition.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

string_enum!(ConditionStatus, "condition.status", condition_error, {
    True => "True",
    False => "False",
    Unknown => "Unknown",
});

/// State of a server set at a certain point.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct P08ServerSetCondition {
    /// Free-form condition type, unique within a status.
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    /// Serialized as `null` when the transition time was never recorded.
    #[serde(default)]
    pub last_transition_time: Option<Time>,
    /// The reason for the condition's last transition.
    #[serde(default)]
    pub reason: String,
    /// A human readable message indicating details about the transition.
    #[serde(default)]
    pub message: String,
}

impl P08ServerSetCondition {
    /// Stamps the transition time in whole seconds, the precision `Time` is written with.
    pub fn new(type_: &str, status: ConditionStatus, reason: &str, message: &str) -> Self {
        P08ServerSetCondition {
            type_: type_.to_string(),
            status,
            last_transition_time: Some(Time(Utc::now().trunc_subsecs(0))),
            reason: reason.to_string(),
            message: message.to_string(),
        }
    }
}

pub mod condition_error {
    use thiserror::Error;
    #[derive(Error, Debug, PartialEq, Eq)]
    pub enum Error {
        #[error("{} value {:?} is not one of the supported values", kind, value)]
        UnknownValue { kind: &'static str, value: String },
    }
}
