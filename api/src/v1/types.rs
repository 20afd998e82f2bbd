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

use std::ops::Range;

use k8s_openapi::{
    api::core::v1::PersistentVolumeClaim,
    apimachinery::pkg::apis::meta::v1::{LabelSelector, ListMeta},
};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::{
    condition::P08ServerSetCondition,
    policy::{PersistentVolumeClaimRetentionPolicy, PodManagementPolicy, UpdateStrategy},
    template::PodTemplate,
    values::{
        API_VERSION, DEFAULT_MIN_READY_SECONDS, DEFAULT_REPLICAS, DEFAULT_REVISION_HISTORY_LIMIT, LIST_KIND,
    },
};

/// Desired state of a P08ServerSet.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "serverset.p08.io",
    version = "v1",
    kind = "P08ServerSet",
    plural = "p08serversets",
    singular = "p08serverset",
    shortname = "p08ss",
    status = "P08ServerSetStatus",
    scale = r#"{"specReplicasPath":".spec.replicas","statusReplicasPath":".status.replicas","labelSelectorPath":".status.labelSelector"}"#,
    derive = "Default",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct P08ServerSetSpec {
    /// Desired number of replicas of the given template, each with a stable identity.
    /// Defaults to 1 when unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0))]
    pub replicas: Option<i32>,

    /// Label query over pods that should match the replica count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,

    /// Pod every replica is stamped out from.
    pub template: PodTemplate,

    /// Claims pods are allowed to reference. Every claim must have a matching volumeMount by name
    /// in one container of the template, and takes precedence over template volumes of that name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_claim_templates: Vec<PersistentVolumeClaim>,

    /// Governing service of the set. It must exist before the set and provides the pods' network
    /// identity: pod-specific-string.serviceName.default.svc.cluster.local
    pub service_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_management_policy: Option<PodManagementPolicy>,

    pub update_strategy: UpdateStrategy,

    /// Maximum number of revisions kept in the revision history. Defaults to 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_history_limit: Option<i32>,

    /// Seconds a new pod must be ready without crashing to count as available. Defaults to 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim_retention_policy: Option<PersistentVolumeClaimRetentionPolicy>,
}

impl P08ServerSetSpec {
    pub fn replicas_or_default(&self) -> i32 {
        self.replicas.unwrap_or(DEFAULT_REPLICAS)
    }

    pub fn pod_management_policy_or_default(&self) -> PodManagementPolicy {
        self.pod_management_policy.unwrap_or_default()
    }

    pub fn revision_history_limit_or_default(&self) -> i32 {
        self.revision_history_limit.unwrap_or(DEFAULT_REVISION_HISTORY_LIMIT)
    }

    pub fn min_ready_seconds_or_default(&self) -> i32 {
        self.min_ready_seconds.unwrap_or(DEFAULT_MIN_READY_SECONDS)
    }

    pub fn retention_policy_or_default(&self) -> PersistentVolumeClaimRetentionPolicy {
        self.persistent_volume_claim_retention_policy.clone().unwrap_or_default().or_default()
    }
}

/// Observed state of a P08ServerSet.
#[derive(Clone, Debug, Default, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct P08ServerSetStatus {
    /// Most recent generation observed for this set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Number of pods created by the controller.
    #[serde(default)]
    pub replicas: i32,

    /// Number of pods with a Ready condition.
    #[serde(default)]
    pub ready_replicas: i32,

    /// Number of pods created from the revision in `current_revision`.
    #[serde(default)]
    pub current_replicas: i32,

    /// Number of pods created from the revision in `update_revision`.
    #[serde(default)]
    pub updated_replicas: i32,

    /// Revision used to generate pods in [0, currentReplicas).
    #[serde(default)]
    pub current_revision: String,

    /// Revision used to generate pods in [replicas - updatedReplicas, replicas).
    #[serde(default)]
    pub update_revision: String,

    /// Count of hash collisions met while naming the newest revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision_count: Option<i32>,

    #[serde(default)]
    pub conditions: Vec<P08ServerSetCondition>,

    /// Pods ready for at least minReadySeconds. The key keeps the historical `avaliableReplicas`
    /// spelling on the wire; `availableReplicas` is accepted on input and loses to the wire key when
    /// a document carries both.
    #[serde(rename = "avaliableReplicas", default, skip_serializing_if = "is_zero")]
    pub available_replicas: i32,

    /// Serialized selector mirrored for the scale subresource.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_selector: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusDocument {
    #[serde(default)]
    observed_generation: Option<i64>,
    #[serde(default)]
    replicas: i32,
    #[serde(default)]
    ready_replicas: i32,
    #[serde(default)]
    current_replicas: i32,
    #[serde(default)]
    updated_replicas: i32,
    #[serde(default)]
    current_revision: String,
    #[serde(default)]
    update_revision: String,
    #[serde(default)]
    collision_count: Option<i32>,
    #[serde(default)]
    conditions: Vec<P08ServerSetCondition>,
    #[serde(rename = "avaliableReplicas", default)]
    avaliable_replicas: Option<i32>,
    #[serde(default)]
    available_replicas: Option<i32>,
    #[serde(default)]
    label_selector: String,
}

impl<'de> Deserialize<'de> for P08ServerSetStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = StatusDocument::deserialize(deserializer)?;
        Ok(P08ServerSetStatus {
            observed_generation: document.observed_generation,
            replicas: document.replicas,
            ready_replicas: document.ready_replicas,
            current_replicas: document.current_replicas,
            updated_replicas: document.updated_replicas,
            current_revision: document.current_revision,
            update_revision: document.update_revision,
            collision_count: document.collision_count,
            conditions: document.conditions,
            available_replicas: document.avaliable_replicas.or(document.available_replicas).unwrap_or_default(),
            label_selector: document.label_selector,
        })
    }
}

impl P08ServerSetStatus {
    pub fn current_ordinals(&self) -> Range<i32> {
        0..self.current_replicas.max(0)
    }

    pub fn updated_ordinals(&self) -> Range<i32> {
        let end = self.replicas.max(0);
        (end - self.updated_replicas.clamp(0, end))..end
    }

    pub fn condition(&self, type_: &str) -> Option<&P08ServerSetCondition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }

    /// Replaces the condition of the same type. Returns false when a condition of that type already
    /// carries the same status and reason, in which case its transition time is kept.
    pub fn set_condition(&mut self, condition: P08ServerSetCondition) -> bool {
        if let Some(current) = self.condition(&condition.type_) {
            if current.status == condition.status && current.reason == condition.reason {
                return false;
            }
        }
        self.conditions.retain(|c| c.type_ != condition.type_);
        self.conditions.push(condition);
        true
    }

    pub fn remove_condition(&mut self, type_: &str) -> Option<P08ServerSetCondition> {
        let index = self.conditions.iter().position(|c| c.type_ == type_)?;
        Some(self.conditions.remove(index))
    }
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Collection of P08ServerSets as returned by list calls.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct P08ServerSetList {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<P08ServerSet>,
}

impl P08ServerSetList {
    pub fn new(items: Vec<P08ServerSet>) -> Self {
        P08ServerSetList { items, ..Default::default() }
    }
}

impl Default for P08ServerSetList {
    fn default() -> Self {
        P08ServerSetList {
            api_version: API_VERSION.to_string(),
            kind: LIST_KIND.to_string(),
            metadata: ListMeta::default(),
            items: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use kube::{CustomResourceExt, Resource};
    use serde_json::json;

    use super::*;
    use crate::v1::{
        condition::ConditionStatus,
        policy::PersistentVolumeClaimRetentionPolicyType,
        values::{CRD_NAME, GROUP, KIND, PLURAL, SHORT_NAME, VERSION},
    };

    fn init() {
        let _ = env_logger::builder()
            .target(env_logger::Target::Stdout)
            .filter_level(log::LevelFilter::Trace)
            .is_test(true)
            .try_init();
    }

    fn minimal_spec() -> P08ServerSetSpec {
        P08ServerSetSpec {
            service_name: "web".to_string(),
            update_strategy: UpdateStrategy::on_delete(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unset_optional_fields_are_omitted() {
        init();
        let value = serde_json::to_value(minimal_spec()).unwrap();
        assert_eq!(
            value,
            json!({
                "template": {},
                "serviceName": "web",
                "updateStrategy": { "type": "OnDelete" },
            })
        );
    }

    #[test]
    fn test_zero_status_serialization() {
        init();
        let value = serde_json::to_value(P08ServerSetStatus::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "replicas": 0,
                "readyReplicas": 0,
                "currentReplicas": 0,
                "updatedReplicas": 0,
                "currentRevision": "",
                "updateRevision": "",
                "conditions": [],
            })
        );
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("observedGeneration"));
        assert!(!object.contains_key("collisionCount"));
        assert!(!object.contains_key("avaliableReplicas"));
        assert!(!object.contains_key("labelSelector"));
    }

    #[test]
    fn test_available_replicas_wire_key() {
        let status = P08ServerSetStatus { available_replicas: 2, ..Default::default() };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["avaliableReplicas"], json!(2));
        assert!(value.get("availableReplicas").is_none());

        let corrected: P08ServerSetStatus = serde_json::from_value(json!({ "availableReplicas": 4 })).unwrap();
        assert_eq!(corrected.available_replicas, 4);
        let legacy: P08ServerSetStatus = serde_json::from_value(json!({ "avaliableReplicas": 3 })).unwrap();
        assert_eq!(legacy.available_replicas, 3);

        let both: P08ServerSetStatus =
            serde_json::from_str(r#"{"availableReplicas":4,"avaliableReplicas":3,"replicas":5}"#).unwrap();
        assert_eq!(both.available_replicas, 3);
        assert_eq!(both.replicas, 5);
    }

    #[test]
    fn test_default_accessors() {
        let spec = minimal_spec();
        assert_eq!(spec.replicas_or_default(), 1);
        assert_eq!(spec.pod_management_policy_or_default(), PodManagementPolicy::OrderedReady);
        assert_eq!(spec.revision_history_limit_or_default(), 10);
        assert_eq!(spec.min_ready_seconds_or_default(), 0);
        assert_eq!(
            spec.retention_policy_or_default(),
            PersistentVolumeClaimRetentionPolicy {
                when_deleted: Some(PersistentVolumeClaimRetentionPolicyType::Retain),
                when_scaled: Some(PersistentVolumeClaimRetentionPolicyType::Retain),
            }
        );

        // an explicit zero is not replaced by the default
        let spec = P08ServerSetSpec { replicas: Some(0), revision_history_limit: Some(0), ..minimal_spec() };
        assert_eq!(spec.replicas_or_default(), 0);
        assert_eq!(spec.revision_history_limit_or_default(), 0);
    }

    #[test]
    fn test_ordinal_ranges() {
        let status = P08ServerSetStatus { replicas: 5, current_replicas: 3, updated_replicas: 2, ..Default::default() };
        assert_eq!(status.current_ordinals(), 0..3);
        assert_eq!(status.updated_ordinals(), 3..5);

        let inconsistent = P08ServerSetStatus { replicas: 2, updated_replicas: 7, ..Default::default() };
        assert_eq!(inconsistent.updated_ordinals(), 0..2);
        assert!(P08ServerSetStatus::default().updated_ordinals().is_empty());
    }

    #[test]
    fn test_conditions_are_never_duplicated() {
        init();
        let mut status = P08ServerSetStatus::default();
        assert!(status.set_condition(P08ServerSetCondition::new("Available", ConditionStatus::False, "Scaling", "")));
        assert!(status.set_condition(P08ServerSetCondition::new("Progressing", ConditionStatus::True, "", "")));

        // same status and reason keeps the original transition time
        let first = status.condition("Available").cloned().unwrap();
        let mut repeated = P08ServerSetCondition::new("Available", ConditionStatus::False, "Scaling", "again");
        repeated.last_transition_time = None;
        assert!(!status.set_condition(repeated));
        assert_eq!(status.condition("Available"), Some(&first));

        assert!(status.set_condition(P08ServerSetCondition::new("Available", ConditionStatus::True, "Ready", "")));
        assert_eq!(status.conditions.len(), 2);
        assert_eq!(status.conditions[0].type_, "Progressing");
        assert_eq!(status.conditions[1].status, ConditionStatus::True);

        let decoded: P08ServerSetStatus = serde_json::from_str(&serde_json::to_string(&status).unwrap()).unwrap();
        assert_eq!(decoded, status);

        assert_eq!(status.remove_condition("Progressing").map(|c| c.type_), Some("Progressing".to_string()));
        assert!(status.remove_condition("Progressing").is_none());
        assert_eq!(status.conditions.len(), 1);
    }

    #[test]
    fn test_resource_identity() {
        assert_eq!(P08ServerSet::group(&()), GROUP);
        assert_eq!(P08ServerSet::version(&()), VERSION);
        assert_eq!(P08ServerSet::kind(&()), KIND);
        assert_eq!(P08ServerSet::plural(&()), PLURAL);
        assert_eq!(P08ServerSet::api_version(&()), API_VERSION);

        let list = P08ServerSetList::default();
        assert_eq!(list.api_version, API_VERSION);
        assert_eq!(list.kind, LIST_KIND);
        assert!(list.items.is_empty());
    }

    #[test]
    fn test_crd_declares_subresources() {
        let crd = P08ServerSet::crd();
        assert_eq!(crd.metadata.name.as_deref(), Some(CRD_NAME));
        assert_eq!(crd.spec.group, GROUP);
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(crd.spec.names.kind, KIND);
        assert_eq!(crd.spec.names.plural, PLURAL);
        assert_eq!(crd.spec.names.short_names, Some(vec![SHORT_NAME.to_string()]));

        let version = &crd.spec.versions[0];
        assert_eq!(version.name, VERSION);
        let subresources = version.subresources.as_ref().unwrap();
        assert!(subresources.status.is_some());
        let scale = subresources.scale.as_ref().unwrap();
        assert_eq!(scale.spec_replicas_path, ".spec.replicas");
        assert_eq!(scale.status_replicas_path, ".status.replicas");
        assert_eq!(scale.label_selector_path.as_deref(), Some(".status.labelSelector"));

        let schema = serde_json::to_value(&version.schema).unwrap();
        let spec = &schema["openAPIV3Schema"]["properties"]["spec"];
        assert_eq!(spec["properties"]["template"]["x-kubernetes-preserve-unknown-fields"], json!(true));
        assert_eq!(spec["properties"]["podManagementPolicy"]["enum"], json!(["OrderedReady", "Parallel"]));
        assert_eq!(
            spec["properties"]["updateStrategy"]["properties"]["type"]["enum"],
            json!(["RollingUpdate", "OnDelete"])
        );
        let required: Vec<&str> = spec["required"].as_array().unwrap().iter().filter_map(|v| v.as_str()).collect();
        assert!(required.contains(&"serviceName"));
        assert!(required.contains(&"template"));
        assert!(required.contains(&"updateStrategy"));
        assert!(!required.contains(&"replicas"));
    }

    #[test]
    fn test_new_object_has_no_status() {
        let mut set = P08ServerSet::new("web", minimal_spec());
        set.metadata.namespace = Some("default".to_string());
        assert_eq!(set.metadata.name.as_deref(), Some("web"));
        assert!(set.status.is_none());
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value["apiVersion"], json!(API_VERSION));
        assert_eq!(value["kind"], json!(KIND));
    }
}
