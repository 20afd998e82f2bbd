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

use k8s_openapi::api::core::v1::PodTemplateSpec;
use schemars::{
    gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject},
    JsonSchema,
};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use template_error::Error;

/// Pod template passed through without a schema.
///
/// The document is kept as an insertion ordered JSON object so fields the typed
/// `PodTemplateSpec` does not know about survive a read/write cycle unchanged. The generated CRD
/// schema marks it with `x-kubernetes-preserve-unknown-fields` so the API server does not prune it.
///
/// Numbers keep their source text when read from JSON. Numbers written in the canonical form of an
/// `i64`, `u64` or `f64` are serialized as such for every format. Any other number text, such as
/// `1.50` or `1e2`, is written verbatim by serde_json and in serde_json's arbitrary-precision
/// number form for other formats.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PodTemplate(pub Map<String, Value>);

impl Serialize for PodTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PlainObject(&self.0).serialize(serializer)
    }
}

struct PlainObject<'a>(&'a Map<String, Value>);

impl Serialize for PlainObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key, PlainJson(value))))
    }
}

/// Serializes a JSON value with canonical numbers handed to the serializer as native integers or
/// floats. Use it to write `Value` trees to formats other than JSON.
pub struct PlainJson<'a>(pub &'a Value);

impl Serialize for PlainJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Number(number) => serialize_number(number, serializer),
            Value::Array(items) => serializer.collect_seq(items.iter().map(PlainJson)),
            Value::Object(fields) => PlainObject(fields).serialize(serializer),
            other => other.serialize(serializer),
        }
    }
}

fn serialize_number<S: Serializer>(number: &Number, serializer: S) -> Result<S::Ok, S::Error> {
    let text = number.to_string();
    if let Some(unsigned) = text.parse::<u64>().ok().filter(|u| u.to_string() == text) {
        return serializer.serialize_u64(unsigned);
    }
    if let Some(signed) = text.parse::<i64>().ok().filter(|i| i.to_string() == text) {
        return serializer.serialize_i64(signed);
    }
    let canonical_float = text
        .parse::<f64>()
        .ok()
        .filter(|f| Number::from_f64(*f).map(|n| n.to_string()).as_deref() == Some(text.as_str()));
    match canonical_float {
        Some(float) => serializer.serialize_f64(float),
        None => number.serialize(serializer),
    }
}

impl PodTemplate {
    pub fn from_typed(template: &PodTemplateSpec) -> Result<Self, Error> {
        match serde_json::to_value(template)? {
            Value::Object(document) => Ok(PodTemplate(document)),
            other => Err(Error::NotAnObject { found: json_type(&other) }),
        }
    }

    /// Decodes the document into the typed pod template, dropping fields it does not know about.
    pub fn to_typed(&self) -> Result<PodTemplateSpec, Error> {
        Ok(PodTemplateSpec::deserialize(Value::Object(self.0.clone()))?)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Value> for PodTemplate {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(document) => Ok(PodTemplate(document)),
            other => Err(Error::NotAnObject { found: json_type(&other) }),
        }
    }
}

impl JsonSchema for PodTemplate {
    fn schema_name() -> String {
        "PodTemplate".to_string()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        let mut schema = SchemaObject { instance_type: Some(InstanceType::Object.into()), ..Default::default() };
        schema.extensions.insert("x-kubernetes-preserve-unknown-fields".to_string(), Value::Bool(true));
        Schema::Object(schema)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub mod template_error {
    use thiserror::Error;
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Pod template must be an object, found {}", found)]
        NotAnObject { found: &'static str },

        #[error("Pod template conversion error: {source}")]
        Conversion {
            #[from]
            source: serde_json::Error,
        },
    }
}
