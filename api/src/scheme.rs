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

//! Registry of the API kinds this crate knows how to decode.
//!
//! A [`Scheme`] maps group/version/kind to the Rust type serving it. It is an ordinary value so
//! tests and embedding programs can build isolated registries; [`scheme()`] returns the
//! process-wide instance with the v1 types installed.

use std::{
    any::{type_name, TypeId},
    collections::BTreeMap,
    fmt,
    sync::{PoisonError, RwLock},
};

use kube::core::GroupVersionKind;
use lazy_static::lazy_static;
use log::{debug, error, trace};
use scheme_error::Error;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

lazy_static! {
    static ref SCHEME: Scheme = {
        let scheme = Scheme::new();
        if let Err(e) = crate::v1::add_to_scheme(&scheme) {
            error!("failed to install v1 types into the scheme: {}", e);
        }
        scheme
    };
}

/// Process-wide scheme, populated with the v1 types on first use.
pub fn scheme() -> &'static Scheme {
    &SCHEME
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl TypeKey {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        TypeKey { group: group.to_string(), version: version.to_string(), kind: kind.to_string() }
    }

    /// Splits an `apiVersion` such as `apps/v1`, or `v1` for the core group.
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => TypeKey::new(group, version, kind),
            None => TypeKey::new("", api_version, kind),
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

impl From<&GroupVersionKind> for TypeKey {
    fn from(gvk: &GroupVersionKind) -> Self {
        TypeKey::new(&gvk.group, &gvk.version, &gvk.kind)
    }
}

impl From<TypeKey> for GroupVersionKind {
    fn from(key: TypeKey) -> Self {
        GroupVersionKind::gvk(&key.group, &key.version, &key.kind)
    }
}

/// A Rust type that can be registered into a [`Scheme`].
pub trait SchemeObject: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    fn type_key() -> TypeKey;

    fn plural() -> Option<String> {
        None
    }

    fn is_list() -> bool {
        false
    }
}

#[derive(Clone)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    pub plural: Option<String>,
    pub list: bool,
    pub type_name: &'static str,
    type_id: TypeId,
    new_object: fn() -> Result<Value, serde_json::Error>,
    check: fn(&Value) -> Result<(), serde_json::Error>,
}

impl TypeDescriptor {
    fn of<T: SchemeObject>() -> Self {
        TypeDescriptor {
            key: T::type_key(),
            plural: T::plural(),
            list: T::is_list(),
            type_name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            new_object: default_document::<T>,
            check: check_document::<T>,
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("plural", &self.plural)
            .field("list", &self.list)
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn default_document<T: SchemeObject>() -> Result<Value, serde_json::Error> {
    let mut document = serde_json::to_value(T::default())?;
    if let Value::Object(fields) = &mut document {
        let key = T::type_key();
        fields.insert("apiVersion".to_string(), Value::String(key.api_version()));
        fields.insert("kind".to_string(), Value::String(key.kind));
    }
    Ok(document)
}

fn check_document<T: SchemeObject>(document: &Value) -> Result<(), serde_json::Error> {
    T::deserialize(document).map(|_| ())
}

/// Reads `apiVersion` and `kind` from a raw document.
pub fn type_key_of(document: &Value) -> Result<TypeKey, Error> {
    let api_version = document
        .get("apiVersion")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingTypeMeta { field: "apiVersion" })?;
    let kind = document
        .get("kind")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingTypeMeta { field: "kind" })?;
    Ok(TypeKey::from_api_version(api_version, kind))
}

#[derive(Debug, Default)]
pub struct Scheme {
    types: RwLock<BTreeMap<TypeKey, TypeDescriptor>>,
}

impl Scheme {
    pub fn new() -> Self {
        Scheme::default()
    }

    /// Registers `T` under its type key. Returns `Ok(false)` when `T` is already registered there,
    /// and a conflict error when the key belongs to another type.
    pub fn register<T: SchemeObject>(&self) -> Result<bool, Error> {
        let descriptor = TypeDescriptor::of::<T>();
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(registered) = types.get(&descriptor.key) {
            if registered.type_id == descriptor.type_id {
                trace!("{} is already registered", descriptor.key);
                return Ok(false);
            }
            return Err(Error::Conflict {
                key: descriptor.key.to_string(),
                registered: registered.type_name,
                requested: descriptor.type_name,
            });
        }
        debug!("registering {} as {}", descriptor.key, descriptor.type_name);
        types.insert(descriptor.key.clone(), descriptor);
        Ok(true)
    }

    pub fn recognizes(&self, key: &TypeKey) -> bool {
        self.types.read().unwrap_or_else(PoisonError::into_inner).contains_key(key)
    }

    pub fn descriptor(&self, key: &TypeKey) -> Option<TypeDescriptor> {
        self.types.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    /// Registered keys in group, version, kind order.
    pub fn known_kinds(&self) -> Vec<TypeKey> {
        self.types.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Default document of the registered kind, with `apiVersion` and `kind` set.
    pub fn new_object(&self, key: &TypeKey) -> Result<Value, Error> {
        let descriptor = self.descriptor(key).ok_or_else(|| Error::NotRegistered { key: key.to_string() })?;
        (descriptor.new_object)().map_err(|source| Error::Decode { key: key.to_string(), source })
    }

    /// Decodes a document into `T` after checking its type meta names the kind `T` serves.
    pub fn decode<T: SchemeObject>(&self, document: Value) -> Result<T, Error> {
        let key = type_key_of(&document)?;
        let descriptor = self.descriptor(&key).ok_or_else(|| Error::NotRegistered { key: key.to_string() })?;
        if descriptor.type_id != TypeId::of::<T>() {
            return Err(Error::TypeMismatch {
                key: key.to_string(),
                registered: descriptor.type_name,
                requested: type_name::<T>(),
            });
        }
        serde_json::from_value(document).map_err(|source| Error::Decode { key: key.to_string(), source })
    }

    /// Decodes a document into whichever registered type its type meta names.
    pub fn check(&self, document: &Value) -> Result<TypeKey, Error> {
        let key = type_key_of(document)?;
        let descriptor = self.descriptor(&key).ok_or_else(|| Error::NotRegistered { key: key.to_string() })?;
        (descriptor.check)(document).map_err(|source| Error::Decode { key: key.to_string(), source })?;
        Ok(key)
    }
}

pub mod scheme_error {
    use thiserror::Error;
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Object has no {} set", field)]
        MissingTypeMeta { field: &'static str },

        #[error("{} is not registered in the scheme", key)]
        NotRegistered { key: String },

        #[error("{} is already registered as {}, cannot register {}", key, registered, requested)]
        Conflict { key: String, registered: &'static str, requested: &'static str },

        #[error("{} decodes into {}, not {}", key, registered, requested)]
        TypeMismatch { key: String, registered: &'static str, requested: &'static str },

        #[error("Decode {} reported error: {source}", key)]
        Decode { key: String, source: serde_json::Error },
    }
}
