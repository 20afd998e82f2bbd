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

use std::{fs, path::Path};

use kube::CustomResourceExt;
use log::debug;
use manifest_error::Error;
use serde::Deserialize;
use serde_json::Value;
use serverset_api::{
    scheme::{scheme_error, Scheme},
    v1::{P08ServerSet, PlainJson},
    TypeKey,
};

use crate::commands::OutputFormat;

pub struct DocumentReport {
    /// Position of the document in the manifest, counting from 0.
    pub index: usize,
    pub result: Result<TypeKey, scheme_error::Error>,
}

pub fn render_crd(format: OutputFormat) -> Result<String, Error> {
    let crd = P08ServerSet::crd();
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&PlainJson(&serde_json::to_value(&crd)?))?,
        OutputFormat::Json => serde_json::to_string_pretty(&crd)? + "\n",
    };
    Ok(rendered)
}

/// Decodes every non-empty document of a YAML stream through the scheme.
pub fn check_manifest(content: &str, scheme: &Scheme) -> Result<Vec<DocumentReport>, Error> {
    let mut reports = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            debug!("document {} is empty, skipping", index);
            continue;
        }
        reports.push(DocumentReport { index, result: scheme.check(&value) });
    }
    Ok(reports)
}

pub fn check_file(path: &Path, scheme: &Scheme) -> Result<Vec<DocumentReport>, Error> {
    let content = fs::read_to_string(path).map_err(|source| Error::Read { path: path.display().to_string(), source })?;
    check_manifest(&content, scheme)
}

pub mod manifest_error {
    use thiserror::Error;
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Cannot read manifest {}, error: {source}", path)]
        Read { path: String, source: std::io::Error },

        #[error("YAML reported error: {source}")]
        Yaml {
            #[from]
            source: serde_yaml::Error,
        },

        #[error("JSON reported error: {source}")]
        Json {
            #[from]
            source: serde_json::Error,
        },
    }
}
