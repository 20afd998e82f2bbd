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

use std::time::Duration;

use apiclient_error::Error;
use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{
    api::{Api, Patch, PatchParams},
    Client,
};
use log::{debug, warn};
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};

use crate::values::{MAX_RETRIES_TIMES, RETRY_BASE_DELAY, RETRY_MAX_DELAY};

#[derive(Clone)]
pub struct CrdClient {
    pub client: Client,
}

impl CrdClient {
    pub fn new(client: Client) -> Self {
        CrdClient { client }
    }
}

#[async_trait]
pub trait ApplyCrd: Clone + Sized + Send + Sync {
    async fn apply_crd(
        &self,
        crd: &CustomResourceDefinition,
        field_manager: &str,
    ) -> Result<CustomResourceDefinition, Error>;
}

#[async_trait]
impl ApplyCrd for CrdClient {
    async fn apply_crd(
        &self,
        crd: &CustomResourceDefinition,
        field_manager: &str,
    ) -> Result<CustomResourceDefinition, Error> {
        let name = crd.metadata.name.clone().ok_or(Error::MissingName)?;
        let crd_api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let params = PatchParams::apply(field_manager).force();
        let (crd_api, name, params) = (&crd_api, name.as_str(), &params);
        debug!("applying customresourcedefinition {} as {}", name, field_manager);
        let applied = RetryIf::start(
            retry_strategy(),
            || async move { crd_api.patch(name, params, &Patch::Apply(crd)).await },
            |e: &kube::Error| {
                let transient = is_transient(e);
                if transient {
                    warn!("apply customresourcedefinition {} failed, retrying: {}", name, e);
                }
                transient
            },
        )
        .await?;
        Ok(applied)
    }
}

fn retry_strategy() -> impl Iterator<Item = Duration> {
    // 2^n * base: base*2, base*4, ...
    ExponentialBackoff::from_millis(2)
        .factor(RETRY_BASE_DELAY.as_millis() as u64)
        .max_delay(RETRY_MAX_DELAY)
        .map(jitter)
        .take(MAX_RETRIES_TIMES)
}

fn is_transient(error: &kube::Error) -> bool {
    match error {
        kube::Error::Api(response) => response.code == 429 || response.code >= 500,
        kube::Error::HyperError(_) | kube::Error::Service(_) => true,
        _ => false,
    }
}

pub mod apiclient_error {
    use thiserror::Error;
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Kubernetes reported error: {source}")]
        KubeError {
            #[from]
            source: kube::Error,
        },

        #[error("CustomResourceDefinition has no metadata.name")]
        MissingName,
    }
}
