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

use anyhow::Result;
use http::{Request, Response};
use hyper::{body::to_bytes, Body};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;

use crate::values::FIELD_MANAGER;

type ApiServerHandle = tower_test::mock::Handle<Request<Body>, Response<Body>>;
pub struct ApiServerVerifier(pub ApiServerHandle);

pub enum Testcases {
    ApplyCrd(CustomResourceDefinition),
    ApplyCrdAfterServerError(CustomResourceDefinition),
    ApplyCrdRejected(CustomResourceDefinition),
}

pub async fn timeout_after_5s(handle: tokio::task::JoinHandle<()>) {
    tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("timeout on mock apiserver")
        .expect("scenario succeeded")
}

impl ApiServerVerifier {
    pub fn run(self, cases: Testcases) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            match cases {
                Testcases::ApplyCrd(crd) => self.handler_crd_apply(crd).await,
                Testcases::ApplyCrdAfterServerError(crd) => {
                    self.handler_crd_apply_failed(crd.clone(), 500).await.unwrap().handler_crd_apply(crd).await
                },
                Testcases::ApplyCrdRejected(crd) => self.handler_crd_apply_failed(crd, 422).await,
            }
            .expect("Case completed without errors");
        })
    }

    async fn handler_crd_apply(mut self, crd: CustomResourceDefinition) -> Result<Self> {
        let (request, send) = self.0.next_request().await.expect("service not called");
        let mut applied = verify_apply_request(request, &crd).await?;
        applied.metadata.resource_version = Some("1".to_string());
        dbg!("handler_crd_apply");
        let response = serde_json::to_vec(&applied).unwrap();
        send.send_response(Response::builder().body(Body::from(response)).unwrap());
        Ok(self)
    }

    async fn handler_crd_apply_failed(mut self, crd: CustomResourceDefinition, code: u16) -> Result<Self> {
        let (request, send) = self.0.next_request().await.expect("service not called");
        verify_apply_request(request, &crd).await?;
        let reason = if code >= 500 { "InternalError" } else { "Invalid" };
        let response_json = serde_json::json!(
            { "kind": "Status", "apiVersion": "v1", "status": "Failure", "message": "mock apiserver failure", "reason": reason, "code": code }
        );
        dbg!("handler_crd_apply_failed");
        let response = serde_json::to_vec(&response_json).unwrap();
        send.send_response(Response::builder().status(code).body(Body::from(response)).unwrap());
        Ok(self)
    }
}

async fn verify_apply_request(
    request: Request<Body>,
    crd: &CustomResourceDefinition,
) -> Result<CustomResourceDefinition> {
    assert_eq!(request.method(), http::Method::PATCH);
    let name = crd.metadata.name.clone().unwrap_or_default();
    assert_eq!(request.uri().path(), format!("/apis/apiextensions.k8s.io/v1/customresourcedefinitions/{}", name));
    let query = request.uri().query().unwrap_or_default().to_string();
    assert!(query.contains(&format!("fieldManager={}", FIELD_MANAGER)));
    assert!(query.contains("force=true"));
    assert_eq!(
        request.headers().get(http::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/apply-patch+yaml")
    );
    let body = to_bytes(request.into_body()).await?;
    let applied: CustomResourceDefinition = serde_json::from_slice(&body)?;
    assert_eq!(&applied, crd);
    Ok(applied)
}
