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

pub const GROUP: &str = "serverset.p08.io";
pub const VERSION: &str = "v1";
pub const API_VERSION: &str = "serverset.p08.io/v1";

pub const KIND: &str = "P08ServerSet";
pub const LIST_KIND: &str = "P08ServerSetList";
pub const PLURAL: &str = "p08serversets";
pub const SINGULAR: &str = "p08serverset";
pub const SHORT_NAME: &str = "p08ss";
pub const CRD_NAME: &str = "p08serversets.serverset.p08.io";

// defaults applied by the admission/defaulting stage, never by this crate
pub const DEFAULT_REPLICAS: i32 = 1;
pub const DEFAULT_REVISION_HISTORY_LIMIT: i32 = 10;
pub const DEFAULT_MIN_READY_SECONDS: i32 = 0;
pub const DEFAULT_PARTITION: i32 = 0;
pub const DEFAULT_MAX_UNAVAILABLE: i32 = 1;
