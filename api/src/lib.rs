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

//! API types of the P08ServerSet custom resource, a StatefulSet-shaped workload with stable
//! replica identities, and the scheme they register into.

pub mod scheme;
pub mod v1;

pub use scheme::{scheme, Scheme, SchemeObject, TypeKey};
