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

//! `serverset.p08.io/v1` API of the P08ServerSet resource.

// closed string enumerations: ALL, as_str, Display and FromStr matching the serde literals;
// parse failures are reported as `$error::Error::UnknownValue`
macro_rules! string_enum {
    ($name:ident, $label:literal, $error:ident, { $($variant:ident => $literal:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $literal),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $error::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($literal => Ok($name::$variant),)+
                    _ => Err($error::Error::UnknownValue { kind: $label, value: s.to_string() }),
                }
            }
        }
    };
}

pub mod condition;
pub mod policy;
pub mod template;
pub mod types;
pub mod values;

pub use condition::*;
pub use policy::*;
pub use template::*;
pub use types::*;
pub use values::*;

use kube::Resource;

use crate::scheme::{scheme_error::Error, Scheme, SchemeObject, TypeKey};

impl SchemeObject for P08ServerSet {
    fn type_key() -> TypeKey {
        TypeKey::new(&Self::group(&()), &Self::version(&()), &Self::kind(&()))
    }

    fn plural() -> Option<String> {
        Some(<Self as Resource>::plural(&()).to_string())
    }
}

impl SchemeObject for P08ServerSetList {
    fn type_key() -> TypeKey {
        TypeKey::new(GROUP, VERSION, LIST_KIND)
    }

    fn plural() -> Option<String> {
        Some(PLURAL.to_string())
    }

    fn is_list() -> bool {
        true
    }
}

/// Registers the root resource and its list form. Safe to call any number of times.
pub fn add_to_scheme(scheme: &Scheme) -> Result<(), Error> {
    scheme.register::<P08ServerSet>()?;
    scheme.register::<P08ServerSetList>()?;
    Ok(())
}
