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

use std::fs;

use anyhow::{bail, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use kube::{Client, CustomResourceExt, ResourceExt};
use log::{debug, error, info};
use serverset_api::{scheme, v1::P08ServerSet};

mod apiclient;
#[cfg(test)]
mod apiserver_mock;
mod commands;
mod manifest;
mod values;

use apiclient::{ApplyCrd, CrdClient};
use commands::{Cli, Commands};

const CTL_VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_log_level: &str = if cli.debug { "debug" } else { "info" };
    // stdout carries rendered manifests
    Builder::from_env(Env::default().default_filter_or(default_log_level)).target(Target::Stderr).init();
    debug!("p08ctl version is {}", CTL_VERSION.unwrap_or("Not Found"));

    match cli.commands {
        Commands::Crd { output, file } => {
            let rendered = manifest::render_crd(output)?;
            match file {
                Some(path) => {
                    fs::write(&path, rendered)?;
                    info!("CustomResourceDefinition written to {}", path.display());
                },
                None => print!("{}", rendered),
            }
        },
        Commands::Install { field_manager } => {
            let client = Client::try_default().await?;
            let crd_client = CrdClient::new(client);
            let applied = crd_client.apply_crd(&P08ServerSet::crd(), &field_manager).await?;
            info!(
                "customresourcedefinition {} applied, resourceVersion {}",
                applied.name_any(),
                applied.resource_version().unwrap_or_default()
            );
        },
        Commands::Check { file } => {
            let reports = manifest::check_file(&file, scheme())?;
            let mut failed = 0;
            for report in reports.iter() {
                match &report.result {
                    Ok(key) => info!("document {}: {} ok", report.index, key),
                    Err(e) => {
                        failed += 1;
                        error!("document {}: {}", report.index, e);
                    },
                }
            }
            if failed > 0 {
                bail!("{} of {} documents in {} failed to decode", failed, reports.len(), file.display());
            }
            info!("{} documents in {} decoded", reports.len(), file.display());
        },
    }
    Ok(())
}
