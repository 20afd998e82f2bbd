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

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::values::FIELD_MANAGER;

#[derive(Parser)]
#[clap(name = "p08ctl")]
#[clap(author, version, about)]
#[clap(about = "CLI tool for managing the P08ServerSet custom resource definition")]
pub struct Cli {
    /// Enable debug logging
    #[clap(short, long, action)]
    pub debug: bool,
    #[clap(subcommand)]
    pub commands: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the CustomResourceDefinition of P08ServerSet
    Crd {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
        /// Write the definition to this file instead of stdout
        #[arg(short, long, value_parser)]
        file: Option<PathBuf>,
    },
    /// Server-side apply the CustomResourceDefinition to the current cluster
    Install {
        #[arg(long, default_value = FIELD_MANAGER)]
        field_manager: String,
    },
    /// Check that every document of a manifest decodes into a registered type
    Check {
        /// Path to a YAML manifest, possibly holding several documents
        #[arg(short, long, value_parser)]
        file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["p08ctl", "crd", "--output", "json"]);
        match cli.commands {
            Commands::Crd { output, file } => {
                assert_eq!(output, OutputFormat::Json);
                assert!(file.is_none());
            },
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from(["p08ctl", "--debug", "install"]);
        assert!(cli.debug);
        match cli.commands {
            Commands::Install { field_manager } => assert_eq!(field_manager, FIELD_MANAGER),
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from(["p08ctl", "check", "-f", "sets.yaml"]);
        match cli.commands {
            Commands::Check { file } => assert_eq!(file, PathBuf::from("sets.yaml")),
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["p08ctl", "crd", "--output", "toml"]).is_err());
    }
}
