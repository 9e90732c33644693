// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::cli::ConfigCommand;
use crate::config;
use crate::error::Result;

/// Execute a config subcommand.
pub fn run(cmd: ConfigCommand, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let config = config::load(config_path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigCommand::Path => println!("{}", config_path.display()),
    }
    Ok(())
}
