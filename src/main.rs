// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # KeyMaster terminal host.
//!
//! Drives a [`KeyMaster`](keymaster::KeyMaster) from a `ratatui` terminal
//! interface, with example command holders for each control page.
//!
//! The host also carries the tooling that goes with the remote channel:
//! exporting the command map, sending a command and writing the remote config
//! file.
//!
//! Logging goes to a file, since the terminal belongs to the interface.

mod host;

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keymaster::{
    Page,
    config::{self, DEFAULT_REMOTE_PORT, RemoteConfig},
};
use tracing_subscriber::EnvFilter;

use crate::host::tools;

#[derive(Parser, Debug)]
#[command(name = "keymaster")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Remote config file. Overrides the `[remote]` table of the application
    /// config.
    #[arg(long, global = true, value_name = "PATH")]
    remote_config: Option<PathBuf>,

    /// Where log output is written.
    #[arg(long, global = true, default_value = "keymaster.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the terminal host (the default).
    Run,

    /// Write the command map as JSON for remote clients.
    ExportMap {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Send a remote command to a running engine.
    Send {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = DEFAULT_REMOTE_PORT)]
        port: u16,

        /// Page number or name, for example `2` or `dev`.
        #[arg(long, value_parser = tools::parse_page)]
        page: Page,

        /// Command label, for example "Toggle Console Output".
        #[arg(long)]
        label: String,
    },

    /// Write the remote config file, or delete it with `--disable`.
    RemoteConfig {
        #[arg(long, default_value_t = DEFAULT_REMOTE_PORT)]
        port: u16,

        #[arg(long, default_value = "127.0.0.1")]
        ip_address: String,

        #[arg(long)]
        disable: bool,
    },
}

/// The entry point of the application.
fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_file)?;

    let remote_config_path = cli
        .remote_config
        .clone()
        .unwrap_or_else(config::default_remote_config_path);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let mut app_config = config::load_config();
            if let Some(remote) = remote_override(cli.remote_config.as_deref())? {
                app_config.remote = Some(remote);
            }
            host::run(app_config)
        }

        Command::ExportMap { path } => tools::export_map(&path),

        Command::Send {
            host,
            port,
            page,
            label,
        } => tools::send_command(&host, port, page, &label),

        Command::RemoteConfig {
            port,
            ip_address,
            disable,
        } => {
            let remote = RemoteConfig::new(port, ip_address);
            config::write_remote_config(&remote_config_path, &remote, !disable)
                .context("Failed to write remote config")
        }
    }
}

/// Reads the remote config file, looking in the working directory when no
/// path was given.
fn remote_override(path: Option<&Path>) -> Result<Option<RemoteConfig>> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_remote_config_path);

    config::load_remote_config(&path).context("Failed to read remote config")
}

/// Installs the `tracing` subscriber, writing to `log_file`.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    // Panics inside commands are caught and reported by the engine; printing
    // them to the terminal as well would corrupt the interface.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(%info, "panic");
    }));

    Ok(())
}
