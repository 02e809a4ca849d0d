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

//! Remote channel tooling.

use std::{fs, net::UdpSocket, path::Path};

use anyhow::{Context, Result, bail};
use keymaster::{KeyMaster, Page, Registry, remote::RemoteCommand};
use serde::Serialize;
use tracing::info;

use crate::host::triggers::{SharedState, register_examples};

/// The command map as read by remote clients.
#[derive(Serialize, Debug)]
struct CommandMapFile {
    pages: Vec<PageCommands>,
}

#[derive(Serialize, Debug)]
struct PageCommands {
    page: i64,
    name: &'static str,
    labels: Vec<String>,
}

impl CommandMapFile {
    fn from_registry(registry: &Registry) -> Self {
        let pages = registry
            .command_map()
            .into_iter()
            .map(|(page, labels)| PageCommands {
                page: page.value(),
                name: page.name(),
                labels,
            })
            .collect();

        Self { pages }
    }
}

/// Writes the host's command map to `path`.
pub(crate) fn export_map(path: &Path) -> Result<()> {
    let mut keymaster = KeyMaster::new();
    register_examples(&mut keymaster, &SharedState::default());

    let map = CommandMapFile::from_registry(keymaster.registry());
    let contents = serde_json::to_string_pretty(&map).context("Failed to encode command map")?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write command map to {}", path.display()))?;

    info!(path = %path.display(), pages = map.pages.len(), "command map exported");
    println!("Wrote command map to {}", path.display());
    Ok(())
}

/// Sends one remote command datagram.
pub(crate) fn send_command(host: &str, port: u16, page: Page, label: &str) -> Result<()> {
    let datagram = RemoteCommand::new(page, label)
        .to_datagram()
        .context("Failed to encode remote command")?;

    let socket = UdpSocket::bind(("0.0.0.0", 0)).context("Failed to bind local socket")?;
    socket
        .send_to(&datagram, (host, port))
        .with_context(|| format!("Failed to send remote command to {host}:{port}"))?;

    info!(host, port, %page, label, "remote command sent");
    println!("Sent '{label}' on page {page} to {host}:{port}");
    Ok(())
}

/// Parses a page given by number or by name, ignoring case, spaces, dashes
/// and underscores.
pub(crate) fn parse_page(value: &str) -> Result<Page> {
    if let Ok(number) = value.parse::<i64>() {
        return Ok(Page::try_from(number)?);
    }

    let wanted = squash(value);
    match Page::ALL.into_iter().find(|page| squash(page.name()) == wanted) {
        Some(page) => Ok(page),
        None => bail!("unknown page '{value}'"),
    }
}

fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
