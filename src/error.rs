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

//! Error types.
//!
//! None of these errors escape the dispatch loop or the remote listener
//! thread; they are returned to callers that want to inspect them and are
//! otherwise reported through `tracing` where they occur.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::page::Page;

/// An integer that does not name any [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown control page value {0}")]
pub struct UnknownPage(pub i64);

#[derive(Debug, Error)]
pub enum RegistryError {
    /// A token with the same page and label is already registered. The
    /// existing binding is kept.
    #[error("label '{label}' is already registered on page {page}: existing {existing}, attempted {attempted}")]
    Collision {
        page: Page,
        label: String,
        existing: String,
        attempted: String,
    },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no command registered for page {page} with label '{label}'")]
    LookupMiss { page: Page, label: String },

    #[error("command '{label}' failed: {message}")]
    Action { label: String, message: String },

    #[error("command '{label}' panicked: {message}")]
    Panic { label: String, message: String },
}

/// A datagram that could not be turned into a remote command.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("datagram is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed message envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("malformed command payload '{payload}': {source}")]
    Payload {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid topic {0} for network message")]
    UnknownTopic(i64),
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote commands are disabled")]
    Disabled,

    #[error("remote listener is already running on {0}")]
    AlreadyRunning(std::net::SocketAddr),

    #[error("failed to bind remote listener to port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("remote transport failure: {0}")]
    Transport(#[source] io::Error),

    #[error("failed to spawn remote listener thread: {0}")]
    Spawn(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
