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

//! Application configuration.
//!
//! Two files are involved:
//!
//! * The application config, managed by `confy` under the `keymaster` name.
//! * The remote config file, a small JSON document read by remote tooling as
//!   well as by the engine. Its presence is what enables remote commands.

use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

const CONFIG_NAME: &str = "keymaster";

pub const REMOTE_CONFIG_FILE: &str = "keymasterRemoteConfig.json";

pub const DEFAULT_REMOTE_PORT: u16 = 9001;

const DEFAULT_TICK_MILLIS: u64 = 50;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,

    /// Interval between dispatch ticks in the terminal host.
    pub tick_millis: u64,

    pub remote: Option<RemoteConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            tick_millis: DEFAULT_TICK_MILLIS,
            remote: None,
        }
    }
}

/// Remote channel settings.
///
/// `ip_address` is informational for the listener, which always binds every
/// interface; client tooling uses it to find the engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    #[serde(default = "enabled_by_default", skip_serializing_if = "is_enabled")]
    pub enabled: bool,

    pub port: u16,

    #[serde(rename = "ipAddress", alias = "ip_address", default)]
    pub ip_address: String,
}

impl RemoteConfig {
    pub fn new(port: u16, ip_address: impl Into<String>) -> Self {
        Self {
            enabled: true,
            port,
            ip_address: ip_address.into(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_PORT, "127.0.0.1")
    }
}

fn enabled_by_default() -> bool {
    true
}

// Keeps the remote config file in the format remote tooling expects.
fn is_enabled(enabled: &bool) -> bool {
    *enabled
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_else(|e| {
        warn!(error = %e, "failed to load application config, using defaults");
        AppConfig::default()
    })
}

pub fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}

/// Where the remote config file lives when no path is given.
pub fn default_remote_config_path() -> PathBuf {
    PathBuf::from(REMOTE_CONFIG_FILE)
}

/// Reads the remote config file.
///
/// A missing or empty file means remote commands are not wanted and yields
/// `None`.
pub fn load_remote_config(path: &Path) -> Result<Option<RemoteConfig>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if contents.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes the remote config file, or deletes it when `allow_remote` is
/// `false`.
pub fn write_remote_config(
    path: &Path,
    config: &RemoteConfig,
    allow_remote: bool,
) -> Result<(), ConfigError> {
    let io_error = |source: io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if !allow_remote {
        match fs::remove_file(path) {
            Ok(()) => info!(path = %path.display(), "remote config removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(e)),
        }
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let contents = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, contents).map_err(io_error)?;

    info!(path = %path.display(), port = config.port, "remote config written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_file_disables_remote() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join(REMOTE_CONFIG_FILE);

        assert_eq!(load_remote_config(&path).expect("missing file"), None);

        fs::write(&path, "  \n").expect("write");
        assert_eq!(load_remote_config(&path).expect("empty file"), None);
    }

    #[test]
    fn reads_the_remote_config_format() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join(REMOTE_CONFIG_FILE);
        fs::write(&path, r#"{"port": 9100, "ipAddress": "192.168.1.20"}"#).expect("write");

        let config = load_remote_config(&path).expect("load").expect("present");
        assert_eq!(config, RemoteConfig::new(9100, "192.168.1.20"));
        assert!(config.enabled);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join(REMOTE_CONFIG_FILE);
        fs::write(&path, r#"{"port": "nine thousand"}"#).expect("write");

        assert!(matches!(load_remote_config(&path), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn writing_without_remote_deletes_the_file() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("nested").join(REMOTE_CONFIG_FILE);
        let config = RemoteConfig::new(9200, "10.0.0.5");

        write_remote_config(&path, &config, true).expect("write");
        let written = fs::read_to_string(&path).expect("read back");
        assert!(written.contains("\"ipAddress\""));
        assert!(!written.contains("enabled"));
        assert_eq!(load_remote_config(&path).expect("load"), Some(config.clone()));

        write_remote_config(&path, &config, false).expect("delete");
        assert!(!path.exists());

        // Deleting again is fine.
        write_remote_config(&path, &config, false).expect("delete missing");
    }

    #[test]
    fn app_config_fills_in_missing_fields() {
        let config: AppConfig = serde_json::from_str(r#"{"version": 1}"#).expect("parse");
        assert_eq!(config, AppConfig::default());

        let config: AppConfig =
            serde_json::from_str(r#"{"remote": {"enabled": false, "port": 9300, "ip_address": "127.0.0.1"}}"#)
                .expect("parse");
        let remote = config.remote.expect("remote table");
        assert!(!remote.enabled);
        assert_eq!(remote.port, 9300);
    }
}
