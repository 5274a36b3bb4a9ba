// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is stored in `config.toml` and includes:
//! - `[api]`: where the backend lives and the version prefix of its routes
//! - `[network]`: how reachability is probed
//! - `[[routes]]`: the route manifest that decides which writes may be queued

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ob_core::{ChaChaCipher, EligibilityContract, Route, RouteManifest, DEFAULT_API_PREFIX};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::ProbeConfig;

const APP_DIR_NAME: &str = "outbox";
const CONFIG_FILE_NAME: &str = "config.toml";
const KEY_FILE_NAME: &str = "queue.key";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    /// Routes the backend mounts. Only writes to these can be deferred.
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Backend location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL relative request URLs are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Version prefix shared by every route (default: "/api/v1").
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Timeout for requests that don't carry their own (default: 15000).
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            prefix: default_prefix(),
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

/// Reachability probing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// URL probed with `HEAD`. Defaults to the API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_url: Option<String>,
    /// Delay between probes while watching (default: 5000).
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    /// Per-probe timeout (default: 3000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            probe_url: None,
            probe_interval_ms: default_probe_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_probe_interval_ms() -> u64 {
    5_000
}

fn default_probe_timeout_ms() -> u64 {
    3_000
}

impl Config {
    /// Loads configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde can't.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if let Some(probe) = &self.network.probe_url {
            Url::parse(probe)
                .map_err(|e| Error::Config(format!("invalid network.probe_url '{probe}': {e}")))?;
        }
        if self.api.default_timeout_ms == 0 {
            return Err(Error::Config(
                "api.default_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.network.probe_interval_ms == 0 || self.network.probe_timeout_ms == 0 {
            return Err(Error::Config(
                "network probe interval and timeout must be greater than 0".to_string(),
            ));
        }
        for route in &self.routes {
            if !is_method_token(&route.method) {
                return Err(Error::Config(format!(
                    "invalid method '{}' for route {}",
                    route.method, route.path
                )));
            }
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.api.base_url).map_err(|e| {
            Error::Config(format!("invalid api.base_url '{}': {e}", self.api.base_url))
        })
    }

    pub fn manifest(&self) -> RouteManifest {
        RouteManifest::new(self.routes.clone())
    }

    /// Builds the eligibility contract from the route manifest.
    pub fn contract(&self) -> Result<EligibilityContract> {
        Ok(EligibilityContract::new(
            &self.api.base_url,
            &self.api.prefix,
            &self.manifest(),
        )?)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.api.default_timeout_ms)
    }

    pub fn probe_config(&self) -> Result<ProbeConfig> {
        let url = match &self.network.probe_url {
            Some(probe) => Url::parse(probe)
                .map_err(|e| Error::Config(format!("invalid network.probe_url '{probe}': {e}")))?,
            None => self.base_url()?,
        };
        Ok(ProbeConfig {
            url,
            interval: Duration::from_millis(self.network.probe_interval_ms),
            timeout: Duration::from_millis(self.network.probe_timeout_ms),
        })
    }
}

/// Route methods are free-form in the file; reads are allowed in the
/// manifest even though only writes are ever queued.
fn is_method_token(method: &str) -> bool {
    let method = method.trim();
    !method.is_empty() && method.chars().all(|c| c.is_ascii_alphabetic())
}

/// Resolves the config file path.
///
/// Priority: explicit override, `OUTBOX_CONFIG`, then
/// `<config dir>/outbox/config.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = env::config_path() {
        return path;
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Resolves the state directory holding the queue and key.
///
/// Priority: `OUTBOX_STATE_DIR`, `$XDG_STATE_HOME/outbox`, then
/// `~/.local/state/outbox`.
pub fn state_dir() -> PathBuf {
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join(APP_DIR_NAME);
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/outbox"))
        .unwrap_or_else(|| PathBuf::from(".local/state/outbox"))
}

/// Loads the queue cipher.
///
/// Uses `OUTBOX_QUEUE_KEY` when set, otherwise `<state_dir>/queue.key`,
/// generating that file on first use.
pub fn queue_cipher(state_dir: &Path) -> Result<ChaChaCipher> {
    load_cipher(env::queue_key(), state_dir)
}

fn load_cipher(explicit_key: Option<String>, state_dir: &Path) -> Result<ChaChaCipher> {
    if let Some(key) = explicit_key {
        return Ok(ChaChaCipher::from_base64(&key)?);
    }
    let path = state_dir.join(KEY_FILE_NAME);
    if path.exists() {
        let key = fs::read_to_string(&path)?;
        return Ok(ChaChaCipher::from_base64(&key)?);
    }

    let key = ChaChaCipher::generate_key();
    fs::create_dir_all(state_dir)?;
    write_private(&path, key.as_bytes())?;
    tracing::info!(path = %path.display(), "generated queue key");
    Ok(ChaChaCipher::from_base64(&key)?)
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
