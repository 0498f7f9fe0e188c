//! Configuration loader with layered files and env overrides.
//!
//! The loading process:
//! 1. Start from built-in defaults
//! 2. Read global config from `~/.config/smartlead/smartlead.json`
//! 3. Read local config from `./smartlead.json`
//! 4. Read an explicitly named config file, if any
//! 5. Deep merge the files at JSON Value level (RFC 7396) and deserialize once
//! 6. Apply `SMARTLEAD_*` env var overrides (highest precedence)
//!
//! Targets are keyed by name, so a later layer replaces or extends a single
//! target without restating the others. The API key is never read from files.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{AuthPlacement, BackendTarget, GatewayConfig, PRIMARY, SMART_DELIVERY};
use crate::error::ConfigError;

/// Filename for local config.
pub const LOCAL_FILE: &str = "smartlead.json";

/// Directory name under config_dir for global config.
pub const GLOBAL_DIR: &str = "smartlead";

/// Filename for global config.
pub const GLOBAL_FILE: &str = "smartlead.json";

/// Typed view of a merged config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    /// Primary API base URL
    pub base_url: Option<String>,
    /// Smart Delivery API base URL
    pub smart_delivery_url: Option<String>,
    /// Per-attempt timeout in milliseconds
    pub timeout: Option<u64>,
    /// Total attempts per call
    pub max_retries: Option<u32>,
    /// Wait before the first retry in milliseconds
    pub retry_delay: Option<u64>,
    /// Growth factor between retries
    pub backoff_factor: Option<f32>,
    /// Requests per minute
    pub rate_limit: Option<u32>,
    /// Overall call deadline in milliseconds (0 disables)
    pub call_deadline: Option<u64>,
    /// Extra or overriding targets, keyed by name
    #[serde(default)]
    pub targets: BTreeMap<String, FileTarget>,
}

/// A backend target as written in a config file.
///
/// Fields left out keep the value of the existing target with the same name.
/// A target that does not exist yet must set `baseUrl`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTarget {
    /// Base URL
    pub base_url: Option<String>,
    /// API key placement
    pub auth: Option<AuthPlacement>,
    /// Per-attempt timeout override in milliseconds
    pub timeout_ms: Option<u64>,
    /// Default headers, added to the existing ones
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl FileTarget {
    fn merge_into(
        self,
        name: String,
        existing: Option<BackendTarget>,
    ) -> Result<BackendTarget, ConfigError> {
        let mut target = match (existing, self.base_url) {
            (Some(mut t), url) => {
                if let Some(url) = url {
                    t.base_url = url;
                }
                t
            }
            (None, Some(url)) => BackendTarget::new(name, url),
            (None, None) => {
                return Err(ConfigError::Parse {
                    path: "merged config".into(),
                    message: format!("new target `{name}` needs a baseUrl at targets.{name}"),
                });
            }
        };
        if let Some(auth) = self.auth {
            target.auth = auth;
        }
        if self.timeout_ms.is_some() {
            target.timeout_ms = self.timeout_ms;
        }
        target.headers.extend(self.headers);
        Ok(target)
    }
}

impl FileConfig {
    /// Layers these file values over `cfg`
    ///
    /// # Errors
    ///
    /// Returns an error if a target that `cfg` does not know lacks a base URL.
    pub fn apply(self, mut cfg: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
        for (name, t) in self.targets {
            let existing = cfg.target(&name).cloned();
            cfg = cfg.with_target(t.merge_into(name, existing)?);
        }
        if let Some(url) = self.base_url {
            cfg = cfg.with_base_url(PRIMARY, url);
        }
        if let Some(url) = self.smart_delivery_url {
            cfg = cfg.with_base_url(SMART_DELIVERY, url);
        }
        if let Some(ms) = self.timeout {
            cfg = cfg.with_timeout(Duration::from_millis(ms));
        }
        if let Some(n) = self.max_retries {
            cfg.retry_mut().max_attempts = n;
        }
        if let Some(ms) = self.retry_delay {
            cfg.retry_mut().initial_delay = Duration::from_millis(ms);
        }
        if let Some(f) = self.backoff_factor {
            cfg.retry_mut().multiplier = f;
        }
        if let Some(n) = self.rate_limit {
            cfg = cfg.with_rate_limit(n);
        }
        if let Some(ms) = self.call_deadline {
            cfg = cfg.with_call_deadline((ms > 0).then(|| Duration::from_millis(ms)));
        }
        Ok(cfg)
    }
}

/// Resolved paths for config files.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Path to global config, when the platform has a config dir
    pub global: Option<PathBuf>,

    /// Path to local config (./smartlead.json).
    pub local: PathBuf,

    /// Explicitly requested config file; it must exist.
    pub extra: Option<PathBuf>,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The layered configuration, not yet validated
    pub config: GatewayConfig,

    /// Resolved config file paths.
    pub paths: ConfigPaths,
}

/// Get the global config file path.
///
/// Returns `~/.config/smartlead/smartlead.json` on Linux.
#[must_use]
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(GLOBAL_DIR).join(GLOBAL_FILE))
}

/// Get the local config file path for a given directory.
#[must_use]
pub fn local_config_path(local_dir: &Path) -> PathBuf {
    local_dir.join(LOCAL_FILE)
}

/// Load and merge configuration for a working directory.
///
/// # Precedence (lowest to highest)
/// 1. Default values
/// 2. Global config (`~/.config/smartlead/smartlead.json`)
/// 3. Local config (`./smartlead.json`)
/// 4. `extra`, typically from `--config`
/// 5. Environment variables
///
/// # Errors
///
/// Returns an error if a file is unreadable, is not a JSON object, has the
/// wrong shape, or if an env override does not parse.
pub fn load_merged(local_dir: &Path, extra: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_from(ConfigPaths {
        global: global_config_path(),
        local: local_config_path(local_dir),
        extra: extra.map(Path::to_path_buf),
    })
}

/// Load configuration from explicit paths.
///
/// # Errors
///
/// See [`load_merged`].
pub fn load_from(paths: ConfigPaths) -> Result<LoadedConfig, ConfigError> {
    let mut merged = Value::Object(serde_json::Map::new());

    if let Some(global) = &paths.global {
        merged = merge_patch(merged, read_json_object_or_empty(global)?);
    }
    merged = merge_patch(merged, read_json_object_or_empty(&paths.local)?);
    if let Some(extra) = &paths.extra {
        if !extra.exists() {
            return Err(ConfigError::Io {
                path: extra.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }
        merged = merge_patch(merged, read_json_object_or_empty(extra)?);
    }

    if let Value::Object(map) = &mut merged {
        if map.remove("apiKey").is_some() {
            tracing::warn!("apiKey in config files is ignored; set SMARTLEAD_API_KEY instead");
        }
    }

    let file: FileConfig = serde_path_to_error::deserialize(merged).map_err(|e| {
        ConfigError::Parse {
            path: "merged config".into(),
            message: format!("{} at {}", e.inner(), e.path()),
        }
    })?;

    let config = file.apply(GatewayConfig::default())?.apply_env()?;
    Ok(LoadedConfig { config, paths })
}

/// Apply RFC 7396-style JSON merge patch.
///
/// Objects merge recursively, `null` in the patch deletes a key, and arrays
/// or scalars replace.
#[must_use]
pub fn merge_patch(target: Value, patch: Value) -> Value {
    match (target, patch) {
        (Value::Object(mut target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                if patch_value.is_null() {
                    target_map.remove(&key);
                    continue;
                }
                let existing = target_map.remove(&key).unwrap_or(Value::Null);
                target_map.insert(key, merge_patch(existing, patch_value));
            }
            Value::Object(target_map)
        }
        (_, patch) => patch,
    }
}

/// Read a JSON file as a Value, returning empty object if file doesn't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not JSON, or its root is
/// not an object.
pub fn read_json_object_or_empty(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let v: Value = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: format!("Invalid JSON: {e}"),
    })?;

    match v {
        Value::Object(_) => Ok(v),
        _ => Err(ConfigError::Parse {
            path: path.display().to_string(),
            message: "Config root must be a JSON object".into(),
        }),
    }
}
