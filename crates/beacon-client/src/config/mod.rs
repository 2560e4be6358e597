//! Client options
//!
//! Options are plain serde data. They can be built in code, loaded from a TOML
//! file, and overlaid with `BEACON_*` environment variables; [`ClientOptions::validate`]
//! reports every invalid field at once.

pub mod validation;

use beacon_core::{BeaconError, Result, SdkInfo};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

pub use validation::{ConfigValidator, ValidationError, ValidationErrors, ValidationResult};

/// Prefix of environment variables read by [`ClientOptions::merge_with_env`]
pub const ENV_PREFIX: &str = "BEACON_";

/// Default bound for a shutdown-triggered flush
pub const DEFAULT_FLUSH_TIMEOUT_MILLIS: u64 = 15_000;

/// Default bound for closing the client when the init guard is dropped
pub const DEFAULT_SHUTDOWN_TIMEOUT_MILLIS: u64 = 2_000;

/// Default number of envelopes buffered before new ones are dropped
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 30;

/// Options controlling the client and its integrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Release attached to payloads that do not set one
    pub release: Option<String>,
    /// Environment attached to payloads that do not set one
    pub environment: Option<String>,
    /// Server name attached to events that do not set one
    pub server_name: Option<String>,
    /// Distribution attached to events that do not set one
    pub dist: Option<String>,
    /// Envelopes buffered before new ones are dropped
    pub max_queue_size: usize,
    /// Bound for the flush performed by the shutdown hook
    pub flush_timeout_millis: u64,
    /// Bound for closing the client when the init guard is dropped
    pub shutdown_timeout_millis: u64,
    /// Whether the shutdown-hook integration attaches a hook
    pub enable_shutdown_hook: bool,
    /// Whether `init` wires termination signals to the shutdown hooks
    pub install_signal_handler: bool,
    /// SDK reported on every envelope
    pub sdk: SdkInfo,
}

impl Default for ClientOptions {
    fn default() -> Self {
        let mut sdk = SdkInfo::default();
        sdk.add_package("cargo:beacon-client", env!("CARGO_PKG_VERSION"));
        Self {
            release: None,
            environment: None,
            server_name: None,
            dist: None,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            flush_timeout_millis: DEFAULT_FLUSH_TIMEOUT_MILLIS,
            shutdown_timeout_millis: DEFAULT_SHUTDOWN_TIMEOUT_MILLIS,
            enable_shutdown_hook: true,
            install_signal_handler: true,
            sdk,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(BeaconError::config(format!(
            "{key}: expected a boolean, got {other:?}"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| BeaconError::config(format!("{key}: {e}")))
}

/// Keep the `BEACON_*` entries of an OS environment as UTF-8 pairs
fn beacon_vars<I>(vars: I) -> Result<Vec<(String, String)>>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut selected = Vec::new();
    for (key, value) in vars {
        let Some(key) = key.to_str().filter(|key| key.starts_with(ENV_PREFIX)) else {
            continue;
        };
        let value = value
            .into_string()
            .map_err(|_| BeaconError::config(format!("{key}: value is not valid UTF-8")))?;
        selected.push((key.to_string(), value));
    }
    Ok(selected)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ClientOptions {
    /// Bound for the flush performed by the shutdown hook
    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_millis)
    }

    /// Bound for closing the client when the init guard is dropped
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_millis)
    }

    /// Load options from a TOML file; missing keys keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BeaconError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let options: Self = toml::from_str(&content)?;
        Ok(options)
    }

    /// Overlay `BEACON_*` variables from the process environment
    ///
    /// Variables that are not valid UTF-8 are skipped unless they carry the
    /// prefix, in which case they are reported as a config error.
    pub fn merge_with_env(&mut self) -> Result<()> {
        let vars = beacon_vars(std::env::vars_os())?;
        self.merge_with_vars(vars)
    }

    /// Overlay `BEACON_*` variables from an explicit list
    ///
    /// Variables without the prefix are ignored; unknown `BEACON_*` names are
    /// logged and skipped.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let name = name.to_ascii_lowercase();
            if !self.try_set(&name, value.as_ref())? {
                tracing::debug!(variable = key.as_ref(), "ignoring unknown beacon variable");
            }
        }
        Ok(())
    }

    /// Set a single option by name
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        if self.try_set(key, value)? {
            Ok(())
        } else {
            Err(BeaconError::config(format!("unknown option {key:?}")))
        }
    }

    /// Set an option by name; `Ok(false)` if no option has that name
    fn try_set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "release" => self.release = non_empty(value),
            "environment" => self.environment = non_empty(value),
            "server_name" => self.server_name = non_empty(value),
            "dist" => self.dist = non_empty(value),
            "max_queue_size" => self.max_queue_size = parse_number(key, value)?,
            "flush_timeout_millis" => self.flush_timeout_millis = parse_number(key, value)?,
            "shutdown_timeout_millis" => self.shutdown_timeout_millis = parse_number(key, value)?,
            "enable_shutdown_hook" => self.enable_shutdown_hook = parse_bool(key, value)?,
            "install_signal_handler" => self.install_signal_handler = parse_bool(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Validate the options, reporting every violation
    pub fn validate(&self) -> Result<()> {
        let mut validator = ConfigValidator::new();
        validator
            .at_least("max_queue_size", self.max_queue_size as u64, 1)
            .at_least("flush_timeout_millis", self.flush_timeout_millis, 1)
            .custom(
                "sdk.name",
                &self.sdk.name,
                |name| !name.is_empty(),
                "must not be empty",
            );
        validator.result().map_err(BeaconError::from)
    }
}
