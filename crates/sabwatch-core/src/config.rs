//! Watchdog configuration.
//!
//! Layers, later wins: built-in defaults, optional TOML file
//! (`~/.config/sabwatch/config.toml` or an explicit path), environment
//! variables. The API key is the only value without a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable names, one per configurable field.
pub mod env {
    pub const API_KEY: &str = "SABNZBD_APIKEY";
    pub const SERVICE_URL: &str = "SABNZBD_URL";
    pub const CONTAINER_NAME: &str = "SABNZBD_CONTAINER";
    pub const CONTAINER_RUNTIME: &str = "CONTAINER_RUNTIME";
    pub const CHECK_INTERVAL: &str = "CHECK_INTERVAL";
    pub const API_TIMEOUT: &str = "API_TIMEOUT";
    pub const MAX_ZERO_COUNT: &str = "MAX_ZERO_COUNT";
    pub const MAX_PAUSED_COUNT: &str = "MAX_PAUSED_COUNT";
    /// Older name for `MAX_PAUSED_COUNT`; the new name wins if both are set.
    pub const MAX_PAUSED_ZERO_COUNT: &str = "MAX_PAUSED_ZERO_COUNT";
    pub const DISK_FREE_THRESHOLD_GB: &str = "DISK_FREE_THRESHOLD_GB";
    pub const MAX_DISK_FULL_COUNT: &str = "MAX_DISK_FULL_COUNT";
    pub const SIZE_CHECK_BUFFER_GB: &str = "SIZE_CHECK_BUFFER_GB";
    pub const RESTART_ON_DISK_FULL_FAIL_COUNT: &str = "RESTART_ON_DISK_FULL_FAIL_COUNT";
    pub const RECHECK_DELAY: &str = "RECHECK_DELAY";
    pub const HANG_POLICY: &str = "HANG_POLICY";
    pub const REQUIRE_OVERSIZE_FOR_DELETE: &str = "REQUIRE_OVERSIZE_FOR_DELETE";
    pub const CHECK_HISTORY: &str = "CHECK_HISTORY";
}

/// Errors while assembling the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {} is missing", env::API_KEY)]
    MissingApiKey,
    #[error("could not read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Which snapshots count toward a download hang.
///
/// Both require active slots, zero speed and no post-processing. They differ
/// in which queue status is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangPolicy {
    /// Any status except `Paused` (stalled `Idle` queues count too).
    #[default]
    NotPaused,
    /// Only a queue reporting `Downloading`.
    Downloading,
}

impl FromStr for HangPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "not_paused" => Ok(HangPolicy::NotPaused),
            "downloading" => Ok(HangPolicy::Downloading),
            other => Err(format!(
                "unknown hang policy {other:?} (expected not_paused or downloading)"
            )),
        }
    }
}

/// Global configuration for the watchdog.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Access credential for the control API. Required.
    pub api_key: String,
    /// Base URL of the download service.
    pub service_url: String,
    /// Container restarted on hangs and failed disk recovery.
    pub container_name: String,
    /// Container runtime binary invoked as `<runtime> restart <name>`.
    pub container_runtime: String,
    /// Seconds between polls.
    pub check_interval_secs: u64,
    /// Total timeout for one API request, in seconds.
    pub api_timeout_secs: u64,
    /// Consecutive hang cycles before a container restart.
    pub max_zero_count: u32,
    /// Consecutive paused cycles (without post-processing) before resuming.
    pub max_paused_count: u32,
    /// Free space below this many GB counts as disk pressure.
    pub disk_free_threshold_gb: f64,
    /// Consecutive low-disk cycles before deleting a job.
    pub max_disk_full_count: u32,
    /// Slack added to free space when judging whether a job is oversized.
    pub size_check_buffer_gb: f64,
    /// Deletions that fail to free enough space before reset + restart.
    pub restart_on_disk_full_fail_count: u32,
    /// Seconds to wait after a deletion before re-checking free space.
    pub recheck_delay_secs: u64,
    pub hang_policy: HangPolicy,
    /// Only delete when the candidate alone exceeds free space plus buffer.
    pub require_oversize_for_delete: bool,
    /// Also scan recent history for post-processing jobs.
    pub check_history: bool,
    /// Number of history entries scanned when `check_history` is on.
    pub history_limit: u32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            service_url: "http://sabnzbd:8080".to_string(),
            container_name: "sabnzbd".to_string(),
            container_runtime: "docker".to_string(),
            check_interval_secs: 60,
            api_timeout_secs: 5,
            max_zero_count: 3,
            max_paused_count: 5,
            disk_free_threshold_gb: 5.0,
            max_disk_full_count: 2,
            size_check_buffer_gb: 1.0,
            restart_on_disk_full_fail_count: 1,
            recheck_delay_secs: 10,
            hang_policy: HangPolicy::NotPaused,
            require_oversize_for_delete: false,
            check_history: true,
            history_limit: 10,
        }
    }
}

impl fmt::Debug for WatchdogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchdogConfig")
            .field("api_key", &"<redacted>")
            .field("service_url", &self.service_url)
            .field("container_name", &self.container_name)
            .field("container_runtime", &self.container_runtime)
            .field("check_interval_secs", &self.check_interval_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_zero_count", &self.max_zero_count)
            .field("max_paused_count", &self.max_paused_count)
            .field("disk_free_threshold_gb", &self.disk_free_threshold_gb)
            .field("max_disk_full_count", &self.max_disk_full_count)
            .field("size_check_buffer_gb", &self.size_check_buffer_gb)
            .field(
                "restart_on_disk_full_fail_count",
                &self.restart_on_disk_full_fail_count,
            )
            .field("recheck_delay_secs", &self.recheck_delay_secs)
            .field("hang_policy", &self.hang_policy)
            .field("require_oversize_for_delete", &self.require_oversize_for_delete)
            .field("check_history", &self.check_history)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

impl WatchdogConfig {
    /// Copy with the API key masked, for printing.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if !cfg.api_key.is_empty() {
            cfg.api_key = "<redacted>".to_string();
        }
        cfg
    }

    /// Overlay values from environment variables, looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(env::API_KEY) {
            self.api_key = v.trim().to_string();
        }
        if let Some(v) = lookup(env::SERVICE_URL) {
            self.service_url = v.trim().to_string();
        }
        if let Some(v) = lookup(env::CONTAINER_NAME) {
            self.container_name = v.trim().to_string();
        }
        if let Some(v) = lookup(env::CONTAINER_RUNTIME) {
            self.container_runtime = v.trim().to_string();
        }
        set_parsed(&lookup, env::CHECK_INTERVAL, &mut self.check_interval_secs)?;
        set_parsed(&lookup, env::API_TIMEOUT, &mut self.api_timeout_secs)?;
        set_parsed(&lookup, env::MAX_ZERO_COUNT, &mut self.max_zero_count)?;
        set_parsed(&lookup, env::MAX_PAUSED_ZERO_COUNT, &mut self.max_paused_count)?;
        set_parsed(&lookup, env::MAX_PAUSED_COUNT, &mut self.max_paused_count)?;
        set_parsed(
            &lookup,
            env::DISK_FREE_THRESHOLD_GB,
            &mut self.disk_free_threshold_gb,
        )?;
        set_parsed(&lookup, env::MAX_DISK_FULL_COUNT, &mut self.max_disk_full_count)?;
        set_parsed(&lookup, env::SIZE_CHECK_BUFFER_GB, &mut self.size_check_buffer_gb)?;
        set_parsed(
            &lookup,
            env::RESTART_ON_DISK_FULL_FAIL_COUNT,
            &mut self.restart_on_disk_full_fail_count,
        )?;
        set_parsed(&lookup, env::RECHECK_DELAY, &mut self.recheck_delay_secs)?;
        set_parsed(&lookup, env::HANG_POLICY, &mut self.hang_policy)?;
        set_flag(
            &lookup,
            env::REQUIRE_OVERSIZE_FOR_DELETE,
            &mut self.require_oversize_for_delete,
        )?;
        set_flag(&lookup, env::CHECK_HISTORY, &mut self.check_history)?;
        Ok(())
    }

    /// Reject configurations the watchdog cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let positive = [
            ("check_interval_secs", self.check_interval_secs),
            ("api_timeout_secs", self.api_timeout_secs),
            ("max_zero_count", u64::from(self.max_zero_count)),
            ("max_paused_count", u64::from(self.max_paused_count)),
            ("max_disk_full_count", u64::from(self.max_disk_full_count)),
            (
                "restart_on_disk_full_fail_count",
                u64::from(self.restart_on_disk_full_fail_count),
            ),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1",
                });
            }
        }
        let non_negative = [
            ("disk_free_threshold_gb", self.disk_free_threshold_gb),
            ("size_check_buffer_gb", self.size_check_buffer_gb),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be a non-negative number",
                });
            }
        }
        Ok(())
    }
}

fn set_parsed<F, T>(lookup: &F, key: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(());
    };
    *slot = raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn set_flag<F>(lookup: &F, key: &'static str, slot: &mut bool) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(());
    };
    *slot = match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            return Err(ConfigError::InvalidEnv {
                key,
                value: raw,
                reason: "expected true or false".to_string(),
            })
        }
    };
    Ok(())
}

/// Default config file location, if one exists.
///
/// An unresolvable XDG home (no `HOME`, no passwd entry) means there is no
/// default file, not a startup failure.
pub fn default_config_path() -> Option<PathBuf> {
    find_default_config(xdg::BaseDirectories::with_prefix("sabwatch"))
}

fn find_default_config<E: fmt::Display>(
    dirs: Result<xdg::BaseDirectories, E>,
) -> Option<PathBuf> {
    match dirs {
        Ok(xdg_dirs) => xdg_dirs.find_config_file("config.toml"),
        Err(e) => {
            tracing::debug!("no XDG config directory, skipping default config file: {e}");
            None
        }
    }
}

/// Read a TOML config file; missing fields keep their defaults.
pub fn load_file(path: &Path) -> Result<WatchdogConfig, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the effective configuration without validating it.
///
/// An explicit `path` must exist; the default XDG location is optional.
pub fn load_unchecked(path: Option<&Path>) -> Result<WatchdogConfig, ConfigError> {
    let file = match path {
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path(),
    };
    let mut cfg = match file {
        Some(p) => {
            let cfg = load_file(&p)?;
            tracing::debug!("loaded config file {}", p.display());
            cfg
        }
        None => WatchdogConfig::default(),
    };
    cfg.apply_env(|key| std::env::var(key).ok())?;
    Ok(cfg)
}

/// Build and validate the effective configuration.
pub fn load(path: Option<&Path>) -> Result<WatchdogConfig, ConfigError> {
    let cfg = load_unchecked(path)?;
    cfg.validate()?;
    Ok(cfg)
}
