// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for snapkeep.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of silently falling back to a default.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use snapkeep_core::{Credentials, DatabaseId, RetentionPolicy, TimeoutPolicy, DEFAULT_PREFIX};

use crate::diagnostic::ConfigError;

const REDACTED: &str = "********";

/// Top-level snapkeep configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SnapkeepConfig {
    /// Remote API endpoint and login.
    #[serde(default)]
    pub api: ApiConfig,

    /// Global retention defaults.
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Backup job polling and purge pacing.
    #[serde(default)]
    pub backup: BackupConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Projects and the databases to back up in batch mode.
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. `https://baserow.example.com/api/`.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,

    /// Login password. Prefer the `SNAPKEEP_API_PASSWORD` env var over the file.
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            email: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Scalar accepted where a string is expected. YAML and env sources type
/// unquoted `123456` as a number, which is still a valid password.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringLike {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl StringLike {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Unsigned(n) => n.to_string(),
            Self::Signed(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringLike>::deserialize(deserializer).map(|v| v.map(StringLike::into_string))
}

/// Global retention configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Number of auto-managed snapshots kept per database unless overridden.
    #[serde(default = "default_keep")]
    pub keep: usize,

    /// Name prefix marking snapshots as auto-managed.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            keep: default_keep(),
            prefix: default_prefix(),
        }
    }
}

fn default_keep() -> usize {
    7
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

/// Backup job polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Maximum number of job status checks per backup.
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    /// Base polling interval. The wait before check `i` is `i * poll_interval_secs`.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Pause after each deletion so the backend settles before the next listing.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    /// Outcome when a job is still unfinished after the last check.
    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            poll_attempts: default_poll_attempts(),
            poll_interval_secs: default_poll_interval_secs(),
            settle_secs: default_settle_secs(),
            timeout_policy: TimeoutPolicy::default(),
        }
    }
}

fn default_poll_attempts() -> u32 {
    10
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_settle_secs() -> u64 {
    5
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A named group of databases sharing a retention setting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,

    /// Database (application) IDs, as numbers or strings.
    #[serde(default)]
    pub databases: Vec<DatabaseId>,

    /// Retention for every database of the project. Falls back to `retention.keep`.
    #[serde(default)]
    pub retention: Option<usize>,

    /// Per-database retention overrides.
    #[serde(default)]
    pub overrides: Vec<DatabaseOverride>,
}

/// Retention override for a single database.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseOverride {
    pub database: DatabaseId,
    pub retention: usize,
}

/// One database to process in batch mode, with its resolved retention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupTarget {
    pub project: String,
    pub database: DatabaseId,
    pub policy: RetentionPolicy,
}

impl SnapkeepConfig {
    /// Flattens projects into the ordered list of databases to process.
    ///
    /// Retention resolves as database override, then project retention, then
    /// the global `retention.keep`.
    pub fn targets(&self) -> Vec<BackupTarget> {
        let mut targets = Vec::new();
        for project in &self.projects {
            let project_keep = project.retention.unwrap_or(self.retention.keep);
            for database in &project.databases {
                let keep = project
                    .overrides
                    .iter()
                    .find(|o| &o.database == database)
                    .map(|o| o.retention)
                    .unwrap_or(project_keep);
                targets.push(BackupTarget {
                    project: project.name.clone(),
                    database: database.clone(),
                    policy: RetentionPolicy::new(keep).with_prefix(&self.retention.prefix),
                });
            }
        }
        targets
    }

    /// Builds login credentials, reporting every missing field.
    pub fn credentials(&self) -> Result<Credentials, Vec<ConfigError>> {
        let mut errors = Vec::new();
        let mut require = |value: &Option<String>, key: &str| match value {
            Some(v) if !v.trim().is_empty() => v.clone(),
            _ => {
                errors.push(ConfigError::MissingKey {
                    key: format!("api.{key}"),
                });
                String::new()
            }
        };

        let email = require(&self.api.email, "email");
        let username = require(&self.api.username, "username");
        let password = require(&self.api.password, "password");

        if errors.is_empty() {
            Ok(Credentials {
                email,
                username,
                password: SecretString::from(password),
            })
        } else {
            Err(errors)
        }
    }

    /// The effective configuration as TOML, with the password masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.api.password.is_some() {
            shown.api.password = Some(REDACTED.to_string());
        }
        toml::to_string_pretty(&shown).map_err(|e| ConfigError::Other(e.to_string()))
    }

    /// The configured API base URL.
    pub fn api_url(&self) -> Result<&str, ConfigError> {
        match self.api.url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url.trim()),
            _ => Err(ConfigError::MissingKey {
                key: "api.url".to_string(),
            }),
        }
    }
}
