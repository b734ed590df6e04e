// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot, job, and retention types shared across the workspace.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Name prefix that marks a snapshot as managed by snapkeep.
///
/// The trailing space is significant: `"Autobackup-x"` is not auto-managed.
pub const DEFAULT_PREFIX: &str = "Autobackup ";

/// Remote identifiers arrive either as JSON numbers or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a database (Baserow "application") whose snapshots are managed.
    DatabaseId
);

opaque_id!(
    /// Remote-assigned snapshot identifier.
    SnapshotId
);

opaque_id!(
    /// Remote-assigned identifier of an asynchronous backend job.
    JobId
);

/// A snapshot of one database, normalized from the backend listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Whether the snapshot name starts with `prefix`, byte for byte.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.name.starts_with(prefix)
    }
}

/// Lifecycle state of a backend job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase", from = "String")]
pub enum JobState {
    Pending,
    Running,
    Finished,
    Failed,
    Unknown,
}

impl From<String> for JobState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "started" | "running" => Self::Running,
            "finished" => Self::Finished,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl JobState {
    /// `finished` and `failed` end polling; everything else may still change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

/// An asynchronous backend job, as returned by snapshot creation and status checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_readable_error: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<JobId>, state: JobState) -> Self {
        Self {
            id: id.into(),
            state,
            progress_percentage: None,
            human_readable_error: None,
        }
    }
}

/// What a backup does when its job is still unfinished after the last status check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Log a warning and report the job as still running.
    #[default]
    Soft,
    /// Fail the backup with [`crate::SnapkeepError::JobTimeout`].
    Hard,
}

/// How many auto-managed snapshots to keep, and which names count as auto-managed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub keep: usize,
    pub prefix: String,
}

impl RetentionPolicy {
    /// Policy over the default `"Autobackup "` prefix.
    pub fn new(keep: usize) -> Self {
        Self {
            keep,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// Login identity exchanged for an [`AccessToken`].
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub username: String,
    pub password: SecretString,
}

/// Bearer token for one run. Never refreshed and never logged.
#[derive(Debug)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}
