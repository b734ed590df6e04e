// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for snapkeep.

use thiserror::Error;

use crate::types::{JobId, JobState};

/// The primary error type returned by every collaborator trait and core operation.
#[derive(Debug, Error)]
pub enum SnapkeepError {
    /// Credentials were rejected or the access token is no longer accepted.
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// The backend answered with an error payload (`{"error": ..., "detail": ...}`).
    #[error("remote error {code}: {detail}")]
    Remote { code: String, detail: String },

    /// A job status check itself failed while waiting for a backup.
    #[error("status check for job {job_id} failed: {source}")]
    JobPoll {
        job_id: JobId,
        source: Box<SnapkeepError>,
    },

    /// The backend reported the backup job as failed.
    #[error("job {job_id} failed: {reason}")]
    JobFailed { job_id: JobId, reason: String },

    /// The job never reached `finished` and the caller asked for a hard timeout.
    #[error("job {job_id} still {last_state} after {attempts} status checks")]
    JobTimeout {
        job_id: JobId,
        attempts: u32,
        last_state: JobState,
    },

    /// Network-level failure (connection refused, timeout, TLS).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered with a payload we could not interpret.
    #[error("invalid response payload: {message}")]
    Decode { message: String },

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A named resource could not be found.
    #[error("{what} not found")]
    NotFound { what: String },
}

impl SnapkeepError {
    /// Whether this error must abort the whole run instead of only the current database.
    ///
    /// Only authentication failures qualify: the token is shared by every call
    /// of the run and is never refreshed.
    pub fn is_fatal_for_run(&self) -> bool {
        match self {
            Self::Auth { .. } => true,
            Self::JobPoll { source, .. } => source.is_fatal_for_run(),
            _ => false,
        }
    }
}
