// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for snapkeep.
//!
//! This crate provides the snapshot and job types, the error type, and the
//! collaborator traits (authentication, snapshot store, job status) that the
//! retention engine is written against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SnapkeepError;
pub use types::{
    AccessToken, Credentials, DatabaseId, DEFAULT_PREFIX, Job, JobId, JobState, RetentionPolicy,
    Snapshot, SnapshotId, TimeoutPolicy,
};

pub use traits::{AuthProvider, JobStatusService, SnapshotStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_deserialize_from_numbers_and_strings() {
        let numeric: SnapshotId = serde_json::from_str("42").unwrap();
        let textual: SnapshotId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(numeric, textual);
        assert_eq!(numeric.to_string(), "42");

        let job: JobId = serde_json::from_str("\"job-7\"").unwrap();
        assert_eq!(job.as_str(), "job-7");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = DatabaseId::from(12u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"12\"");
    }

    #[test]
    fn job_state_maps_backend_strings() {
        let cases = [
            ("pending", JobState::Pending),
            ("started", JobState::Running),
            ("running", JobState::Running),
            ("finished", JobState::Finished),
            ("failed", JobState::Failed),
            ("exploded", JobState::Unknown),
        ];
        for (raw, expected) in cases {
            let parsed: JobState = serde_json::from_value(serde_json::json!(raw)).unwrap();
            assert_eq!(parsed, expected, "state {raw}");
        }
        assert_eq!(JobState::Running.to_string(), "running");
    }

    #[test]
    fn only_finished_and_failed_are_terminal() {
        assert!(JobState::Finished.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(!JobState::Unknown.is_terminal());
    }

    #[test]
    fn job_deserializes_baserow_payload() {
        let job: Job = serde_json::from_value(serde_json::json!({
            "id": 311,
            "type": "create_snapshot",
            "progress_percentage": 40,
            "state": "started",
            "human_readable_error": ""
        }))
        .unwrap();
        assert_eq!(job.id, JobId::from(311u64));
        assert_eq!(job.state, JobState::Running);
        assert_eq!(job.progress_percentage, Some(40));
    }

    #[test]
    fn prefix_match_is_byte_exact() {
        let snapshot = Snapshot {
            id: SnapshotId::from(1u64),
            name: "Autobackup 2024-01-01T00:00:00 UTC".into(),
            created_at: chrono::Utc::now(),
        };
        assert!(snapshot.matches_prefix(DEFAULT_PREFIX));
        assert!(snapshot.matches_prefix("Autobackup"));
        assert!(!snapshot.matches_prefix("autobackup "));
        assert!(!snapshot.matches_prefix("Autobackup  "));
    }

    #[test]
    fn only_auth_errors_abort_the_run() {
        assert!(SnapkeepError::Auth { message: "expired".into() }.is_fatal_for_run());
        assert!(
            SnapkeepError::JobPoll {
                job_id: JobId::from("9"),
                source: Box::new(SnapkeepError::Auth { message: "expired".into() }),
            }
            .is_fatal_for_run()
        );
        assert!(
            !SnapkeepError::Remote {
                code: "ERROR_APPLICATION_DOES_NOT_EXIST".into(),
                detail: "missing".into(),
            }
            .is_fatal_for_run()
        );
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret-jwt");
        assert_eq!(token.expose(), "super-secret-jwt");
        assert!(!format!("{token:?}").contains("super-secret-jwt"));
    }

    #[test]
    fn default_retention_policy_uses_autobackup_prefix() {
        let policy = RetentionPolicy::new(3);
        assert_eq!(policy.prefix, "Autobackup ");
        assert_eq!(policy.with_prefix("Nightly ").prefix, "Nightly ");
    }
}
