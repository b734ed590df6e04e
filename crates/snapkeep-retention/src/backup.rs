// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup job orchestration: request a snapshot, then poll its job with
//! linearly increasing waits until it finishes or the attempts run out.

use std::time::Duration;

use chrono::{DateTime, Utc};
use snapkeep_core::{
    AccessToken, DatabaseId, Job, JobState, JobStatusService, SnapkeepError, SnapshotStore,
    TimeoutPolicy,
};
use tracing::{debug, info, warn};

/// Bounded polling schedule for a backup job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status checks.
    pub max_attempts: u32,
    /// The wait before check `i` (0-based) is `base_interval * i`.
    pub base_interval: Duration,
    /// What to do when the job is still unfinished after the last check.
    pub timeout: TimeoutPolicy,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_interval: Duration::from_secs(5),
            timeout: TimeoutPolicy::Soft,
        }
    }
}

impl PollPolicy {
    /// Wait before the status check with 0-based index `attempt`, saturating
    /// at [`Duration::MAX`].
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.base_interval.saturating_mul(attempt)
    }
}

/// Options for [`take_backup`].
#[derive(Debug, Clone, Default)]
pub struct BackupOptions {
    pub poll: PollPolicy,
    /// Skip the create request and report [`BackupOutcome::DryRun`].
    pub dry_run: bool,
}

/// Result of a backup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// The job reached `finished`.
    Completed(Job),
    /// Attempts ran out under [`TimeoutPolicy::Soft`]; carries the last observed status.
    StillRunning(Job),
    /// Dry run: nothing was requested.
    DryRun,
}

impl BackupOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The last job status observed, if a job was created.
    pub fn job(&self) -> Option<&Job> {
        match self {
            Self::Completed(job) | Self::StillRunning(job) => Some(job),
            Self::DryRun => None,
        }
    }
}

/// Auto-backup name under `prefix`, e.g. `"Autobackup 2024-01-02T03:04:05 UTC"`.
pub fn autobackup_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}{} UTC", now.format("%Y-%m-%dT%H:%M:%S"))
}

/// Requests a snapshot of `database` named `name` and waits for its job.
///
/// A failing status check aborts with [`SnapkeepError::JobPoll`] without
/// retrying. A job reported `failed` aborts with [`SnapkeepError::JobFailed`].
pub async fn take_backup<S, J>(
    store: &S,
    jobs: &J,
    token: &AccessToken,
    database: &DatabaseId,
    name: &str,
    options: &BackupOptions,
) -> Result<BackupOutcome, SnapkeepError>
where
    S: SnapshotStore + ?Sized,
    J: JobStatusService + ?Sized,
{
    if options.dry_run {
        info!(database = %database, snapshot = name, "DRY: would take snapshot");
        return Ok(BackupOutcome::DryRun);
    }

    let created = store.create(token, database, name).await?;
    let job_id = created.id.clone();
    info!(database = %database, job = %job_id, snapshot = name, "snapshot requested");

    let policy = &options.poll;
    let mut last = created;
    for attempt in 0..policy.max_attempts {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let status = jobs
            .status(token, &job_id)
            .await
            .map_err(|e| SnapkeepError::JobPoll {
                job_id: job_id.clone(),
                source: Box::new(e),
            })?;
        debug!(
            job = %job_id,
            attempt = attempt + 1,
            state = %status.state,
            progress = status.progress_percentage,
            "job status"
        );

        match status.state {
            JobState::Finished => {
                info!(database = %database, job = %job_id, attempts = attempt + 1, "backup finished");
                return Ok(BackupOutcome::Completed(status));
            }
            JobState::Failed => {
                let reason = status
                    .human_readable_error
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| "backend reported the job as failed".to_string());
                return Err(SnapkeepError::JobFailed { job_id, reason });
            }
            _ => last = status,
        }
    }

    match policy.timeout {
        TimeoutPolicy::Soft => {
            warn!(
                database = %database,
                job = %job_id,
                state = %last.state,
                attempts = policy.max_attempts,
                "backup still running"
            );
            Ok(BackupOutcome::StillRunning(last))
        }
        TimeoutPolicy::Hard => Err(SnapkeepError::JobTimeout {
            job_id,
            attempts: policy.max_attempts,
            last_state: last.state,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use snapkeep_core::DEFAULT_PREFIX;
    use snapkeep_test_utils::MockBackend;
    use tracing_test::traced_test;

    fn db() -> DatabaseId {
        DatabaseId::from(7u64)
    }

    fn running(n: usize) -> Vec<JobState> {
        vec![JobState::Running; n]
    }

    #[test]
    fn delays_grow_linearly_from_zero() {
        let policy = PollPolicy::default();
        assert_eq!(policy.delay_before(0), Duration::ZERO);
        assert_eq!(policy.delay_before(1), Duration::from_secs(5));
        assert_eq!(policy.delay_before(9), Duration::from_secs(45));
    }

    #[test]
    fn huge_intervals_saturate_instead_of_overflowing() {
        let policy = PollPolicy {
            base_interval: Duration::from_secs(9_000_000_000_000_000_000),
            ..PollPolicy::default()
        };
        assert_eq!(policy.delay_before(3), Duration::MAX);
    }

    #[test]
    fn autobackup_name_embeds_utc_seconds() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            autobackup_name(DEFAULT_PREFIX, now),
            "Autobackup 2024-01-02T03:04:05 UTC"
        );
        assert_eq!(autobackup_name("nightly-", now), "nightly-2024-01-02T03:04:05 UTC");
    }

    #[tokio::test(start_paused = true)]
    async fn finished_on_third_check_stops_polling() {
        let mut states = running(2);
        states.push(JobState::Finished);
        let backend = MockBackend::new().with_job_states(states);

        let outcome = take_backup(
            &backend,
            &backend,
            &backend.token(),
            &db(),
            "Autobackup x",
            &BackupOptions::default(),
        )
        .await
        .unwrap();

        assert!(outcome.is_completed());
        assert_eq!(backend.status_calls(), 3);
        assert_eq!(backend.create_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_on_the_last_allowed_check_completes() {
        let mut states = running(9);
        states.push(JobState::Finished);
        let backend = MockBackend::new().with_job_states(states);
        let started = tokio::time::Instant::now();

        let outcome = take_backup(
            &backend,
            &backend,
            &backend.token(),
            &db(),
            "Autobackup x",
            &BackupOptions {
                poll: PollPolicy {
                    timeout: TimeoutPolicy::Hard,
                    ..PollPolicy::default()
                },
                ..BackupOptions::default()
            },
        )
        .await
        .unwrap();

        assert!(outcome.is_completed());
        assert_eq!(backend.status_calls(), 10);
        assert_eq!(started.elapsed(), Duration::from_secs(225));
    }

    #[tokio::test(start_paused = true)]
    async fn finished_immediately_needs_one_check_and_no_wait() {
        let backend = MockBackend::new().with_job_states(vec![JobState::Finished]);
        let started = tokio::time::Instant::now();

        let outcome = take_backup(
            &backend,
            &backend,
            &backend.token(),
            &db(),
            "Autobackup x",
            &BackupOptions::default(),
        )
        .await
        .unwrap();

        assert!(outcome.is_completed());
        assert_eq!(backend.status_calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn soft_timeout_checks_ten_times_and_reports_running() {
        let backend = MockBackend::new().with_job_states(running(20));
        let started = tokio::time::Instant::now();

        let outcome = take_backup(
            &backend,
            &backend,
            &backend.token(),
            &db(),
            "Autobackup x",
            &BackupOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(backend.status_calls(), 10);
        match outcome {
            BackupOutcome::StillRunning(job) => assert_eq!(job.state, JobState::Running),
            other => panic!("expected StillRunning, got {other:?}"),
        }
        // 5s * (0 + 1 + ... + 9)
        assert_eq!(started.elapsed(), Duration::from_secs(225));
        assert!(logs_contain("backup still running"));
    }

    #[tokio::test(start_paused = true)]
    async fn hard_timeout_is_an_error() {
        let backend = MockBackend::new().with_job_states(vec![JobState::Pending; 10]);
        let options = BackupOptions {
            poll: PollPolicy {
                timeout: TimeoutPolicy::Hard,
                ..PollPolicy::default()
            },
            dry_run: false,
        };

        let err = take_backup(&backend, &backend, &backend.token(), &db(), "n", &options)
            .await
            .unwrap_err();

        assert_eq!(backend.status_calls(), 10);
        match err {
            SnapkeepError::JobTimeout {
                attempts,
                last_state,
                ..
            } => {
                assert_eq!(attempts, 10);
                assert_eq!(last_state, JobState::Pending);
            }
            other => panic!("expected JobTimeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn status_failure_aborts_without_retry() {
        let backend = MockBackend::new().fail_status("ERROR_JOB_DOES_NOT_EXIST");

        let err = take_backup(
            &backend,
            &backend,
            &backend.token(),
            &db(),
            "n",
            &BackupOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SnapkeepError::JobPoll { .. }), "got: {err:?}");
        assert_eq!(backend.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_aborts_with_reason() {
        let backend = MockBackend::new()
            .with_job_states(vec![JobState::Running, JobState::Failed]);

        let err = take_backup(
            &backend,
            &backend,
            &backend.token(),
            &db(),
            "n",
            &BackupOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SnapkeepError::JobFailed { .. }), "got: {err:?}");
        assert_eq!(backend.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn create_failure_skips_polling() {
        let backend = MockBackend::new().fail_create("ERROR_MAXIMUM_SNAPSHOTS_REACHED");

        let err = take_backup(
            &backend,
            &backend,
            &backend.token(),
            &db(),
            "n",
            &BackupOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SnapkeepError::Remote { .. }));
        assert_eq!(backend.status_calls(), 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn dry_run_makes_no_calls() {
        let backend = MockBackend::new();
        let options = BackupOptions {
            dry_run: true,
            ..BackupOptions::default()
        };

        let outcome = take_backup(&backend, &backend, &backend.token(), &db(), "Autobackup d", &options)
            .await
            .unwrap();

        assert_eq!(outcome, BackupOutcome::DryRun);
        assert_eq!(backend.create_calls(), 0);
        assert_eq!(backend.status_calls(), 0);
        assert!(logs_contain("DRY: would take snapshot"));
    }
}
