// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch mode: process every configured database in order.
//!
//! Each database is listed, then (with `--take`) backed up and purged before
//! the next one starts. A failure only skips the rest of the current database,
//! except an authentication failure, which ends the run.

use chrono::Utc;
use snapkeep_config::BackupTarget;
use snapkeep_core::{
    AuthProvider, Credentials, DatabaseId, JobStatusService, SnapkeepError, SnapshotStore,
};
use snapkeep_retention::{BackupOutcome, autobackup_name, list_snapshots, purge, take_backup};
use strum::Display;
use tracing::{error, info, warn};

use crate::settings::Settings;

/// The step of a database's processing that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Auth,
    List,
    Backup,
    Purge,
}

#[derive(Debug)]
pub struct RunFailure {
    pub project: String,
    pub database: Option<DatabaseId>,
    pub stage: Stage,
    pub error: SnapkeepError,
}

impl RunFailure {
    /// One-line description, e.g. `crm/12 purge: remote error ...`.
    pub fn label(&self) -> String {
        match &self.database {
            Some(database) => format!("{}/{} {}: {}", self.project, database, self.stage, self.error),
            None => format!("{}: {}", self.stage, self.error),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// Databases whose processing was started.
    pub processed: usize,
    pub failures: Vec<RunFailure>,
    /// Whether a fatal error ended the run before every database was processed.
    pub aborted: bool,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }

    /// Logs and records a failure. Returns whether the run must stop.
    fn record(&mut self, target: &BackupTarget, stage: Stage, error: SnapkeepError) -> bool {
        error!(
            project = %target.project,
            database = %target.database,
            stage = %stage,
            error = %error,
            "database processing failed"
        );
        let fatal = error.is_fatal_for_run();
        self.failures.push(RunFailure {
            project: target.project.clone(),
            database: Some(target.database.clone()),
            stage,
            error,
        });
        if fatal {
            self.aborted = true;
        }
        fatal
    }
}

/// Runs the batch over `targets`. Without `take` the run only reports how
/// many auto-managed snapshots each database holds.
pub async fn run_batch<B>(
    backend: &B,
    credentials: &Credentials,
    targets: &[BackupTarget],
    settings: &Settings,
    take: bool,
) -> RunSummary
where
    B: AuthProvider + SnapshotStore + JobStatusService + ?Sized,
{
    let mut summary = RunSummary::default();
    if settings.dry_run {
        info!("dry run: no snapshot will be created or deleted");
    }
    if targets.is_empty() {
        warn!("no databases configured, nothing to do");
        return summary;
    }

    let token = match backend.authenticate(credentials).await {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "authentication failure, check credentials");
            summary.failures.push(RunFailure {
                project: String::new(),
                database: None,
                stage: Stage::Auth,
                error: e,
            });
            summary.aborted = true;
            return summary;
        }
    };

    let backup_options = settings.backup_options();
    let purge_options = settings.purge_options();

    for target in targets {
        summary.processed += 1;
        let prefix = target.policy.prefix.as_str();
        info!(
            project = %target.project,
            database = %target.database,
            keep = target.policy.keep,
            "processing database"
        );

        let existing = match list_snapshots(backend, &token, &target.database, Some(prefix)).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                if summary.record(target, Stage::List, e) {
                    break;
                }
                continue;
            }
        };
        info!(database = %target.database, count = existing.len(), "existing auto-backups");

        if !take {
            continue;
        }

        let name = autobackup_name(prefix, Utc::now());
        let mut policy = target.policy.clone();
        match take_backup(backend, backend, &token, &target.database, &name, &backup_options).await {
            Ok(BackupOutcome::StillRunning(job)) => {
                // The new snapshot is the newest one, so purging cannot select
                // it unless keep is 0.
                warn!(database = %target.database, job = %job.id, "purging while backup is still running");
            }
            Ok(BackupOutcome::DryRun) => {
                // The skipped backup would have been one more auto-managed snapshot.
                policy.keep = policy.keep.saturating_sub(1);
                info!(database = %target.database, keep = policy.keep, "dry run: counting the skipped backup against retention");
            }
            Ok(BackupOutcome::Completed(_)) => {}
            Err(e) => {
                if summary.record(target, Stage::Backup, e) {
                    break;
                }
                continue;
            }
        }

        match purge(backend, &token, &target.database, &policy, &purge_options).await {
            Ok(report) => info!(
                database = %target.database,
                deleted = report.deleted.len(),
                remaining = report.remaining,
                dry_run = report.dry_run,
                "retention applied"
            ),
            Err(e) => {
                if summary.record(target, Stage::Purge, e) {
                    break;
                }
            }
        }
    }

    if !summary.is_success() {
        let failed: Vec<String> = summary.failures.iter().map(RunFailure::label).collect();
        error!(failed = ?failed, aborted = summary.aborted, "run finished with failures");
    }
    summary
}
