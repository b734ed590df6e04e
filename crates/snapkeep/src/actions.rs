// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive actions: one operation against one database per invocation.

use chrono::Utc;
use clap::Subcommand;
use snapkeep_core::{
    AccessToken, DatabaseId, Job, JobId, JobStatusService, RetentionPolicy, SnapkeepError,
    Snapshot, SnapshotStore,
};
use snapkeep_retention::{
    BackupOutcome, PurgeReport, autobackup_name, find_snapshot_by_name, list_snapshots,
    oldest_snapshot, purge, take_backup,
};
use tracing::info;

use crate::settings::Settings;

/// Single-database commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// List every snapshot of a database.
    List { database: DatabaseId },
    /// List the auto-managed snapshots of a database.
    #[command(visible_alias = "listAuto")]
    ListAuto { database: DatabaseId },
    /// Show the oldest snapshot of a database.
    Oldest { database: DatabaseId },
    /// Show the oldest auto-managed snapshot of a database.
    #[command(visible_alias = "oldestAuto")]
    OldestAuto { database: DatabaseId },
    /// Take a snapshot and wait for it to finish.
    Take {
        database: DatabaseId,
        /// Snapshot name. Defaults to the auto-backup prefix plus the UTC time.
        name: Option<String>,
    },
    /// Delete the first snapshot whose name starts with NAME.
    Delete { database: DatabaseId, name: String },
    /// Show the status of a backend job.
    JobStatus { job: JobId },
    /// Delete the oldest auto-managed snapshots until KEEP remain.
    Purge { database: DatabaseId, keep: usize },
}

/// What an action produced, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutput {
    Snapshots(Vec<Snapshot>),
    Oldest(Option<Snapshot>),
    Backup { name: String, outcome: BackupOutcome },
    Deleted { snapshot: Snapshot, dry_run: bool },
    Job(Job),
    Purged(PurgeReport),
}

pub async fn execute<B>(
    backend: &B,
    token: &AccessToken,
    action: Action,
    settings: &Settings,
) -> Result<ActionOutput, SnapkeepError>
where
    B: SnapshotStore + JobStatusService + ?Sized,
{
    let prefix = settings.prefix.as_str();
    match action {
        Action::List { database } => list_snapshots(backend, token, &database, None)
            .await
            .map(ActionOutput::Snapshots),
        Action::ListAuto { database } => list_snapshots(backend, token, &database, Some(prefix))
            .await
            .map(ActionOutput::Snapshots),
        Action::Oldest { database } => oldest_snapshot(backend, token, &database, None)
            .await
            .map(ActionOutput::Oldest),
        Action::OldestAuto { database } => oldest_snapshot(backend, token, &database, Some(prefix))
            .await
            .map(ActionOutput::Oldest),
        Action::Take { database, name } => {
            let name = name.unwrap_or_else(|| autobackup_name(prefix, Utc::now()));
            let options = settings.interactive_backup_options();
            let outcome = take_backup(backend, backend, token, &database, &name, &options).await?;
            Ok(ActionOutput::Backup { name, outcome })
        }
        Action::Delete { database, name } => {
            let snapshot = find_snapshot_by_name(backend, token, &database, &name)
                .await?
                .ok_or_else(|| SnapkeepError::NotFound {
                    what: format!("backup {name:?}"),
                })?;
            if settings.dry_run {
                info!(database = %database, snapshot = %snapshot.name, id = %snapshot.id, "DRY: would delete snapshot");
            } else {
                info!(database = %database, snapshot = %snapshot.name, id = %snapshot.id, "deleting snapshot");
                backend.delete(token, &snapshot.id).await?;
            }
            Ok(ActionOutput::Deleted {
                snapshot,
                dry_run: settings.dry_run,
            })
        }
        Action::JobStatus { job } => backend.status(token, &job).await.map(ActionOutput::Job),
        Action::Purge { database, keep } => {
            let policy = RetentionPolicy::new(keep).with_prefix(prefix);
            purge(backend, token, &database, &policy, &settings.purge_options())
                .await
                .map(ActionOutput::Purged)
        }
    }
}
