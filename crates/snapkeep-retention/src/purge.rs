// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retention purge: delete the oldest auto-managed snapshots until at most
//! `keep` remain.
//!
//! The victim is re-selected from a fresh listing before every deletion, so
//! snapshots added or removed by someone else during the purge are taken
//! into account and nothing outside the prefix-filtered set is ever deleted.

use std::collections::HashSet;
use std::time::Duration;

use snapkeep_core::{
    AccessToken, DatabaseId, RetentionPolicy, Snapshot, SnapkeepError, SnapshotId, SnapshotStore,
};
use tracing::{debug, info, warn};

use crate::directory::list_snapshots;
use crate::oldest::find_oldest;

/// Options for [`purge`].
#[derive(Debug, Clone)]
pub struct PurgeOptions {
    /// Pause after each (real or simulated) deletion.
    pub settle: Duration,
    /// Log deletions instead of issuing them.
    pub dry_run: bool,
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(5),
            dry_run: false,
        }
    }
}

/// What a purge removed, or would have removed in a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    /// Auto-managed snapshots present when the purge started.
    pub before: usize,
    /// Deleted snapshots, oldest first.
    pub deleted: Vec<Snapshot>,
    /// Auto-managed snapshots left according to the last listing, minus the
    /// victim chosen from it.
    pub remaining: usize,
    pub dry_run: bool,
}

/// Deletes the oldest snapshots matching `policy.prefix` until `policy.keep` remain.
///
/// The first failed deletion aborts the purge. Deletions already made are not
/// rolled back.
pub async fn purge<S>(
    store: &S,
    token: &AccessToken,
    database: &DatabaseId,
    policy: &RetentionPolicy,
    options: &PurgeOptions,
) -> Result<PurgeReport, SnapkeepError>
where
    S: SnapshotStore + ?Sized,
{
    let prefix = policy.prefix.as_str();
    let current = list_snapshots(store, token, database, Some(prefix)).await?;
    let mut report = PurgeReport {
        before: current.len(),
        deleted: Vec::new(),
        remaining: current.len(),
        dry_run: options.dry_run,
    };

    if current.is_empty() {
        warn!(database = %database, prefix, "no auto-managed snapshots found");
        return Ok(report);
    }

    let excess = current.len().saturating_sub(policy.keep);
    if excess == 0 {
        debug!(database = %database, count = current.len(), keep = policy.keep, "within retention");
        return Ok(report);
    }
    info!(
        database = %database,
        count = current.len(),
        keep = policy.keep,
        excess,
        dry_run = options.dry_run,
        "purging oldest snapshots"
    );

    // Deleted (or simulated) ids are skipped if a listing still shows them.
    let mut removed: HashSet<SnapshotId> = HashSet::new();
    for _ in 0..excess {
        let candidates: Vec<Snapshot> = list_snapshots(store, token, database, Some(prefix))
            .await?
            .into_iter()
            .filter(|s| !removed.contains(&s.id))
            .collect();
        let Some(victim) = find_oldest(&candidates).cloned() else {
            warn!(database = %database, "snapshots disappeared during purge");
            report.remaining = 0;
            break;
        };

        if options.dry_run {
            info!(database = %database, snapshot = %victim.name, id = %victim.id, "DRY: would delete snapshot");
        } else {
            store.delete(token, &victim.id).await?;
            info!(database = %database, snapshot = %victim.name, id = %victim.id, "snapshot deleted");
        }
        removed.insert(victim.id.clone());
        report.remaining = candidates.len() - 1;
        report.deleted.push(victim);

        if !options.settle.is_zero() {
            tokio::time::sleep(options.settle).await;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapkeep_test_utils::{MockBackend, at, snapshot};
    use tracing_test::traced_test;

    fn db() -> DatabaseId {
        DatabaseId::from(3u64)
    }

    fn autos(n: u64) -> Vec<Snapshot> {
        // Listed newest first to make sure order plays no role.
        (0..n)
            .rev()
            .map(|i| snapshot(i + 1, &format!("Autobackup {i}"), at(i as i64 * 60)))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn deletes_exactly_the_oldest_excess() {
        let backend = MockBackend::new().with_snapshots(db(), autos(5));
        let report = purge(
            &backend,
            &backend.token(),
            &db(),
            &RetentionPolicy::new(2),
            &PurgeOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.before, 5);
        assert_eq!(report.remaining, 2);
        assert_eq!(backend.deleted_ids(), vec!["1", "2", "3"]);
        assert_eq!(backend.snapshot_count(&db()), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn relists_before_every_deletion() {
        let backend = MockBackend::new().with_snapshots(db(), autos(4));
        purge(
            &backend,
            &backend.token(),
            &db(),
            &RetentionPolicy::new(1),
            &PurgeOptions::default(),
        )
        .await
        .unwrap();

        // Initial count plus one listing per deletion.
        assert_eq!(backend.list_calls(), 4);
        assert_eq!(backend.delete_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn within_retention_issues_no_delete() {
        let backend = MockBackend::new().with_snapshots(db(), autos(3));
        let report = purge(
            &backend,
            &backend.token(),
            &db(),
            &RetentionPolicy::new(3),
            &PurgeOptions::default(),
        )
        .await
        .unwrap();

        assert!(report.deleted.is_empty());
        assert_eq!(backend.delete_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn empty_set_warns_but_succeeds() {
        let backend = MockBackend::new()
            .with_snapshots(db(), vec![snapshot(1, "Manual", at(0))]);
        let report = purge(
            &backend,
            &backend.token(),
            &db(),
            &RetentionPolicy::new(0),
            &PurgeOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.before, 0);
        assert_eq!(backend.delete_calls(), 0);
        assert!(logs_contain("no auto-managed snapshots found"));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_snapshots_are_never_touched() {
        let backend = MockBackend::new().with_snapshots(
            db(),
            vec![
                snapshot(1, "Autobackup 2024-01-01", at(10)),
                snapshot(2, "Manual", at(0)),
                snapshot(3, "Autobackup 2024-01-02", at(20)),
            ],
        );
        let policy = RetentionPolicy::new(1).with_prefix("Autobackup");

        purge(&backend, &backend.token(), &db(), &policy, &PurgeOptions::default())
            .await
            .unwrap();

        assert_eq!(backend.deleted_ids(), vec!["1"]);
        let left: Vec<String> = backend.snapshots(&db()).into_iter().map(|s| s.id.0).collect();
        assert_eq!(left, vec!["2", "3"]);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn dry_run_keeps_timing_but_deletes_nothing() {
        let backend = MockBackend::new().with_snapshots(db(), autos(4));
        let started = tokio::time::Instant::now();
        let options = PurgeOptions {
            dry_run: true,
            ..PurgeOptions::default()
        };

        let report = purge(&backend, &backend.token(), &db(), &RetentionPolicy::new(1), &options)
            .await
            .unwrap();

        assert_eq!(backend.delete_calls(), 0);
        assert_eq!(backend.snapshot_count(&db()), 4);
        assert!(report.dry_run);
        let would_delete: Vec<&str> = report.deleted.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(would_delete, vec!["1", "2", "3"]);
        assert_eq!(report.remaining, 1);
        assert_eq!(started.elapsed(), Duration::from_secs(15));
        assert!(logs_contain("DRY: would delete snapshot"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_deletion_aborts_and_keeps_earlier_deletions() {
        let backend = MockBackend::new()
            .with_snapshots(db(), autos(5))
            .fail_delete_after(1, "ERROR_SNAPSHOT_IS_BEING_CREATED");

        let err = purge(
            &backend,
            &backend.token(),
            &db(),
            &RetentionPolicy::new(1),
            &PurgeOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SnapkeepError::Remote { .. }));
        assert_eq!(backend.deleted_ids(), vec!["1"]);
        assert_eq!(backend.snapshot_count(&db()), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_removal_is_tolerated() {
        // Someone deletes snapshot 2 by hand between our listings: the purge
        // re-selects and removes the next oldest instead.
        let backend = MockBackend::new()
            .with_snapshots(db(), autos(4))
            .remove_after_list(2, SnapshotId::from(2u64));

        let report = purge(
            &backend,
            &backend.token(),
            &db(),
            &RetentionPolicy::new(2),
            &PurgeOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.deleted.len(), 2);
        assert_eq!(report.remaining, 1);
        assert_eq!(backend.deleted_ids(), vec!["1", "3"]);
        assert_eq!(backend.snapshot_count(&db()), 1);
    }
}
