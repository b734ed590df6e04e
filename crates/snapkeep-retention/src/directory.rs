// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot directory reads: listing with prefix filtering and lookups built on it.

use snapkeep_core::{AccessToken, DatabaseId, Snapshot, SnapkeepError, SnapshotStore};
use tracing::debug;

use crate::oldest::find_oldest;

/// Lists the snapshots of `database`, keeping only names starting with `prefix` when given.
///
/// The prefix match is case-sensitive and byte-exact. Backend order is preserved.
pub async fn list_snapshots<S>(
    store: &S,
    token: &AccessToken,
    database: &DatabaseId,
    prefix: Option<&str>,
) -> Result<Vec<Snapshot>, SnapkeepError>
where
    S: SnapshotStore + ?Sized,
{
    let all = store.list(token, database).await?;
    let total = all.len();
    let filtered: Vec<Snapshot> = match prefix {
        Some(prefix) => all.into_iter().filter(|s| s.matches_prefix(prefix)).collect(),
        None => all,
    };
    debug!(
        database = %database,
        total,
        matched = filtered.len(),
        prefix = prefix.unwrap_or(""),
        "snapshots listed"
    );
    Ok(filtered)
}

/// Lists and returns the oldest matching snapshot. `Ok(None)` means nothing matched.
pub async fn oldest_snapshot<S>(
    store: &S,
    token: &AccessToken,
    database: &DatabaseId,
    prefix: Option<&str>,
) -> Result<Option<Snapshot>, SnapkeepError>
where
    S: SnapshotStore + ?Sized,
{
    let snapshots = list_snapshots(store, token, database, prefix).await?;
    Ok(find_oldest(&snapshots).cloned())
}

/// First snapshot (in backend order) whose name starts with `name`.
pub async fn find_snapshot_by_name<S>(
    store: &S,
    token: &AccessToken,
    database: &DatabaseId,
    name: &str,
) -> Result<Option<Snapshot>, SnapkeepError>
where
    S: SnapshotStore + ?Sized,
{
    let snapshots = list_snapshots(store, token, database, Some(name)).await?;
    Ok(snapshots.into_iter().next())
}
