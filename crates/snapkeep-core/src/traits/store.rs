// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot store trait for remote snapshot CRUD.

use async_trait::async_trait;

use crate::error::SnapkeepError;
use crate::types::{AccessToken, DatabaseId, Job, Snapshot, SnapshotId};

/// Remote snapshot resources of one backend.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns every snapshot of `database`, unfiltered and in backend order.
    async fn list(
        &self,
        token: &AccessToken,
        database: &DatabaseId,
    ) -> Result<Vec<Snapshot>, SnapkeepError>;

    /// Requests a new snapshot named `name`. Creation is asynchronous: the
    /// returned job must be polled through a [`crate::JobStatusService`].
    async fn create(
        &self,
        token: &AccessToken,
        database: &DatabaseId,
        name: &str,
    ) -> Result<Job, SnapkeepError>;

    /// Deletes a single snapshot.
    async fn delete(
        &self,
        token: &AccessToken,
        snapshot: &SnapshotId,
    ) -> Result<(), SnapkeepError>;
}
