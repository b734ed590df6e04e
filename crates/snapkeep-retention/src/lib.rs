// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retention engine for snapkeep.
//!
//! Everything here is written against the collaborator traits in
//! `snapkeep-core`, so the same code drives the Baserow client in production
//! and the in-memory mock backend in tests.
//!
//! - [`directory`]: listing with prefix filtering and oldest/by-name lookups
//! - [`backup`]: snapshot creation with bounded job polling
//! - [`purge`]: deletion of the oldest auto-managed snapshots beyond `keep`

pub mod backup;
pub mod directory;
pub mod oldest;
pub mod purge;

pub use backup::{BackupOptions, BackupOutcome, PollPolicy, autobackup_name, take_backup};
pub use directory::{find_snapshot_by_name, list_snapshots, oldest_snapshot};
pub use oldest::find_oldest;
pub use purge::{PurgeOptions, PurgeReport, purge};
