// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Oldest-snapshot selection.

use snapkeep_core::Snapshot;

/// Returns the snapshot with the smallest `created_at`, or `None` for an empty slice.
///
/// Ties keep the first element in slice order. The backend does not define
/// listing order, so which of two equally old snapshots wins is unspecified.
pub fn find_oldest(snapshots: &[Snapshot]) -> Option<&Snapshot> {
    let mut oldest: Option<&Snapshot> = None;
    for snapshot in snapshots {
        match oldest {
            Some(current) if snapshot.created_at >= current.created_at => {}
            _ => oldest = Some(snapshot),
        }
    }
    oldest
}
