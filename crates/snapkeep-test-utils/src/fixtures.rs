// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Duration, TimeZone, Utc};
use snapkeep_core::{Snapshot, SnapshotId};

/// `minutes` after 2024-01-01T00:00:00Z.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
        + Duration::minutes(minutes)
}

pub fn snapshot(id: u64, name: &str, created_at: DateTime<Utc>) -> Snapshot {
    Snapshot {
        id: SnapshotId::from(id),
        name: name.to_string(),
        created_at,
    }
}
