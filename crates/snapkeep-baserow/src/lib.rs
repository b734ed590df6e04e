// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Baserow backend for snapkeep.
//!
//! Talks to the Baserow REST API (`user/token-auth/`, `snapshots/...`,
//! `jobs/...`) and implements [`AuthProvider`](snapkeep_core::AuthProvider),
//! [`SnapshotStore`](snapkeep_core::SnapshotStore), and
//! [`JobStatusService`](snapkeep_core::JobStatusService).

pub mod client;
pub mod types;

pub use client::{BaserowClient, DEFAULT_TIMEOUT};
