// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the retention engine.
//!
//! All traits use `#[async_trait]` so the engine can run against the HTTP
//! client in production and an in-memory backend in tests.

pub mod auth;
pub mod jobs;
pub mod store;

pub use auth::AuthProvider;
pub use jobs::JobStatusService;
pub use store::SnapshotStore;
