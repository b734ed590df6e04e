// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for snapkeep.
//!
//! Provides an in-memory backend and snapshot fixtures for fast,
//! deterministic tests without a Baserow instance.
//!
//! # Components
//!
//! - [`MockBackend`] - Scriptable backend implementing every collaborator trait
//! - [`snapshot`] / [`at`] - Fixture helpers with a fixed time origin

pub mod fixtures;
pub mod mock_backend;

pub use fixtures::{at, snapshot};
pub use mock_backend::MockBackend;
