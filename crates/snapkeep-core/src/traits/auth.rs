// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication provider trait.

use async_trait::async_trait;

use crate::error::SnapkeepError;
use crate::types::{AccessToken, Credentials};

/// Exchanges credentials for the bearer token used by every later call.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticates once. Any response without a token is [`SnapkeepError::Auth`];
    /// there is no retry and no refresh.
    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, SnapkeepError>;
}
