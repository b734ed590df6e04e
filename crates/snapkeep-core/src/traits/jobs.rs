// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job status service trait.

use async_trait::async_trait;

use crate::error::SnapkeepError;
use crate::types::{AccessToken, Job, JobId};

/// Reports the state of asynchronous backend jobs.
#[async_trait]
pub trait JobStatusService: Send + Sync {
    async fn status(&self, token: &AccessToken, job: &JobId) -> Result<Job, SnapkeepError>;
}
