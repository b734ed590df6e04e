// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime settings derived from the loaded configuration and global CLI flags.

use std::time::Duration;

use snapkeep_config::SnapkeepConfig;
use snapkeep_core::TimeoutPolicy;
use snapkeep_retention::{BackupOptions, PollPolicy, PurgeOptions};

#[derive(Debug, Clone)]
pub struct Settings {
    /// Name prefix of auto-managed snapshots.
    pub prefix: String,
    pub poll: PollPolicy,
    /// Pause after each deletion during a purge.
    pub settle: Duration,
    pub dry_run: bool,
}

impl Settings {
    pub fn from_config(config: &SnapkeepConfig, dry_run: bool) -> Self {
        Self {
            prefix: config.retention.prefix.clone(),
            poll: PollPolicy {
                max_attempts: config.backup.poll_attempts,
                base_interval: Duration::from_secs(config.backup.poll_interval_secs),
                timeout: config.backup.timeout_policy,
            },
            settle: Duration::from_secs(config.backup.settle_secs),
            dry_run,
        }
    }

    /// Options for batch backups, honoring the configured timeout policy.
    pub fn backup_options(&self) -> BackupOptions {
        BackupOptions {
            poll: self.poll.clone(),
            dry_run: self.dry_run,
        }
    }

    /// Options for a backup requested from the command line. An unfinished
    /// job is always an error there, so the exit code reflects it.
    pub fn interactive_backup_options(&self) -> BackupOptions {
        let mut options = self.backup_options();
        options.poll.timeout = TimeoutPolicy::Hard;
        options
    }

    pub fn purge_options(&self) -> PurgeOptions {
        PurgeOptions {
            settle: self.settle,
            dry_run: self.dry_run,
        }
    }
}
