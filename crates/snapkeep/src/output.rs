// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of interactive action results for stdout.
//!
//! Plain mode prints one line per snapshot. With `--json` every result is a
//! pretty-printed JSON document.

use colored::Colorize;
use serde_json::{Value, json};
use snapkeep_core::Snapshot;
use snapkeep_retention::BackupOutcome;

use crate::actions::ActionOutput;

pub fn render(output: &ActionOutput, as_json: bool, use_color: bool) -> String {
    if as_json {
        let value = to_json(output);
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    } else {
        to_text(output, use_color)
    }
}

fn snapshot_line(snapshot: &Snapshot, use_color: bool) -> String {
    let created = snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC");
    if use_color {
        format!(
            "{:>8}  {}  {}",
            snapshot.id.as_str().dimmed(),
            created,
            snapshot.name.bold()
        )
    } else {
        format!("{:>8}  {}  {}", snapshot.id, created, snapshot.name)
    }
}

fn to_text(output: &ActionOutput, use_color: bool) -> String {
    match output {
        ActionOutput::Snapshots(snapshots) => {
            let mut lines = vec![format!("{} snapshots available", snapshots.len())];
            lines.extend(snapshots.iter().map(|s| snapshot_line(s, use_color)));
            lines.join("\n")
        }
        ActionOutput::Oldest(Some(snapshot)) => snapshot_line(snapshot, use_color),
        ActionOutput::Oldest(None) => "no snapshot found".to_string(),
        ActionOutput::Backup { name, outcome } => match outcome {
            BackupOutcome::Completed(job) => {
                let status = if use_color {
                    "finished".green().to_string()
                } else {
                    "finished".to_string()
                };
                format!("backup {name:?} {status} (job {})", job.id)
            }
            BackupOutcome::StillRunning(job) => {
                format!("backup {name:?} still {} (job {})", job.state, job.id)
            }
            BackupOutcome::DryRun => format!("dry run: would take backup {name:?}"),
        },
        ActionOutput::Deleted { snapshot, dry_run } => {
            let verb = if *dry_run { "would delete" } else { "deleted" };
            format!("{verb} snapshot {} ({})", snapshot.name, snapshot.id)
        }
        ActionOutput::Job(job) => {
            let mut line = format!("job {}: {}", job.id, job.state);
            if let Some(progress) = job.progress_percentage {
                line.push_str(&format!(" ({progress}%)"));
            }
            if let Some(reason) = &job.human_readable_error {
                line.push_str(&format!(": {reason}"));
            }
            line
        }
        ActionOutput::Purged(report) => {
            let verb = if report.dry_run { "would delete" } else { "deleted" };
            let mut lines = vec![format!(
                "{verb} {} of {} auto-managed snapshots, {} remaining",
                report.deleted.len(),
                report.before,
                report.remaining
            )];
            lines.extend(report.deleted.iter().map(|s| snapshot_line(s, use_color)));
            lines.join("\n")
        }
    }
}

fn to_json(output: &ActionOutput) -> Value {
    match output {
        ActionOutput::Snapshots(snapshots) => json!({
            "count": snapshots.len(),
            "snapshots": snapshots,
        }),
        ActionOutput::Oldest(snapshot) => json!({ "oldest": snapshot }),
        ActionOutput::Backup { name, outcome } => {
            let state = match outcome {
                BackupOutcome::Completed(_) => "finished",
                BackupOutcome::StillRunning(_) => "running",
                BackupOutcome::DryRun => "dry_run",
            };
            json!({ "name": name, "outcome": state, "job": outcome.job() })
        }
        ActionOutput::Deleted { snapshot, dry_run } => json!({
            "deleted": snapshot,
            "dry_run": dry_run,
        }),
        ActionOutput::Job(job) => json!(job),
        ActionOutput::Purged(report) => json!({
            "before": report.before,
            "remaining": report.remaining,
            "deleted": report.deleted,
            "dry_run": report.dry_run,
        }),
    }
}
