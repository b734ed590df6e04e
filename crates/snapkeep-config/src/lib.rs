// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for snapkeep.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, legacy and `SNAPKEEP_*`
//! environment variable overrides, and miette diagnostics with typo
//! suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use snapkeep_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("default retention: {}", config.retention.keep);
//! ```

pub mod diagnostic;
mod legacy;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{BackupTarget, SnapkeepConfig};

/// Load configuration from the standard hierarchy (or `explicit` in place of
/// `./snapkeep.toml`) and validate it.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<SnapkeepConfig, Vec<ConfigError>> {
    let loaded = loader::build_figment(explicit).and_then(|figment| figment.extract());
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(projects = config.projects.len(), "configuration loaded");
            Ok(config)
        }
        Err(err) => {
            let sources = collect_toml_sources(explicit);
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SnapkeepConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read the TOML files that exist so diagnostics can point into them.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    loader::config_file_paths(explicit)
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            // Figment records absolute paths in error metadata.
            let path = std::fs::canonicalize(&path).unwrap_or(path);
            Some((path.display().to_string(), content))
        })
        .collect()
}
