// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::SnapkeepConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one. Credentials
/// are not checked here: read-only commands such as `--help` or a report
/// without the API must not require them.
pub fn validate_config(config: &SnapkeepConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(url) = config.api.url.as_deref() {
        let url = url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::Validation {
                message: format!("api.url `{url}` must start with http:// or https://"),
            });
        }
    }

    if config.api.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.backup.poll_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "backup.poll_attempts must be at least 1".to_string(),
        });
    }

    if config.retention.prefix.is_empty() {
        errors.push(ConfigError::Validation {
            message: "retention.prefix must not be empty; it protects manual snapshots from purge"
                .to_string(),
        });
    }

    let mut seen_projects = HashSet::new();
    for (i, project) in config.projects.iter().enumerate() {
        if project.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("projects[{i}].name must not be empty"),
            });
        } else if !seen_projects.insert(project.name.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate project name `{}`", project.name),
            });
        }

        let mut seen_databases = HashSet::new();
        for database in &project.databases {
            if !seen_databases.insert(database) {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "database `{database}` listed twice in project `{}`",
                        project.name
                    ),
                });
            }
        }

        for over in &project.overrides {
            if !project.databases.contains(&over.database) {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "override for database `{}` in project `{}` does not match a listed database",
                        over.database, project.name
                    ),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DatabaseOverride, ProjectConfig};
    use snapkeep_core::DatabaseId;

    fn has_validation(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&SnapkeepConfig::default()).is_ok());
    }

    #[test]
    fn non_http_url_fails_validation() {
        let mut config = SnapkeepConfig::default();
        config.api.url = Some("ftp://baserow.example.com".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "api.url"));
    }

    #[test]
    fn zero_poll_attempts_fails_validation() {
        let mut config = SnapkeepConfig::default();
        config.backup.poll_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "poll_attempts"));
    }

    #[test]
    fn empty_prefix_fails_validation() {
        let mut config = SnapkeepConfig::default();
        config.retention.prefix = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "retention.prefix"));
    }

    #[test]
    fn project_errors_are_all_collected() {
        let mut config = SnapkeepConfig::default();
        config.projects = vec![
            ProjectConfig {
                name: "crm".into(),
                databases: vec![DatabaseId::from(1u64), DatabaseId::from("1")],
                retention: None,
                overrides: vec![DatabaseOverride {
                    database: DatabaseId::from(9u64),
                    retention: 2,
                }],
            },
            ProjectConfig {
                name: "crm".into(),
                databases: vec![],
                retention: None,
                overrides: vec![],
            },
        ];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_validation(&errors, "listed twice"));
        assert!(has_validation(&errors, "does not match"));
        assert!(has_validation(&errors, "duplicate project name"));
    }
}
