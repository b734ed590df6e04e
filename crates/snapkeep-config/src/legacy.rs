// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML configuration carried in the `CREDS` and `CONFIG` env vars.
//!
//! Kubernetes CronJob deployments mount two YAML documents as env vars:
//!
//! ```yaml
//! # CREDS
//! api_url: https://baserow.example.com/api/
//! email: ops@example.com
//! username: ops
//! password: secret
//! # CONFIG
//! retention: 7
//! backups:
//!   - project: crm
//!     ids: [12, 13]
//!     retention: 3
//! ```
//!
//! Both are translated into a partial [`SnapkeepConfig`](crate::SnapkeepConfig)
//! layer so they merge like any other source.

#![allow(clippy::result_large_err)]

use figment::{
    Figment,
    providers::{Format, Yaml},
};
use serde::{Deserialize, Serialize};
use snapkeep_core::DatabaseId;

use crate::model::{ProjectConfig, lenient_string};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyCreds {
    api_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacySetup {
    retention: Option<usize>,
    #[serde(default)]
    backups: Vec<LegacyBackup>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyBackup {
    project: String,
    ids: Vec<DatabaseId>,
    retention: Option<usize>,
}

/// Partial config layer; absent values are not serialized so lower layers survive.
#[derive(Debug, Default, Serialize)]
pub struct LegacyLayer {
    #[serde(skip_serializing_if = "ApiLayer::is_empty")]
    api: ApiLayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    retention: Option<RetentionLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projects: Option<Vec<ProjectConfig>>,
}

#[derive(Debug, Default, Serialize)]
struct ApiLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

impl ApiLayer {
    fn is_empty(&self) -> bool {
        self.url.is_none() && self.email.is_none() && self.username.is_none() && self.password.is_none()
    }
}

#[derive(Debug, Serialize)]
struct RetentionLayer {
    keep: usize,
}

/// Parse the `CREDS` and `CONFIG` documents into a config layer.
pub fn from_yaml(creds: Option<&str>, setup: Option<&str>) -> Result<LegacyLayer, figment::Error> {
    let mut layer = LegacyLayer::default();

    if let Some(raw) = creds {
        let creds: LegacyCreds = Figment::from(Yaml::string(raw)).extract()?;
        layer.api = ApiLayer {
            url: creds.api_url,
            email: creds.email,
            username: creds.username,
            password: creds.password,
        };
    }

    if let Some(raw) = setup {
        let setup: LegacySetup = Figment::from(Yaml::string(raw)).extract()?;
        layer.retention = setup.retention.map(|keep| RetentionLayer { keep });
        if !setup.backups.is_empty() {
            layer.projects = Some(
                setup
                    .backups
                    .into_iter()
                    .map(|b| ProjectConfig {
                        name: b.project,
                        databases: b.ids,
                        retention: b.retention,
                        overrides: Vec::new(),
                    })
                    .collect(),
            );
        }
    }

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sources_yield_empty_layer() {
        let layer = from_yaml(None, None).unwrap();
        assert!(layer.api.is_empty());
        assert!(layer.retention.is_none());
        assert!(layer.projects.is_none());
    }

    #[test]
    fn backups_become_projects() {
        let layer = from_yaml(
            None,
            Some("retention: 4\nbackups:\n  - project: crm\n    ids: [1, \"2\"]\n    retention: 9\n"),
        )
        .unwrap();
        assert_eq!(layer.retention.as_ref().map(|r| r.keep), Some(4));
        let projects = layer.projects.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "crm");
        assert_eq!(projects[0].databases, vec![DatabaseId::from(1u64), DatabaseId::from("2")]);
        assert_eq!(projects[0].retention, Some(9));
    }

    #[test]
    fn numeric_yaml_credentials_stay_strings() {
        let layer = from_yaml(
            Some("api_url: https://b.example.com/api/\nemail: ops@example.com\nusername: 42\npassword: 123456\n"),
            None,
        )
        .unwrap();
        assert_eq!(layer.api.username.as_deref(), Some("42"));
        assert_eq!(layer.api.password.as_deref(), Some("123456"));
    }

    #[test]
    fn unknown_yaml_keys_are_rejected() {
        let err = from_yaml(Some("api_url: x\ntoken: nope\n"), None).unwrap_err();
        assert!(err.to_string().contains("token"), "got: {err}");
    }
}
