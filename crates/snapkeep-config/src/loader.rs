// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy `/etc/snapkeep/snapkeep.toml` <
//! `~/.config/snapkeep/snapkeep.toml` < `./snapkeep.toml`, the legacy
//! `CREDS`/`CONFIG` YAML documents and `BASEROW_*` variables, and finally
//! `SNAPKEEP_*` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::legacy;
use crate::model::SnapkeepConfig;

/// Sections addressable through `SNAPKEEP_<SECTION>_<KEY>`.
const ENV_SECTIONS: &[&str] = &["api", "retention", "backup", "log"];

const ENV_PREFIX: &str = "SNAPKEEP_";

/// String-typed keys whose env values are used verbatim.
const VERBATIM_KEYS: &[&str] = &[
    "api.url",
    "api.email",
    "api.username",
    "api.password",
    "retention.prefix",
    "log.level",
];

/// Legacy variables of the standalone interactive backup script.
const BASEROW_ENV_KEYS: &[(&str, &str)] = &[
    ("BASEROW_API_URL", "api.url"),
    ("BASEROW_EMAIL", "api.email"),
    ("BASEROW_USER", "api.username"),
    ("BASEROW_PWD", "api.password"),
];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/snapkeep/snapkeep.toml`
/// 3. `~/.config/snapkeep/snapkeep.toml`
/// 4. `./snapkeep.toml`
/// 5. `CREDS` / `CONFIG` YAML env vars
/// 6. `BASEROW_*` env vars
/// 7. `SNAPKEEP_*` env vars
pub fn load_config() -> Result<SnapkeepConfig, figment::Error> {
    build_figment(None)?.extract()
}

/// Load configuration with an explicit file in place of `./snapkeep.toml`.
pub fn load_config_from_path(path: &Path) -> Result<SnapkeepConfig, figment::Error> {
    build_figment(Some(path))?.extract()
}

/// Load configuration from a TOML string only (no files, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<SnapkeepConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SnapkeepConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Config files consulted, lowest precedence first.
pub fn config_file_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/snapkeep/snapkeep.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("snapkeep/snapkeep.toml"));
    }
    paths.push(
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("snapkeep.toml")),
    );
    paths
}

/// Build the Figment used for config loading, before extraction.
///
/// Fails only when the legacy YAML env vars are present but malformed.
pub fn build_figment(explicit: Option<&Path>) -> Result<Figment, figment::Error> {
    let mut figment = Figment::new().merge(Serialized::defaults(SnapkeepConfig::default()));
    for path in config_file_paths(explicit) {
        figment = figment.merge(Toml::file(path));
    }

    let creds = std::env::var("CREDS").ok();
    let setup = std::env::var("CONFIG").ok();
    if creds.is_some() || setup.is_some() {
        let patch = legacy::from_yaml(creds.as_deref(), setup.as_deref())?;
        figment = figment.merge(Serialized::defaults(patch));
    }

    Ok(figment
        .merge(baserow_env_layer())
        .merge(env_provider())
        .merge(verbatim_env_layer()))
}

/// Maps `BASEROW_API_URL`, `BASEROW_EMAIL`, `BASEROW_USER`, and `BASEROW_PWD`.
///
/// All four are strings and are taken byte for byte, so a numeric password or
/// one with surrounding spaces survives.
fn baserow_env_layer() -> Figment {
    BASEROW_ENV_KEYS
        .iter()
        .filter_map(|(name, path)| Some((*path, std::env::var(name).ok()?)))
        .fold(Figment::new(), |figment, (path, value)| {
            figment.merge(Serialized::default(path, value))
        })
}

/// `api_url` -> `api.url`, `backup_poll_attempts` -> `backup.poll_attempts`.
///
/// Uses an explicit section table, not `Env::split("_")`, because field names
/// contain underscores.
fn section_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    ENV_SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or(key)
}

/// `SNAPKEEP_*` variables for non-string keys, parsed by figment.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).filter_map(|key| {
        let path = section_path(key.as_str());
        (!VERBATIM_KEYS.contains(&path.as_str())).then(|| path.into())
    })
}

/// `SNAPKEEP_*` variables for string keys. `Env` trims and parses values,
/// which would turn `"Autobackup "` into `"Autobackup"` and `"007"` into `7`.
fn verbatim_env_layer() -> Figment {
    std::env::vars_os()
        .filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            let value = value.into_string().ok()?;
            let rest = key
                .get(..ENV_PREFIX.len())
                .filter(|p| p.eq_ignore_ascii_case(ENV_PREFIX))
                .map(|_| &key[ENV_PREFIX.len()..])?;
            let path = section_path(rest);
            VERBATIM_KEYS.contains(&path.as_str()).then_some((path, value))
        })
        .fold(Figment::new(), |figment, (path, value)| {
            figment.merge(Serialized::default(&path, value))
        })
}
