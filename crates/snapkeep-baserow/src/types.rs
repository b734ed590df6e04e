// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Baserow snapshot, job, and auth endpoints.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use snapkeep_core::{Snapshot, SnapkeepError, SnapshotId};

/// Body of `POST user/token-auth/`.
#[derive(Debug, Serialize)]
pub struct TokenAuthRequest<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST user/token-auth/`. Older servers answer with `token`.
#[derive(Debug, Deserialize)]
pub struct TokenAuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of `POST snapshots/application/{id}/`.
#[derive(Debug, Serialize)]
pub struct CreateSnapshotRequest<'a> {
    pub name: &'a str,
}

/// One element of `GET snapshots/application/{id}/`.
#[derive(Debug, Deserialize)]
pub struct SnapshotPayload {
    pub id: SnapshotId,
    pub name: String,
    pub created_at: String,
}

impl TryFrom<SnapshotPayload> for Snapshot {
    type Error = SnapkeepError;

    fn try_from(payload: SnapshotPayload) -> Result<Self, Self::Error> {
        Ok(Snapshot {
            created_at: parse_created_at(&payload.created_at)?,
            id: payload.id,
            name: payload.name,
        })
    }
}

/// Error payload: `{"error": "ERROR_CODE", "detail": "..."}`. `detail` may be an object.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    pub fn detail_text(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl From<ApiErrorBody> for SnapkeepError {
    fn from(body: ApiErrorBody) -> Self {
        SnapkeepError::Remote {
            detail: body.detail_text(),
            code: body.error,
        }
    }
}

/// Parse a backend creation timestamp into UTC.
///
/// Baserow emits ISO-8601 with a trailing `Z` (`2024-01-02T03:04:05.123456Z`);
/// the value is treated as UTC. Explicit offsets are converted.
pub fn parse_created_at(raw: &str) -> Result<DateTime<Utc>, SnapkeepError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.and_utc())
        .map_err(|e| SnapkeepError::Decode {
            message: format!("invalid created_at `{raw}`: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_trailing_z_with_micros() {
        let dt = parse_created_at("2024-01-02T03:04:05.123456Z").unwrap();
        assert_eq!(dt.timestamp(), Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap().timestamp());
        assert_eq!(dt.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn parses_naive_timestamp_as_utc() {
        let dt = parse_created_at("2024-01-02T03:04:05").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn converts_explicit_offset() {
        let dt = parse_created_at("2024-01-02T05:04:05+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_created_at("yesterday").unwrap_err();
        assert!(matches!(err, SnapkeepError::Decode { .. }));
    }

    #[test]
    fn error_detail_object_is_stringified() {
        let body: ApiErrorBody = serde_json::from_value(serde_json::json!({
            "error": "ERROR_REQUEST_BODY_VALIDATION",
            "detail": {"name": [{"error": "too long", "code": "max_length"}]}
        }))
        .unwrap();
        assert!(body.detail_text().contains("too long"));
    }
}
