// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Baserow REST API.
//!
//! [`BaserowClient`] is built once per run and implements the three
//! collaborator traits. It owns no session state: the access token is passed
//! into every call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use snapkeep_core::{
    AccessToken, AuthProvider, Credentials, DatabaseId, Job, JobId, JobStatusService, Snapshot,
    SnapkeepError, SnapshotId, SnapshotStore,
};
use tracing::debug;

use crate::types::{
    ApiErrorBody, CreateSnapshotRequest, SnapshotPayload, TokenAuthRequest, TokenAuthResponse,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Baserow API client.
#[derive(Debug, Clone)]
pub struct BaserowClient {
    client: reqwest::Client,
    base_url: String,
}

impl BaserowClient {
    /// Creates a client for the API rooted at `base_url`
    /// (e.g. `https://baserow.example.com/api/`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SnapkeepError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SnapkeepError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the API root without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authorized(
        &self,
        request: RequestBuilder,
        token: &AccessToken,
    ) -> Result<RequestBuilder, SnapkeepError> {
        let mut value = HeaderValue::from_str(&format!("JWT {}", token.expose())).map_err(|_| {
            SnapkeepError::Auth {
                message: "access token contains characters not allowed in a header".into(),
            }
        })?;
        value.set_sensitive(true);
        Ok(request.header(AUTHORIZATION, value))
    }

    /// Sends the request and returns status plus body text.
    async fn execute(
        &self,
        request: RequestBuilder,
    ) -> Result<(StatusCode, String), SnapkeepError> {
        let response = request.send().await.map_err(|e| SnapkeepError::Transport {
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| SnapkeepError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(status = %status, bytes = body.len(), "response received");
        Ok((status, body))
    }

    /// Sends an authorized request and decodes the JSON answer.
    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: &AccessToken,
    ) -> Result<T, SnapkeepError> {
        let (status, body) = self.execute(self.authorized(request, token)?).await?;
        check_status(status, &body)?;
        decode(&body)
    }
}

/// Maps non-success statuses to typed errors. 401 means the token was rejected.
fn check_status(status: StatusCode, body: &str) -> Result<(), SnapkeepError> {
    if status.is_success() {
        return Ok(());
    }
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    if status == StatusCode::UNAUTHORIZED {
        return Err(SnapkeepError::Auth {
            message: parsed
                .map(|b| format!("{}: {}", b.error, b.detail_text()))
                .unwrap_or_else(|| format!("API returned {status}")),
        });
    }
    Err(match parsed {
        Some(api_err) => api_err.into(),
        None => SnapkeepError::Remote {
            code: format!("HTTP_{}", status.as_u16()),
            detail: body.to_string(),
        },
    })
}

/// Decodes a success body, treating an embedded `{"error": ...}` payload as a remote error.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SnapkeepError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| SnapkeepError::Decode {
            message: format!("response is not JSON: {e}"),
        })?;
    if value.get("error").is_some() {
        let api_err: ApiErrorBody =
            serde_json::from_value(value).map_err(|e| SnapkeepError::Decode {
                message: format!("malformed error payload: {e}"),
            })?;
        return Err(api_err.into());
    }
    serde_json::from_value(value).map_err(|e| SnapkeepError::Decode {
        message: format!("unexpected response shape: {e}"),
    })
}

#[async_trait]
impl AuthProvider for BaserowClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, SnapkeepError> {
        let body = TokenAuthRequest {
            email: &credentials.email,
            username: &credentials.username,
            password: credentials.password.expose_secret(),
        };
        let request = self.client.post(self.endpoint("user/token-auth/")).json(&body);

        let (status, text) = self.execute(request).await.map_err(|e| SnapkeepError::Auth {
            message: e.to_string(),
        })?;
        if let Err(e) = check_status(status, &text) {
            return Err(SnapkeepError::Auth {
                message: e.to_string(),
            });
        }

        let response: TokenAuthResponse = serde_json::from_str(&text).map_err(|e| {
            SnapkeepError::Auth {
                message: format!("unreadable token response: {e}"),
            }
        })?;
        response
            .access_token
            .or(response.token)
            .map(AccessToken::new)
            .ok_or_else(|| SnapkeepError::Auth {
                message: "response did not contain an access token".into(),
            })
    }
}

#[async_trait]
impl SnapshotStore for BaserowClient {
    async fn list(
        &self,
        token: &AccessToken,
        database: &DatabaseId,
    ) -> Result<Vec<Snapshot>, SnapkeepError> {
        let request = self
            .client
            .get(self.endpoint(&format!("snapshots/application/{database}/")));
        let payloads: Vec<SnapshotPayload> = self.call(request, token).await?;
        payloads.into_iter().map(Snapshot::try_from).collect()
    }

    async fn create(
        &self,
        token: &AccessToken,
        database: &DatabaseId,
        name: &str,
    ) -> Result<Job, SnapkeepError> {
        let request = self
            .client
            .post(self.endpoint(&format!("snapshots/application/{database}/")))
            .json(&CreateSnapshotRequest { name });
        self.call(request, token).await
    }

    async fn delete(
        &self,
        token: &AccessToken,
        snapshot: &SnapshotId,
    ) -> Result<(), SnapkeepError> {
        let request = self
            .client
            .delete(self.endpoint(&format!("snapshots/{snapshot}/")));
        let (status, body) = self.execute(self.authorized(request, token)?).await?;
        check_status(status, &body)
    }
}

#[async_trait]
impl JobStatusService for BaserowClient {
    async fn status(&self, token: &AccessToken, job: &JobId) -> Result<Job, SnapkeepError> {
        let request = self.client.get(self.endpoint(&format!("jobs/{job}/")));
        self.call(request, token).await
    }
}
