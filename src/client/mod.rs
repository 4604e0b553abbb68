// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed HTTP client for the gym-tracker API.
//!
//! Covers account login and the session auto-save flow. Set edits go through
//! an [`AutosaveBuffer`] so callers see them immediately.

pub mod autosave;

pub use autosave::{AutosaveBuffer, LocalSet, SetKey};

use crate::error::ErrorResponse;
use crate::models::{SessionDetail, SetInput, SetLog, SetValidationError};
use crate::routes::auth::AuthResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally; nothing was sent.
    #[error("invalid set: {0}")]
    InvalidSet(#[from] SetValidationError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: ErrorResponse },

    #[error("not logged in")]
    NotLoggedIn,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// API client holding a bearer token after login.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    sets: AutosaveBuffer,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            sets: AutosaveBuffer::new(),
        }
    }

    /// Local view of the sets, including unsaved edits.
    pub fn sets(&self) -> &AutosaveBuffer {
        &self.sets
    }

    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "display_name": display_name,
        });
        let auth: AuthResponse = self.send(self.http.post(self.url("/auth/register")).json(&body)).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let auth: AuthResponse = self.send(self.http.post(self.url("/auth/login")).json(&body)).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// Generic authenticated GET.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.http.get(self.url(path)).bearer_auth(self.token()?);
        self.send(request).await
    }

    /// Generic authenticated POST with a JSON body.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self
            .http
            .post(self.url(path))
            .bearer_auth(self.token()?)
            .json(body);
        self.send(request).await
    }

    /// Fetch the active session and make it the local baseline.
    pub async fn load_active_session(&mut self) -> Result<SessionDetail, ClientError> {
        let session: SessionDetail = self.get("/api/sessions/active").await?;
        self.sets.load_session(&session);
        Ok(session)
    }

    /// Log a set with an optimistic local update.
    ///
    /// The edit is visible in [`ApiClient::sets`] before the request is sent.
    /// On success the server's record replaces it; on any failure the local
    /// state is rolled back and the error returned.
    pub async fn log_set(
        &mut self,
        session_id: i64,
        key: SetKey,
        input: SetInput,
    ) -> Result<SetLog, ClientError> {
        input.validate(key.set_number)?;
        self.sets.apply(key, input);

        let result = match self.token() {
            Ok(token) => {
                let request = self
                    .http
                    .put(self.url(&format!(
                        "/api/sessions/{}/exercises/{}/sets/{}",
                        session_id, key.session_exercise_id, key.set_number
                    )))
                    .bearer_auth(token)
                    .json(&input);
                self.send::<SetLog>(request).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(saved) => {
                self.sets.reconcile(key, &saved);
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(
                    session_id,
                    session_exercise_id = key.session_exercise_id,
                    set_number = key.set_number,
                    status = ?e.status(),
                    error = %e,
                    "Set save failed, rolling back local edit"
                );
                self.sets.rollback(key);
                Err(e)
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::NotLoggedIn)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<ErrorResponse>(&text).unwrap_or(ErrorResponse {
            error: "http_error".to_string(),
            field: None,
            details: Some(text),
        });
        Err(ClientError::Api {
            status: status.as_u16(),
            body,
        })
    }
}
