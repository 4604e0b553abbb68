// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration and login routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, JsonBody, Result};
use crate::middleware::auth::{create_jwt, AUTH_COOKIE, TOKEN_TTL_SECS};
use crate::models::User;
use crate::services::{hash_password, verify_password};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters"))]
    pub display_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            created_at: format_utc_rfc3339(user.created_at),
        }
    }
}

/// Returned by register and login. The token is also set as a cookie.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Build the auth cookie. Marked `Secure` unless the frontend is plain HTTP.
fn auth_cookie(state: &AppState, value: String) -> Cookie<'static> {
    let secure = state.config.frontend_url.starts_with("https://");
    Cookie::build((AUTH_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(TOKEN_TTL_SECS as i64))
        .build()
}

fn issue_session(state: &AppState, jar: CookieJar, user: User) -> Result<(CookieJar, AuthResponse)> {
    let token = create_jwt(user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
    let jar = jar.add(auth_cookie(state, token.clone()));
    Ok((
        jar,
        AuthResponse {
            user: user.into(),
            token,
        },
    ))
}

/// Create an account and log it in.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(body), _): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    body.validate()?;

    let password_hash = hash_password(&body.password)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?;
    let user = state
        .db
        .create_user(&body.email, &body.display_name, &password_hash)
        .await?;

    tracing::info!(user_id = user.id, "Registered new account");

    let (jar, response) = issue_session(&state, jar, user)?;
    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// Exchange email and password for a session token.
///
/// Unknown email and wrong password produce the same response.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(body), _): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    body.validate()?;

    let Some(user) = state.db.get_user_by_email(&body.email).await? else {
        tracing::debug!("Login for unknown email");
        return Err(AppError::Unauthorized);
    };

    let valid = verify_password(&body.password, &user.password_hash).map_err(|e| {
        AppError::Internal(anyhow::anyhow!(
            "Stored password hash for user {} unusable: {}",
            user.id,
            e
        ))
    })?;
    if !valid {
        tracing::info!(user_id = user.id, "Login with wrong password");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(user_id = user.id, "User logged in");
    let (jar, response) = issue_session(&state, jar, user)?;
    Ok((jar, Json(response)))
}

/// Clear the auth cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let jar = jar.remove(auth_cookie(&state, String::new()));
    (StatusCode::NO_CONTENT, jar)
}
