// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Deserialize;
use smartone_core::audit::{AuditLog, AuditLogger};
use smartone_core::password::check_credentials;

use crate::auth::assemble_claims;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ClientIp, OptionalSession, RequestContext, ValidatedJson};
use crate::response::LogoutResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn record(logger: &Arc<dyn AuditLogger>, entry: AuditLog) {
    let logger = logger.clone();
    tokio::spawn(async move {
        if let Err(e) = logger.log(entry).await {
            tracing::warn!(error = %e, "Failed to write audit entry");
        }
    });
}

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address, matched case-insensitively.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/auth/login
///
/// Verifies the credentials, issues a session token and sets the session
/// cookie. Returns the session view.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state.store().find_user_by_email(&request.email).await?;

    // Unknown accounts still pay for one verification.
    let stored = user.as_ref().and_then(|u| u.password_hash.clone());
    let verified = match check_credentials(stored, request.password).await {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!(error = %e, "Password verification failed");
            false
        }
    };

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::info!(email = %request.email, "Login rejected");
            record(
                state.audit(),
                AuditLog::login_failed(request.email.trim(), client_ip, INVALID_CREDENTIALS),
            );
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let builder = assemble_claims(state.store(), &user).await?;
    let issued = state.tokens.issue(builder)?;
    let cookie = state
        .cookie()
        .issue(&issued.token)
        .ok_or_else(|| ApiError::internal("Session token is not a valid cookie value"))?;

    record(state.audit(), AuditLog::login(user.id.to_string(), client_ip));
    tracing::info!(user_id = %user.id, role = %issued.claims.role_name, "User logged in");

    Ok(([(header::SET_COOKIE, cookie)], Json(issued.claims.view())))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/auth/logout
///
/// Expires the session cookie. The token itself stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
) -> ApiResult<impl IntoResponse> {
    if let Some(claims) = ctx.claims() {
        record(state.audit(), AuditLog::logout(claims.sub.to_string(), ctx.client_ip));
        tracing::info!(user_id = %claims.sub, "User logged out");
    }

    let cookie = state
        .cookie()
        .expire()
        .ok_or_else(|| ApiError::internal("Cookie name is not a valid header value"))?;

    Ok(([(header::SET_COOKIE, cookie)], Json(LogoutResponse { success: true })))
}

// =============================================================================
// Session
// =============================================================================

/// GET /api/auth/session
///
/// Returns the current session view, or `null` without a session.
pub async fn session(OptionalSession(claims): OptionalSession) -> impl IntoResponse {
    Json(claims.map(|c| c.view()))
}

// =============================================================================
// Tests
// =============================================================================
