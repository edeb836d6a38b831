// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::auth::{Resolution, SessionClaims, SessionContext};
use crate::error::ApiError;

fn context(parts: &Parts) -> SessionContext {
    parts
        .extensions
        .get::<SessionContext>()
        .cloned()
        .unwrap_or_default()
}

// =============================================================================
// Session Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Returns 401 without a session and a generic 500 when the session could
/// not be verified.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Session(claims): Session) -> impl IntoResponse {
///     format!("Hello, {}", claims.role_name)
/// }
/// ```
pub struct Session(pub Arc<SessionClaims>);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match context(parts).resolution {
            Resolution::Authenticated(claims) => Ok(Session(claims)),
            Resolution::Unauthenticated => Err(ApiError::unauthorized("No active session")),
            Resolution::StoreUnavailable => {
                Err(ApiError::store_unavailable("Session could not be verified"))
            }
        }
    }
}

// =============================================================================
// Optional Session Extractor
// =============================================================================

/// Extractor for optionally authenticated requests.
///
/// `None` means there is no session. A store failure is still an error.
pub struct OptionalSession(pub Option<Arc<SessionClaims>>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match context(parts).resolution {
            Resolution::Authenticated(claims) => Ok(OptionalSession(Some(claims))),
            Resolution::Unauthenticated => Ok(OptionalSession(None)),
            Resolution::StoreUnavailable => {
                Err(ApiError::store_unavailable("Session could not be verified"))
            }
        }
    }
}

// =============================================================================
// Context Extractor
// =============================================================================

/// Extractor for the whole session context.
pub struct RequestContext(pub SessionContext);

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext(context(parts)))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads with API-shaped rejections.
pub struct ValidatedJson<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Client IP Extractor
// =============================================================================

/// Extractor for the client IP address.
pub struct ClientIp(pub Option<std::net::IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse().ok());

        if let Some(ip) = forwarded {
            return Ok(ClientIp(Some(ip)));
        }

        let real_ip = parts
            .headers
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        if let Some(ip) = real_ip {
            return Ok(ClientIp(Some(ip)));
        }

        Ok(ClientIp(
            parts
                .extensions
                .get::<SessionContext>()
                .and_then(|ctx| ctx.client_ip),
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
