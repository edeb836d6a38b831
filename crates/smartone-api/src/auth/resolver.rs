// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session resolution.
//!
//! Turns the credential on an inbound request into a [`Resolution`]. A
//! request without a usable credential is a normal outcome, not an error.

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;
use smartone_core::IdentityStore;

use super::claims::SessionClaims;
use super::cookie::SessionCookie;
use super::jwt::SessionTokenManager;

// =============================================================================
// Resolution
// =============================================================================

/// Outcome of resolving the session for one request.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A valid session for an existing principal.
    Authenticated(Arc<SessionClaims>),
    /// No session, or one that no longer counts.
    Unauthenticated,
    /// The principal could not be checked because the store failed.
    StoreUnavailable,
}

impl Resolution {
    /// Returns the claims if authenticated.
    pub fn claims(&self) -> Option<&Arc<SessionClaims>> {
        match self {
            Resolution::Authenticated(claims) => Some(claims),
            _ => None,
        }
    }

    /// Returns `true` if authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Resolution::Authenticated(_))
    }

    /// Returns the outcome name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Authenticated(_) => "authenticated",
            Resolution::Unauthenticated => "unauthenticated",
            Resolution::StoreUnavailable => "store_unavailable",
        }
    }
}

/// A resolution plus the re-signed token, if the session was renewed.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    /// The outcome.
    pub resolution: Resolution,
    /// Replacement token to send back to the client.
    pub refreshed_token: Option<String>,
}

impl ResolvedSession {
    fn unauthenticated() -> Self {
        Self {
            resolution: Resolution::Unauthenticated,
            refreshed_token: None,
        }
    }
}

// =============================================================================
// SessionResolver
// =============================================================================

/// Resolves request credentials into session claims.
#[derive(Clone)]
pub struct SessionResolver {
    tokens: Arc<SessionTokenManager>,
    store: Arc<dyn IdentityStore>,
    cookie: SessionCookie,
    verify_principal: bool,
}

impl SessionResolver {
    /// Creates a resolver that checks the principal still exists.
    pub fn new(
        tokens: Arc<SessionTokenManager>,
        store: Arc<dyn IdentityStore>,
        cookie: SessionCookie,
    ) -> Self {
        Self {
            tokens,
            store,
            cookie,
            verify_principal: true,
        }
    }

    /// Enables or disables the principal existence check.
    pub fn with_principal_check(mut self, enabled: bool) -> Self {
        self.verify_principal = enabled;
        self
    }

    /// Returns the token manager.
    pub fn tokens(&self) -> &SessionTokenManager {
        &self.tokens
    }

    /// Returns the cookie helper.
    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    /// Resolves the session carried by the request headers.
    pub async fn resolve(&self, headers: &HeaderMap) -> ResolvedSession {
        match self.cookie.credential(headers) {
            Some((token, source)) => {
                tracing::trace!(source = ?source, "Session credential found");
                self.resolve_token(&token).await
            }
            None => ResolvedSession::unauthenticated(),
        }
    }

    /// Resolves a raw session token.
    pub async fn resolve_token(&self, token: &str) -> ResolvedSession {
        let claims = match self.tokens.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, kind = e.error_type(), "Session token rejected");
                return ResolvedSession::unauthenticated();
            }
        };

        if self.verify_principal {
            match self.store.find_user_by_id(claims.sub).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::info!(user_id = %claims.sub, "Session principal no longer exists");
                    return ResolvedSession::unauthenticated();
                }
                Err(e) => {
                    tracing::error!(
                        user_id = %claims.sub,
                        store = self.store.name(),
                        error = %e,
                        "Principal lookup failed"
                    );
                    return ResolvedSession {
                        resolution: Resolution::StoreUnavailable,
                        refreshed_token: None,
                    };
                }
            }
        }

        let now = Utc::now();
        if self.tokens.needs_refresh(&claims, now) {
            match self.tokens.refresh(&claims, now) {
                Ok(issued) => {
                    tracing::debug!(user_id = %claims.sub, "Session token renewed");
                    return ResolvedSession {
                        resolution: Resolution::Authenticated(Arc::new(issued.claims)),
                        refreshed_token: Some(issued.token),
                    };
                }
                Err(e) => {
                    tracing::warn!(user_id = %claims.sub, error = %e, "Failed to renew session token");
                }
            }
        }

        ResolvedSession {
            resolution: Resolution::Authenticated(Arc::new(claims)),
            refreshed_token: None,
        }
    }
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("tokens", &self.tokens)
            .field("store", &self.store.name())
            .field("cookie", &self.cookie.name())
            .field("verify_principal", &self.verify_principal)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
