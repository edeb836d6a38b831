// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role gate middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use smartone_config::PagesConfig;
use smartone_core::audit::{AuditLog, AuditLogger};
use tower::{Layer, Service};

use crate::auth::{GateDecision, RoleSet, SessionContext};
use crate::error::ApiError;

// =============================================================================
// GateMode
// =============================================================================

/// How a gate turns a failed check into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateMode {
    /// JSON 401/403 for API routes.
    Deny,
    /// 303 redirects for page routes.
    Redirect {
        /// Sign-in page; receives `callbackUrl`.
        sign_in: String,
        /// Not-authorized page.
        unauthorized: String,
    },
}

impl GateMode {
    /// Redirect mode using the configured pages.
    pub fn redirect(pages: &PagesConfig) -> Self {
        GateMode::Redirect {
            sign_in: pages.sign_in.clone(),
            unauthorized: pages.unauthorized.clone(),
        }
    }
}

// =============================================================================
// RoleGateLayer
// =============================================================================

/// Layer that admits only sessions whose role is in a [`RoleSet`].
#[derive(Clone)]
pub struct RoleGateLayer {
    roles: Arc<RoleSet>,
    mode: Arc<GateMode>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
}

impl RoleGateLayer {
    /// Creates a gate that answers with JSON errors.
    pub fn deny(roles: RoleSet) -> Self {
        Self {
            roles: Arc::new(roles),
            mode: Arc::new(GateMode::Deny),
            audit_logger: None,
        }
    }

    /// Creates a gate that redirects to the given pages.
    pub fn redirect(roles: RoleSet, pages: &PagesConfig) -> Self {
        Self {
            roles: Arc::new(roles),
            mode: Arc::new(GateMode::redirect(pages)),
            audit_logger: None,
        }
    }

    /// Records forbidden requests with the given audit logger.
    pub fn with_audit(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(logger);
        self
    }
}

impl<S> Layer<S> for RoleGateLayer {
    type Service = RoleGateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleGateMiddleware {
            inner,
            roles: self.roles.clone(),
            mode: self.mode.clone(),
            audit_logger: self.audit_logger.clone(),
        }
    }
}

// =============================================================================
// RoleGateMiddleware
// =============================================================================

/// Middleware enforcing a role gate.
#[derive(Clone)]
pub struct RoleGateMiddleware<S> {
    inner: S,
    roles: Arc<RoleSet>,
    mode: Arc<GateMode>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
}

impl<S> Service<Request<Body>> for RoleGateMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let roles = self.roles.clone();
        let mode = self.mode.clone();
        let audit_logger = self.audit_logger.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ctx = req
                .extensions()
                .get::<SessionContext>()
                .cloned()
                .unwrap_or_default();
            let path = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.uri().path().to_string());

            match ctx.require_role(&roles) {
                GateDecision::Authorized(_) => inner.call(req).await,
                GateDecision::Unauthenticated => {
                    tracing::debug!(path = %path, "No session, gate closed");
                    Ok(match mode.as_ref() {
                        GateMode::Deny => ApiError::unauthorized("No active session").into_response(),
                        GateMode::Redirect { sign_in, .. } => {
                            see_other(&format!("{}?callbackUrl={}", sign_in, urlencoding::encode(&path)))
                        }
                    })
                }
                GateDecision::Forbidden(claims) => {
                    tracing::warn!(
                        user_id = %claims.sub,
                        role = %claims.role_name,
                        required_roles = %roles,
                        path = %path,
                        "Role not permitted"
                    );

                    if let Some(logger) = audit_logger {
                        let entry = AuditLog::access_denied(
                            claims.sub.to_string(),
                            req.uri().path(),
                            ctx.client_ip,
                            claims.role_name.clone(),
                        )
                        .with_request_id(ctx.request_id.to_string());
                        tokio::spawn(async move {
                            if let Err(e) = logger.log(entry).await {
                                tracing::warn!(error = %e, "Failed to audit denied access");
                            }
                        });
                    }

                    Ok(match mode.as_ref() {
                        GateMode::Deny => ApiError::forbidden(format!(
                            "Role '{}' is not permitted",
                            claims.role_name
                        ))
                        .into_response(),
                        GateMode::Redirect { unauthorized, .. } => see_other(unauthorized),
                    })
                }
                GateDecision::StoreUnavailable => {
                    Ok(ApiError::store_unavailable("Session could not be verified").into_response())
                }
            }
        })
    }
}

fn see_other(location: &str) -> Response {
    match header::HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = StatusCode::SEE_OTHER.into_response();
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => ApiError::internal(format!("Invalid redirect location: {}", location)).into_response(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use smartone_core::audit::{AuditAction, InMemoryAuditLogger};
    use smartone_core::{Role, UserId};
    use tower::ServiceExt;

    use crate::auth::{Resolution, SessionClaims};

    fn mock_service() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Future<Output = Result<Response, Infallible>> + Send,
    > + Clone
           + Send {
        tower::service_fn(|_req| async { Ok::<_, Infallible>(Response::new(Body::empty())) })
    }

    fn admins() -> RoleSet {
        RoleSet::new(["System Administrator", "Administrator"]).unwrap()
    }

    fn request(uri: &str, ctx: Option<SessionContext>) -> Request<Body> {
        let mut req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req
    }

    fn session(role: &str) -> SessionContext {
        SessionContext::authenticated(SessionClaims::builder(UserId::new(), &Role::new(role)).build())
    }

    #[tokio::test]
    async fn test_authorized_role_passes() {
        let service = RoleGateLayer::deny(admins()).layer(mock_service());
        let response = service
            .oneshot(request("/api/permissions", Some(session("Administrator"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_deny_mode_statuses() {
        let service = RoleGateLayer::deny(admins()).layer(mock_service());

        let response = service
            .clone()
            .oneshot(request("/api/permissions", Some(session("Staff"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = service.oneshot(request("/api/permissions", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_redirect_mode() {
        let pages = PagesConfig::default();
        let service = RoleGateLayer::redirect(admins(), &pages).layer(mock_service());

        let response = service
            .clone()
            .oneshot(request("/settings/profile?tab=security", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/signin?callbackUrl=%2Fsettings%2Fprofile%3Ftab%3Dsecurity"
        );

        let response = service
            .oneshot(request("/settings/profile", Some(session("Staff"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/unauthorized");
    }

    #[tokio::test]
    async fn test_store_unavailable_is_500() {
        let service = RoleGateLayer::deny(admins()).layer(mock_service());
        let ctx = SessionContext::new(Resolution::StoreUnavailable);

        let response = service.oneshot(request("/api/users", Some(ctx))).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_forbidden_is_audited() {
        let logger = Arc::new(InMemoryAuditLogger::new());
        let service = RoleGateLayer::deny(admins())
            .with_audit(logger.clone())
            .layer(mock_service());

        let response = service
            .oneshot(request("/api/users", Some(session("Staff"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        for _ in 0..50 {
            if !logger.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        let entries = logger.entries_for_action(AuditAction::AccessDenied);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].details["role"], "Staff");
    }
}
