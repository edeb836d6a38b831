// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use smartone_config::{CorsConfig, SmartOneConfig};
use smartone_core::audit::AuditLogger;
use smartone_core::IdentityStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{RoleGateLayer, SessionLayer};
use crate::state::{AppState, AppStateBuilder};

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
    config: Arc<SmartOneConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let allowed_roles = self.state.allowed_roles.as_ref().clone();

        let settings_api = Router::new()
            .route("/api/permissions", get(handlers::list_permissions))
            .route("/api/roles", get(handlers::list_roles))
            .route("/api/users", get(handlers::list_users))
            .route_layer(
                RoleGateLayer::deny(allowed_roles.clone()).with_audit(self.state.audit_logger.clone()),
            );

        let settings_pages = Router::new()
            .route("/settings/profile", get(handlers::profile))
            .route_layer(
                RoleGateLayer::redirect(allowed_roles, &self.config.session.pages)
                    .with_audit(self.state.audit_logger.clone()),
            );

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.server.request_timeout(),
            ))
            .layer(create_cors_layer(&self.config.server.cors))
            .layer(SessionLayer::new(self.state.resolver.clone()).with_default_skip_paths());

        Router::new()
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .route("/api/auth/login", post(handlers::login))
            .route("/api/auth/logout", post(handlers::logout))
            .route("/api/auth/session", get(handlers::session))
            .merge(settings_api)
            .merge(settings_pages)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.addr();
        let router = self.router();

        info!(
            addr = %addr,
            store = self.state.store.name(),
            allowed_roles = %self.state.allowed_roles,
            "Starting API server"
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.server.socket_addr()
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// No origins means no CORS headers. A wildcard never carries credentials.
fn create_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if cors.allowed_origins.is_empty() {
        return layer;
    }

    if cors.allowed_origins.iter().any(|o| o == "*") {
        if cors.allow_credentials {
            tracing::warn!("CORS credentials are ignored with a wildcard origin");
        }
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(cors.allow_credentials)
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
#[derive(Default)]
pub struct ApiServerBuilder {
    state_builder: AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: SmartOneConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the identity store.
    pub fn store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.state_builder = self.state_builder.store(store);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.state_builder = self.state_builder.audit_logger(logger);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use smartone_config::SecretValue;
    use tower::ServiceExt;

    fn test_config() -> SmartOneConfig {
        let mut config = SmartOneConfig::default();
        config.session.secret = Some(SecretValue::new("server-test-secret-key-long-enough-0"));
        config
    }

    #[test]
    fn test_server_builder() {
        let server = ApiServerBuilder::new().config(test_config()).build().unwrap();
        assert_eq!(server.addr().port(), 3000);
    }

    #[tokio::test]
    async fn test_health_route() {
        let server = ApiServerBuilder::new().config(test_config()).build().unwrap();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gated_routes_without_session() {
        let server = ApiServerBuilder::new().config(test_config()).build().unwrap();
        let router = server.router();

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/api/permissions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(Request::builder().uri("/settings/profile").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/signin?callbackUrl=%2Fsettings%2Fprofile"
        );
    }

    #[test]
    fn test_cors_layer_variants() {
        let _ = create_cors_layer(&CorsConfig::default());
        let _ = create_cors_layer(&CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
        });
        let _ = create_cors_layer(&CorsConfig {
            allowed_origins: vec!["https://erp.smartone.example".to_string()],
            allow_credentials: true,
        });
    }
}
