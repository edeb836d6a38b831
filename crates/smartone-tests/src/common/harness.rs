// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! [`TestApp`] builds the production router over a chosen store and
//! configuration and drives it in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use smartone_api::{ApiServer, ApiServerBuilder};
use smartone_config::SmartOneConfig;
use smartone_core::audit::{AuditAction, AuditLog, InMemoryAuditLogger};
use smartone_core::IdentityStore;

use super::assertions::set_cookie_value;
use super::builders::ConfigBuilder;
use super::fixtures::DirectoryFixtures;

// =============================================================================
// TestApp
// =============================================================================

/// The full application router plus handles on its collaborators.
pub struct TestApp {
    server: ApiServer,
    router: Router,
    store: Arc<dyn IdentityStore>,
    audit: Arc<InMemoryAuditLogger>,
}

impl TestApp {
    /// The standard directory behind the default test configuration.
    pub async fn standard() -> Self {
        let store = DirectoryFixtures::standard().build().await;
        Self::new(ConfigBuilder::new().build(), Arc::new(store))
    }

    /// Builds the app over an existing store.
    pub fn new(config: SmartOneConfig, store: Arc<dyn IdentityStore>) -> Self {
        super::init_test_logging();

        let audit = Arc::new(InMemoryAuditLogger::new());
        let server = ApiServerBuilder::new()
            .config(config)
            .store(store.clone())
            .audit_logger(audit.clone())
            .build()
            .expect("Failed to build API server");
        let router = server.router();

        Self {
            server,
            router,
            store,
            audit,
        }
    }

    /// The server under test.
    pub fn server(&self) -> &ApiServer {
        &self.server
    }

    /// The identity store behind the app.
    pub fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    /// The audit log the app writes to.
    pub fn audit(&self) -> &InMemoryAuditLogger {
        &self.audit
    }

    /// The configured session cookie name.
    pub fn cookie_name(&self) -> &str {
        &self.server.state().config.session.cookie_name
    }

    /// Sends one request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    /// `GET uri`, carrying `token` in the session cookie when given.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("{}={}", self.cookie_name(), token));
        }
        self.request(builder.body(Body::empty()).expect("Invalid request"))
            .await
    }

    /// `GET uri` with the token as a bearer credential.
    pub async fn get_bearer(&self, uri: &str, token: &str) -> Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("Invalid request");
        self.request(request).await
    }

    /// `POST uri` with a JSON body and an optional session cookie.
    pub async fn post_json(&self, uri: &str, body: serde_json::Value, token: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("{}={}", self.cookie_name(), token));
        }
        self.request(builder.body(Body::from(body.to_string())).expect("Invalid request"))
            .await
    }

    /// Posts credentials to the login endpoint.
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_json(
            "/api/auth/login",
            serde_json::json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    /// Logs in and returns the session token. Panics if login fails.
    pub async fn sign_in(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert!(
            response.status().is_success(),
            "login for {email} failed with {}",
            response.status()
        );
        set_cookie_value(&response, self.cookie_name()).expect("Login did not set the session cookie")
    }

    /// Waits until `count` audit entries with `action` were written.
    ///
    /// Handlers write audit entries on a spawned task, so they can land
    /// after the response.
    pub async fn audit_entries(&self, action: AuditAction, count: usize) -> Vec<AuditLog> {
        for _ in 0..100 {
            let entries = self.audit.entries_for_action(action);
            if entries.len() >= count {
                return entries;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.audit.entries_for_action(action)
    }
}
