// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session resolution middleware.
//!
//! Resolves the session for every request, attaches a [`SessionContext`] to
//! the request extensions and writes a renewed session cookie when the
//! resolver re-signed the token. This layer never rejects a request; gates
//! decide what an unauthenticated session may reach.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::Response,
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{SessionContext, SessionResolver};

// =============================================================================
// SessionLayer
// =============================================================================

/// Layer that resolves the session for each request.
#[derive(Clone)]
pub struct SessionLayer {
    resolver: Arc<SessionResolver>,
    skip_paths: Arc<HashSet<String>>,
}

impl SessionLayer {
    /// Creates a new session layer.
    pub fn new(resolver: Arc<SessionResolver>) -> Self {
        Self {
            resolver,
            skip_paths: Arc::new(HashSet::new()),
        }
    }

    /// Paths that get an anonymous context without touching the resolver.
    ///
    /// A trailing `*` matches by prefix.
    pub fn with_skip_paths(mut self, paths: Vec<String>) -> Self {
        self.skip_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Skips the health probes.
    pub fn with_default_skip_paths(self) -> Self {
        self.with_skip_paths(vec!["/health".to_string(), "/ready".to_string()])
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            resolver: self.resolver.clone(),
            skip_paths: self.skip_paths.clone(),
        }
    }
}

// =============================================================================
// SessionMiddleware
// =============================================================================

/// Middleware that resolves the session.
#[derive(Clone)]
pub struct SessionMiddleware<S> {
    inner: S,
    resolver: Arc<SessionResolver>,
    skip_paths: Arc<HashSet<String>>,
}

impl<S> SessionMiddleware<S> {
    fn is_skipped(&self, path: &str) -> bool {
        if self.skip_paths.contains(path) {
            return true;
        }

        self.skip_paths.iter().any(|skip| {
            skip.strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for SessionMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let resolver = self.resolver.clone();
        let skipped = self.is_skipped(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let request_id = Uuid::now_v7();
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            if skipped {
                let ctx = SessionContext::anonymous()
                    .with_request_id(request_id)
                    .with_client_ip(client_ip);
                req.extensions_mut().insert(ctx);
                return inner.call(req).await;
            }

            let resolved = resolver.resolve(req.headers()).await;
            tracing::trace!(
                request_id = %request_id,
                outcome = resolved.resolution.as_str(),
                "Session resolved"
            );

            let ctx = SessionContext::new(resolved.resolution)
                .with_request_id(request_id)
                .with_client_ip(client_ip);
            req.extensions_mut().insert(ctx);

            let mut response = inner.call(req).await?;

            if let Some(token) = resolved.refreshed_token {
                let cookie = resolver.cookie();
                let prefix = format!("{}=", cookie.name());
                let handler_set_cookie = response
                    .headers()
                    .get_all(header::SET_COOKIE)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .any(|v| v.starts_with(&prefix));

                if !handler_set_cookie {
                    if let Some(value) = cookie.issue(&token) {
                        response.headers_mut().append(header::SET_COOKIE, value);
                    }
                }
            }

            Ok(response)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
