// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Simple liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

// =============================================================================
// Readiness Check
// =============================================================================

/// GET /ready
///
/// Reports whether the identity store and the audit logger are usable.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.store().health_check().await;
    let audit_healthy = state.audit().health_check().await;

    let mut store = ComponentStatus::new("identity_store", store_healthy)
        .with_message(state.store().name());
    if !store_healthy {
        store = store.with_message("Identity store unavailable");
    }

    let mut audit = ComponentStatus::new("audit_logger", audit_healthy);
    if !audit_healthy {
        audit = audit.with_message("Audit logger unhealthy");
    }

    let ready = store_healthy && audit_healthy;
    let response = ReadinessResponse {
        ready,
        components: vec![store, audit],
    };

    if ready {
        (StatusCode::OK, Json(response))
    } else {
        tracing::warn!(store = store_healthy, audit = audit_healthy, "Service not ready");
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

// =============================================================================
// Tests
// =============================================================================
