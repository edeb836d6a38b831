// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Profile page handler.

use axum::{response::IntoResponse, Json};

use crate::extractors::Session;

/// GET /settings/profile
///
/// Data for the profile page shell. Redirect-gated; reaching the handler
/// means the session was admitted.
pub async fn profile(Session(claims): Session) -> impl IntoResponse {
    tracing::debug!(user_id = %claims.sub, "Profile requested");
    Json(claims.user())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use smartone_core::{Role, UserId};

    use crate::auth::SessionClaims;

    #[tokio::test]
    async fn test_profile_returns_session_user() {
        let claims = SessionClaims::builder(UserId::new(), &Role::new("Administrator"))
            .name("Admin")
            .email("admin@smartone-erp.com")
            .build();
        let response = profile(Session(Arc::new(claims))).await.into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["roleName"], "Administrator");
        assert_eq!(body["email"], "admin@smartone-erp.com");
    }
}
