// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Settings handlers.
//!
//! These routes sit behind the role gate; the handlers assume an admitted
//! session and only read the store.

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::ApiResult;
use crate::response::{RoleResponse, UserResponse};
use crate::state::AppState;

/// GET /api/permissions
///
/// Lists every permission, ascending by name.
pub async fn list_permissions(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let permissions = state.store().list_permissions().await?;
    tracing::debug!(count = permissions.len(), "Listed permissions");
    Ok(Json(permissions))
}

/// GET /api/roles
pub async fn list_roles(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let roles: Vec<RoleResponse> = state
        .store()
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();
    Ok(Json(roles))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users: Vec<UserResponse> = state
        .store()
        .list_users_with_roles()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(users))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::to_bytes;
    use smartone_config::{SecretValue, SmartOneConfig};
    use smartone_core::{IdentityStore, MemoryIdentityStore, Permission, Role, User};

    async fn state() -> AppState {
        let store = MemoryIdentityStore::new();
        let role = Role::new("Administrator").with_admin(true);
        store.insert_role(role.clone()).await.unwrap();
        for name in ["users.write", "finance.read", "users.read"] {
            let permission = Permission::new(name);
            store.insert_permission(permission.clone()).await.unwrap();
            store.grant_permission(role.id, permission.id).await.unwrap();
        }
        store
            .insert_user(User::new("Admin", "admin@smartone-erp.com", role.id))
            .await
            .unwrap();

        let mut config = SmartOneConfig::default();
        config.session.secret = Some(SecretValue::new("settings-test-secret-long-enough-00"));
        AppState::builder()
            .config(config)
            .store(Arc::new(store))
            .build()
            .unwrap()
    }

    async fn json(response: impl IntoResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_permissions_sorted_and_idempotent() {
        let state = state().await;
        let first = json(list_permissions(State(state.clone())).await.unwrap()).await;
        let second = json(list_permissions(State(state)).await.unwrap()).await;

        let names: Vec<&str> = first
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["finance.read", "users.read", "users.write"]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_roles_and_users() {
        let state = state().await;
        let roles = json(list_roles(State(state.clone())).await.unwrap()).await;
        assert_eq!(roles[0]["name"], "Administrator");
        assert_eq!(roles[0]["permissions"].as_array().unwrap().len(), 3);

        let users = json(list_users(State(state)).await.unwrap()).await;
        assert_eq!(users[0]["email"], "admin@smartone-erp.com");
        assert_eq!(users[0]["roleName"], "Administrator");
    }
}
