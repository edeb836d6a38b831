// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Claims assembly: Principal → Role → Permission set.

use smartone_core::{IdentityStore, StoreError, StoreResult, User};

use super::claims::{SessionClaims, SessionClaimsBuilder};

/// Joins a principal with its role and the role's current grants.
///
/// The result is unsigned and carries no issuer or lifetime yet; the token
/// manager stamps those when the token is issued.
pub async fn assemble_claims(
    store: &dyn IdentityStore,
    user: &User,
) -> StoreResult<SessionClaimsBuilder> {
    let role = store
        .find_role(user.role_id)
        .await?
        .ok_or_else(|| StoreError::unknown_role(user.role_id))?;

    let permissions = store.role_permissions(role.id).await?;

    tracing::debug!(
        user_id = %user.id,
        role = %role.name,
        permissions = permissions.len(),
        "Assembled session claims"
    );

    Ok(SessionClaims::builder(user.id, &role)
        .permissions(permissions.into_iter().map(|p| p.name))
        .name(&user.name)
        .email(&user.email))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smartone_core::{MemoryIdentityStore, Permission, Role};

    #[tokio::test]
    async fn test_assembles_full_grant_set() {
        let store = MemoryIdentityStore::new();
        let role = Role::new("Administrator").with_admin(true);
        let read = Permission::new("finance.read");
        let write = Permission::new("finance.write");
        let unrelated = Permission::new("press.manage");
        store.insert_role(role.clone()).await.unwrap();
        for p in [&read, &write, &unrelated] {
            store.insert_permission(p.clone()).await.unwrap();
        }
        store.grant_permission(role.id, write.id).await.unwrap();
        store.grant_permission(role.id, read.id).await.unwrap();

        let user = User::new("Admin", "admin@smartone-erp.com", role.id);
        store.insert_user(user.clone()).await.unwrap();

        let claims = assemble_claims(&store, &user).await.unwrap().build();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role_id, role.id);
        assert_eq!(claims.role_name, "Administrator");
        assert!(claims.is_admin);
        assert!(!claims.is_system);
        assert_eq!(claims.permissions, vec!["finance.read", "finance.write"]);
        assert_eq!(claims.email.as_deref(), Some("admin@smartone-erp.com"));
    }

    #[tokio::test]
    async fn test_role_without_grants() {
        let store = MemoryIdentityStore::new();
        let role = Role::new("Staff");
        store.insert_role(role.clone()).await.unwrap();
        let user = User::new("Kim", "kim@smartone-erp.com", role.id);
        store.insert_user(user.clone()).await.unwrap();

        let claims = assemble_claims(&store, &user).await.unwrap().build();
        assert!(claims.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_dangling_role() {
        let store = MemoryIdentityStore::new();
        let user = User::new("Ghost", "ghost@smartone-erp.com", smartone_core::RoleId::new());

        let err = assemble_claims(&store, &user).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownRole { .. }));
    }
}
