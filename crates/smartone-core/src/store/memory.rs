// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory identity store.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::directory::Directory;
use super::IdentityStore;
use crate::error::StoreResult;
use crate::types::{
    Permission, PermissionId, Role, RoleId, RoleWithPermissions, User, UserId, UserWithRole,
};

// =============================================================================
// Memory Identity Store
// =============================================================================

/// Identity store that keeps the whole directory in memory.
///
/// Cloning is cheap and every clone sees the same directory. Each trait method
/// takes the lock exactly once and never holds it across an `.await`.
///
/// # Example
///
/// ```rust,ignore
/// use smartone_core::store::{IdentityStore, MemoryIdentityStore};
/// use smartone_core::types::{Permission, Role};
///
/// let store = MemoryIdentityStore::new();
/// store.insert_role(Role::new("Administrator")).await?;
/// store.insert_permission(Permission::new("finance.read")).await?;
/// assert_eq!(store.list_permissions().await?.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    directory: Arc<RwLock<Directory>>,
}

impl MemoryIdentityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store over an existing directory.
    pub fn from_directory(directory: Directory) -> Self {
        Self {
            directory: Arc::new(RwLock::new(directory)),
        }
    }

    /// Returns a copy of the current directory.
    pub fn directory(&self) -> Directory {
        self.directory.read().clone()
    }

    /// Runs `f` against the directory under a read guard.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Directory) -> R) -> R {
        f(&self.directory.read())
    }

    /// Swaps in a new directory.
    pub(crate) fn replace(&self, directory: Directory) {
        *self.directory.write() = directory;
    }

    /// Runs `f` against the directory under a write guard.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Directory) -> R) -> R {
        f(&mut self.directory.write())
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.read(|d| d.user_by_email(email)))
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read(|d| d.user_by_id(id)))
    }

    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        Ok(self.read(|d| d.role(id)))
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(self.read(|d| d.role_by_name(name)))
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        Ok(self.read(|d| d.permissions()))
    }

    async fn role_permissions(&self, role_id: RoleId) -> StoreResult<Vec<Permission>> {
        Ok(self.read(|d| d.role_permissions(role_id)))
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleWithPermissions>> {
        Ok(self.read(|d| d.roles()))
    }

    async fn list_users_with_roles(&self) -> StoreResult<Vec<UserWithRole>> {
        Ok(self.read(|d| d.users_with_roles()))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.write(|d| d.delete_user(id)))
    }

    async fn insert_user(&self, user: User) -> StoreResult<()> {
        self.write(|d| d.insert_user(user))
    }

    async fn insert_role(&self, role: Role) -> StoreResult<()> {
        self.write(|d| d.insert_role(role))
    }

    async fn insert_permission(&self, permission: Permission) -> StoreResult<()> {
        self.write(|d| d.insert_permission(permission))
    }

    async fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()> {
        self.write(|d| d.grant(role_id, permission_id))
    }

    async fn revoke_permission(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<bool> {
        Ok(self.write(|d| d.revoke(role_id, permission_id)))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryIdentityStore, Role) {
        let store = MemoryIdentityStore::new();
        let role = Role::new("System Administrator").with_admin(true).with_system(true);
        store.insert_role(role.clone()).await.unwrap();
        for name in ["users.manage", "finance.read", "orders.read"] {
            let permission = Permission::new(name);
            store.insert_permission(permission.clone()).await.unwrap();
            store.grant_permission(role.id, permission.id).await.unwrap();
        }
        (store, role)
    }

    #[tokio::test]
    async fn test_list_permissions_sorted_and_stable() {
        let (store, _) = seeded().await;

        let first = store.list_permissions().await.unwrap();
        let second = store.list_permissions().await.unwrap();

        let names: Vec<&str> = first.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["finance.read", "orders.read", "users.manage"]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_find_user_by_email_case_insensitive() {
        let (store, role) = seeded().await;
        store
            .insert_user(User::new("Admin", "admin@smartone-erp.com", role.id))
            .await
            .unwrap();

        let found = store.find_user_by_email("Admin@SmartOne-ERP.com").await.unwrap();
        assert_eq!(found.unwrap().name, "Admin");
        assert!(store.find_user_by_email("nobody@smartone-erp.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_permission() {
        let (store, role) = seeded().await;
        let finance = store
            .list_permissions()
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.name == "finance.read")
            .unwrap();

        assert!(store.revoke_permission(role.id, finance.id).await.unwrap());
        assert!(!store.revoke_permission(role.id, finance.id).await.unwrap());
        assert_eq!(store.role_permissions(role.id).await.unwrap().len(), 2);
        // The permission itself stays in the catalogue.
        assert_eq!(store.list_permissions().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_clones_share_directory() {
        let (store, role) = seeded().await;
        let other = store.clone();
        other
            .insert_user(User::new("Staff", "staff@smartone-erp.com", role.id))
            .await
            .unwrap();
        assert_eq!(store.list_users_with_roles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_roles_includes_permission_names() {
        let (store, _) = seeded().await;
        store.insert_role(Role::new("Administrator").with_admin(true)).await.unwrap();

        let roles = store.list_roles().await.unwrap();
        assert_eq!(roles[0].role.name, "Administrator");
        assert!(roles[0].permissions.is_empty());
        assert_eq!(
            roles[1].permission_names(),
            vec!["finance.read", "orders.read", "users.manage"]
        );
    }
}
