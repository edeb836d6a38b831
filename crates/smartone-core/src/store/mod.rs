// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity store abstraction.
//!
//! The [`IdentityStore`] trait is the only way the rest of the system reaches
//! users, roles and permissions. Two implementations ship with the crate:
//!
//! - [`MemoryIdentityStore`]: a directory behind a single `RwLock`
//! - [`FileIdentityStore`]: the same directory, persisted as a JSON snapshot
//!
//! # Ordering guarantees
//!
//! - [`IdentityStore::list_permissions`] and [`IdentityStore::role_permissions`]
//!   return permissions in ascending name order.
//! - [`IdentityStore::list_roles`] returns roles in ascending name order.
//! - [`IdentityStore::list_users_with_roles`] returns users ordered by name, then email.

mod directory;
mod file;
mod memory;

pub use directory::{Directory, Snapshot};
pub use file::FileIdentityStore;
pub use memory::MemoryIdentityStore;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{
    Permission, PermissionId, Role, RoleId, RoleWithPermissions, User, UserId, UserWithRole,
};

// =============================================================================
// Core Trait
// =============================================================================

/// Read and write access to the identity directory.
///
/// Every read method observes one consistent view of the directory.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Looks up a user by email, case-insensitively.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Looks up a user by id.
    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Looks up a role by id.
    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>>;

    /// Looks up a role by its exact name.
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    /// Lists every permission in ascending name order.
    async fn list_permissions(&self) -> StoreResult<Vec<Permission>>;

    /// Lists the permissions granted to a role in ascending name order.
    ///
    /// An unknown role yields an empty list.
    async fn role_permissions(&self, role_id: RoleId) -> StoreResult<Vec<Permission>>;

    /// Lists every role with its granted permissions.
    async fn list_roles(&self) -> StoreResult<Vec<RoleWithPermissions>>;

    /// Lists every user joined with its role.
    async fn list_users_with_roles(&self) -> StoreResult<Vec<UserWithRole>>;

    /// Deletes a user. Returns `false` when no such user exists.
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;

    /// Inserts a user.
    ///
    /// Fails with `Duplicate` when the email is taken and with `UnknownRole`
    /// when the role id is not in the directory.
    async fn insert_user(&self, user: User) -> StoreResult<()>;

    /// Inserts a role. Role names are unique.
    async fn insert_role(&self, role: Role) -> StoreResult<()>;

    /// Inserts a permission. Permission names are unique.
    async fn insert_permission(&self, permission: Permission) -> StoreResult<()>;

    /// Grants a permission to a role. Granting twice is a no-op.
    async fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()>;

    /// Revokes a permission from a role. Returns `false` if it was not granted.
    async fn revoke_permission(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<bool>;

    /// Returns the store name for identification.
    fn name(&self) -> &str {
        "identity_store"
    }

    /// Returns `true` if the store can serve requests.
    async fn health_check(&self) -> bool {
        true
    }
}
