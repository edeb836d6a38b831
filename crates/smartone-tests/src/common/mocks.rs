// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! [`FaultyStore`] wraps a [`MemoryIdentityStore`] and can be switched into
//! a state where every call fails as if the backing store went away.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use smartone_core::{
    IdentityStore, MemoryIdentityStore, Permission, PermissionId, Role, RoleId,
    RoleWithPermissions, StoreError, StoreResult, User, UserId, UserWithRole,
};

/// Message carried by every injected failure. Must never reach a client.
pub const FAULT_MESSAGE: &str = "connection refused: identity-db.internal:5432";

// =============================================================================
// FaultyStore
// =============================================================================

/// An identity store with a failure switch.
#[derive(Clone)]
pub struct FaultyStore {
    inner: MemoryIdentityStore,
    failing: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl FaultyStore {
    /// Wraps a store; calls pass through until [`fail`](Self::fail) is called.
    pub fn new(inner: MemoryIdentityStore) -> Self {
        Self {
            inner,
            failing: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A store that fails from the first call.
    pub fn always_failing() -> Self {
        let store = Self::new(MemoryIdentityStore::new());
        store.fail();
        store
    }

    /// Makes every subsequent call fail.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Lets calls through again.
    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    /// Number of store calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The wrapped store.
    pub fn inner(&self) -> &MemoryIdentityStore {
        &self.inner
    }

    fn check(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(FAULT_MESSAGE));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for FaultyStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check()?;
        self.inner.find_user_by_email(email).await
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.check()?;
        self.inner.find_user_by_id(id).await
    }

    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        self.check()?;
        self.inner.find_role(id).await
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        self.check()?;
        self.inner.find_role_by_name(name).await
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        self.check()?;
        self.inner.list_permissions().await
    }

    async fn role_permissions(&self, role_id: RoleId) -> StoreResult<Vec<Permission>> {
        self.check()?;
        self.inner.role_permissions(role_id).await
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleWithPermissions>> {
        self.check()?;
        self.inner.list_roles().await
    }

    async fn list_users_with_roles(&self) -> StoreResult<Vec<UserWithRole>> {
        self.check()?;
        self.inner.list_users_with_roles().await
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        self.check()?;
        self.inner.delete_user(id).await
    }

    async fn insert_user(&self, user: User) -> StoreResult<()> {
        self.check()?;
        self.inner.insert_user(user).await
    }

    async fn insert_role(&self, role: Role) -> StoreResult<()> {
        self.check()?;
        self.inner.insert_role(role).await
    }

    async fn insert_permission(&self, permission: Permission) -> StoreResult<()> {
        self.check()?;
        self.inner.insert_permission(permission).await
    }

    async fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()> {
        self.check()?;
        self.inner.grant_permission(role_id, permission_id).await
    }

    async fn revoke_permission(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<bool> {
        self.check()?;
        self.inner.revoke_permission(role_id, permission_id).await
    }

    fn name(&self) -> &str {
        "faulty"
    }

    async fn health_check(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }
}
