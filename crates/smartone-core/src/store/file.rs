// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! File-backed identity store.
//!
//! The directory lives in memory and every successful mutation rewrites a JSON
//! snapshot. A mutation is applied to a copy of the directory, the copy is
//! written on the blocking pool, and only then does it replace the live
//! directory. Writes go to a sibling temp file which is then renamed over the
//! snapshot, so readers of the file never see a partial write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::directory::{Directory, Snapshot};
use super::memory::MemoryIdentityStore;
use super::IdentityStore;
use crate::error::{StoreError, StoreResult};
use crate::types::{
    Permission, PermissionId, Role, RoleId, RoleWithPermissions, User, UserId, UserWithRole,
};

// =============================================================================
// File Identity Store
// =============================================================================

/// Identity store persisted to a JSON snapshot file.
#[derive(Debug)]
pub struct FileIdentityStore {
    path: PathBuf,
    memory: MemoryIdentityStore,
    /// Serializes mutate-then-persist so snapshots land in mutation order.
    persist_lock: Mutex<()>,
}

impl FileIdentityStore {
    /// Opens the store at `path`.
    ///
    /// A missing file yields an empty directory; the file is created on the
    /// first mutation.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let directory = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            let snapshot: Snapshot = serde_json::from_str(&content)
                .map_err(|e| StoreError::corrupted(format!("{}: {}", path.display(), e)))?;
            Directory::from_snapshot(snapshot)?
        } else {
            tracing::info!(path = %path.display(), "Identity snapshot not found, starting empty");
            Directory::new()
        };

        tracing::debug!(
            path = %path.display(),
            users = directory.user_count(),
            "Identity store opened"
        );

        Ok(Self {
            path,
            memory: MemoryIdentityStore::from_directory(directory),
            persist_lock: Mutex::new(()),
        })
    }

    /// Returns the snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies a mutation and persists the result.
    ///
    /// The live directory changes only after the snapshot is on disk. When the
    /// mutation or the write fails, memory and file keep the previous state.
    async fn mutate<R, F>(&self, f: F) -> StoreResult<R>
    where
        R: Send,
        F: FnOnce(&mut Directory) -> StoreResult<R> + Send,
    {
        let _guard = self.persist_lock.lock().await;

        let mut next = self.memory.directory();
        let result = f(&mut next)?;
        let snapshot = next.to_snapshot();

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_snapshot(&path, &snapshot))
            .await
            .map_err(|e| StoreError::unavailable(format!("Snapshot task failed: {}", e)))??;

        self.memory.replace(next);
        Ok(result)
    }
}

/// Writes `snapshot` to `path` through a temp file and a rename.
fn write_snapshot(path: &Path, snapshot: &Snapshot) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }

    let json =
        serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::corrupted(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(&json).map_err(|e| StoreError::io(&tmp, e))?;
        file.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;

    tracing::trace!(path = %path.display(), bytes = json.len(), "Identity snapshot written");
    Ok(())
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.memory.find_user_by_email(email).await
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.memory.find_user_by_id(id).await
    }

    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        self.memory.find_role(id).await
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        self.memory.find_role_by_name(name).await
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        self.memory.list_permissions().await
    }

    async fn role_permissions(&self, role_id: RoleId) -> StoreResult<Vec<Permission>> {
        self.memory.role_permissions(role_id).await
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleWithPermissions>> {
        self.memory.list_roles().await
    }

    async fn list_users_with_roles(&self) -> StoreResult<Vec<UserWithRole>> {
        self.memory.list_users_with_roles().await
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        self.mutate(|d| Ok(d.delete_user(id))).await
    }

    async fn insert_user(&self, user: User) -> StoreResult<()> {
        self.mutate(|d| d.insert_user(user)).await
    }

    async fn insert_role(&self, role: Role) -> StoreResult<()> {
        self.mutate(|d| d.insert_role(role)).await
    }

    async fn insert_permission(&self, permission: Permission) -> StoreResult<()> {
        self.mutate(|d| d.insert_permission(permission)).await
    }

    async fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()> {
        self.mutate(|d| d.grant(role_id, permission_id)).await
    }

    async fn revoke_permission(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<bool> {
        self.mutate(|d| Ok(d.revoke(role_id, permission_id))).await
    }

    fn name(&self) -> &str {
        "file"
    }

    async fn health_check(&self) -> bool {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
            _ => true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("identity.json");

        let role = Role::new("Administrator").with_admin(true);
        {
            let store = FileIdentityStore::open(&path).unwrap();
            store.insert_role(role.clone()).await.unwrap();
            store
                .insert_user(
                    User::new("Admin", "admin@smartone-erp.com", role.id)
                        .with_password_hash("$argon2id$v=19$stub"),
                )
                .await
                .unwrap();
        }

        let reopened = FileIdentityStore::open(&path).unwrap();
        let user = reopened
            .find_user_by_email("admin@smartone-erp.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role_id, role.id);
        assert!(user.password_hash.is_some());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_mutation_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("identity.json");
        let store = FileIdentityStore::open(&path).unwrap();

        let orphan = User::new("Ghost", "ghost@smartone-erp.com", RoleId::new());
        assert!(store.insert_user(orphan).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_delete_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("identity.json");
        let store = FileIdentityStore::open(&path).unwrap();

        let role = Role::new("Staff");
        store.insert_role(role.clone()).await.unwrap();
        let user = User::new("Staff", "staff@smartone-erp.com", role.id);
        let id = user.id;
        store.insert_user(user).await.unwrap();
        assert!(store.delete_user(id).await.unwrap());

        let reopened = FileIdentityStore::open(&path).unwrap();
        assert!(reopened.find_user_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_directory_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("identity.json");
        let store = FileIdentityStore::open(&path).unwrap();

        let role = Role::new("Staff");
        store.insert_role(role.clone()).await.unwrap();
        let user = User::new("Staff", "staff@smartone-erp.com", role.id);
        let id = user.id;
        store.insert_user(user).await.unwrap();

        // A directory in the temp file's place makes every write fail.
        fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let late = User::new("Late", "late@smartone-erp.com", role.id);
        assert!(store.insert_user(late).await.unwrap_err().is_unavailable());
        assert!(store.delete_user(id).await.is_err());

        assert!(store.find_user_by_email("late@smartone-erp.com").await.unwrap().is_none());
        assert!(store.find_user_by_id(id).await.unwrap().is_some());

        let reopened = FileIdentityStore::open(&path).unwrap();
        assert_eq!(reopened.list_users_with_roles().await.unwrap().len(), 1);
    }

    #[test]
    fn test_corrupted_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("identity.json");
        fs::write(&path, "{ not json").unwrap();

        let error = FileIdentityStore::open(&path).unwrap_err();
        assert!(error.is_unavailable());
    }
}
