// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Plain in-process identity directory shared by the store implementations.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::types::{
    normalize_email, Permission, PermissionId, Role, RoleId, RoleWithPermissions, User, UserId,
    UserWithRole,
};

// =============================================================================
// Directory
// =============================================================================

/// Users, roles, permissions and the role/permission association table.
///
/// All methods are synchronous. Callers provide the locking.
#[derive(Debug, Default, Clone)]
pub struct Directory {
    users: HashMap<UserId, User>,
    email_index: HashMap<String, UserId>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    grants: BTreeSet<(RoleId, PermissionId)>,
}

impl Directory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub(crate) fn user_by_email(&self, email: &str) -> Option<User> {
        self.email_index
            .get(&normalize_email(email))
            .and_then(|id| self.users.get(id))
            .cloned()
    }

    pub(crate) fn user_by_id(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    pub(crate) fn role(&self, id: RoleId) -> Option<Role> {
        self.roles.get(&id).cloned()
    }

    pub(crate) fn role_by_name(&self, name: &str) -> Option<Role> {
        self.roles.values().find(|r| r.name == name).cloned()
    }

    pub(crate) fn permissions(&self) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self.permissions.values().cloned().collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        permissions
    }

    pub(crate) fn role_permissions(&self, role_id: RoleId) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self
            .grants
            .range((role_id, PermissionId::from_uuid(uuid::Uuid::nil()))..)
            .take_while(|(r, _)| *r == role_id)
            .filter_map(|(_, p)| self.permissions.get(p).cloned())
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        permissions
    }

    pub(crate) fn roles(&self) -> Vec<RoleWithPermissions> {
        let mut roles: Vec<RoleWithPermissions> = self
            .roles
            .values()
            .map(|role| RoleWithPermissions {
                role: role.clone(),
                permissions: self.role_permissions(role.id),
            })
            .collect();
        roles.sort_by(|a, b| a.role.name.cmp(&b.role.name));
        roles
    }

    pub(crate) fn users_with_roles(&self) -> Vec<UserWithRole> {
        let mut users: Vec<UserWithRole> = self
            .users
            .values()
            .filter_map(|user| match self.roles.get(&user.role_id) {
                Some(role) => Some(UserWithRole {
                    user: user.clone(),
                    role: role.clone(),
                }),
                None => {
                    tracing::warn!(user_id = %user.id, role_id = %user.role_id, "User references a missing role");
                    None
                }
            })
            .collect();
        users.sort_by(|a, b| {
            a.user
                .name
                .cmp(&b.user.name)
                .then_with(|| a.user.email.cmp(&b.user.email))
        });
        users
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    pub(crate) fn insert_user(&mut self, user: User) -> StoreResult<()> {
        let key = normalize_email(&user.email);
        if self.email_index.contains_key(&key) {
            return Err(StoreError::duplicate("user", user.email));
        }
        if self.users.contains_key(&user.id) {
            return Err(StoreError::duplicate("user", user.id.to_string()));
        }
        if !self.roles.contains_key(&user.role_id) {
            return Err(StoreError::unknown_role(user.role_id));
        }

        self.email_index.insert(key, user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    pub(crate) fn delete_user(&mut self, id: UserId) -> bool {
        match self.users.remove(&id) {
            Some(user) => {
                self.email_index.remove(&normalize_email(&user.email));
                true
            }
            None => false,
        }
    }

    pub(crate) fn insert_role(&mut self, role: Role) -> StoreResult<()> {
        if self.roles.contains_key(&role.id) {
            return Err(StoreError::duplicate("role", role.id.to_string()));
        }
        if self.roles.values().any(|r| r.name == role.name) {
            return Err(StoreError::duplicate("role", role.name));
        }
        self.roles.insert(role.id, role);
        Ok(())
    }

    pub(crate) fn insert_permission(&mut self, permission: Permission) -> StoreResult<()> {
        if self.permissions.contains_key(&permission.id) {
            return Err(StoreError::duplicate("permission", permission.id.to_string()));
        }
        if self.permissions.values().any(|p| p.name == permission.name) {
            return Err(StoreError::duplicate("permission", permission.name));
        }
        self.permissions.insert(permission.id, permission);
        Ok(())
    }

    pub(crate) fn grant(&mut self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()> {
        if !self.roles.contains_key(&role_id) {
            return Err(StoreError::not_found("role", role_id.to_string()));
        }
        if !self.permissions.contains_key(&permission_id) {
            return Err(StoreError::not_found("permission", permission_id.to_string()));
        }
        self.grants.insert((role_id, permission_id));
        Ok(())
    }

    pub(crate) fn revoke(&mut self, role_id: RoleId, permission_id: PermissionId) -> bool {
        self.grants.remove(&(role_id, permission_id))
    }

    // -------------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------------

    /// Captures the directory as a serializable snapshot.
    pub fn to_snapshot(&self) -> Snapshot {
        let mut roles: Vec<Role> = self.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));

        let mut users: Vec<UserRecord> = self.users.values().cloned().map(UserRecord::from).collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));

        Snapshot {
            version: Snapshot::VERSION,
            roles,
            permissions: self.permissions(),
            grants: self
                .grants
                .iter()
                .map(|(role_id, permission_id)| Grant {
                    role_id: *role_id,
                    permission_id: *permission_id,
                })
                .collect(),
            users,
        }
    }

    /// Rebuilds a directory from a snapshot, re-checking every constraint.
    pub fn from_snapshot(snapshot: Snapshot) -> StoreResult<Self> {
        if snapshot.version != Snapshot::VERSION {
            return Err(StoreError::corrupted(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut directory = Self::new();
        for role in snapshot.roles {
            directory.insert_role(role).map_err(|e| StoreError::corrupted(e.to_string()))?;
        }
        for permission in snapshot.permissions {
            directory
                .insert_permission(permission)
                .map_err(|e| StoreError::corrupted(e.to_string()))?;
        }
        for grant in snapshot.grants {
            directory
                .grant(grant.role_id, grant.permission_id)
                .map_err(|e| StoreError::corrupted(e.to_string()))?;
        }
        for record in snapshot.users {
            directory
                .insert_user(record.into())
                .map_err(|e| StoreError::corrupted(e.to_string()))?;
        }
        Ok(directory)
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Serialized form of a [`Directory`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// Roles.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Permissions.
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Role/permission associations.
    #[serde(default)]
    pub grants: Vec<Grant>,
    /// Users, including password hashes.
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

impl Snapshot {
    /// Current snapshot format version.
    pub const VERSION: u32 = 1;
}

/// One role/permission association.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    /// Role id.
    pub role_id: RoleId,
    /// Permission id.
    pub permission_id: PermissionId,
}

/// Persisted user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    id: UserId,
    name: String,
    email: String,
    role_id: RoleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role_id: user.role_id,
            password_hash: user.password_hash,
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            role_id: record.role_id,
            password_hash: record.password_hash,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
