// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builders for identity directories and service configurations.
//!
//! ```rust,ignore
//! let store = DirectoryBuilder::new()
//!     .role(Role::new("Administrator").with_admin(true))
//!     .permission("finance.read")
//!     .grant("Administrator", "finance.read")
//!     .user_with_password("Admin", "admin@smartone-erp.com", "Administrator", "secret-pass")
//!     .build()
//!     .await;
//! ```

use std::collections::HashMap;

use smartone_config::{SecretValue, SmartOneConfig, StoreKind};
use smartone_core::password::hash_password;
use smartone_core::{IdentityStore, MemoryIdentityStore, Permission, Role, User};

use super::fixtures::TEST_SECRET;

// =============================================================================
// DirectoryBuilder
// =============================================================================

struct UserSpec {
    name: String,
    email: String,
    role: String,
    password: Option<String>,
}

/// Builds a populated identity directory.
///
/// Roles and permissions are referenced by name; a grant or user naming
/// something that was never added panics when the directory is built.
#[derive(Default)]
pub struct DirectoryBuilder {
    roles: Vec<Role>,
    permissions: Vec<String>,
    grants: Vec<(String, String)>,
    users: Vec<UserSpec>,
}

impl DirectoryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role.
    pub fn role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Adds a permission.
    pub fn permission(mut self, name: impl Into<String>) -> Self {
        self.permissions.push(name.into());
        self
    }

    /// Grants a permission to a role.
    pub fn grant(mut self, role: impl Into<String>, permission: impl Into<String>) -> Self {
        self.grants.push((role.into(), permission.into()));
        self
    }

    /// Adds a user without a password.
    pub fn user(
        mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        self.users.push(UserSpec {
            name: name.into(),
            email: email.into(),
            role: role.into(),
            password: None,
        });
        self
    }

    /// Adds a user who can sign in with `password`.
    pub fn user_with_password(
        mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.users.push(UserSpec {
            name: name.into(),
            email: email.into(),
            role: role.into(),
            password: Some(password.into()),
        });
        self
    }

    /// Writes the directory into an existing store.
    pub async fn seed(self, store: &dyn IdentityStore) {
        let mut roles = HashMap::new();
        for role in self.roles {
            roles.insert(role.name.clone(), role.id);
            store.insert_role(role).await.expect("Failed to insert role");
        }

        let mut permissions = HashMap::new();
        for name in self.permissions {
            let permission = Permission::new(&name);
            permissions.insert(name, permission.id);
            store
                .insert_permission(permission)
                .await
                .expect("Failed to insert permission");
        }

        for (role, permission) in self.grants {
            let role_id = roles[&role];
            let permission_id = permissions[&permission];
            store
                .grant_permission(role_id, permission_id)
                .await
                .expect("Failed to grant permission");
        }

        for spec in self.users {
            let mut user = User::new(spec.name, spec.email, roles[&spec.role]);
            if let Some(password) = spec.password {
                user = user.with_password_hash(
                    hash_password(&password).expect("Failed to hash password"),
                );
            }
            store.insert_user(user).await.expect("Failed to insert user");
        }
    }

    /// Builds an in-memory store holding the directory.
    pub async fn build(self) -> MemoryIdentityStore {
        let store = MemoryIdentityStore::new();
        self.seed(&store).await;
        store
    }
}

// =============================================================================
// ConfigBuilder
// =============================================================================

/// Builds a valid service configuration for tests.
///
/// Starts from defaults with a test secret, the in-memory store and no
/// role seeding.
pub struct ConfigBuilder {
    config: SmartOneConfig,
}

impl ConfigBuilder {
    /// Creates a builder with test defaults.
    pub fn new() -> Self {
        let mut config = SmartOneConfig::default();
        config.session.secret = Some(SecretValue::new(TEST_SECRET));
        config.store.kind = StoreKind::Memory;
        config.store.seed_default_roles = false;
        Self { config }
    }

    /// Sets the roles admitted to the settings area.
    pub fn allowed_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.settings.allowed_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the session lifetime in seconds.
    pub fn max_age_secs(mut self, secs: u64) -> Self {
        self.config.session.max_age_secs = secs;
        self
    }

    /// Sets the renewal threshold in seconds.
    pub fn update_age_secs(mut self, secs: u64) -> Self {
        self.config.session.update_age_secs = secs;
        self
    }

    /// Enables or disables the principal existence check.
    pub fn verify_principal(mut self, enabled: bool) -> Self {
        self.config.session.verify_principal = enabled;
        self
    }

    /// Sets the session cookie name.
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.config.session.cookie_name = name.into();
        self
    }

    /// Returns the configuration.
    pub fn build(self) -> SmartOneConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
