// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Administrative user operations.
//!
//! These back the `smartone users` subcommands and are plain functions over an
//! [`IdentityStore`], so they can be driven from tests without a process.

use std::fmt;

use crate::error::{CoreError, CoreResult, StoreError};
use crate::password::hash_in_background;
use crate::store::IdentityStore;
use crate::types::{normalize_email, Role, User, UserWithRole};

/// Name of the built-in system administrator role.
pub const SYSTEM_ADMINISTRATOR: &str = "System Administrator";

/// Name of the built-in administrator role.
pub const ADMINISTRATOR: &str = "Administrator";

/// Minimum accepted password length for provisioned users.
pub const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// Listing
// =============================================================================

/// Formats one line of the user listing.
pub fn format_user_line(entry: &UserWithRole) -> String {
    format!("- {}", entry)
}

/// Lists every user joined with its role, one formatted line per user.
pub async fn list_users(store: &dyn IdentityStore) -> CoreResult<Vec<String>> {
    let users = store.list_users_with_roles().await?;
    Ok(users.iter().map(format_user_line).collect())
}

// =============================================================================
// Deletion
// =============================================================================

/// Outcome of [`delete_user_by_email`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No user has that email. Nothing changed.
    NotFound {
        /// The email that was looked up.
        email: String,
    },
    /// Exactly one user was removed.
    Deleted {
        /// The removed user.
        user: User,
    },
}

impl DeleteOutcome {
    /// Returns `true` if a user was removed.
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteOutcome::NotFound { email } => write!(f, "User not found: {}", email),
            DeleteOutcome::Deleted { user } => {
                write!(f, "Deleted user: {} ({})", user.name, user.email)
            }
        }
    }
}

/// Looks a user up by email and deletes it.
///
/// A missing email is reported, not treated as an error.
pub async fn delete_user_by_email(store: &dyn IdentityStore, email: &str) -> CoreResult<DeleteOutcome> {
    let Some(user) = store.find_user_by_email(email).await? else {
        tracing::debug!(email = %email, "Delete requested for unknown user");
        return Ok(DeleteOutcome::NotFound {
            email: email.to_string(),
        });
    };

    if !store.delete_user(user.id).await? {
        // Removed concurrently between lookup and delete.
        return Ok(DeleteOutcome::NotFound {
            email: email.to_string(),
        });
    }

    tracing::info!(user_id = %user.id, email = %user.email, "User deleted");
    Ok(DeleteOutcome::Deleted { user })
}

// =============================================================================
// Provisioning
// =============================================================================

/// Input for [`add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password, hashed before storage.
    pub password: String,
    /// Exact name of an existing role.
    pub role_name: String,
}

impl NewUser {
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid_input("name", "must not be empty"));
        }
        let email = normalize_email(&self.email);
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::invalid_input("email", "must be an email address"));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(CoreError::invalid_input(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        Ok(())
    }
}

/// Creates a user with an Argon2-hashed password.
pub async fn add_user(store: &dyn IdentityStore, new_user: NewUser) -> CoreResult<User> {
    new_user.validate()?;

    let role = store
        .find_role_by_name(&new_user.role_name)
        .await?
        .ok_or_else(|| StoreError::not_found("role", new_user.role_name.clone()))?;

    let hash = hash_in_background(new_user.password.clone()).await?;
    let user = User::new(new_user.name.trim(), new_user.email.trim(), role.id).with_password_hash(hash);
    store.insert_user(user.clone()).await?;

    tracing::info!(user_id = %user.id, email = %user.email, role = %role.name, "User created");
    Ok(user)
}

/// Ensures the built-in administrator roles exist.
///
/// Returns the roles that were created. Existing roles are left untouched.
pub async fn seed_default_roles(store: &dyn IdentityStore) -> CoreResult<Vec<Role>> {
    let defaults = [
        Role::new(SYSTEM_ADMINISTRATOR).with_admin(true).with_system(true),
        Role::new(ADMINISTRATOR).with_admin(true),
    ];

    let mut created = Vec::new();
    for role in defaults {
        if store.find_role_by_name(&role.name).await?.is_some() {
            continue;
        }
        store.insert_role(role.clone()).await?;
        tracing::info!(role = %role.name, "Seeded default role");
        created.push(role);
    }
    Ok(created)
}

// =============================================================================
// Tests
// =============================================================================
