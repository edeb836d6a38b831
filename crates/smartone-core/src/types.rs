// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity directory types: users, roles and permissions.
//!
//! Every user references exactly one [`Role`]. A role carries the `is_admin` and
//! `is_system` flags and is granted a set of [`Permission`]s through the store's
//! association table.
//!
//! Wire serialization uses camelCase field names to match the web client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new time-ordered identifier.
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            #[inline]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the inner UUID.
            #[inline]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier of a user (principal).
    UserId
);

uuid_id!(
    /// Unique identifier of a role.
    RoleId
);

uuid_id!(
    /// Unique identifier of a permission.
    PermissionId
);

// =============================================================================
// Permission
// =============================================================================

/// An atomic, named capability grant.
///
/// Names are unique across the directory and are what authorization checks
/// compare against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Permission identifier.
    pub id: PermissionId,
    /// Unique permission name, e.g. `finance.read`.
    pub name: String,
}

impl Permission {
    /// Creates a permission with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PermissionId::new(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role identifier.
    pub id: RoleId,
    /// Role name, e.g. "System Administrator".
    pub name: String,
    /// Administrative flag. Data only; role checks never consult it.
    pub is_admin: bool,
    /// System flag. Data only; role checks never consult it.
    pub is_system: bool,
}

impl Role {
    /// Creates a role with a fresh identifier and both flags cleared.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            is_admin: false,
            is_system: false,
        }
    }

    /// Sets the admin flag.
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    /// Sets the system flag.
    pub fn with_system(mut self, is_system: bool) -> Self {
        self.is_system = is_system;
        self
    }
}

/// A role together with its granted permissions, ordered by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleWithPermissions {
    /// The role.
    #[serde(flatten)]
    pub role: Role,
    /// Granted permissions in ascending name order.
    pub permissions: Vec<Permission>,
}

impl RoleWithPermissions {
    /// Returns the granted permission names in ascending order.
    pub fn permission_names(&self) -> Vec<String> {
        self.permissions.iter().map(|p| p.name.clone()).collect()
    }
}

// =============================================================================
// User
// =============================================================================

/// An authenticated principal.
///
/// The password hash is never serialized. Snapshot persistence writes it
/// through a dedicated record type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique (case-insensitive) across the directory.
    pub email: String,
    /// The single role held by this user.
    pub role_id: RoleId,
    /// Argon2 PHC string, absent for accounts provisioned without a password.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
}

impl User {
    /// Creates a user with a fresh identifier and no password.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role_id: RoleId) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            role_id,
            password_hash: None,
        }
    }

    /// Sets the stored password hash.
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A user joined with its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRole {
    /// The user.
    pub user: User,
    /// The user's role.
    pub role: Role,
}

impl fmt::Display for UserWithRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}), Role: {}",
            self.user.name, self.user.email, self.role.name
        )
    }
}

/// Normalizes an email address for lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_parse() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);

        let parsed: UserId = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
        assert!("not-a-uuid".parse::<RoleId>().is_err());
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let user = User::new("Admin", "admin@smartone-erp.com", RoleId::new())
            .with_password_hash("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA");
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["roleId"], user.role_id.to_string());
    }

    #[test]
    fn test_user_debug_redacts_hash() {
        let user = User::new("Admin", "admin@smartone-erp.com", RoleId::new())
            .with_password_hash("secret-hash");
        let debug = format!("{:?}", user);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-hash"));
    }

    #[test]
    fn test_role_wire_shape() {
        let role = Role::new("Administrator").with_admin(true);
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["isAdmin"], true);
        assert_eq!(json["isSystem"], false);
    }

    #[test]
    fn test_user_with_role_display() {
        let role = Role::new("System Administrator");
        let user = User::new("Admin", "admin@smartone-erp.com", role.id);
        let joined = UserWithRole { user, role };
        assert_eq!(
            joined.to_string(),
            "Admin (admin@smartone-erp.com), Role: System Administrator"
        );
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Admin@SmartOne-ERP.com "), "admin@smartone-erp.com");
    }
}
