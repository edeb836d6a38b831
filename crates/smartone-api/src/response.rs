// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use serde::{Deserialize, Serialize};
use smartone_core::{RoleId, RoleWithPermissions, UserId, UserWithRole};

// =============================================================================
// Health
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready.
    pub ready: bool,
    /// Component statuses.
    pub components: Vec<ComponentStatus>,
}

/// Status of a system component.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    /// Creates a component status.
    pub fn new(name: impl Into<String>, healthy: bool) -> Self {
        Self {
            name: name.into(),
            healthy,
            message: None,
        }
    }

    /// Adds a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// =============================================================================
// Settings
// =============================================================================

/// A role as listed by `/api/roles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    /// Role id.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Admin flag.
    pub is_admin: bool,
    /// System flag.
    pub is_system: bool,
    /// Granted permission names, ascending.
    pub permissions: Vec<String>,
}

impl From<RoleWithPermissions> for RoleResponse {
    fn from(entry: RoleWithPermissions) -> Self {
        let permissions = entry.permission_names();
        Self {
            id: entry.role.id,
            name: entry.role.name,
            is_admin: entry.role.is_admin,
            is_system: entry.role.is_system,
            permissions,
        }
    }
}

/// A user as listed by `/api/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Role id.
    pub role_id: RoleId,
    /// Role name.
    pub role_name: String,
}

impl From<UserWithRole> for UserResponse {
    fn from(entry: UserWithRole) -> Self {
        Self {
            id: entry.user.id,
            name: entry.user.name,
            email: entry.user.email,
            role_id: entry.role.id,
            role_name: entry.role.name,
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Logout response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Always `true`.
    pub success: bool,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smartone_core::{Permission, Role, User};

    #[test]
    fn test_role_response_shape() {
        let role = Role::new("Administrator").with_admin(true);
        let entry = RoleWithPermissions {
            role,
            permissions: vec![Permission::new("finance.read"), Permission::new("users.read")],
        };
        let json = serde_json::to_value(RoleResponse::from(entry)).unwrap();

        assert_eq!(json["name"], "Administrator");
        assert_eq!(json["isAdmin"], true);
        assert_eq!(json["isSystem"], false);
        assert_eq!(json["permissions"], serde_json::json!(["finance.read", "users.read"]));
    }

    #[test]
    fn test_user_response_has_no_password() {
        let role = Role::new("Staff");
        let user = User::new("Kim", "kim@smartone-erp.com", role.id).with_password_hash("$argon2id$x");
        let json = serde_json::to_value(UserResponse::from(UserWithRole { user, role })).unwrap();

        assert_eq!(json["roleName"], "Staff");
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_health_response() {
        let response = HealthResponse::healthy();
        assert_eq!(response.status, "ok");
        assert!(!response.version.is_empty());
    }
}
