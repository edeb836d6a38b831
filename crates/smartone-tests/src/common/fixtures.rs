// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! The standard test directory and ready-made configuration documents.
//!
//! | User | Role | Grants |
//! |------|------|--------|
//! | Admin | System Administrator | every permission |
//! | Manager | Administrator | `finance.read`, `users.read` |
//! | Staff Member | Staff | `finance.read` |

use smartone_core::Role;

use super::builders::DirectoryBuilder;

// =============================================================================
// Constants
// =============================================================================

/// Session signing secret used across the suite.
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// System administrator role name.
pub const SYSTEM_ADMINISTRATOR: &str = "System Administrator";
/// Administrator role name.
pub const ADMINISTRATOR: &str = "Administrator";
/// Role outside the settings area.
pub const STAFF: &str = "Staff";

/// Email of the system administrator.
pub const ADMIN_EMAIL: &str = "admin@smartone-erp.com";
/// Password of the system administrator.
pub const ADMIN_PASSWORD: &str = "admin-password-1";
/// Email of the administrator.
pub const MANAGER_EMAIL: &str = "manager@smartone-erp.com";
/// Password of the administrator.
pub const MANAGER_PASSWORD: &str = "manager-password-1";
/// Email of the staff user.
pub const STAFF_EMAIL: &str = "staff@smartone-erp.com";
/// Password of the staff user.
pub const STAFF_PASSWORD: &str = "staff-password-1";

/// Every permission in the standard directory, in ascending name order.
pub const PERMISSIONS: [&str; 5] = [
    "finance.read",
    "finance.write",
    "settings.manage",
    "users.read",
    "users.write",
];

// =============================================================================
// Directory Fixtures
// =============================================================================

/// Pre-built identity directories.
pub struct DirectoryFixtures;

impl DirectoryFixtures {
    /// The standard three-user directory.
    pub fn standard() -> DirectoryBuilder {
        let mut builder = DirectoryBuilder::new()
            .role(Role::new(SYSTEM_ADMINISTRATOR).with_admin(true).with_system(true))
            .role(Role::new(ADMINISTRATOR).with_admin(true))
            .role(Role::new(STAFF));

        // Inserted out of order so ordering assertions mean something.
        for name in PERMISSIONS.iter().rev() {
            builder = builder
                .permission(*name)
                .grant(SYSTEM_ADMINISTRATOR, *name);
        }

        builder
            .grant(ADMINISTRATOR, "users.read")
            .grant(ADMINISTRATOR, "finance.read")
            .grant(STAFF, "finance.read")
            .user_with_password("Admin", ADMIN_EMAIL, SYSTEM_ADMINISTRATOR, ADMIN_PASSWORD)
            .user_with_password("Manager", MANAGER_EMAIL, ADMINISTRATOR, MANAGER_PASSWORD)
            .user_with_password("Staff Member", STAFF_EMAIL, STAFF, STAFF_PASSWORD)
    }

    /// A directory with roles but no users.
    pub fn roles_only() -> DirectoryBuilder {
        DirectoryBuilder::new()
            .role(Role::new(SYSTEM_ADMINISTRATOR).with_admin(true).with_system(true))
            .role(Role::new(ADMINISTRATOR).with_admin(true))
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Configuration documents in each supported format.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// A complete YAML configuration.
    pub fn yaml() -> String {
        format!(
            r#"
server:
  bind_address: "127.0.0.1"
  port: 8443
  request_timeout_secs: 10
  cors:
    allowed_origins:
      - "https://erp.smartone.example"
    allow_credentials: true

session:
  secret: "{TEST_SECRET}"
  issuer: "smartone-test"
  max_age_secs: 7200
  update_age_secs: 600
  cookie_name: "smartone.test-session"
  cookie_secure: true

settings:
  allowed_roles:
    - "System Administrator"
    - "Administrator"
    - "Auditor"

store:
  kind: file
  path: "data/identity.json"
  seed_default_roles: false

audit:
  enabled: false

logging:
  level: debug
  format: json
"#
        )
    }

    /// A minimal TOML configuration.
    pub fn toml() -> String {
        format!(
            r#"
[server]
port = 9000

[session]
secret = "{TEST_SECRET}"

[store]
kind = "memory"
"#
        )
    }

    /// A minimal JSON configuration.
    pub fn json() -> String {
        format!(
            r#"{{
  "server": {{ "port": 9100 }},
  "session": {{ "secret": "{TEST_SECRET}", "max_age_secs": 3600 }},
  "store": {{ "kind": "memory" }}
}}"#
        )
    }
}
