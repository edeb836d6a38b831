// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session claims carried inside the signed session token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use smartone_core::{Role, RoleId, UserId};
use uuid::Uuid;

/// Claims embedded in a session token.
///
/// This is a snapshot of the principal's role and permission grants taken
/// when the token was issued. Revoking a permission does not change tokens
/// that are already out; they keep the old grant until they are re-issued
/// or expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject: the principal id.
    pub sub: UserId,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Not before time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Token id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    // =========================================================================
    // Session Claims
    // =========================================================================
    /// Role id.
    pub role_id: RoleId,

    /// Role name, compared exactly by role gates.
    pub role_name: String,

    /// Role admin flag.
    #[serde(default)]
    pub is_admin: bool,

    /// Role system flag.
    #[serde(default)]
    pub is_system: bool,

    /// Permission names granted to the role at issuance, ascending.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SessionClaims {
    /// Creates a builder for the given principal and role.
    pub fn builder(user_id: UserId, role: &Role) -> SessionClaimsBuilder {
        SessionClaimsBuilder::new(user_id, role)
    }

    /// Returns the principal id.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns `true` if the role name matches exactly.
    pub fn has_role(&self, role_name: &str) -> bool {
        self.role_name == role_name
    }

    /// Returns `true` if the permission was granted at issuance.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Returns `true` if every listed permission was granted.
    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().all(|p| self.has_permission(p.as_ref()))
    }

    /// Returns `true` if at least one listed permission was granted.
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().any(|p| self.has_permission(p.as_ref()))
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issue time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Returns how long ago the token was issued.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        Duration::seconds(now.timestamp() - self.iat)
    }

    /// Returns the same claims with a fresh issue time, expiry and token id.
    pub fn renewed(&self, now: DateTime<Utc>, lifetime: Duration) -> Self {
        let iat = now.timestamp();
        Self {
            exp: iat + lifetime.num_seconds(),
            iat,
            nbf: Some(iat),
            jti: Some(Uuid::now_v7().to_string()),
            ..self.clone()
        }
    }

    /// Returns the client-facing view of these claims.
    pub fn user(&self) -> SessionUser {
        SessionUser {
            id: self.sub,
            name: self.name.clone(),
            email: self.email.clone(),
            role_id: self.role_id,
            role_name: self.role_name.clone(),
            is_admin: self.is_admin,
            is_system: self.is_system,
            permissions: self.permissions.clone(),
        }
    }

    /// Returns the session view served by `/api/auth/session`.
    pub fn view(&self) -> SessionView {
        SessionView {
            user: self.user(),
            expires: self.expires_at().unwrap_or_else(Utc::now),
        }
    }
}

// =============================================================================
// SessionClaimsBuilder
// =============================================================================

/// Builder for [`SessionClaims`].
#[derive(Debug, Clone)]
pub struct SessionClaimsBuilder {
    user_id: UserId,
    role_id: RoleId,
    role_name: String,
    is_admin: bool,
    is_system: bool,
    permissions: Vec<String>,
    name: Option<String>,
    email: Option<String>,
    issuer: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    lifetime: Duration,
}

impl SessionClaimsBuilder {
    /// Creates a builder for the given principal and role.
    pub fn new(user_id: UserId, role: &Role) -> Self {
        Self {
            user_id,
            role_id: role.id,
            role_name: role.name.clone(),
            is_admin: role.is_admin,
            is_system: role.is_system,
            permissions: Vec::new(),
            name: None,
            email: None,
            issuer: None,
            issued_at: None,
            lifetime: Duration::hours(1),
        }
    }

    /// Sets the granted permission names. They are sorted and deduplicated.
    pub fn permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = permissions.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        self.permissions = names;
        self
    }

    /// Sets the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the issuer.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Pins the issue time. Defaults to now.
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }

    /// Sets the token lifetime.
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Builds the claims.
    pub fn build(self) -> SessionClaims {
        let iat = self.issued_at.unwrap_or_else(Utc::now).timestamp();

        SessionClaims {
            sub: self.user_id,
            exp: iat + self.lifetime.num_seconds(),
            iat,
            nbf: Some(iat),
            iss: self.issuer,
            jti: Some(Uuid::now_v7().to_string()),
            role_id: self.role_id,
            role_name: self.role_name,
            is_admin: self.is_admin,
            is_system: self.is_system,
            permissions: self.permissions,
            name: self.name,
            email: self.email,
        }
    }
}

// =============================================================================
// Client-facing views
// =============================================================================

/// The principal as seen by the web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Principal id.
    pub id: UserId,
    /// Display name.
    pub name: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Role id.
    pub role_id: RoleId,
    /// Role name.
    pub role_name: String,
    /// Role admin flag.
    pub is_admin: bool,
    /// Role system flag.
    pub is_system: bool,
    /// Permission names, ascending.
    pub permissions: Vec<String>,
}

/// Current session as returned to the web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    /// The signed-in principal.
    pub user: SessionUser,
    /// When the session expires.
    pub expires: DateTime<Utc>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_role() -> Role {
        Role::new("Administrator").with_admin(true)
    }

    #[test]
    fn test_builder_sorts_and_dedups_permissions() {
        let claims = SessionClaims::builder(UserId::new(), &admin_role())
            .permissions(["users.write", "finance.read", "users.write"])
            .build();

        assert_eq!(claims.permissions, vec!["finance.read", "users.write"]);
        assert!(claims.has_permission("finance.read"));
        assert!(!claims.has_permission("Finance.read"));
    }

    #[test]
    fn test_role_flags_copied_from_role() {
        let role = admin_role().with_system(true);
        let claims = SessionClaims::builder(UserId::new(), &role).build();

        assert_eq!(claims.role_id, role.id);
        assert_eq!(claims.role_name, "Administrator");
        assert!(claims.is_admin);
        assert!(claims.is_system);
        assert!(claims.has_role("Administrator"));
        assert!(!claims.has_role("administrator"));
    }

    #[test]
    fn test_permission_sets() {
        let claims = SessionClaims::builder(UserId::new(), &admin_role())
            .permissions(["a", "b"])
            .build();

        assert!(claims.has_all_permissions(&["a", "b"]));
        assert!(!claims.has_all_permissions(&["a", "c"]));
        assert!(claims.has_any_permission(&["c", "b"]));
        assert!(!claims.has_any_permission(&["c"]));
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let claims = SessionClaims::builder(UserId::new(), &admin_role())
            .email("admin@smartone-erp.com")
            .build();
        let json = serde_json::to_value(&claims).unwrap();

        assert!(json.get("roleId").is_some());
        assert_eq!(json["roleName"], "Administrator");
        assert_eq!(json["isAdmin"], true);
        assert_eq!(json["isSystem"], false);
        assert!(json.get("sub").is_some());
    }

    #[test]
    fn test_renewed_keeps_grants() {
        let issued = Utc::now() - Duration::days(2);
        let claims = SessionClaims::builder(UserId::new(), &admin_role())
            .permissions(["finance.read"])
            .issued_at(issued)
            .lifetime(Duration::days(30))
            .build();

        let now = Utc::now();
        let renewed = claims.renewed(now, Duration::days(30));

        assert_eq!(renewed.permissions, claims.permissions);
        assert_eq!(renewed.sub, claims.sub);
        assert_eq!(renewed.iat, now.timestamp());
        assert!(renewed.exp > claims.exp);
        assert_ne!(renewed.jti, claims.jti);
        assert!(claims.age_at(now) >= Duration::days(2));
    }

    #[test]
    fn test_view() {
        let claims = SessionClaims::builder(UserId::new(), &admin_role())
            .name("Admin")
            .email("admin@smartone-erp.com")
            .build();
        let view = claims.view();

        assert_eq!(view.user.id, claims.sub);
        assert_eq!(view.user.role_name, "Administrator");
        assert_eq!(Some(view.expires), claims.expires_at());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["user"]["roleName"], "Administrator");
        assert_eq!(json["user"]["email"], "admin@smartone-erp.com");
    }
}
