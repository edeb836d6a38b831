// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role and permission gates.
//!
//! A gate is a pure check over an already resolved session. It never looks
//! anything up, so it can be evaluated any number of times per request.
//! Role names are compared exactly. The `isAdmin` and `isSystem` flags are
//! not consulted; callers that care about them read them from the claims.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use super::claims::SessionClaims;
use super::resolver::Resolution;
use crate::error::ApiError;

// =============================================================================
// GateError
// =============================================================================

/// Errors building a gate requirement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// A role set must name at least one role.
    #[error("role set cannot be empty")]
    EmptyRoleSet,

    /// A permission requirement must name at least one permission.
    #[error("permission requirement cannot be empty")]
    EmptyPermissionSet,

    /// Blank names never match anything.
    #[error("blank name in {0}")]
    BlankName(&'static str),
}

// =============================================================================
// RoleSet
// =============================================================================

/// A non-empty set of acceptable role names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet {
    roles: BTreeSet<String>,
}

impl RoleSet {
    /// Creates a role set. Fails on an empty list or a blank name.
    pub fn new<I, S>(roles: I) -> Result<Self, GateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: BTreeSet<String> = roles.into_iter().map(Into::into).collect();
        if roles.is_empty() {
            return Err(GateError::EmptyRoleSet);
        }
        if roles.iter().any(|r| r.trim().is_empty()) {
            return Err(GateError::BlankName("role set"));
        }
        Ok(Self { roles })
    }

    /// Returns `true` if the role name is acceptable. Case-sensitive.
    pub fn contains(&self, role_name: &str) -> bool {
        self.roles.contains(role_name)
    }

    /// Iterates the role names in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    /// Returns the number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Always `false`; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

// =============================================================================
// PermissionRequirement
// =============================================================================

/// Permission names a session must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionRequirement {
    /// Every listed permission.
    All(Vec<String>),
    /// At least one listed permission.
    Any(Vec<String>),
}

impl PermissionRequirement {
    /// Requires every listed permission.
    pub fn all<I, S>(permissions: I) -> Result<Self, GateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::collect(permissions).map(PermissionRequirement::All)
    }

    /// Requires at least one listed permission.
    pub fn any<I, S>(permissions: I) -> Result<Self, GateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::collect(permissions).map(PermissionRequirement::Any)
    }

    fn collect<I, S>(permissions: I) -> Result<Vec<String>, GateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = permissions.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(GateError::EmptyPermissionSet);
        }
        if names.iter().any(|p| p.trim().is_empty()) {
            return Err(GateError::BlankName("permission requirement"));
        }
        Ok(names)
    }

    /// Returns `true` if the claims satisfy the requirement.
    pub fn is_satisfied_by(&self, claims: &SessionClaims) -> bool {
        match self {
            PermissionRequirement::All(names) => claims.has_all_permissions(names),
            PermissionRequirement::Any(names) => claims.has_any_permission(names),
        }
    }
}

// =============================================================================
// GateDecision
// =============================================================================

/// Terminal outcome of a gate check.
#[derive(Debug, Clone)]
pub enum GateDecision {
    /// The session passes the gate.
    Authorized(Arc<SessionClaims>),
    /// There is no session; the caller should send the user to sign in.
    Unauthenticated,
    /// The session exists but does not pass the gate.
    Forbidden(Arc<SessionClaims>),
    /// The session could not be resolved because the store failed.
    StoreUnavailable,
}

impl GateDecision {
    /// Returns `true` if authorized.
    pub fn is_authorized(&self) -> bool {
        matches!(self, GateDecision::Authorized(_))
    }

    /// Returns `true` if forbidden.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, GateDecision::Forbidden(_))
    }

    /// Returns `true` if unauthenticated.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, GateDecision::Unauthenticated)
    }

    /// Returns the outcome name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateDecision::Authorized(_) => "authorized",
            GateDecision::Unauthenticated => "unauthenticated",
            GateDecision::Forbidden(_) => "forbidden",
            GateDecision::StoreUnavailable => "store_unavailable",
        }
    }

    /// Converts the decision into the authorized claims or an API error.
    pub fn into_result(self) -> Result<Arc<SessionClaims>, ApiError> {
        match self {
            GateDecision::Authorized(claims) => Ok(claims),
            GateDecision::Unauthenticated => Err(ApiError::unauthorized("No active session")),
            GateDecision::Forbidden(claims) => Err(ApiError::forbidden(format!(
                "Role '{}' is not permitted",
                claims.role_name
            ))),
            GateDecision::StoreUnavailable => {
                Err(ApiError::store_unavailable("Session principal lookup failed"))
            }
        }
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Gate checks over a resolved session.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gate;

impl Gate {
    /// Requires the session's role name to be one of `roles`.
    pub fn require_role(roles: &RoleSet, resolution: &Resolution) -> GateDecision {
        Self::check(resolution, |claims| roles.contains(&claims.role_name))
    }

    /// Requires the session to hold the given permissions.
    pub fn require_permission(
        requirement: &PermissionRequirement,
        resolution: &Resolution,
    ) -> GateDecision {
        Self::check(resolution, |claims| requirement.is_satisfied_by(claims))
    }

    fn check<F>(resolution: &Resolution, allowed: F) -> GateDecision
    where
        F: Fn(&SessionClaims) -> bool,
    {
        match resolution {
            Resolution::Authenticated(claims) if allowed(claims) => {
                GateDecision::Authorized(claims.clone())
            }
            Resolution::Authenticated(claims) => GateDecision::Forbidden(claims.clone()),
            Resolution::Unauthenticated => GateDecision::Unauthenticated,
            Resolution::StoreUnavailable => GateDecision::StoreUnavailable,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smartone_core::{Role, UserId};

    fn session(role: Role, permissions: &[&str]) -> Resolution {
        let claims = SessionClaims::builder(UserId::new(), &role)
            .permissions(permissions.iter().copied())
            .build();
        Resolution::Authenticated(Arc::new(claims))
    }

    fn admins() -> RoleSet {
        RoleSet::new(["System Administrator", "Administrator"]).unwrap()
    }

    #[test]
    fn test_empty_role_set_rejected() {
        assert_eq!(RoleSet::new(Vec::<String>::new()), Err(GateError::EmptyRoleSet));
        assert!(matches!(RoleSet::new([" "]), Err(GateError::BlankName(_))));
    }

    #[test]
    fn test_administrator_is_authorized() {
        let decision = Gate::require_role(&admins(), &session(Role::new("Administrator"), &[]));
        assert!(decision.is_authorized());
    }

    #[test]
    fn test_staff_is_forbidden() {
        let decision = Gate::require_role(&admins(), &session(Role::new("Staff"), &[]));
        assert!(decision.is_forbidden());
    }

    #[test]
    fn test_no_session_is_unauthenticated() {
        let decision = Gate::require_role(&admins(), &Resolution::Unauthenticated);
        assert!(decision.is_unauthenticated());

        let anyone = RoleSet::new(["Staff"]).unwrap();
        assert!(Gate::require_role(&anyone, &Resolution::Unauthenticated).is_unauthenticated());
    }

    #[test]
    fn test_role_comparison_is_case_sensitive() {
        let decision = Gate::require_role(&admins(), &session(Role::new("administrator"), &[]));
        assert!(decision.is_forbidden());
    }

    #[test]
    fn test_flags_do_not_satisfy_role_check() {
        let role = Role::new("Owner").with_admin(true).with_system(true);
        let decision = Gate::require_role(&admins(), &session(role, &[]));
        assert!(decision.is_forbidden());
    }

    #[test]
    fn test_gate_is_idempotent() {
        let resolution = session(Role::new("Administrator"), &[]);
        let roles = admins();
        for _ in 0..3 {
            assert!(Gate::require_role(&roles, &resolution).is_authorized());
        }
    }

    #[test]
    fn test_store_unavailable_passes_through() {
        let decision = Gate::require_role(&admins(), &Resolution::StoreUnavailable);
        assert!(matches!(decision, GateDecision::StoreUnavailable));
        assert_eq!(decision.into_result().unwrap_err().error_code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_permission_all_and_any() {
        let resolution = session(Role::new("Staff"), &["finance.read", "orders.read"]);

        let all = PermissionRequirement::all(["finance.read", "orders.read"]).unwrap();
        assert!(Gate::require_permission(&all, &resolution).is_authorized());

        let all = PermissionRequirement::all(["finance.read", "finance.write"]).unwrap();
        assert!(Gate::require_permission(&all, &resolution).is_forbidden());

        let any = PermissionRequirement::any(["finance.write", "orders.read"]).unwrap();
        assert!(Gate::require_permission(&any, &resolution).is_authorized());

        assert_eq!(
            PermissionRequirement::any(Vec::<String>::new()),
            Err(GateError::EmptyPermissionSet)
        );
    }

    #[test]
    fn test_decision_into_result() {
        let resolution = session(Role::new("Staff"), &[]);
        let err = Gate::require_role(&admins(), &resolution).into_result().unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");

        let err = Gate::require_role(&admins(), &Resolution::Unauthenticated)
            .into_result()
            .unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_display() {
        assert_eq!(admins().to_string(), "{Administrator, System Administrator}");
    }
}
