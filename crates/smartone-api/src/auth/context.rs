// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request session context.

use std::net::IpAddr;
use std::sync::Arc;

use uuid::Uuid;

use super::claims::SessionClaims;
use super::gate::{Gate, GateDecision, PermissionRequirement, RoleSet};
use super::resolver::Resolution;

/// Session context attached to every request by the session middleware.
///
/// Handlers and gates read the session from here instead of from any
/// process-wide state.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Resolved session.
    pub resolution: Resolution,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl SessionContext {
    /// Creates a context for a resolved session.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Creates an unauthenticated context.
    pub fn anonymous() -> Self {
        Self::new(Resolution::Unauthenticated)
    }

    /// Creates an authenticated context.
    pub fn authenticated(claims: SessionClaims) -> Self {
        Self::new(Resolution::Authenticated(Arc::new(claims)))
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.client_ip = ip;
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the claims if authenticated.
    pub fn claims(&self) -> Option<&Arc<SessionClaims>> {
        self.resolution.claims()
    }

    /// Returns `true` if authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.resolution.is_authenticated()
    }

    /// Requires one of the given roles.
    pub fn require_role(&self, roles: &RoleSet) -> GateDecision {
        Gate::require_role(roles, &self.resolution)
    }

    /// Requires the given permissions.
    pub fn require_permission(&self, requirement: &PermissionRequirement) -> GateDecision {
        Gate::require_permission(requirement, &self.resolution)
    }

    /// Returns the user id for audit records, or `anonymous`.
    pub fn audit_user(&self) -> String {
        self.claims()
            .map(|c| c.sub.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smartone_core::{Role, UserId};

    #[test]
    fn test_anonymous_context() {
        let ctx = SessionContext::anonymous();
        assert!(!ctx.is_authenticated());
        assert!(ctx.claims().is_none());
        assert_eq!(ctx.audit_user(), "anonymous");
    }

    #[test]
    fn test_require_role_through_context() {
        let user_id = UserId::new();
        let claims = SessionClaims::builder(user_id, &Role::new("Administrator")).build();
        let ctx = SessionContext::authenticated(claims);

        let roles = RoleSet::new(["Administrator"]).unwrap();
        assert!(ctx.require_role(&roles).is_authorized());
        assert_eq!(ctx.audit_user(), user_id.to_string());

        let roles = RoleSet::new(["System Administrator"]).unwrap();
        assert!(ctx.require_role(&roles).is_forbidden());
    }
}
