// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit log entry types.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Audit Log Entry
// =============================================================================

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// Unique identifier for this log entry.
    pub id: Uuid,

    /// Timestamp when the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Severity of the event.
    pub severity: AuditSeverity,

    /// User who performed the action, or the attempted email for failed logins.
    pub user_id: Option<String>,

    /// Client IP address.
    pub client_ip: Option<IpAddr>,

    /// The action that was performed.
    pub action: AuditAction,

    /// The resource that was affected.
    pub resource: AuditResource,

    /// Additional details about the action.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,

    /// The result of the action.
    pub result: ActionResult,

    /// Request ID for correlating with request traces.
    pub request_id: Option<String>,
}

impl AuditLog {
    /// Creates a new audit log entry.
    pub fn new(action: AuditAction, resource: AuditResource, result: ActionResult) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            severity: action.default_severity(),
            user_id: None,
            client_ip: None,
            action,
            resource,
            details: serde_json::Value::Null,
            result,
            request_id: None,
        }
    }

    /// Sets the user information.
    pub fn with_user(mut self, user_id: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        self.user_id = Some(user_id.into());
        self.client_ip = client_ip;
        self
    }

    /// Sets the details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets the severity.
    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    // =========================================================================
    // Factory methods for common actions
    // =========================================================================

    /// Creates an audit log for a successful login.
    pub fn login(user_id: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        let user_id = user_id.into();
        Self::new(AuditAction::Login, AuditResource::user(&user_id), ActionResult::Success)
            .with_user(&user_id, client_ip)
    }

    /// Creates an audit log for a rejected login.
    ///
    /// The attempted email stands in for the user id.
    pub fn login_failed(
        email: impl Into<String>,
        client_ip: Option<IpAddr>,
        reason: impl Into<String>,
    ) -> Self {
        let email = email.into();
        Self::new(
            AuditAction::LoginFailed,
            AuditResource::user(&email),
            ActionResult::failure(reason),
        )
        .with_user(&email, client_ip)
    }

    /// Creates an audit log for a logout.
    pub fn logout(user_id: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        let user_id = user_id.into();
        Self::new(AuditAction::Logout, AuditResource::user(&user_id), ActionResult::Success)
            .with_user(&user_id, client_ip)
    }

    /// Creates an audit log for a request turned away by a role gate.
    pub fn access_denied(
        user_id: impl Into<String>,
        path: impl Into<String>,
        client_ip: Option<IpAddr>,
        role: impl Into<String>,
    ) -> Self {
        Self::new(AuditAction::AccessDenied, AuditResource::route(path), ActionResult::Denied)
            .with_user(user_id, client_ip)
            .with_details(serde_json::json!({
                "role": role.into(),
            }))
    }

    /// Creates an audit log for a newly provisioned user.
    pub fn user_created(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(
            AuditAction::UserCreate,
            AuditResource::user(user_id),
            ActionResult::Success,
        )
        .with_details(serde_json::json!({
            "email": email.into(),
        }))
    }

    /// Creates an audit log for a deleted user.
    pub fn user_deleted(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(
            AuditAction::UserDelete,
            AuditResource::user(user_id),
            ActionResult::Success,
        )
        .with_details(serde_json::json!({
            "email": email.into(),
        }))
    }
}

// =============================================================================
// Audit Severity
// =============================================================================

/// Severity level for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Normal operations.
    #[default]
    Info,

    /// Normal but significant events.
    Notice,

    /// Potentially harmful situations.
    Warning,

    /// Error events.
    Error,
}

impl AuditSeverity {
    /// Returns the severity level as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Info => "info",
            AuditSeverity::Notice => "notice",
            AuditSeverity::Warning => "warning",
            AuditSeverity::Error => "error",
        }
    }
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audit Action
// =============================================================================

/// Types of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Successful credentials login.
    Login,
    /// Rejected credentials login.
    LoginFailed,
    /// Logout.
    Logout,
    /// Authenticated request refused by a role or permission gate.
    AccessDenied,
    /// User provisioned.
    UserCreate,
    /// User deleted.
    UserDelete,
}

impl AuditAction {
    /// Returns the action name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::Logout => "logout",
            AuditAction::AccessDenied => "access_denied",
            AuditAction::UserCreate => "user_create",
            AuditAction::UserDelete => "user_delete",
        }
    }

    /// Returns the default severity for this action.
    pub fn default_severity(&self) -> AuditSeverity {
        match self {
            AuditAction::Login | AuditAction::Logout => AuditSeverity::Info,
            AuditAction::LoginFailed | AuditAction::AccessDenied => AuditSeverity::Warning,
            AuditAction::UserCreate | AuditAction::UserDelete => AuditSeverity::Notice,
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audit Resource
// =============================================================================

/// The resource that was affected by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResource {
    /// Resource type.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
}

impl AuditResource {
    /// Creates a new resource.
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// A user account.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::new("user", user_id)
    }

    /// An HTTP route.
    pub fn route(path: impl Into<String>) -> Self {
        Self::new("route", path)
    }

    /// The service itself.
    pub fn system() -> Self {
        Self::new("system", "smartone")
    }
}

// =============================================================================
// Action Result
// =============================================================================

/// The result of an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status")]
pub enum ActionResult {
    /// Action completed successfully.
    #[default]
    #[serde(rename = "success")]
    Success,

    /// Action failed.
    #[serde(rename = "failure")]
    Failure {
        /// Reason for failure.
        reason: String,
    },

    /// Action was denied (authorization).
    #[serde(rename = "denied")]
    Denied,
}

impl ActionResult {
    /// Creates a failure result.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the action was successful.
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success)
    }

    /// Returns `true` if the action was denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, ActionResult::Denied)
    }

    /// Returns `true` if the action failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionResult::Failure { .. })
    }

    /// Returns the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionResult::Success => "success",
            ActionResult::Failure { .. } => "failure",
            ActionResult::Denied => "denied",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_severities() {
        assert_eq!(AuditLog::login("u-1", None).severity, AuditSeverity::Info);
        assert_eq!(
            AuditLog::login_failed("a@b.c", None, "bad password").severity,
            AuditSeverity::Warning
        );
        assert_eq!(
            AuditLog::user_deleted("u-1", "a@b.c").severity,
            AuditSeverity::Notice
        );
    }

    #[test]
    fn test_access_denied_entry() {
        let log = AuditLog::access_denied("u-1", "/api/permissions", None, "Staff");
        assert_eq!(log.action, AuditAction::AccessDenied);
        assert!(log.result.is_denied());
        assert_eq!(log.resource, AuditResource::route("/api/permissions"));
        assert_eq!(log.details["role"], "Staff");
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(ActionResult::failure("nope")).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["reason"], "nope");
    }
}
