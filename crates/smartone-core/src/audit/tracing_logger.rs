// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit logger that forwards entries to `tracing`.

use async_trait::async_trait;

use super::error::AuditResult;
use super::types::{AuditLog, AuditSeverity};
use super::AuditLogger;

/// Tracing target used for audit events.
pub const AUDIT_TARGET: &str = "audit";

/// Emits every entry as a structured event on the `audit` target.
///
/// Routing and retention are left to the subscriber, so this logger cannot be
/// queried.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditLogger;

impl TracingAuditLogger {
    /// Creates a new tracing logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        let details = if entry.details.is_null() {
            String::new()
        } else {
            serde_json::to_string(&entry.details)?
        };
        let user_id = entry.user_id.as_deref().unwrap_or("-");
        let client_ip = entry
            .client_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "-".to_string());

        macro_rules! emit {
            ($level:ident) => {
                tracing::$level!(
                    target: AUDIT_TARGET,
                    audit_id = %entry.id,
                    action = %entry.action,
                    result = entry.result.as_str(),
                    user_id = user_id,
                    client_ip = %client_ip,
                    resource_type = %entry.resource.resource_type,
                    resource_id = %entry.resource.resource_id,
                    request_id = entry.request_id.as_deref().unwrap_or("-"),
                    details = %details,
                    "audit"
                )
            };
        }

        match entry.severity {
            AuditSeverity::Info | AuditSeverity::Notice => emit!(info),
            AuditSeverity::Warning => emit!(warn),
            AuditSeverity::Error => emit!(error),
        }
        Ok(())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracing_logger_accepts_entries() {
        let logger = TracingAuditLogger::new();
        assert!(logger.log(AuditLog::login("u-1", None)).await.is_ok());
        assert!(
            logger
                .log(AuditLog::access_denied("u-2", "/api/users", None, "Staff"))
                .await
                .is_ok()
        );
    }
}
