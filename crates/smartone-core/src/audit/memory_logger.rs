// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory audit logger for testing and development.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::AuditResult;
use super::types::{AuditAction, AuditLog};
use super::AuditLogger;

// =============================================================================
// In-Memory Audit Logger
// =============================================================================

/// In-memory audit logger.
///
/// Clones share the same entry list, so a test can keep one handle while the
/// application state owns another.
///
/// # Example
///
/// ```rust,ignore
/// use smartone_core::audit::{InMemoryAuditLogger, AuditLog, AuditAction};
///
/// let logger = InMemoryAuditLogger::new();
/// logger.log(AuditLog::login("u-1", None)).await?;
/// assert_eq!(logger.entries_for_action(AuditAction::Login).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLogger {
    logs: Arc<RwLock<Vec<AuditLog>>>,
    /// Maximum number of entries to keep (0 = unlimited).
    max_entries: usize,
}

impl InMemoryAuditLogger {
    /// Creates a new in-memory logger with unlimited capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logger that drops the oldest entry once `max_entries` is reached.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            logs: Arc::new(RwLock::new(Vec::with_capacity(max_entries.min(10_000)))),
            max_entries,
        }
    }

    /// Returns all logged entries.
    pub fn entries(&self) -> Vec<AuditLog> {
        self.logs.read().clone()
    }

    /// Returns entries matching a predicate.
    pub fn entries_where<F>(&self, predicate: F) -> Vec<AuditLog>
    where
        F: Fn(&AuditLog) -> bool,
    {
        self.logs.read().iter().filter(|l| predicate(l)).cloned().collect()
    }

    /// Returns entries for a specific user.
    pub fn entries_for_user(&self, user_id: &str) -> Vec<AuditLog> {
        self.entries_where(|l| l.user_id.as_deref() == Some(user_id))
    }

    /// Returns entries for a specific action.
    pub fn entries_for_action(&self, action: AuditAction) -> Vec<AuditLog> {
        self.entries_where(|l| l.action == action)
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.logs.write().clear();
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    /// Returns `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.logs.read().is_empty()
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        let mut logs = self.logs.write();
        if self.max_entries > 0 && logs.len() >= self.max_entries {
            logs.remove(0);
        }
        logs.push(entry);
        Ok(())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_logger_capacity() {
        let logger = InMemoryAuditLogger::with_capacity(3);
        for i in 0..5 {
            logger.log(AuditLog::login(format!("u-{}", i), None)).await.unwrap();
        }

        assert_eq!(logger.len(), 3);
        assert_eq!(logger.entries()[0].user_id.as_deref(), Some("u-2"));
    }

    #[tokio::test]
    async fn test_memory_logger_lookups() {
        let logger = InMemoryAuditLogger::new();
        logger.log(AuditLog::login("admin", None)).await.unwrap();
        logger
            .log(AuditLog::access_denied("staff", "/api/roles", None, "Staff"))
            .await
            .unwrap();
        logger
            .log(AuditLog::login_failed("staff@smartone-erp.com", None, "invalid password"))
            .await
            .unwrap();

        assert_eq!(logger.entries_for_action(AuditAction::Login).len(), 1);
        assert_eq!(logger.len(), 3);
        assert_eq!(logger.entries_for_user("staff").len(), 1);
        assert_eq!(logger.entries_for_action(AuditAction::AccessDenied).len(), 1);
    }

    #[tokio::test]
    async fn test_memory_logger_clone_shares_entries() {
        let logger = InMemoryAuditLogger::new();
        let handle = logger.clone();

        logger.log(AuditLog::logout("admin", None)).await.unwrap();
        assert_eq!(handle.len(), 1);

        handle.clear();
        assert!(logger.is_empty());
    }
}
