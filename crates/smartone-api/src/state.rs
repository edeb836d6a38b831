// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use smartone_config::SmartOneConfig;
use smartone_core::audit::{AuditLogger, NoOpAuditLogger};
use smartone_core::{IdentityStore, MemoryIdentityStore};

use crate::auth::{RoleSet, SessionCookie, SessionResolver, SessionTokenManager};
use crate::error::ApiResult;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<SmartOneConfig>,
    /// Identity store.
    pub store: Arc<dyn IdentityStore>,
    /// Session token manager.
    pub tokens: Arc<SessionTokenManager>,
    /// Session resolver shared with the session middleware.
    pub resolver: Arc<SessionResolver>,
    /// Roles admitted to the settings routes.
    pub allowed_roles: Arc<RoleSet>,
    /// Audit logger.
    pub audit_logger: Arc<dyn AuditLogger>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the identity store.
    pub fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    /// Returns the session cookie settings.
    pub fn cookie(&self) -> &SessionCookie {
        self.resolver.cookie()
    }

    /// Returns the audit logger.
    pub fn audit(&self) -> &Arc<dyn AuditLogger> {
        &self.audit_logger
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.name())
            .field("tokens", &self.tokens)
            .field("allowed_roles", &self.allowed_roles)
            .field("audit_logger", &self.audit_logger.name())
            .finish()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<SmartOneConfig>,
    store: Option<Arc<dyn IdentityStore>>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: SmartOneConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the identity store.
    pub fn store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Builds the AppState.
    ///
    /// Fails when the session secret is missing or the allowed role list is
    /// empty. Without a store an empty in-memory directory is used.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let tokens = Arc::new(SessionTokenManager::new(&config.session)?);
        let allowed_roles = Arc::new(RoleSet::new(config.settings.allowed_roles.iter())?);

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryIdentityStore::new()));

        let resolver = Arc::new(
            SessionResolver::new(
                tokens.clone(),
                store.clone(),
                SessionCookie::from_config(&config.session),
            )
            .with_principal_check(config.session.verify_principal),
        );

        let audit_logger = self
            .audit_logger
            .unwrap_or_else(|| Arc::new(NoOpAuditLogger));

        Ok(AppState {
            config: Arc::new(config),
            store,
            tokens,
            resolver,
            allowed_roles,
            audit_logger,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<SessionTokenManager> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<dyn IdentityStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<SmartOneConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smartone_config::SecretValue;

    fn config() -> SmartOneConfig {
        let mut config = SmartOneConfig::default();
        config.session.secret = Some(SecretValue::new("state-test-secret-key-long-enough-000"));
        config
    }

    #[test]
    fn test_app_state_builder() {
        let state = AppState::builder().config(config()).build().unwrap();

        assert!(state.allowed_roles.contains("Administrator"));
        assert!(state.allowed_roles.contains("System Administrator"));
        assert_eq!(state.cookie().name(), "smartone.session-token");
        assert_eq!(state.audit().name(), "noop");
    }

    #[test]
    fn test_missing_secret_fails() {
        let err = AppState::builder()
            .config(SmartOneConfig::default())
            .build()
            .unwrap_err();
        assert!(err.is_server_error());
    }

    #[test]
    fn test_empty_allowed_roles_fails() {
        let mut config = config();
        config.settings.allowed_roles.clear();
        assert!(AppState::builder().config(config).build().is_err());
    }
}
