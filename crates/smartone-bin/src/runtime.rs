// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Loads configuration, opens the identity store, picks the audit backend
//! and runs the HTTP server until shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use smartone_api::ApiServerBuilder;
use smartone_config::{ConfigLoader, SmartOneConfig, StoreKind};
use smartone_core::audit::{AuditLogger, NoOpAuditLogger, TracingAuditLogger};
use smartone_core::{admin, FileIdentityStore, IdentityStore, MemoryIdentityStore};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// Component construction
// =============================================================================

/// Loads the configuration file, or defaults plus environment overrides when
/// the file does not exist.
pub fn load_configuration(path: &Path) -> BinResult<SmartOneConfig> {
    let loader = ConfigLoader::new();
    if path.exists() {
        return loader.load(path).map_err(|e| {
            BinError::from(e).with_context(format!("Failed to load {}", path.display()))
        });
    }

    warn!(path = %path.display(), "Configuration file not found, using defaults");
    Ok(loader.load_defaults()?)
}

/// Opens the identity store described by the configuration.
///
/// Seeds the built-in administrator roles when configured to.
pub async fn open_store(config: &SmartOneConfig) -> BinResult<Arc<dyn IdentityStore>> {
    let store: Arc<dyn IdentityStore> = match config.store.kind {
        StoreKind::File => {
            let store = FileIdentityStore::open(&config.store.path).map_err(|e| {
                BinError::init(format!(
                    "Failed to open identity store {}: {}",
                    config.store.path.display(),
                    e
                ))
            })?;
            info!(path = %config.store.path.display(), "File identity store opened");
            Arc::new(store)
        }
        StoreKind::Memory => {
            warn!("Using in-memory identity store; changes are lost on exit");
            Arc::new(MemoryIdentityStore::new())
        }
    };

    if config.store.seed_default_roles {
        let created = admin::seed_default_roles(store.as_ref()).await?;
        if !created.is_empty() {
            info!(count = created.len(), "Default roles created");
        }
    }

    Ok(store)
}

/// Creates the audit logger based on configuration.
pub fn create_audit_logger(config: &SmartOneConfig) -> Arc<dyn AuditLogger> {
    if config.audit.enabled {
        info!("Audit logging enabled (tracing target \"audit\")");
        Arc::new(TracingAuditLogger::new())
    } else {
        info!("Audit logging disabled");
        Arc::new(NoOpAuditLogger)
    }
}

// =============================================================================
// ServiceRuntime
// =============================================================================

/// The service runtime.
pub struct ServiceRuntime {
    config: SmartOneConfig,
    shutdown: ShutdownCoordinator,
}

impl ServiceRuntime {
    /// Creates a new runtime.
    pub fn new(config: SmartOneConfig) -> Self {
        Self {
            config,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the service until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting SmartOne v{}", smartone_api::VERSION);

        let store = open_store(&self.config).await?;
        let audit_logger = create_audit_logger(&self.config);

        let server = ApiServerBuilder::new()
            .config(self.config)
            .store(store)
            .audit_logger(audit_logger.clone())
            .build()?;

        let signals = self.shutdown.clone();
        tokio::spawn(async move { signals.wait_for_shutdown().await });

        let result = server.run_with_shutdown(self.shutdown.shutdown_signal()).await;

        if let Err(e) = audit_logger.flush().await {
            warn!(error = %e, "Failed to flush audit log");
        }
        info!("SmartOne shutdown complete");

        result.map_err(BinError::from)
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the service runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<SmartOneConfig>,
    port: Option<u16>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: SmartOneConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ServiceRuntime> {
        let mut config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => load_configuration(&path)?,
            (None, None) => return Err(BinError::config("No configuration provided")),
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(ServiceRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smartone_config::SecretValue;

    fn test_config() -> SmartOneConfig {
        let mut config = SmartOneConfig::default();
        config.session.secret = Some(SecretValue::new("runtime-test-secret-long-enough-000"));
        config.store.kind = StoreKind::Memory;
        config
    }

    #[test]
    fn test_runtime_builder_port_override() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .port(Some(9090))
            .build()
            .unwrap();
        assert_eq!(runtime.config.server.port, 9090);
        assert!(!runtime.shutdown().is_shutdown_initiated());
    }

    #[test]
    fn test_runtime_builder_requires_config() {
        assert!(RuntimeBuilder::new().build().is_err());
    }

    #[tokio::test]
    async fn test_open_memory_store_seeds_roles() {
        let store = open_store(&test_config()).await.unwrap();
        assert!(store.find_role_by_name("Administrator").await.unwrap().is_some());
        assert!(store.find_role_by_name("System Administrator").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.store.kind = StoreKind::File;
        config.store.path = dir.path().join("identity.json");

        let store = open_store(&config).await.unwrap();
        assert_eq!(store.list_roles().await.unwrap().len(), 2);
    }

    #[test]
    fn test_audit_logger_selection() {
        let mut config = test_config();
        config.audit.enabled = false;
        assert_eq!(create_audit_logger(&config).name(), "noop");
    }
}
