// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # smartone-config
//!
//! Configuration management for the SmartOne authorization service.
//!
//! ## Features
//!
//! - **Schema Definition**: server, session, settings, store, audit and logging sections
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `SMARTONE_*` variables and `${VAR:default}` placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use smartone_config::loader::load_config;
//!
//! let config = load_config("smartone.yaml").unwrap();
//! println!("Listening on {}", config.server.socket_addr());
//! ```
//!
//! ## Example File
//!
//! ```yaml
//! server:
//!   port: 3000
//! session:
//!   secret: "${SMARTONE_SECRET}"
//!   max_age_secs: 2592000
//!   update_age_secs: 86400
//! settings:
//!   allowed_roles: ["System Administrator", "Administrator"]
//! store:
//!   kind: file
//!   path: ./data/identity.json
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, parse_log_level, ConfigFormat, ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{
    AuditConfig, CorsConfig, LogFormat, LogLevel, LoggingConfig, PagesConfig, SecretValue,
    ServerConfig, SessionAlgorithm, SessionConfig, SettingsConfig, SmartOneConfig, StoreConfig,
    StoreKind,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
