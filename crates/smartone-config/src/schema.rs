// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for SmartOne.
//!
//! # Schema Structure
//!
//! ```text
//! SmartOneConfig
//! ├── server: ServerConfig
//! ├── session: SessionConfig
//! │   └── pages: PagesConfig
//! ├── settings: SettingsConfig
//! ├── store: StoreConfig
//! ├── audit: AuditConfig
//! └── logging: LoggingConfig
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default listen port.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default session lifetime in seconds (30 days).
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Default age after which a session token is re-signed (24 hours).
pub const DEFAULT_SESSION_UPDATE_AGE_SECS: u64 = 24 * 60 * 60;

/// Longest accepted session lifetime in seconds (365 days).
pub const MAX_SESSION_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "smartone.session-token";

/// Recommended minimum secret length in bytes.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Roles allowed on the settings endpoints by default.
pub const DEFAULT_ALLOWED_ROLES: [&str; 2] = ["System Administrator", "Administrator"];

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for SmartOne.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmartOneConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Session token and cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Settings endpoint configuration.
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Identity store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SmartOneConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.session.validate()?;
        self.settings.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Listen port.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_request_timeout() -> u64 {
    30
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: DEFAULT_SERVER_PORT,
            request_timeout_secs: default_request_timeout(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins. Empty disables CORS; "*" allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allow credentials (cookies) on cross-origin requests.
    #[serde(default)]
    pub allow_credentials: bool,
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Session token and cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Token signing secret.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// Token issuer.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Signing algorithm.
    #[serde(default)]
    pub algorithm: SessionAlgorithm,

    /// Session lifetime in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    /// Age in seconds after which a valid token is re-signed.
    #[serde(default = "default_update_age")]
    pub update_age_secs: u64,

    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,

    /// Session cookie name.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Mark the session cookie `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,

    /// Look the principal up on every request and treat a missing one as
    /// unauthenticated.
    #[serde(default = "default_true")]
    pub verify_principal: bool,

    /// Page routes used by redirecting gates.
    #[serde(default)]
    pub pages: PagesConfig,
}

fn default_issuer() -> String {
    "smartone".to_string()
}

fn default_max_age() -> u64 {
    DEFAULT_SESSION_MAX_AGE_SECS
}

fn default_update_age() -> u64 {
    DEFAULT_SESSION_UPDATE_AGE_SECS
}

fn default_leeway() -> u64 {
    60
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

impl SessionConfig {
    /// Validates the session configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        match self.secret {
            None => return Err(ConfigError::missing_field("session.secret")),
            Some(ref secret) if secret.raw().is_empty() => {
                return Err(ConfigError::validation("session.secret", "cannot be empty"));
            }
            Some(ref secret) if secret.raw().len() < RECOMMENDED_SECRET_LEN => {
                tracing::warn!(
                    length = secret.raw().len(),
                    recommended = RECOMMENDED_SECRET_LEN,
                    "Session secret is shorter than recommended"
                );
            }
            Some(_) => {}
        }
        if self.max_age_secs == 0 {
            return Err(ConfigError::validation("session.max_age_secs", "cannot be zero"));
        }
        if self.max_age_secs > MAX_SESSION_AGE_SECS {
            return Err(ConfigError::validation(
                "session.max_age_secs",
                format!("cannot exceed {} seconds", MAX_SESSION_AGE_SECS),
            ));
        }
        if self.update_age_secs > self.max_age_secs {
            return Err(ConfigError::validation(
                "session.update_age_secs",
                "cannot exceed session.max_age_secs",
            ));
        }
        if self.cookie_name.trim().is_empty() {
            return Err(ConfigError::validation("session.cookie_name", "cannot be empty"));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::validation("session.issuer", "cannot be empty"));
        }
        self.pages.validate()?;
        Ok(())
    }

    /// Returns the session lifetime as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    /// Returns the refresh threshold as a Duration.
    pub fn update_age(&self) -> Duration {
        Duration::from_secs(self.update_age_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: default_issuer(),
            algorithm: SessionAlgorithm::default(),
            max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
            update_age_secs: DEFAULT_SESSION_UPDATE_AGE_SECS,
            leeway_secs: default_leeway(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            verify_principal: true,
            pages: PagesConfig::default(),
        }
    }
}

/// Session token signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionAlgorithm {
    /// HMAC using SHA-256.
    #[default]
    HS256,
    /// HMAC using SHA-384.
    HS384,
    /// HMAC using SHA-512.
    HS512,
}

/// Page routes used by redirecting gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagesConfig {
    /// Sign-in page.
    #[serde(default = "default_sign_in")]
    pub sign_in: String,

    /// Not-authorized page.
    #[serde(default = "default_unauthorized")]
    pub unauthorized: String,
}

fn default_sign_in() -> String {
    "/auth/signin".to_string()
}

fn default_unauthorized() -> String {
    "/unauthorized".to_string()
}

impl PagesConfig {
    /// Validates the page routes.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("session.pages.sign_in", &self.sign_in),
            ("session.pages.unauthorized", &self.unauthorized),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::validation(field, "must be an absolute path"));
            }
        }
        Ok(())
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            sign_in: default_sign_in(),
            unauthorized: default_unauthorized(),
        }
    }
}

// =============================================================================
// Settings Configuration
// =============================================================================

/// Settings endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsConfig {
    /// Role names allowed on the settings endpoints. Matched exactly.
    #[serde(default = "default_allowed_roles")]
    pub allowed_roles: Vec<String>,
}

fn default_allowed_roles() -> Vec<String> {
    DEFAULT_ALLOWED_ROLES.iter().map(|r| r.to_string()).collect()
}

impl SettingsConfig {
    /// Validates the settings configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.allowed_roles.is_empty() {
            return Err(ConfigError::validation("settings.allowed_roles", "cannot be empty"));
        }
        if self.allowed_roles.iter().any(|r| r.is_empty()) {
            return Err(ConfigError::validation(
                "settings.allowed_roles",
                "role names cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            allowed_roles: default_allowed_roles(),
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Identity store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend.
    #[serde(default)]
    pub kind: StoreKind,

    /// Snapshot path for the file backend.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Create the built-in administrator roles on startup when missing.
    #[serde(default = "default_true")]
    pub seed_default_roles: bool,
}

/// Returns the default snapshot path.
pub fn default_store_path() -> PathBuf {
    PathBuf::from("./data/identity.json")
}

impl StoreConfig {
    /// Validates the store configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.kind == StoreKind::File && self.path.as_os_str().is_empty() {
            return Err(ConfigError::validation(
                "store.path",
                "is required for the file store",
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: default_store_path(),
            seed_default_roles: true,
        }
    }
}

/// Identity store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// JSON snapshot on disk.
    #[default]
    File,
    /// Process memory only.
    Memory,
}

// =============================================================================
// Audit Configuration
// =============================================================================

/// Audit logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Whether audit logging is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON for log aggregation.
    Json,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret configuration value. Never printed or serialized in clear.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl Serialize for SecretValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SmartOneConfig {
        let mut config = SmartOneConfig::default();
        config.session.secret = Some(SecretValue::new("0123456789abcdef0123456789abcdef"));
        config
    }

    #[test]
    fn test_defaults() {
        let config = SmartOneConfig::default();
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
        assert_eq!(config.session.cookie_name, "smartone.session-token");
        assert_eq!(
            config.settings.allowed_roles,
            vec!["System Administrator", "Administrator"]
        );
        assert_eq!(config.session.pages.sign_in, "/auth/signin");
        assert!(config.session.verify_principal);
    }

    #[test]
    fn test_secret_required() {
        let config = SmartOneConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField { .. })));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_short_secret_is_accepted() {
        let mut config = valid();
        config.session.secret = Some(SecretValue::new("short"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_update_age_bounded_by_max_age() {
        let mut config = valid();
        config.session.max_age_secs = 60;
        config.session.update_age_secs = 120;
        assert!(config.validate().is_err());

        config.session.max_age_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_age_has_upper_bound() {
        let mut config = valid();
        config.session.max_age_secs = MAX_SESSION_AGE_SECS;
        assert!(config.validate().is_ok());

        config.session.max_age_secs = 10_000_000_000_000_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "session.max_age_secs"
        ));
    }

    #[test]
    fn test_allowed_roles_cannot_be_empty() {
        let mut config = valid();
        config.settings.allowed_roles.clear();
        assert!(config.validate().is_err());

        config.settings.allowed_roles = vec![String::new()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cookie_name_required() {
        let mut config = valid();
        config.session.cookie_name = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pages_must_be_absolute() {
        let mut config = valid();
        config.session.pages.sign_in = "auth/signin".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secret_value_is_hidden() {
        let secret = SecretValue::new("super-secret");
        assert_eq!(secret.to_string(), "***");
        assert!(!format!("{:?}", secret).contains("super-secret"));
        assert_eq!(secret.raw(), "super-secret");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"***\"");
    }
}
