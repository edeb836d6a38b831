// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # smartone-bin
//!
//! The `smartone` binary: the HTTP service plus user administration.
//!
//! ## Usage
//!
//! ```bash
//! # Start the service (default command)
//! smartone -c /etc/smartone/smartone.yaml
//!
//! # Validate configuration
//! smartone validate -f json
//!
//! # User administration
//! smartone users list
//! smartone users delete kim@smartone-erp.com
//! SMARTONE_USER_PASSWORD=... smartone users add --name Kim --email kim@smartone-erp.com --role Staff
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, ServiceRuntime};
pub use shutdown::ShutdownCoordinator;

use cli::LogFormat;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolves the log level and format for this invocation.
///
/// Command-line flags and their environment variables win; otherwise the
/// `logging` section of the configuration file applies when it loads.
pub fn logging_settings(cli: &Cli) -> (String, LogFormat) {
    let file = cli
        .config
        .exists()
        .then(|| smartone_config::load_config(&cli.config).ok())
        .flatten()
        .map(|config| config.logging)
        .unwrap_or_default();

    let level = cli.effective_log_level(file.level.as_str()).to_string();
    let format = cli.log_format.unwrap_or_else(|| file.format.into());
    (level, format)
}
